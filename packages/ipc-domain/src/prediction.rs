use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::section::SectionRecord;

pub const FALLBACK_TEXT: &str =
	"The described incident does not clearly fall under a specific IPC section.";

/// The single "no applicable section" answer. Every failed or gated request returns this.
pub const FALLBACK: PredictionResult = PredictionResult {
	predicted_sections: Vec::new(),
	confidence: 0.0,
	explanation: Cow::Borrowed(FALLBACK_TEXT),
	title: Cow::Borrowed(""),
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
	/// Zero or one identifier, always drawn from the candidate set of the request.
	pub predicted_sections: Vec<String>,
	pub confidence: f64,
	pub explanation: Cow<'static, str>,
	/// Empty unless exactly one section was predicted.
	pub title: Cow<'static, str>,
}
impl PredictionResult {
	pub fn section(&self) -> Option<&str> {
		match self.predicted_sections.as_slice() {
			[section] => Some(section.as_str()),
			_ => None,
		}
	}

	pub fn is_fallback(&self) -> bool {
		*self == FALLBACK
	}

	/// Attach the catalog title of the predicted section, looked up among `candidates` only.
	pub fn with_title_from<'a, I>(mut self, candidates: I) -> Self
	where
		I: IntoIterator<Item = &'a SectionRecord>,
	{
		let title = self.section().and_then(|section| {
			candidates
				.into_iter()
				.find(|record| record.section_number.trim() == section)
				.map(|record| record.title.trim().to_string())
		});

		self.title = title.map(Cow::Owned).unwrap_or(Cow::Borrowed(""));

		self
	}
}

/// A catalog entry scored against one query.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate {
	pub record: SectionRecord,
	pub similarity: f32,
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::section::OffenceType;

	fn record(section_number: &str, title: &str) -> SectionRecord {
		SectionRecord {
			section_number: section_number.to_string(),
			title: title.to_string(),
			summary: String::new(),
			keywords: Vec::new(),
			full_text: String::new(),
			offence_type: OffenceType::Other,
		}
	}

	#[test]
	fn fallback_satisfies_the_empty_prediction_invariant() {
		assert!(FALLBACK.predicted_sections.is_empty());
		assert_eq!(FALLBACK.confidence, 0.0);
		assert_eq!(FALLBACK.explanation, FALLBACK_TEXT);
		assert!(FALLBACK.title.is_empty());
		assert!(FALLBACK.is_fallback());
		assert_eq!(FALLBACK.section(), None);
	}

	#[test]
	fn fallback_serializes_with_camel_case_keys() {
		let json = serde_json::to_value(FALLBACK).expect("Serialize failed.");

		assert_eq!(
			json,
			serde_json::json!({
				"predictedSections": [],
				"confidence": 0.0,
				"explanation": FALLBACK_TEXT,
				"title": "",
			})
		);
	}

	#[test]
	fn title_comes_from_matching_candidate() {
		let candidates = [record("378", "Theft"), record("420", " Cheating ")];
		let result = PredictionResult {
			predicted_sections: vec!["420".to_string()],
			confidence: 0.8,
			explanation: Cow::Borrowed("Deceit."),
			title: Cow::Borrowed(""),
		}
		.with_title_from(&candidates);

		assert_eq!(result.title, "Cheating");
	}

	#[test]
	fn title_stays_empty_without_a_match() {
		let candidates = [record("378", "Theft")];
		let result = PredictionResult {
			predicted_sections: vec!["999".to_string()],
			confidence: 0.8,
			explanation: Cow::Borrowed("Unknown."),
			title: Cow::Borrowed("stale"),
		}
		.with_title_from(&candidates);

		assert!(result.title.is_empty());
		assert!(FALLBACK.with_title_from(&candidates).is_fallback());
	}
}
