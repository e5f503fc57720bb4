//! Validation of raw reasoning output.
//!
//! [`validate_response`] reports the first violated rule; [`guard_response`] collapses every
//! violation to [`FALLBACK`].

use std::{borrow::Cow, sync::LazyLock};

use regex::Regex;
use serde_json::{Map, Value};

use crate::prediction::{FALLBACK, PredictionResult};

pub const MIN_CONFIDENCE: f64 = 0.30;

pub const KEY_PREDICTED_SECTIONS: &str = "predictedSections";
pub const KEY_CONFIDENCE: &str = "confidence";
pub const KEY_EXPLANATION: &str = "explanation";

const REQUIRED_KEYS: [&str; 3] = [KEY_PREDICTED_SECTIONS, KEY_CONFIDENCE, KEY_EXPLANATION];

// One fenced block spanning the whole reply, with an optional info string such as `json`.
static FENCE: LazyLock<Option<Regex>> =
	LazyLock::new(|| Regex::new(r"(?s)\A```[A-Za-z0-9_+-]*[ \t]*\r?\n?(.*?)\s*```\z").ok());

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Rejection {
	#[error("Response is not valid JSON.")]
	Unparsable,
	#[error("Response is not a JSON object.")]
	NotAnObject,
	#[error("Response is missing the {0} key.")]
	MissingKey(&'static str),
	#[error("predictedSections is not a list.")]
	SectionsNotAList,
	#[error("predictedSections is empty.")]
	Abstained,
	#[error("predictedSections holds {0} elements.")]
	MultipleSections(usize),
	#[error("The predicted section is not a string.")]
	SectionNotAString,
	#[error("The predicted section is blank.")]
	EmptySection,
	#[error("Section {0} is not among the allowed candidates.")]
	SectionNotAllowed(String),
	#[error("confidence is not a number.")]
	ConfidenceNotANumber,
	#[error("confidence is not finite.")]
	ConfidenceNotFinite,
	#[error("confidence {confidence} is below the minimum {min_confidence}.")]
	BelowMinConfidence { confidence: f64, min_confidence: f64 },
	#[error("explanation is not a string.")]
	ExplanationNotAString,
	#[error("explanation is blank.")]
	EmptyExplanation,
}
impl Rejection {
	/// Stable label for logs and metrics.
	pub fn code(&self) -> &'static str {
		match self {
			Self::Unparsable => "unparsable",
			Self::NotAnObject => "not_an_object",
			Self::MissingKey(_) => "missing_key",
			Self::SectionsNotAList => "sections_not_a_list",
			Self::Abstained => "abstained",
			Self::MultipleSections(_) => "multiple_sections",
			Self::SectionNotAString => "section_not_a_string",
			Self::EmptySection => "empty_section",
			Self::SectionNotAllowed(_) => "section_not_allowed",
			Self::ConfidenceNotANumber => "confidence_not_a_number",
			Self::ConfidenceNotFinite => "confidence_not_finite",
			Self::BelowMinConfidence { .. } => "below_min_confidence",
			Self::ExplanationNotAString => "explanation_not_a_string",
			Self::EmptyExplanation => "empty_explanation",
		}
	}
}

/// Remove a single wrapping fence. Anything else is returned trimmed but untouched.
pub fn strip_fence(raw: &str) -> &str {
	let trimmed = raw.trim();

	FENCE
		.as_ref()
		.and_then(|re| re.captures(trimmed))
		.and_then(|caps| caps.get(1))
		.map(|inner| inner.as_str().trim())
		.unwrap_or(trimmed)
}

/// Check `raw` against the output contract. On success the result carries exactly one
/// trimmed identifier from `allowed_sections`, a confidence clamped to `[0, 1]`, the trimmed
/// explanation, and an empty title.
pub fn validate_response(
	raw: &str,
	allowed_sections: &[String],
	min_confidence: f64,
) -> Result<PredictionResult, Rejection> {
	let parsed: Value =
		serde_json::from_str(strip_fence(raw)).map_err(|_| Rejection::Unparsable)?;
	let Value::Object(object) = parsed else {
		return Err(Rejection::NotAnObject);
	};

	for key in REQUIRED_KEYS {
		if !object.contains_key(key) {
			return Err(Rejection::MissingKey(key));
		}
	}

	let section = validate_section(&object, allowed_sections)?;
	let confidence = validate_confidence(&object, min_confidence)?;
	let explanation = validate_explanation(&object)?;

	Ok(PredictionResult {
		predicted_sections: vec![section],
		confidence,
		explanation: Cow::Owned(explanation),
		title: Cow::Borrowed(""),
	})
}

/// Total wrapper over [`validate_response`].
pub fn guard_response(
	raw: &str,
	allowed_sections: &[String],
	min_confidence: f64,
) -> PredictionResult {
	validate_response(raw, allowed_sections, min_confidence).unwrap_or(FALLBACK)
}

fn validate_section(
	object: &Map<String, Value>,
	allowed_sections: &[String],
) -> Result<String, Rejection> {
	let Some(Value::Array(sections)) = object.get(KEY_PREDICTED_SECTIONS) else {
		return Err(Rejection::SectionsNotAList);
	};
	let section = match sections.as_slice() {
		[] => return Err(Rejection::Abstained),
		[only] => only,
		many => return Err(Rejection::MultipleSections(many.len())),
	};
	let Value::String(section) = section else {
		return Err(Rejection::SectionNotAString);
	};
	let section = section.trim();

	if section.is_empty() {
		return Err(Rejection::EmptySection);
	}
	if !allowed_sections.iter().any(|allowed| allowed.trim() == section) {
		return Err(Rejection::SectionNotAllowed(section.to_string()));
	}

	Ok(section.to_string())
}

fn validate_confidence(
	object: &Map<String, Value>,
	min_confidence: f64,
) -> Result<f64, Rejection> {
	let Some(Value::Number(number)) = object.get(KEY_CONFIDENCE) else {
		return Err(Rejection::ConfidenceNotANumber);
	};
	let Some(confidence) = number.as_f64() else {
		return Err(Rejection::ConfidenceNotANumber);
	};

	if !confidence.is_finite() {
		return Err(Rejection::ConfidenceNotFinite);
	}

	let confidence = confidence.clamp(0.0, 1.0);

	if confidence < min_confidence {
		return Err(Rejection::BelowMinConfidence { confidence, min_confidence });
	}

	Ok(confidence)
}

fn validate_explanation(object: &Map<String, Value>) -> Result<String, Rejection> {
	let Some(Value::String(explanation)) = object.get(KEY_EXPLANATION) else {
		return Err(Rejection::ExplanationNotAString);
	};
	let explanation = explanation.trim();

	if explanation.is_empty() {
		return Err(Rejection::EmptyExplanation);
	}

	Ok(explanation.to_string())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn allowed() -> Vec<String> {
		["378", "420", "452"].map(String::from).to_vec()
	}

	fn validate(raw: &str) -> Result<PredictionResult, Rejection> {
		validate_response(raw, &allowed(), MIN_CONFIDENCE)
	}

	#[test]
	fn strips_tagged_and_untagged_fences() {
		assert_eq!(strip_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
		assert_eq!(strip_fence("  ```\n{\"a\":1}```  "), "{\"a\":1}");
		assert_eq!(strip_fence("```JSON {\"a\":1} ```"), "{\"a\":1}");
		assert_eq!(strip_fence("{\"a\":1}"), "{\"a\":1}");
	}

	#[test]
	fn strips_only_one_layer() {
		let doubled = "```\n```json\n{\"a\":1}\n```\n```";

		assert!(strip_fence(doubled).starts_with("```"));
	}

	#[test]
	fn unterminated_fence_is_left_alone() {
		assert_eq!(strip_fence("```json\n{\"a\":1}"), "```json\n{\"a\":1}");
	}

	#[test]
	fn reports_first_violation() {
		assert_eq!(validate("not json"), Err(Rejection::Unparsable));
		assert_eq!(validate(""), Err(Rejection::Unparsable));
		assert_eq!(validate("[1, 2, 3]"), Err(Rejection::NotAnObject));
		assert_eq!(
			validate(r#"{"predictedSections": ["378"]}"#),
			Err(Rejection::MissingKey(KEY_CONFIDENCE))
		);
		assert_eq!(
			validate(r#"{"predictedSections": "378", "confidence": 0.8, "explanation": "x"}"#),
			Err(Rejection::SectionsNotAList)
		);
		assert_eq!(
			validate(r#"{"predictedSections": [378], "confidence": 0.8, "explanation": "x"}"#),
			Err(Rejection::SectionNotAString)
		);
		assert_eq!(
			validate(r#"{"predictedSections": ["  "], "confidence": 0.8, "explanation": "x"}"#),
			Err(Rejection::EmptySection)
		);
		assert_eq!(
			validate(r#"{"predictedSections": ["378"], "confidence": null, "explanation": "x"}"#),
			Err(Rejection::ConfidenceNotANumber)
		);
		assert_eq!(
			validate(r#"{"predictedSections": ["378"], "confidence": 0.8, "explanation": 7}"#),
			Err(Rejection::ExplanationNotAString)
		);
	}

	#[test]
	fn empty_section_list_is_an_abstain() {
		let err = validate(r#"{"predictedSections": [], "confidence": 0.0, "explanation": "none"}"#)
			.expect_err("Expected rejection.");

		assert_eq!(err, Rejection::Abstained);
		assert_eq!(err.code(), "abstained");
	}

	#[test]
	fn below_minimum_reports_clamped_value() {
		assert_eq!(
			validate(r#"{"predictedSections": ["378"], "confidence": -0.5, "explanation": "x"}"#),
			Err(Rejection::BelowMinConfidence { confidence: 0.0, min_confidence: MIN_CONFIDENCE })
		);
	}

	#[test]
	fn minimum_confidence_is_configurable() {
		let raw = r#"{"predictedSections": ["420"], "confidence": 0.1, "explanation": "x"}"#;

		assert!(validate_response(raw, &allowed(), 0.0).is_ok());
		assert!(validate_response(raw, &allowed(), 0.5).is_err());
	}

	#[test]
	fn allowed_list_entries_are_compared_trimmed() {
		let raw = r#"{"predictedSections": ["420"], "confidence": 0.9, "explanation": "x"}"#;
		let allowed = vec![" 420 ".to_string()];

		assert_eq!(
			validate_response(raw, &allowed, MIN_CONFIDENCE)
				.expect("Expected acceptance.")
				.predicted_sections,
			vec!["420".to_string()]
		);
	}

	#[test]
	fn guard_collapses_to_fallback() {
		assert_eq!(guard_response("garbage", &allowed(), MIN_CONFIDENCE), FALLBACK);
	}
}
