use crate::prediction::RankedCandidate;

pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = -0.60;

#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
	/// The whole ranked list becomes the candidate set for the reasoning step.
	Proceed(Vec<RankedCandidate>),
	Reject(GateRejection),
}

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum GateRejection {
	#[error("No candidates were retrieved.")]
	NoCandidates,
	#[error("Top similarity {top_similarity} is below threshold {threshold}.")]
	BelowThreshold { top_similarity: f32, threshold: f32 },
}

/// Only the first candidate is inspected; `ranked` must already be ordered.
///
/// A NaN top score never clears the threshold.
pub fn similarity_gate(ranked: Vec<RankedCandidate>, threshold: f32) -> GateDecision {
	let Some(top) = ranked.first() else {
		return GateDecision::Reject(GateRejection::NoCandidates);
	};
	let top_similarity = top.similarity;

	if top_similarity.is_nan() || top_similarity < threshold {
		return GateDecision::Reject(GateRejection::BelowThreshold { top_similarity, threshold });
	}

	GateDecision::Proceed(ranked)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::section::{OffenceType, SectionRecord};

	fn candidate(section_number: &str, similarity: f32) -> RankedCandidate {
		RankedCandidate {
			record: SectionRecord {
				section_number: section_number.to_string(),
				title: String::new(),
				summary: String::new(),
				keywords: Vec::new(),
				full_text: String::new(),
				offence_type: OffenceType::Other,
			},
			similarity,
		}
	}

	#[test]
	fn empty_list_is_rejected() {
		assert_eq!(
			similarity_gate(Vec::new(), DEFAULT_SIMILARITY_THRESHOLD),
			GateDecision::Reject(GateRejection::NoCandidates)
		);
	}

	#[test]
	fn strictly_below_threshold_is_rejected() {
		let decision = similarity_gate(vec![candidate("378", -0.61)], -0.60);

		assert!(matches!(
			decision,
			GateDecision::Reject(GateRejection::BelowThreshold { top_similarity, .. })
				if top_similarity == -0.61
		));
	}

	#[test]
	fn at_threshold_proceeds_with_every_candidate() {
		let ranked = vec![candidate("378", -0.60), candidate("420", -0.9), candidate("1", -2.0)];
		let decision = similarity_gate(ranked.clone(), -0.60);

		assert_eq!(decision, GateDecision::Proceed(ranked));
	}

	#[test]
	fn only_the_top_candidate_is_inspected() {
		let ranked = vec![candidate("378", 0.1), candidate("420", -5.0)];

		assert!(matches!(similarity_gate(ranked, 0.0), GateDecision::Proceed(list) if list.len() == 2));
	}

	#[test]
	fn nan_top_similarity_is_rejected() {
		let decision = similarity_gate(vec![candidate("378", f32::NAN)], -0.60);

		assert!(matches!(decision, GateDecision::Reject(GateRejection::BelowThreshold { .. })));
	}
}
