//! Closed-candidate-set instructions for the reasoning step.
//!
//! The rules embedded here are advisory to the model. [`crate::guard`] enforces them.

use serde_json::Value;

use crate::prediction::RankedCandidate;

const PREAMBLE: &str = "\
You are a legal reasoning assistant for IPC section prediction.
You are strictly restricted to the provided candidate sections.
You must not invent, infer, or reference any section outside the allowed list.";

const DECISION_RULES: &str = "\
Decision Rules:
1. Select at most one section number, or return an empty list.
2. You may choose only from Allowed Section Numbers.
3. Select the most applicable section even if the match is partial.
4. Return an empty list only when no candidate section is genuinely relevant.
5. predictedSections must contain at most one element.
6. confidence must be a numeric value between 0.0 and 1.0, not a string.
7. Set confidence above 0.3 only if the section is a reasonable match.
8. Output a single flat JSON object with exactly the keys predictedSections, confidence, and explanation.
9. Do not output additional keys.
10. Do not output markdown, code fences, or backticks.
11. Do not output any commentary before or after the JSON object.";

const OUTPUT_SCHEMA: &str = "\
Output Schema:
{
  \"predictedSections\": [\"<section_number>\"] OR [],
  \"confidence\": <number between 0.0 and 1.0>,
  \"explanation\": \"<plain English explanation>\"
}

Return ONLY valid JSON.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPrompt {
	pub text: String,
	/// Trimmed identifiers in candidate order. The guard checks replies against exactly this
	/// list.
	pub allowed_sections: Vec<String>,
}

/// Pure function of its inputs: no clock, no randomness.
pub fn compile_prompt(incident_text: &str, candidates: &[RankedCandidate]) -> CompiledPrompt {
	let allowed_sections: Vec<String> = candidates
		.iter()
		.map(|candidate| candidate.record.section_number.trim().to_string())
		.collect();
	let allowed_list = Value::from(allowed_sections.clone()).to_string();
	let candidate_blocks: Vec<String> = candidates
		.iter()
		.map(|candidate| {
			let record = &candidate.record;
			let keywords: Vec<&str> = record.keywords.iter().map(|kw| kw.trim()).collect();

			format!(
				"Section Number: {}\nTitle: {}\nSummary: {}\nKeywords: {}",
				record.section_number.trim(),
				record.title.trim(),
				record.summary.trim(),
				keywords.join(", "),
			)
		})
		.collect();
	let text = format!(
		"{PREAMBLE}\n\nAllowed Section Numbers:\n{allowed_list}\n\nCandidate Sections:\n{}\n\nIncident Description:\n{}\n\n{DECISION_RULES}\n\n{OUTPUT_SCHEMA}",
		candidate_blocks.join("\n\n"),
		incident_text.trim(),
	);

	CompiledPrompt { text, allowed_sections }
}
