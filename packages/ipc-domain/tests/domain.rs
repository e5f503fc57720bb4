use ipc_domain::{
	FALLBACK, FALLBACK_TEXT, GateDecision, MIN_CONFIDENCE, OffenceType, SectionRecord,
	compile_prompt, guard_response, rank, similarity_gate, validate_response,
};

fn allowed() -> Vec<String> {
	vec!["378".to_string(), "420".to_string(), "452".to_string()]
}

fn guard(raw: &str) -> ipc_domain::PredictionResult {
	guard_response(raw, &allowed(), MIN_CONFIDENCE)
}

fn accepted(section: &str, confidence: f64, explanation: &str) -> ipc_domain::PredictionResult {
	ipc_domain::PredictionResult {
		predicted_sections: vec![section.to_string()],
		confidence,
		explanation: explanation.to_string().into(),
		title: "".into(),
	}
}

fn record(section_number: &str, title: &str) -> SectionRecord {
	SectionRecord {
		section_number: section_number.to_string(),
		title: title.to_string(),
		summary: format!("{title} summary"),
		keywords: vec![title.to_lowercase()],
		full_text: String::new(),
		offence_type: OffenceType::PropertyCrime,
	}
}

#[test]
fn guard_is_total_over_malformed_replies() {
	let malformed = [
		"This is not JSON",
		"",
		"   ",
		"[1, 2, 3]",
		"\"just a string\"",
		"42",
		"null",
		r#"{"predictedSections": ["378"]}"#,
		r#"{"confidence": 0.8, "explanation": "theft"}"#,
		r#"{"predictedSections": ["378", "420"], "confidence": 0.8, "explanation": "theft"}"#,
		r#"{"predictedSections": [], "confidence": 0.8, "explanation": "theft"}"#,
		r#"{"predictedSections": ["999"], "confidence": 0.8, "explanation": "theft"}"#,
		r#"{"predictedSections": ["378"], "confidence": "0.8", "explanation": "theft"}"#,
		r#"{"predictedSections": ["378"], "confidence": NaN, "explanation": "theft"}"#,
		r#"{"predictedSections": ["378"], "confidence": Infinity, "explanation": "theft"}"#,
		r#"{"predictedSections": ["378"], "confidence": 0.8, "explanation": ""}"#,
		r#"{"predictedSections": ["378"], "confidence": 0.8, "explanation": "   \n"}"#,
		r#"{"predictedSections": [["378"]], "confidence": 0.8, "explanation": "theft"}"#,
		"```json\n```json\n{\"predictedSections\": [\"378\"], \"confidence\": 0.8, \"explanation\": \"theft\"}\n```\n```",
		"Sure! {\"predictedSections\": [\"378\"], \"confidence\": 0.8, \"explanation\": \"theft\"}",
	];

	for raw in malformed {
		assert_eq!(guard(raw), FALLBACK, "Expected fallback for {raw:?}.");
	}
}

#[test]
fn guard_accepts_valid_reply() {
	let result = guard(
		r#"{"predictedSections": ["378"], "confidence": 0.8, "explanation": "This involves theft."}"#,
	);

	assert_eq!(result, accepted("378", 0.8, "This involves theft."));
}

#[test]
fn guard_drops_extra_keys() {
	let result = guard(
		r#"{"predictedSections": ["378"], "confidence": 0.8, "explanation": "theft", "extra": true}"#,
	);
	let json = serde_json::to_value(&result).expect("Serialize failed.");

	assert_eq!(result, accepted("378", 0.8, "theft"));
	assert!(json.get("extra").is_none());
}

#[test]
fn guard_confidence_boundaries() {
	let reply = |confidence: &str| {
		format!(
			r#"{{"predictedSections": ["378"], "confidence": {confidence}, "explanation": "theft"}}"#
		)
	};

	assert_eq!(guard(&reply("0.29")), FALLBACK);
	assert_eq!(guard(&reply("0.30")), accepted("378", 0.30, "theft"));
	assert_eq!(guard(&reply("1.2")), accepted("378", 1.0, "theft"));
	assert_eq!(guard(&reply("1")), accepted("378", 1.0, "theft"));
	assert_eq!(guard(&reply("-0.5")), FALLBACK);
	assert_eq!(guard(&reply("0.0")), FALLBACK);
}

#[test]
fn guard_trims_section_and_explanation() {
	let result = guard(
		r#"{"predictedSections": [" 378 "], "confidence": 0.8, "explanation": "  theft \n"}"#,
	);

	assert_eq!(result, accepted("378", 0.8, "theft"));
}

#[test]
fn fenced_reply_matches_unfenced_reply() {
	let body = r#"{"predictedSections": ["378"], "confidence": 0.8, "explanation": "theft"}"#;
	let plain = guard(body);

	assert_eq!(guard(&format!("```json\n{body}\n```")), plain);
	assert_eq!(guard(&format!("```\n{body}\n```")), plain);
	assert_eq!(plain, accepted("378", 0.8, "theft"));
}

#[test]
fn fallback_constant_is_the_documented_value() {
	assert!(FALLBACK.predicted_sections.is_empty());
	assert_eq!(FALLBACK.confidence, 0.0);
	assert_eq!(FALLBACK.explanation, FALLBACK_TEXT);
	assert_eq!(FALLBACK.title, "");
}

#[test]
fn allowed_set_is_per_request_not_catalog_wide() {
	let raw = r#"{"predictedSections": ["302"], "confidence": 0.9, "explanation": "murder"}"#;

	assert!(validate_response(raw, &allowed(), MIN_CONFIDENCE).is_err());
	assert!(validate_response(raw, &["302".to_string()], MIN_CONFIDENCE).is_ok());
}

#[test]
fn rank_gate_compile_guard_pipeline_is_deterministic() {
	let hits = vec![
		(record("420", "Cheating"), 0.3),
		(record("378", "Theft"), 0.3),
		(record("415", "Cheating defined"), 0.6),
		(record("406", "Criminal breach of trust"), 0.9),
	];
	let reply = r#"{"predictedSections": ["420"], "confidence": 0.8, "explanation": "Deceit."}"#;
	let run = || {
		let ranked = rank(hits.clone(), 7);
		let GateDecision::Proceed(candidates) = similarity_gate(ranked, -0.60) else {
			panic!("Expected the gate to pass.");
		};
		let prompt = compile_prompt("He cheated me.", &candidates);
		let result = guard_response(reply, &prompt.allowed_sections, MIN_CONFIDENCE)
			.with_title_from(candidates.iter().map(|candidate| &candidate.record));

		(prompt, result)
	};
	let (first_prompt, first_result) = run();

	assert_eq!(first_prompt.allowed_sections, vec!["378", "420", "415", "406"]);
	assert_eq!(first_result.title, "Cheating");

	for _ in 0..10 {
		let (prompt, result) = run();

		assert_eq!(prompt.text, first_prompt.text);
		assert_eq!(result, first_result);
	}
}
