use axum::{
	Json, Router,
	extract::State,
	http::StatusCode,
	routing::{get, post},
};
use serde::{Deserialize, Serialize};

use ipc_domain::PredictionResult;

use crate::state::AppState;

pub const SUGGESTIONS: [&str; 5] = [
	"Consider consulting a legal professional.",
	"You may approach the nearest police station.",
	"Document all relevant evidence.",
	"Ensure your safety before taking further action.",
	"Seek immediate help if the situation escalates.",
];
pub const INSUFFICIENT_DETAIL_MESSAGE: &str =
	"Please describe the incident with sufficient details.";
pub const INSUFFICIENT_DETAIL_DISCLAIMER: &str =
	"This tool requires incident details to provide a legal prediction.";
pub const DISCLAIMER: &str = "This is an AI-assisted legal awareness tool.";

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
	pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PredictResponse {
	Predicted(PredictedBody),
	InsufficientDetail(InsufficientDetailBody),
}

#[derive(Debug, Serialize)]
pub struct PredictedBody {
	pub prediction: PredictionView,
	pub explanation: String,
	pub why: String,
	pub suggestion: &'static str,
	pub disclaimer: &'static str,
}

#[derive(Debug, Serialize)]
pub struct PredictionView {
	pub ipc_section: Option<String>,
	pub title: String,
	/// Percentage, rounded.
	pub confidence: u32,
}

#[derive(Debug, Serialize)]
pub struct InsufficientDetailBody {
	pub prediction: Option<PredictionView>,
	pub message: &'static str,
	pub disclaimer: &'static str,
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/ipc/predict", post(predict))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn predict(
	State(state): State<AppState>,
	Json(payload): Json<PredictRequest>,
) -> Json<PredictResponse> {
	let text = payload.text.trim();
	let min_chars = state.service.cfg.prediction.min_incident_chars as usize;

	if text.chars().count() < min_chars {
		return Json(PredictResponse::InsufficientDetail(InsufficientDetailBody {
			prediction: None,
			message: INSUFFICIENT_DETAIL_MESSAGE,
			disclaimer: INSUFFICIENT_DETAIL_DISCLAIMER,
		}));
	}

	let result = state.service.predict(text).await;

	Json(PredictResponse::Predicted(predicted_body(text, result)))
}

fn predicted_body(text: &str, result: PredictionResult) -> PredictedBody {
	let prediction = PredictionView {
		ipc_section: result.section().map(|section| format!("IPC {section}")),
		title: result.title.into_owned(),
		confidence: (result.confidence * 100.0).round() as u32,
	};
	let explanation = result.explanation.into_owned();

	PredictedBody {
		prediction,
		why: explanation.clone(),
		explanation,
		suggestion: suggestion_for(text),
		disclaimer: DISCLAIMER,
	}
}

/// Same incident text, same suggestion.
pub fn suggestion_for(text: &str) -> &'static str {
	let hash = blake3::hash(text.as_bytes());
	let mut head = [0_u8; 8];

	head.copy_from_slice(&hash.as_bytes()[..8]);

	SUGGESTIONS[(u64::from_le_bytes(head) % SUGGESTIONS.len() as u64) as usize]
}

#[cfg(test)]
mod tests {
	use std::borrow::Cow;

	use super::*;

	#[test]
	fn confidence_is_reported_as_rounded_percentage() {
		let result = PredictionResult {
			predicted_sections: vec!["379".to_string()],
			confidence: 0.876,
			explanation: Cow::Borrowed("Phone taken from a bag."),
			title: Cow::Borrowed("Punishment for theft"),
		};
		let body = predicted_body("my phone was taken from my bag", result);

		assert_eq!(body.prediction.ipc_section.as_deref(), Some("IPC 379"));
		assert_eq!(body.prediction.confidence, 88);
		assert_eq!(body.why, body.explanation);
	}

	#[test]
	fn fallback_has_no_section() {
		let body = predicted_body("nothing legal happened here", ipc_domain::FALLBACK);

		assert_eq!(body.prediction.ipc_section, None);
		assert_eq!(body.prediction.confidence, 0);
		assert_eq!(body.prediction.title, "");
		assert_eq!(body.explanation, ipc_domain::FALLBACK_TEXT);
	}

	#[test]
	fn suggestion_is_stable_per_text() {
		let text = "Someone stole my bicycle from the college stand.";

		assert_eq!(suggestion_for(text), suggestion_for(text));
		assert!(SUGGESTIONS.contains(&suggestion_for(text)));
	}
}
