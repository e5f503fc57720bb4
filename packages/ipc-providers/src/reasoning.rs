//! Single-shot text generation. Failed calls are not retried.

use ipc_config::{ReasoningProtocol, ReasoningProviderConfig};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

use crate::{Error, Result};

const GEMINI_API_KEY_HEADER: &str = "x-goog-api-key";

/// Send `prompt` once and return the raw reply text, unvalidated.
pub async fn generate(cfg: &ReasoningProviderConfig, prompt: &str) -> Result<String> {
	let client = crate::client(cfg.timeout_ms)?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let (headers, body) = match cfg.protocol {
		ReasoningProtocol::ChatCompletions => (
			crate::auth_headers(&cfg.api_key, &cfg.default_headers)?,
			chat_completions_body(cfg, prompt),
		),
		ReasoningProtocol::Gemini => (gemini_headers(cfg)?, gemini_body(cfg, prompt)),
	};
	let res = client.post(url).headers(headers).json(&body).send().await?;
	let json: Value = res.error_for_status()?.json().await?;

	tracing::debug!(provider_id = %cfg.provider_id, model = %cfg.model, "Reasoning reply received.");

	parse_reply(cfg.protocol, &json)
}

fn chat_completions_body(cfg: &ReasoningProviderConfig, prompt: &str) -> Value {
	serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"messages": [{ "role": "user", "content": prompt }],
	})
}

fn gemini_body(cfg: &ReasoningProviderConfig, prompt: &str) -> Value {
	serde_json::json!({
		"contents": [{ "parts": [{ "text": prompt }] }],
		"generationConfig": { "temperature": cfg.temperature },
	})
}

fn gemini_headers(cfg: &ReasoningProviderConfig) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	headers.insert(
		HeaderName::from_static(GEMINI_API_KEY_HEADER),
		HeaderValue::from_str(&cfg.api_key)?,
	);
	crate::extend_headers(&mut headers, &cfg.default_headers)?;

	Ok(headers)
}

fn parse_reply(protocol: ReasoningProtocol, json: &Value) -> Result<String> {
	let text = match protocol {
		ReasoningProtocol::ChatCompletions => json
			.get("choices")
			.and_then(Value::as_array)
			.and_then(|choices| choices.first())
			.and_then(|choice| choice.pointer("/message/content"))
			.and_then(Value::as_str)
			.map(str::to_string),
		ReasoningProtocol::Gemini => json
			.get("candidates")
			.and_then(Value::as_array)
			.and_then(|candidates| candidates.first())
			.and_then(|candidate| candidate.pointer("/content/parts"))
			.and_then(Value::as_array)
			.map(|parts| {
				parts.iter().filter_map(|part| part.get("text").and_then(Value::as_str)).collect()
			})
			.filter(|text: &String| !text.is_empty()),
	};

	text.ok_or_else(|| Error::InvalidResponse {
		message: "Reasoning response is missing reply text.".to_string(),
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reads_chat_completion_content() {
		let json = serde_json::json!({
			"choices": [{ "message": { "role": "assistant", "content": "{\"a\":1}" } }]
		});

		assert_eq!(
			parse_reply(ReasoningProtocol::ChatCompletions, &json).expect("Failed to parse reply."),
			"{\"a\":1}"
		);
	}

	#[test]
	fn joins_gemini_text_parts() {
		let json = serde_json::json!({
			"candidates": [{ "content": { "parts": [{ "text": "{\"a\":" }, { "text": "1}" }] } }]
		});

		assert_eq!(parse_reply(ReasoningProtocol::Gemini, &json).expect("Failed to parse reply."), "{\"a\":1}");
	}

	#[test]
	fn missing_text_is_an_invalid_response() {
		let blocked = serde_json::json!({ "candidates": [{ "finishReason": "SAFETY" }] });
		let empty = serde_json::json!({ "choices": [] });

		assert!(matches!(
			parse_reply(ReasoningProtocol::Gemini, &blocked),
			Err(Error::InvalidResponse { .. })
		));
		assert!(matches!(
			parse_reply(ReasoningProtocol::ChatCompletions, &empty),
			Err(Error::InvalidResponse { .. })
		));
	}

	#[test]
	fn bodies_pin_temperature() {
		let cfg = ReasoningProviderConfig {
			provider_id: "p".to_string(),
			api_base: "http://localhost".to_string(),
			api_key: "key".to_string(),
			path: "/".to_string(),
			model: "m".to_string(),
			protocol: ReasoningProtocol::Gemini,
			temperature: 0.0,
			timeout_ms: 1_000,
			default_headers: serde_json::Map::new(),
		};

		assert_eq!(gemini_body(&cfg, "hi")["generationConfig"]["temperature"], 0.0);
		assert_eq!(chat_completions_body(&cfg, "hi")["messages"][0]["content"], "hi");
	}
}
