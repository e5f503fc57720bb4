use serde_json::Value;

use crate::{Error, Result};

pub async fn embed(
	cfg: &ipc_config::EmbeddingProviderConfig,
	texts: &[String],
) -> Result<Vec<Vec<f32>>> {
	let client = crate::client(cfg.timeout_ms)?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"input": texts,
		"dimensions": cfg.dimensions,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_embedding_response(json)
}

/// Embed a single query and check it against the configured dimensionality.
pub async fn embed_query(
	cfg: &ipc_config::EmbeddingProviderConfig,
	text: &str,
) -> Result<Vec<f32>> {
	let vectors = embed(cfg, &[text.to_string()]).await?;
	let Some(vector) = vectors.into_iter().next() else {
		return Err(invalid("Embedding response contained no vectors."));
	};

	if vector.len() != cfg.dimensions as usize {
		return Err(Error::InvalidResponse {
			message: format!(
				"Embedding dimension mismatch: expected {}, got {}.",
				cfg.dimensions,
				vector.len()
			),
		});
	}

	Ok(vector)
}

fn parse_embedding_response(json: Value) -> Result<Vec<Vec<f32>>> {
	let Some(data) = json.get("data").and_then(Value::as_array) else {
		return Err(invalid("Embedding response is missing data array."));
	};
	let mut indexed = data
		.iter()
		.enumerate()
		.map(|(position, item)| {
			let index = item.get("index").and_then(Value::as_u64).map_or(position, |v| v as usize);
			let values = item
				.get("embedding")
				.and_then(Value::as_array)
				.ok_or_else(|| invalid("Embedding item is missing its vector."))?;
			let vector = values
				.iter()
				.map(|v| {
					v.as_f64()
						.map(|n| n as f32)
						.ok_or_else(|| invalid("Embedding values must be numeric."))
				})
				.collect::<Result<Vec<f32>>>()?;

			Ok((index, vector))
		})
		.collect::<Result<Vec<(usize, Vec<f32>)>>>()?;

	// Providers may answer out of order; `index` is authoritative.
	indexed.sort_by_key(|(index, _)| *index);

	Ok(indexed.into_iter().map(|(_, vector)| vector).collect())
}

fn invalid(message: &str) -> Error {
	Error::InvalidResponse { message: message.to_string() }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_embeddings_in_index_order() {
		let json = serde_json::json!({
			"data": [
				{ "index": 1, "embedding": [2.0, 3.0] },
				{ "index": 0, "embedding": [0.5, 1.5] }
			]
		});
		let parsed = parse_embedding_response(json).expect("Failed to parse embeddings.");
		assert_eq!(parsed, vec![vec![0.5, 1.5], vec![2.0, 3.0]]);
	}

	#[test]
	fn rejects_non_numeric_values() {
		let json = serde_json::json!({ "data": [{ "embedding": ["x"] }] });

		assert!(matches!(
			parse_embedding_response(json),
			Err(Error::InvalidResponse { .. })
		));
	}

	#[test]
	fn rejects_missing_data() {
		assert!(parse_embedding_response(serde_json::json!({ "error": "quota" })).is_err());
	}
}
