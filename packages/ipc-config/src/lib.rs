mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, EmbeddingProviderConfig, Prediction, Providers, Qdrant, ReasoningProtocol,
	ReasoningProviderConfig, Service, Storage,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.storage.qdrant.collection.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.qdrant.collection must be non-empty.".to_string(),
		});
	}
	if cfg.storage.qdrant.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "storage.qdrant.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.storage.qdrant.vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match storage.qdrant.vector_dim."
				.to_string(),
		});
	}

	for (label, key, timeout_ms) in [
		("embedding", &cfg.providers.embedding.api_key, cfg.providers.embedding.timeout_ms),
		("reasoning", &cfg.providers.reasoning.api_key, cfg.providers.reasoning.timeout_ms),
	] {
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
		if timeout_ms == 0 {
			return Err(Error::Validation {
				message: format!("Provider {label} timeout_ms must be greater than zero."),
			});
		}
	}

	// Decoding must be greedy so that identical prompts yield identical answers.
	if cfg.providers.reasoning.temperature != 0.0 {
		return Err(Error::Validation {
			message: "providers.reasoning.temperature must be 0.0.".to_string(),
		});
	}

	let prediction = &cfg.prediction;

	if prediction.top_k == 0 {
		return Err(Error::Validation {
			message: "prediction.top_k must be greater than zero.".to_string(),
		});
	}
	if !prediction.similarity_threshold.is_finite() {
		return Err(Error::Validation {
			message: "prediction.similarity_threshold must be a finite number.".to_string(),
		});
	}
	if !prediction.min_confidence.is_finite() {
		return Err(Error::Validation {
			message: "prediction.min_confidence must be a finite number.".to_string(),
		});
	}
	if !(0.0..=1.0).contains(&prediction.min_confidence) {
		return Err(Error::Validation {
			message: "prediction.min_confidence must be in the range 0.0-1.0.".to_string(),
		});
	}
	if prediction.min_incident_chars == 0 {
		return Err(Error::Validation {
			message: "prediction.min_incident_chars must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.service.log_level = cfg.service.log_level.trim().to_string();

	for api_base in
		[&mut cfg.providers.embedding.api_base, &mut cfg.providers.reasoning.api_base]
	{
		let trimmed = api_base.trim().trim_end_matches('/').to_string();

		*api_base = trimmed;
	}
}
