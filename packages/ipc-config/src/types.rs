use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub prediction: Prediction,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub qdrant: Qdrant,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Qdrant {
	pub url: String,
	pub collection: String,
	pub vector_dim: u32,
	/// Bound on every search and scroll request.
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub reasoning: ReasoningProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReasoningProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	#[serde(default)]
	pub protocol: ReasoningProtocol,
	#[serde(default)]
	pub temperature: f32,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

/// Wire format spoken by the reasoning endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasoningProtocol {
	/// OpenAI-compatible `/chat/completions`.
	#[default]
	ChatCompletions,
	/// Google `generateContent`.
	Gemini,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Prediction {
	/// Candidates surfaced to the reasoning step.
	pub top_k: u32,
	/// Requests whose best candidate scores strictly below this never reach the reasoning step.
	pub similarity_threshold: f32,
	/// Validated predictions below this confidence are discarded.
	pub min_confidence: f64,
	/// Shortest trimmed incident text the HTTP surface will forward.
	pub min_incident_chars: u32,
}
impl Default for Prediction {
	fn default() -> Self {
		Self {
			top_k: 7,
			similarity_threshold: -0.60,
			min_confidence: 0.30,
			min_incident_chars: 10,
		}
	}
}

fn default_timeout_ms() -> u64 {
	60_000
}
