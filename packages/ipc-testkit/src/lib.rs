//! In-memory collaborators for exercising the prediction pipeline without Qdrant or any
//! model endpoint.

use std::{
	collections::HashMap,
	sync::{
		Arc, Mutex,
		atomic::{AtomicUsize, Ordering},
	},
};

use serde_json::Map;

use ipc_config::{
	Config, EmbeddingProviderConfig, Prediction, Providers as ProviderConfigs, Qdrant,
	ReasoningProtocol, ReasoningProviderConfig, Service, Storage,
};
use ipc_domain::{OffenceType, SectionRecord};
use ipc_service::{
	BoxFuture, EmbeddingProvider, Error, IpcService, Providers, ReasoningProvider, Result,
	SectionRetriever,
};

pub const TEST_VECTOR_DIM: u32 = 4;

/// Serves a fixed catalog. Every record is reported at `default_distance` unless a
/// per-section distance was set.
pub struct CatalogRetriever {
	records: Vec<SectionRecord>,
	distances: HashMap<String, f32>,
	default_distance: f32,
	failure: Option<String>,
	search_calls: AtomicUsize,
	list_calls: AtomicUsize,
}
impl CatalogRetriever {
	pub fn new(records: Vec<SectionRecord>, default_distance: f32) -> Self {
		Self {
			records,
			distances: HashMap::new(),
			default_distance,
			failure: None,
			search_calls: AtomicUsize::new(0),
			list_calls: AtomicUsize::new(0),
		}
	}

	pub fn with_distance(mut self, section_number: &str, distance: f32) -> Self {
		self.distances.insert(section_number.to_string(), distance);

		self
	}

	/// Every call fails as if the vector store were unreachable.
	pub fn failing(mut self, message: &str) -> Self {
		self.failure = Some(message.to_string());

		self
	}

	pub fn search_count(&self) -> usize {
		self.search_calls.load(Ordering::SeqCst)
	}

	pub fn list_count(&self) -> usize {
		self.list_calls.load(Ordering::SeqCst)
	}

	fn distance_of(&self, record: &SectionRecord) -> f32 {
		self.distances.get(&record.section_number).copied().unwrap_or(self.default_distance)
	}

	fn nearest(&self, k: usize) -> Vec<(SectionRecord, f32)> {
		let mut hits: Vec<(SectionRecord, f32)> = self
			.records
			.iter()
			.map(|record| (record.clone(), self.distance_of(record)))
			.collect();

		hits.sort_by(|a, b| a.1.total_cmp(&b.1));
		hits.truncate(k);

		hits
	}

	fn check(&self) -> Result<()> {
		match &self.failure {
			Some(message) => Err(Error::Qdrant { message: message.clone() }),
			None => Ok(()),
		}
	}
}
impl SectionRetriever for CatalogRetriever {
	fn search<'a>(
		&'a self,
		_vector: &'a [f32],
		k: usize,
	) -> BoxFuture<'a, Result<Vec<(SectionRecord, f32)>>> {
		self.search_calls.fetch_add(1, Ordering::SeqCst);

		let result = self.check().map(|()| self.nearest(k));

		Box::pin(async move { result })
	}

	fn list_all<'a>(&'a self) -> BoxFuture<'a, Result<Vec<SectionRecord>>> {
		self.list_calls.fetch_add(1, Ordering::SeqCst);

		let result = self.check().map(|()| self.records.clone());

		Box::pin(async move { result })
	}
}

/// Returns a constant vector of the configured dimensionality.
#[derive(Default)]
pub struct StubEmbedding {
	calls: AtomicUsize,
}
impl StubEmbedding {
	pub fn count(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl EmbeddingProvider for StubEmbedding {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		_text: &'a str,
	) -> BoxFuture<'a, Result<Vec<f32>>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let vector = vec![0.5; cfg.dimensions as usize];

		Box::pin(async move { Ok(vector) })
	}
}

/// Answers every prompt with the same reply and records what it was asked.
pub struct SpyReasoning {
	reply: std::result::Result<String, String>,
	calls: AtomicUsize,
	prompts: Mutex<Vec<String>>,
}
impl SpyReasoning {
	pub fn replying(reply: impl Into<String>) -> Self {
		Self::with_reply(Ok(reply.into()))
	}

	/// Every call fails as a transport error would.
	pub fn failing(message: impl Into<String>) -> Self {
		Self::with_reply(Err(message.into()))
	}

	pub fn count(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	pub fn last_prompt(&self) -> Option<String> {
		self.prompts.lock().unwrap_or_else(|err| err.into_inner()).last().cloned()
	}

	fn with_reply(reply: std::result::Result<String, String>) -> Self {
		Self { reply, calls: AtomicUsize::new(0), prompts: Mutex::new(Vec::new()) }
	}
}
impl ReasoningProvider for SpyReasoning {
	fn generate<'a>(
		&'a self,
		_cfg: &'a ReasoningProviderConfig,
		prompt: &'a str,
	) -> BoxFuture<'a, Result<String>> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.prompts.lock().unwrap_or_else(|err| err.into_inner()).push(prompt.to_string());

		let reply = self.reply.clone().map_err(|message| Error::Provider { message });

		Box::pin(async move { reply })
	}
}

/// The collaborators behind one test service, kept so tests can inspect call counts.
pub struct Harness {
	pub service: IpcService,
	pub retriever: Arc<CatalogRetriever>,
	pub embedding: Arc<StubEmbedding>,
	pub reasoning: Arc<SpyReasoning>,
}

pub fn harness(cfg: Config, retriever: CatalogRetriever, reasoning: SpyReasoning) -> Harness {
	let retriever = Arc::new(retriever);
	let embedding = Arc::new(StubEmbedding::default());
	let reasoning = Arc::new(reasoning);
	let service = IpcService::with_providers(
		cfg,
		retriever.clone(),
		Providers::new(embedding.clone(), reasoning.clone()),
	);

	Harness { service, retriever, embedding, reasoning }
}

pub fn test_config() -> Config {
	Config {
		service: Service { http_bind: "127.0.0.1:0".to_string(), log_level: "info".to_string() },
		storage: Storage {
			qdrant: Qdrant {
				url: "http://127.0.0.1:6334".to_string(),
				collection: "ipc_sections_test".to_string(),
				vector_dim: TEST_VECTOR_DIM,
				timeout_ms: 1_000,
			},
		},
		providers: ProviderConfigs {
			embedding: EmbeddingProviderConfig {
				provider_id: "stub".to_string(),
				api_base: "http://127.0.0.1".to_string(),
				api_key: "test-key".to_string(),
				path: "/embeddings".to_string(),
				model: "stub-embed".to_string(),
				dimensions: TEST_VECTOR_DIM,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
			reasoning: ReasoningProviderConfig {
				provider_id: "stub".to_string(),
				api_base: "http://127.0.0.1".to_string(),
				api_key: "test-key".to_string(),
				path: "/chat/completions".to_string(),
				model: "stub-reason".to_string(),
				protocol: ReasoningProtocol::ChatCompletions,
				temperature: 0.0,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
		},
		prediction: Prediction::default(),
	}
}

pub fn section(
	section_number: &str,
	title: &str,
	summary: &str,
	keywords: &[&str],
	offence_type: OffenceType,
) -> SectionRecord {
	SectionRecord {
		section_number: section_number.to_string(),
		title: title.to_string(),
		summary: summary.to_string(),
		keywords: keywords.iter().map(|kw| kw.to_string()).collect(),
		full_text: String::new(),
		offence_type,
	}
}

/// Nine sections across several offence types, deliberately out of key order.
pub fn sample_catalog() -> Vec<SectionRecord> {
	vec![
		section(
			"420",
			"Cheating and dishonestly inducing delivery of property",
			"Cheating that induces the victim to deliver property or alter a valuable security.",
			&["cheating", "fraud", "deception", "money"],
			OffenceType::FraudCheating,
		),
		section(
			"378",
			"Theft",
			"Dishonestly taking movable property out of another's possession without consent.",
			&["theft", "stolen", "movable property"],
			OffenceType::PropertyCrime,
		),
		section(
			"120B",
			"Punishment of criminal conspiracy",
			"Punishment for being party to a criminal conspiracy.",
			&["conspiracy", "agreement"],
			OffenceType::Punishment,
		),
		section(
			"302",
			"Punishment for murder",
			"Death or imprisonment for life for committing murder.",
			&["murder", "killing"],
			OffenceType::ViolentCrime,
		),
		section(
			"120A",
			"Definition of criminal conspiracy",
			"Two or more persons agreeing to do an illegal act.",
			&["conspiracy"],
			OffenceType::Other,
		),
		section(
			"406",
			"Punishment for criminal breach of trust",
			"Dishonest misappropriation of property entrusted to the accused.",
			&["breach of trust", "entrusted"],
			OffenceType::FraudCheating,
		),
		section(
			"379",
			"Punishment for theft",
			"Imprisonment up to three years, fine, or both for theft.",
			&["theft", "punishment"],
			OffenceType::Punishment,
		),
		section(
			"354",
			"Assault or criminal force to woman with intent to outrage her modesty",
			"Assault or criminal force on a woman intending to outrage her modesty.",
			&["assault", "modesty", "woman"],
			OffenceType::SexualOffence,
		),
		section(
			"415",
			"Cheating",
			"Deceiving a person to fraudulently induce delivery of property.",
			&["cheating", "deceive"],
			OffenceType::FraudCheating,
		),
	]
}
