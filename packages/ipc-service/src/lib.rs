pub mod predict;

mod error;

pub use error::{Error, Result};
pub use predict::PredictionFailure;

use std::{future::Future, pin::Pin, sync::Arc};

use ipc_config::{Config, EmbeddingProviderConfig, ReasoningProviderConfig};
use ipc_domain::SectionRecord;
use ipc_providers::{embedding, reasoning};
use ipc_storage::SectionStore;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, Result<Vec<f32>>>;
}

pub trait ReasoningProvider
where
	Self: Send + Sync,
{
	/// One call, one raw reply. Implementations must not retry.
	fn generate<'a>(
		&'a self,
		cfg: &'a ReasoningProviderConfig,
		prompt: &'a str,
	) -> BoxFuture<'a, Result<String>>;
}

/// Read access to the section catalog.
pub trait SectionRetriever
where
	Self: Send + Sync,
{
	/// Up to `k` nearest sections with their distance to `vector`.
	fn search<'a>(
		&'a self,
		vector: &'a [f32],
		k: usize,
	) -> BoxFuture<'a, Result<Vec<(SectionRecord, f32)>>>;

	fn list_all<'a>(&'a self) -> BoxFuture<'a, Result<Vec<SectionRecord>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub reasoning: Arc<dyn ReasoningProvider>,
}
impl Providers {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		reasoning: Arc<dyn ReasoningProvider>,
	) -> Self {
		Self { embedding, reasoning }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { embedding: provider.clone(), reasoning: provider }
	}
}

pub struct IpcService {
	pub cfg: Config,
	pub retriever: Arc<dyn SectionRetriever>,
	pub providers: Providers,
}
impl IpcService {
	pub fn new(cfg: Config, retriever: Arc<dyn SectionRetriever>) -> Self {
		Self { cfg, retriever, providers: Providers::default() }
	}

	pub fn with_providers(
		cfg: Config,
		retriever: Arc<dyn SectionRetriever>,
		providers: Providers,
	) -> Self {
		Self { cfg, retriever, providers }
	}

	/// Service backed by the configured Qdrant collection and HTTP providers.
	pub fn connect(cfg: Config) -> Result<Self> {
		let store = SectionStore::new(&cfg.storage.qdrant)?;

		Ok(Self::new(cfg, Arc::new(store)))
	}
}

struct DefaultProviders;
impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, Result<Vec<f32>>> {
		Box::pin(async move { embedding::embed_query(cfg, text).await.map_err(Error::from) })
	}
}
impl ReasoningProvider for DefaultProviders {
	fn generate<'a>(
		&'a self,
		cfg: &'a ReasoningProviderConfig,
		prompt: &'a str,
	) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move { reasoning::generate(cfg, prompt).await.map_err(Error::from) })
	}
}

impl SectionRetriever for SectionStore {
	fn search<'a>(
		&'a self,
		vector: &'a [f32],
		k: usize,
	) -> BoxFuture<'a, Result<Vec<(SectionRecord, f32)>>> {
		Box::pin(async move { SectionStore::search(self, vector, k).await.map_err(Error::from) })
	}

	fn list_all<'a>(&'a self) -> BoxFuture<'a, Result<Vec<SectionRecord>>> {
		Box::pin(async move { SectionStore::list_all(self).await.map_err(Error::from) })
	}
}
