//! Request orchestration: retrieve, gate, compile, call, guard, enrich.
//!
//! [`IpcService::predict`] is total. Every failure below it is logged with its cause and
//! answered with [`FALLBACK`].

use ipc_domain::{
	FALLBACK, GateDecision, GateRejection, PredictionResult, RankedCandidate, Rejection,
	compile_prompt, is_degenerate_query, rank, rank_by_section, similarity_gate,
	validate_response,
};

use crate::{Error, IpcService};

/// Why a request ended in the fallback.
#[derive(Debug, thiserror::Error)]
pub enum PredictionFailure {
	#[error("Section retrieval failed: {0}")]
	Retrieval(Error),
	#[error("Query embedding failed: {0}")]
	Embedding(Error),
	#[error("Reasoning call failed: {0}")]
	Reasoning(Error),
	#[error("Gated: {0}")]
	Gated(GateRejection),
	#[error("Rejected reply: {0}")]
	Rejected(Rejection),
}
impl PredictionFailure {
	pub fn code(&self) -> &'static str {
		match self {
			Self::Retrieval(_) => "retrieval",
			Self::Embedding(_) => "embedding",
			Self::Reasoning(_) => "reasoning",
			Self::Gated(_) => "gated",
			Self::Rejected(_) => "rejected",
		}
	}

	/// Upstream trouble, as opposed to an ordinary "no applicable section" outcome.
	pub fn is_upstream(&self) -> bool {
		self.upstream_error().is_some()
	}

	pub fn upstream_error(&self) -> Option<&Error> {
		match self {
			Self::Retrieval(err) | Self::Embedding(err) | Self::Reasoning(err) => Some(err),
			Self::Gated(_) | Self::Rejected(_) => None,
		}
	}
}

impl IpcService {
	pub async fn predict(&self, text: &str) -> PredictionResult {
		match self.predict_detailed(text).await {
			Ok(result) => {
				tracing::info!(
					section = result.section().unwrap_or_default(),
					confidence = result.confidence,
					"Prediction accepted."
				);

				result
			},
			Err(failure) => {
				if let Some(err) = failure.upstream_error() {
					tracing::warn!(
						reason = failure.code(),
						upstream = err.code(),
						error = %failure,
						"Prediction fell back."
					);
				} else {
					tracing::info!(reason = failure.code(), detail = %failure, "Prediction fell back.");
				}

				FALLBACK
			},
		}
	}

	/// Same pipeline as [`IpcService::predict`], keeping the reason a request did not produce
	/// a section.
	pub async fn predict_detailed(
		&self,
		text: &str,
	) -> Result<PredictionResult, PredictionFailure> {
		let ranked = self.retrieve(text).await?;
		let candidates = match similarity_gate(ranked, self.cfg.prediction.similarity_threshold) {
			GateDecision::Proceed(candidates) => candidates,
			GateDecision::Reject(rejection) => return Err(PredictionFailure::Gated(rejection)),
		};
		let prompt = compile_prompt(text, &candidates);

		tracing::debug!(
			candidate_count = candidates.len(),
			top_similarity = candidates.first().map(|c| c.similarity).unwrap_or_default(),
			"Gate passed."
		);

		let raw = self
			.providers
			.reasoning
			.generate(&self.cfg.providers.reasoning, &prompt.text)
			.await
			.map_err(PredictionFailure::Reasoning)?;
		let result =
			validate_response(&raw, &prompt.allowed_sections, self.cfg.prediction.min_confidence)
				.map_err(PredictionFailure::Rejected)?;

		Ok(result.with_title_from(candidates.iter().map(|candidate| &candidate.record)))
	}

	/// Ranked top-K candidates for `text`, before gating.
	///
	/// Blank queries skip the embedding call and take the first K sections in catalog order.
	pub async fn retrieve(&self, text: &str) -> Result<Vec<RankedCandidate>, PredictionFailure> {
		let k = self.cfg.prediction.top_k as usize;

		if is_degenerate_query(text) {
			let catalog =
				self.retriever.list_all().await.map_err(PredictionFailure::Retrieval)?;

			return Ok(rank_by_section(catalog, k));
		}

		let vector = self
			.providers
			.embedding
			.embed(&self.cfg.providers.embedding, text)
			.await
			.map_err(PredictionFailure::Embedding)?;
		let hits = self.retriever.search(&vector, k).await.map_err(PredictionFailure::Retrieval)?;

		Ok(rank(hits, k))
	}
}
