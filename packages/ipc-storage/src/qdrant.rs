use std::time::Duration;

use qdrant_client::qdrant::{PointId, Query, QueryPointsBuilder, ScrollPointsBuilder};

use ipc_domain::SectionRecord;

use crate::{Error, Result, payload};

const SCROLL_PAGE_SIZE: u32 = 256;

/// Read-only view over the section collection.
pub struct SectionStore {
	pub client: qdrant_client::Qdrant,
	pub collection: String,
	pub vector_dim: u32,
	pub timeout: Duration,
}
impl SectionStore {
	pub fn new(cfg: &ipc_config::Qdrant) -> Result<Self> {
		let timeout = Duration::from_millis(cfg.timeout_ms);
		let client = qdrant_client::Qdrant::from_url(&cfg.url).timeout(timeout).build()?;

		Ok(Self {
			client,
			collection: cfg.collection.clone(),
			vector_dim: cfg.vector_dim,
			timeout,
		})
	}

	/// Nearest sections to `vector`, paired with their cosine distance (`1 - score`).
	pub async fn search(&self, vector: &[f32], k: usize) -> Result<Vec<(SectionRecord, f32)>> {
		if vector.len() != self.vector_dim as usize {
			return Err(Error::InvalidArgument(format!(
				"Query vector has {} dimensions; collection expects {}.",
				vector.len(),
				self.vector_dim
			)));
		}
		if k == 0 {
			return Ok(Vec::new());
		}

		let search = QueryPointsBuilder::new(self.collection.clone())
			.query(Query::new_nearest(vector.to_vec()))
			.with_payload(true)
			.limit(k as u64);
		let response = self.client.query(search).await?;
		let hits = response
			.result
			.into_iter()
			.filter_map(|point| {
				payload::decode_section(&point.payload).map(|record| (record, 1.0 - point.score))
			})
			.collect::<Vec<_>>();

		tracing::debug!(collection = %self.collection, hits = hits.len(), "Section search finished.");

		Ok(hits)
	}

	/// Every decodable section in the collection, in scroll order.
	pub async fn list_all(&self) -> Result<Vec<SectionRecord>> {
		let mut out = Vec::new();
		let mut offset: Option<PointId> = None;

		loop {
			let mut scroll = ScrollPointsBuilder::new(self.collection.clone())
				.with_payload(true)
				.limit(SCROLL_PAGE_SIZE);

			if let Some(point_id) = offset.take() {
				scroll = scroll.offset(point_id);
			}

			let response = self.client.scroll(scroll).await?;

			out.extend(
				response.result.iter().filter_map(|point| payload::decode_section(&point.payload)),
			);

			match response.next_page_offset {
				Some(next) => offset = Some(next),
				None => break,
			}
		}

		tracing::debug!(collection = %self.collection, sections = out.len(), "Section catalog listed.");

		Ok(out)
	}
}
