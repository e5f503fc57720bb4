//! Deterministic top-K ordering of retrieved sections.

use std::cmp::Ordering;

use crate::{prediction::RankedCandidate, section::SectionRecord};

pub const DEFAULT_TOP_K: usize = 7;

/// Queries with no semantic signal skip embedding and fall back to catalog order.
pub fn is_degenerate_query(text: &str) -> bool {
	text.trim().is_empty()
}

/// Turn `(record, distance)` hits into the top `k` candidates.
///
/// Similarity is `1 - distance`. Candidates are ordered by similarity descending, then by
/// [`SectionKey`](crate::section::SectionKey) ascending, so equal scores still yield a total
/// order that does not depend on the order the hits arrived in.
pub fn rank(hits: Vec<(SectionRecord, f32)>, k: usize) -> Vec<RankedCandidate> {
	let mut ranked: Vec<RankedCandidate> = hits
		.into_iter()
		.map(|(record, distance)| RankedCandidate { record, similarity: 1.0 - distance })
		.collect();

	ranked.sort_by(cmp_candidates);
	ranked.truncate(k);

	ranked
}

/// Catalog order for degenerate queries: identifier key only, every similarity 0.0.
pub fn rank_by_section(catalog: Vec<SectionRecord>, k: usize) -> Vec<RankedCandidate> {
	let mut catalog = catalog;

	catalog.sort_by(|a, b| a.key().cmp(&b.key()));
	catalog.truncate(k);

	catalog.into_iter().map(|record| RankedCandidate { record, similarity: 0.0 }).collect()
}

pub fn cmp_candidates(a: &RankedCandidate, b: &RankedCandidate) -> Ordering {
	cmp_f32_desc(a.similarity, b.similarity).then_with(|| a.record.key().cmp(&b.record.key()))
}

/// Descending order with NaN last.
pub fn cmp_f32_desc(a: f32, b: f32) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
	}
}
