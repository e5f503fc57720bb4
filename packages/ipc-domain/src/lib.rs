//! Decision core for IPC section prediction: ranking, gating, prompt compilation, and
//! response validation. Nothing here performs I/O.

pub mod gate;
pub mod guard;
pub mod prediction;
pub mod prompt;
pub mod ranker;
pub mod section;

pub use gate::{DEFAULT_SIMILARITY_THRESHOLD, GateDecision, GateRejection, similarity_gate};
pub use guard::{MIN_CONFIDENCE, Rejection, guard_response, validate_response};
pub use prediction::{FALLBACK, FALLBACK_TEXT, PredictionResult, RankedCandidate};
pub use prompt::{CompiledPrompt, compile_prompt};
pub use ranker::{DEFAULT_TOP_K, is_degenerate_query, rank, rank_by_section};
pub use section::{OffenceType, SectionKey, SectionRecord};
