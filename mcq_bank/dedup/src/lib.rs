#![deny(missing_docs, rust_2018_idioms)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

//! Deduplication of multiple-choice-question collections.
//!
//! Questions are compared with lexical heuristics, grouped into connected
//! components of the similarity relation, collapsed to one representative
//! per group, and renumbered densely.

/// Clustering by direct and transitive similarity.
pub mod cluster;
/// Operator configuration.
pub mod config;
/// Preview and run orchestration.
pub mod engine;
/// Error types.
pub mod error;
/// Explanation scoring and merging.
pub mod explanation;
/// Collection export formats.
pub mod export;
/// Standardization of pipeline output.
pub mod ingest;
/// The MCQ record.
pub mod record;
/// Dense id reassignment.
pub mod renumber;
/// Operator-facing text reports.
pub mod report;
/// Representative selection.
pub mod select;
/// Pairwise question similarity.
pub mod similarity;
/// Collection persistence.
pub mod store;
/// Structured logging handle.
pub mod telemetry;
/// Question text canonicalization.
pub mod text;

pub use cluster::group_similar;
pub use config::DedupConfig;
pub use engine::{DedupEngine, DedupOutcome, PreviewReport, RunReport};
pub use error::{ConfigError, StoreError};
pub use explanation::{merge_explanations, score_explanation};
pub use export::{ExportError, ExportFormat};
pub use record::McqRecord;
pub use renumber::renumber;
pub use report::ReportStyle;
pub use select::{resolve_group, GroupResolution};
pub use similarity::{are_similar, calculate_similarity, SimilarityVerdict};
pub use store::{AppendSummary, McqStore};
pub use telemetry::DedupTelemetry;
