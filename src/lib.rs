#![warn(missing_docs)]

//! A ranked country search library for interactive pickers.
//!
//! `countrysearch` matches a user-typed query against a list of country
//! records by localized name, dial code, ISO code, or common abbreviation,
//! with typo tolerance across scripts (Latin with diacritics and Arabic at
//! minimum). It is built for keystroke-by-keystroke re-querying over ~250
//! entries: results are deterministic, deduplicated by ISO code, and capped.

/// Script-aware normalization of names and queries into search keys.
pub mod normalize;

/// Country records, their derived search keys, and the resolver seam.
pub mod record;

/// Compiled substring scanning for the strict match stage.
pub mod scan;

/// Similarity metrics (Jaro-Winkler, n-gram, token cosine) with caching.
pub mod similarity;

/// Query classification, stage orchestration, ranking, and capping.
pub mod finder;

// Re-export primary public API types and functions at the crate root.
pub use finder::{Finder, FinderConfig};
pub use normalize::build_search_key;
pub use record::{build_records, CountryRecord, CountryResolver, FnResolver, ResolvedCountry};
pub use scan::{CompiledPattern, ScanAlgorithm};
pub use similarity::{SimilarityAlgorithm, SimilarityEngine};
