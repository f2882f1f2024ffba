//! Query classification, stage orchestration, ranking, and result
//! assembly.
//!
//! [`Finder::where_text`] decides per query which stages to run: a
//! dial-code filter for numeric queries, otherwise a strict substring
//! scan, a short-key pass for queries of up to three characters, and an
//! adaptive fuzzy fill when too few strict hits turn up. Results are
//! deduplicated by ISO code, ranked deterministically, and capped.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::normalize::{build_search_key, strip_spaces};
use crate::record::CountryRecord;
use crate::scan::{CompiledPattern, ScanAlgorithm};
use crate::similarity::{SimilarityAlgorithm, SimilarityEngine};

/// Default cap on the number of returned records.
pub const DEFAULT_MAX_RESULTS: usize = 50;

/// Default n-gram window width for the similarity engine.
pub const DEFAULT_NGRAM_SIZE: usize = 3;

/// Default capacity of the similarity score cache.
pub const DEFAULT_SIMILARITY_CACHE_CAPACITY: usize = 512;

/// Longest spaceless query the short-key stage handles.
pub const SHORT_KEY_MAX_QUERY_LEN: usize = 3;

/// Short-key acceptance threshold for three-character queries; one- and
/// two-character queries require an exact short-key match.
pub const SHORT_KEY_FUZZY_THRESHOLD: f64 = 0.85;

/// Merged strict/short-key hit count at which the fuzzy stage is skipped.
pub const FUZZY_SKIP_HIT_COUNT: usize = 8;

/// Query length (in characters) up to which Jaro-Winkler is preferred
/// over n-gram similarity for single-word queries.
pub const JARO_WINKLER_MAX_QUERY_LEN: usize = 7;

/// Fuzzy threshold for one- and two-character queries. Deliberately
/// unreachable: such queries produce nothing but noise under fuzzy
/// matching.
pub const FUZZY_THRESHOLD_TINY: f64 = 0.999;

/// Fuzzy threshold for multi-word (cosine) queries.
pub const FUZZY_THRESHOLD_COSINE: f64 = 0.55;

/// Fuzzy threshold for queries of three or four characters.
pub const FUZZY_THRESHOLD_SHORT: f64 = 0.75;

/// Fuzzy threshold for queries of five to seven characters.
pub const FUZZY_THRESHOLD_MEDIUM: f64 = 0.65;

/// Fuzzy threshold for queries of eight or more characters.
pub const FUZZY_THRESHOLD_LONG: f64 = 0.55;

/// Configuration for a [`Finder`].
///
/// # Defaults
///
/// - `max_results`: [`DEFAULT_MAX_RESULTS`]
/// - `strict_algorithm`: [`ScanAlgorithm::BoyerMoore`]
/// - `ngram_size`: [`DEFAULT_NGRAM_SIZE`]
/// - `similarity_cache_capacity`: [`DEFAULT_SIMILARITY_CACHE_CAPACITY`]
///
/// # Examples
///
/// ```
/// use countrysearch::FinderConfig;
///
/// let config = FinderConfig::default();
/// assert_eq!(config.max_results, 50);
/// assert_eq!(config.ngram_size, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinderConfig {
    /// Upper bound on returned list length at every stage's output.
    pub max_results: usize,
    /// Substring-scan implementation for the strict stage.
    pub strict_algorithm: ScanAlgorithm,
    /// Window width for n-gram similarity.
    pub ngram_size: usize,
    /// Entries retained by the similarity cache; `0` disables it.
    pub similarity_cache_capacity: usize,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            strict_algorithm: ScanAlgorithm::default(),
            ngram_size: DEFAULT_NGRAM_SIZE,
            similarity_cache_capacity: DEFAULT_SIMILARITY_CACHE_CAPACITY,
        }
    }
}

/// A strict-stage hit: where the query first occurs in the record's key.
#[derive(Debug, Clone, Copy)]
struct StrictHit<'a> {
    record: &'a CountryRecord,
    /// Smaller of the match indices in `search_key` and
    /// `search_key_no_spaces`.
    best_index: usize,
    /// True when the match starts at index zero.
    is_prefix: bool,
}

/// A similarity-scored hit from the short-key or fuzzy stage.
#[derive(Debug, Clone, Copy)]
struct ScoredHit<'a> {
    record: &'a CountryRecord,
    score: f64,
}

/// Insertion-ordered result assembly that rejects ISO codes already
/// present.
struct ResultSet<'a> {
    records: Vec<&'a CountryRecord>,
    seen: HashSet<&'a str>,
}

impl<'a> ResultSet<'a> {
    fn new() -> Self {
        Self {
            records: Vec::new(),
            seen: HashSet::new(),
        }
    }

    fn push(&mut self, record: &'a CountryRecord) {
        if self.seen.insert(record.iso_code()) {
            self.records.push(record);
        }
    }

    fn contains(&self, iso_code: &str) -> bool {
        self.seen.contains(iso_code)
    }

    fn len(&self) -> usize {
        self.records.len()
    }

    fn into_capped(mut self, max_results: usize) -> Vec<&'a CountryRecord> {
        self.records.truncate(max_results);
        self.records
    }
}

/// Ranks country records against user queries.
///
/// A finder is immutable after construction apart from its internal
/// similarity cache, which is synchronized; one instance can serve
/// queries from several threads and return the same results as
/// sequential execution. Records are borrowed for the duration of a call
/// and never retained.
///
/// # Examples
///
/// ```
/// use countrysearch::{CountryRecord, Finder, FinderConfig};
///
/// let records = vec![
///     CountryRecord::new("AT", "43", "Austria"),
///     CountryRecord::new("AU", "61", "Australia"),
///     CountryRecord::new("ES", "34", "Spain"),
/// ];
/// let finder = Finder::new(FinderConfig::default());
///
/// // Both Austria and Australia start with "aus"; the shorter key wins.
/// let results = finder.where_text("Aus", &records);
/// assert_eq!(results[0].iso_code(), "AT");
/// assert_eq!(results[1].iso_code(), "AU");
///
/// // Numeric queries filter by dial code instead.
/// let results = finder.where_text("+43", &records);
/// assert_eq!(results[0].iso_code(), "AT");
/// ```
#[derive(Debug)]
pub struct Finder {
    max_results: usize,
    strict_algorithm: ScanAlgorithm,
    engine: SimilarityEngine,
}

impl Finder {
    /// Create a finder from `config`.
    pub fn new(config: FinderConfig) -> Self {
        Self {
            max_results: config.max_results,
            strict_algorithm: config.strict_algorithm,
            engine: SimilarityEngine::new(config.ngram_size, config.similarity_cache_capacity),
        }
    }

    /// Return the records matching `raw_query`, ranked and capped.
    ///
    /// An empty query (or one that normalizes to empty, such as pure
    /// punctuation) returns every record in input order, uncapped; the
    /// caller decides pagination for the unfiltered list. A query that
    /// is all digits (after dropping one leading `+` and surrounding
    /// whitespace) filters by dial code; anything else matches names and
    /// short keys, with a fuzzy fill when strict matching finds fewer
    /// than [`FUZZY_SKIP_HIT_COUNT`] hits.
    ///
    /// For a fixed record list, repeated calls with the same query
    /// return identical results in identical order.
    pub fn where_text<'a>(
        &self,
        raw_query: &str,
        records: &'a [CountryRecord],
    ) -> Vec<&'a CountryRecord> {
        let unsigned = raw_query.strip_prefix('+').unwrap_or(raw_query);
        let trimmed = unsigned.trim();
        if trimmed.is_empty() {
            return records.iter().collect();
        }
        if trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return self.dial_code_matches(trimmed, records);
        }
        self.name_matches(raw_query, records)
    }

    /// First match for `raw_query`, preferring `favorites`.
    ///
    /// Equals the first record of `where_text(raw_query, favorites)`
    /// when that is non-empty, else the first of
    /// `where_text(raw_query, records)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use countrysearch::{CountryRecord, Finder, FinderConfig};
    ///
    /// let records = vec![
    ///     CountryRecord::new("DE", "49", "Germany"),
    ///     CountryRecord::new("ES", "34", "Spain"),
    /// ];
    /// let finder = Finder::new(FinderConfig::default());
    /// let first = finder.first_match("spa", &[], &records);
    /// assert_eq!(first.map(|r| r.iso_code()), Some("ES"));
    /// ```
    pub fn first_match<'a>(
        &self,
        raw_query: &str,
        favorites: &'a [CountryRecord],
        records: &'a [CountryRecord],
    ) -> Option<&'a CountryRecord> {
        self.where_text(raw_query, favorites)
            .first()
            .copied()
            .or_else(|| self.where_text(raw_query, records).first().copied())
    }

    /// Dial-code path: keep records whose dial code contains the digits,
    /// prefix matches first, input order otherwise preserved.
    fn dial_code_matches<'a>(
        &self,
        digits: &str,
        records: &'a [CountryRecord],
    ) -> Vec<&'a CountryRecord> {
        let mut hits: Vec<&CountryRecord> = records
            .iter()
            .filter(|record| record.dial_code().contains(digits))
            .collect();
        // Stable sort: prefix hits float to the front, ties keep input
        // order.
        hits.sort_by_key(|record| !record.dial_code().starts_with(digits));
        hits.truncate(self.max_results);
        hits
    }

    /// Name path: strict substring stage, short-key stage, fuzzy fill.
    fn name_matches<'a>(
        &self,
        raw_query: &str,
        records: &'a [CountryRecord],
    ) -> Vec<&'a CountryRecord> {
        let query = build_search_key(raw_query);
        if query.is_empty() {
            return records.iter().collect();
        }
        let query_no_spaces = strip_spaces(&query);
        let query_len = query.chars().count();
        let spaceless_len = query_no_spaces.chars().count();

        let strict = self.strict_hits(&query, &query_no_spaces, records);
        let short = if (1..=SHORT_KEY_MAX_QUERY_LEN).contains(&spaceless_len) {
            self.short_key_hits(&query_no_spaces, spaceless_len, records)
        } else {
            Vec::new()
        };

        // Merge order depends on how abbreviation-like the query is: at
        // up to two characters an exact short key beats any substring
        // hit; at three the substring hit is usually the intent.
        let mut results = ResultSet::new();
        if spaceless_len < SHORT_KEY_MAX_QUERY_LEN {
            for hit in &short {
                results.push(hit.record);
            }
            for hit in &strict {
                results.push(hit.record);
            }
        } else {
            for hit in &strict {
                results.push(hit.record);
            }
            for hit in &short {
                results.push(hit.record);
            }
        }

        if results.len() >= FUZZY_SKIP_HIT_COUNT || query_len <= 2 {
            return results.into_capped(self.max_results);
        }

        let algorithm = fuzzy_algorithm(&query, query_len);
        let threshold = fuzzy_threshold(query_len, algorithm);
        let fuzzy = self.fuzzy_hits(
            &query,
            &query_no_spaces,
            records,
            algorithm,
            threshold,
            &results,
        );
        for hit in &fuzzy {
            results.push(hit.record);
        }

        results.into_capped(self.max_results)
    }

    /// Strict substring stage over both key variants.
    ///
    /// Hits sort prefix-first, then by match position, then by key
    /// length; ties keep input order.
    fn strict_hits<'a>(
        &self,
        query: &str,
        query_no_spaces: &str,
        records: &'a [CountryRecord],
    ) -> Vec<StrictHit<'a>> {
        let pattern = CompiledPattern::compile(query, self.strict_algorithm);
        // Reuse the compiled pattern when removing spaces changed
        // nothing.
        let spaceless_pattern = if query_no_spaces == query {
            None
        } else {
            Some(CompiledPattern::compile(
                query_no_spaces,
                self.strict_algorithm,
            ))
        };

        let mut hits = Vec::new();
        for record in records {
            let in_key = pattern.first_index_in(record.search_key());
            let in_spaceless = spaceless_pattern
                .as_ref()
                .unwrap_or(&pattern)
                .first_index_in(record.search_key_no_spaces());
            let best_index = match (in_key, in_spaceless) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (hit, None) | (None, hit) => hit,
            };
            if let Some(best_index) = best_index {
                hits.push(StrictHit {
                    record,
                    best_index,
                    is_prefix: best_index == 0,
                });
            }
        }

        hits.sort_by(|a, b| {
            b.is_prefix
                .cmp(&a.is_prefix)
                .then_with(|| a.best_index.cmp(&b.best_index))
                .then_with(|| {
                    let a_len = a.record.search_key().chars().count();
                    let b_len = b.record.search_key().chars().count();
                    a_len.cmp(&b_len)
                })
        });
        hits
    }

    /// Short-key stage for spaceless queries of one to three characters.
    ///
    /// One- and two-character queries match short keys exactly only; a
    /// three-character query additionally gets a Jaro-Winkler comparison
    /// against two-character keys, so a near-miss like `egb` still
    /// reaches `eg` without letting every three-letter query match
    /// everything.
    fn short_key_hits<'a>(
        &self,
        query_no_spaces: &str,
        spaceless_len: usize,
        records: &'a [CountryRecord],
    ) -> Vec<ScoredHit<'a>> {
        let threshold = if spaceless_len < SHORT_KEY_MAX_QUERY_LEN {
            1.0
        } else {
            SHORT_KEY_FUZZY_THRESHOLD
        };

        let mut hits = Vec::new();
        for record in records {
            let mut best = 0.0_f64;
            for key in record.short_keys() {
                let score = if key.as_str() == query_no_spaces {
                    1.0
                } else if spaceless_len == SHORT_KEY_MAX_QUERY_LEN
                    && key.chars().count() == 2
                {
                    self.engine
                        .compare(query_no_spaces, key, SimilarityAlgorithm::JaroWinkler)
                } else {
                    continue;
                };
                best = best.max(score);
            }
            if best >= threshold {
                hits.push(ScoredHit {
                    record,
                    score: best,
                });
            }
        }

        sort_by_score_descending(&mut hits);
        hits
    }

    /// Fuzzy fill: score records not yet in `results` and keep those at
    /// or above `threshold`, best first.
    fn fuzzy_hits<'a>(
        &self,
        query: &str,
        query_no_spaces: &str,
        records: &'a [CountryRecord],
        algorithm: SimilarityAlgorithm,
        threshold: f64,
        results: &ResultSet<'_>,
    ) -> Vec<ScoredHit<'a>> {
        let mut hits = Vec::new();
        for record in records {
            if results.contains(record.iso_code()) {
                continue;
            }
            let on_key = self.engine.compare(query, record.search_key(), algorithm);
            let on_spaceless = if query_no_spaces.is_empty() {
                0.0
            } else {
                self.engine
                    .compare(query_no_spaces, record.search_key_no_spaces(), algorithm)
            };
            let score = on_key.max(on_spaceless);
            if score >= threshold {
                hits.push(ScoredHit { record, score });
            }
        }

        sort_by_score_descending(&mut hits);
        hits
    }
}

/// Pick the similarity metric from the query's shape.
fn fuzzy_algorithm(query: &str, query_len: usize) -> SimilarityAlgorithm {
    if query.contains(' ') {
        SimilarityAlgorithm::CosineTokens
    } else if query_len <= JARO_WINKLER_MAX_QUERY_LEN {
        SimilarityAlgorithm::JaroWinkler
    } else {
        SimilarityAlgorithm::Ngram
    }
}

/// Pick the fuzzy acceptance threshold from query length and metric.
///
/// Short queries produce many spurious fuzzy hits, so their thresholds
/// are tighter; these values are part of the ranking contract.
fn fuzzy_threshold(query_len: usize, algorithm: SimilarityAlgorithm) -> f64 {
    if query_len <= 2 {
        FUZZY_THRESHOLD_TINY
    } else if algorithm == SimilarityAlgorithm::CosineTokens {
        FUZZY_THRESHOLD_COSINE
    } else if query_len <= 4 {
        FUZZY_THRESHOLD_SHORT
    } else if query_len <= JARO_WINKLER_MAX_QUERY_LEN {
        FUZZY_THRESHOLD_MEDIUM
    } else {
        FUZZY_THRESHOLD_LONG
    }
}

/// Stable descending sort by score; ties keep input order.
fn sort_by_score_descending(hits: &mut [ScoredHit<'_>]) {
    hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
}
