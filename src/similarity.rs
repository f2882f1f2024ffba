//! Similarity scoring between normalized search keys.
//!
//! The engine does no normalization of its own: operands are assumed to
//! already be search keys (see [`build_search_key`](crate::build_search_key)).
//! Every metric is symmetric, total, and returns a score in `[0.0, 1.0]`;
//! an empty operand always scores `0.0`.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::iter;
use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;

/// Padding character for n-gram windows. A normalized key can never
/// contain NUL, so padding grams never collide with content grams.
const NGRAM_PAD: char = '\0';

/// The similarity metrics the engine can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimilarityAlgorithm {
    /// Classical Jaro with a common-prefix bonus (scale 0.1, prefix
    /// capped at 4 characters). Suits short single-word queries.
    JaroWinkler,
    /// Sørensen–Dice coefficient over the multiset of length-`n`
    /// character windows, padded with `n - 1` NUL characters on each
    /// side. Suits longer single-word queries.
    Ngram,
    /// Cosine similarity of whitespace-token count vectors. Suits
    /// multi-word queries, where token overlap matters more than order.
    CosineTokens,
}

type CacheKey = (SimilarityAlgorithm, String, String);

/// Computes similarity scores between two keys, with a bounded LRU cache
/// of previous results.
///
/// The cache is keyed by `(algorithm, a, b)` with the operands in
/// canonical order, so `compare(a, b, ..)` and `compare(b, a, ..)` share
/// one entry. Keys are owned strings: caching a score never extends the
/// lifetime of any record. The cache sits behind a [`Mutex`], so sharing
/// one engine across threads stays safe and agrees with sequential
/// execution.
///
/// # Examples
///
/// ```
/// use countrysearch::{SimilarityAlgorithm, SimilarityEngine};
///
/// let engine = SimilarityEngine::new(3, 64);
/// let score = engine.compare("germny", "germany", SimilarityAlgorithm::JaroWinkler);
/// assert!(score > 0.9);
/// assert_eq!(engine.compare("", "germany", SimilarityAlgorithm::JaroWinkler), 0.0);
/// ```
pub struct SimilarityEngine {
    ngram_size: usize,
    cache_capacity: usize,
    cache: Option<Mutex<LruCache<CacheKey, f64>>>,
}

impl SimilarityEngine {
    /// Create an engine with the given n-gram window width and cache
    /// capacity. A capacity of `0` disables caching; an `ngram_size` of
    /// `0` is treated as `1`.
    pub fn new(ngram_size: usize, cache_capacity: usize) -> Self {
        let cache =
            NonZeroUsize::new(cache_capacity).map(|capacity| Mutex::new(LruCache::new(capacity)));
        Self {
            ngram_size: ngram_size.max(1),
            cache_capacity,
            cache,
        }
    }

    /// Score the similarity of two keys in `[0.0, 1.0]`.
    ///
    /// Symmetric in its operands. Either operand empty scores `0.0`.
    pub fn compare(&self, a: &str, b: &str, algorithm: SimilarityAlgorithm) -> f64 {
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        // Canonical operand order; every metric is symmetric, so this
        // only matters for cache hits.
        let (x, y) = if a <= b { (a, b) } else { (b, a) };

        if let Some(score) = self.cached(algorithm, x, y) {
            return score;
        }

        let score = match algorithm {
            SimilarityAlgorithm::JaroWinkler => strsim::jaro_winkler(x, y),
            SimilarityAlgorithm::Ngram => self.ngram_dice(x, y),
            SimilarityAlgorithm::CosineTokens => cosine_tokens(x, y),
        };

        if let Some(cache) = &self.cache {
            let mut cache = lock_unpoison(cache);
            cache.put((algorithm, x.to_owned(), y.to_owned()), score);
        }
        score
    }

    fn cached(&self, algorithm: SimilarityAlgorithm, x: &str, y: &str) -> Option<f64> {
        let cache = self.cache.as_ref()?;
        let mut cache = lock_unpoison(cache);
        cache
            .get(&(algorithm, x.to_owned(), y.to_owned()))
            .copied()
    }

    /// Sørensen–Dice over padded character n-grams.
    fn ngram_dice(&self, a: &str, b: &str) -> f64 {
        let a_grams = padded_ngrams(a, self.ngram_size);
        let b_grams = padded_ngrams(b, self.ngram_size);
        if a_grams.is_empty() || b_grams.is_empty() {
            return 0.0;
        }

        // Both gram lists are sorted; count multiset overlap by merging.
        let mut shared = 0usize;
        let (mut i, mut j) = (0, 0);
        while i < a_grams.len() && j < b_grams.len() {
            match a_grams[i].cmp(&b_grams[j]) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    shared += 1;
                    i += 1;
                    j += 1;
                }
            }
        }

        2.0 * shared as f64 / (a_grams.len() + b_grams.len()) as f64
    }
}

// `Mutex` does not implement `Debug` usefully here; report the knobs.
impl fmt::Debug for SimilarityEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimilarityEngine")
            .field("ngram_size", &self.ngram_size)
            .field("cache_capacity", &self.cache_capacity)
            .finish()
    }
}

fn lock_unpoison<'a, K: std::hash::Hash + Eq, V>(
    cache: &'a Mutex<LruCache<K, V>>,
) -> std::sync::MutexGuard<'a, LruCache<K, V>> {
    // No code path panics while holding the lock; if a caller's unwind
    // poisoned it anyway, the cached scores are still valid.
    match cache.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Sorted multiset of length-`n` char windows over `s`, padded with
/// `n - 1` [`NGRAM_PAD`] characters on each side.
fn padded_ngrams(s: &str, n: usize) -> Vec<String> {
    let chars: Vec<char> = iter::repeat(NGRAM_PAD)
        .take(n - 1)
        .chain(s.chars())
        .chain(iter::repeat(NGRAM_PAD).take(n - 1))
        .collect();
    if chars.len() < n {
        return Vec::new();
    }
    let mut grams: Vec<String> = chars
        .windows(n)
        .map(|window| window.iter().collect())
        .collect();
    grams.sort_unstable();
    grams
}

/// Cosine similarity of whitespace-token count vectors.
fn cosine_tokens(a: &str, b: &str) -> f64 {
    let a_counts = token_counts(a);
    let b_counts = token_counts(b);
    if a_counts.is_empty() || b_counts.is_empty() {
        return 0.0;
    }

    let dot: f64 = a_counts
        .iter()
        .filter_map(|(token, &count_a)| {
            b_counts
                .get(token)
                .map(|&count_b| f64::from(count_a) * f64::from(count_b))
        })
        .sum();
    if dot == 0.0 {
        return 0.0;
    }

    dot / (vector_norm(&a_counts) * vector_norm(&b_counts))
}

fn token_counts(s: &str) -> HashMap<&str, u32> {
    let mut counts = HashMap::new();
    for token in s.split_whitespace() {
        *counts.entry(token).or_insert(0) += 1;
    }
    counts
}

fn vector_norm(counts: &HashMap<&str, u32>) -> f64 {
    counts
        .values()
        .map(|&count| f64::from(count) * f64::from(count))
        .sum::<f64>()
        .sqrt()
}
