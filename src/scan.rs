//! Compiled substring scanning.
//!
//! A query is compiled into a [`CompiledPattern`] once and then applied to
//! every record's search key, so the per-haystack cost is a plain scan
//! with precomputed tables rather than a naive quadratic compare.

use memchr::memmem;

/// Selects the substring-scan implementation a finder compiles with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanAlgorithm {
    /// Boyer-Moore-Horspool: a 256-entry bad-character shift table built
    /// at compile time. The default.
    #[default]
    BoyerMoore,
    /// The SIMD-accelerated `memchr::memmem` searcher.
    Memmem,
}

/// A pattern compiled for repeated leftmost-match scans.
///
/// Both backends report identical indices for identical inputs; the
/// choice only affects how the scan is carried out.
///
/// # Examples
///
/// ```
/// use countrysearch::{CompiledPattern, ScanAlgorithm};
///
/// let pattern = CompiledPattern::compile("land", ScanAlgorithm::default());
/// assert_eq!(pattern.first_index_in("new zealand"), Some(7));
/// assert_eq!(pattern.first_index_in("iceland"), Some(3));
/// assert_eq!(pattern.first_index_in("spain"), None);
/// ```
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    backend: Backend,
}

#[derive(Debug, Clone)]
enum Backend {
    /// Degenerate empty pattern: never matches.
    Empty,
    Horspool {
        pattern: Vec<u8>,
        /// Shift per trailing haystack byte; `pattern.len()` for bytes
        /// absent from the pattern.
        skip: Box<[usize; 256]>,
    },
    Memmem(memmem::Finder<'static>),
}

impl CompiledPattern {
    /// Compile `pattern` for the given algorithm.
    ///
    /// An empty pattern compiles to a scanner that never matches.
    pub fn compile(pattern: &str, algorithm: ScanAlgorithm) -> Self {
        if pattern.is_empty() {
            return Self {
                backend: Backend::Empty,
            };
        }
        let backend = match algorithm {
            ScanAlgorithm::BoyerMoore => {
                let bytes = pattern.as_bytes().to_vec();
                let mut skip = Box::new([bytes.len(); 256]);
                for (i, &b) in bytes[..bytes.len() - 1].iter().enumerate() {
                    skip[b as usize] = bytes.len() - 1 - i;
                }
                Backend::Horspool {
                    pattern: bytes,
                    skip,
                }
            }
            ScanAlgorithm::Memmem => {
                Backend::Memmem(memmem::Finder::new(pattern.as_bytes()).into_owned())
            }
        };
        Self { backend }
    }

    /// Byte index of the leftmost occurrence of the pattern in
    /// `haystack`, or `None` when it does not occur.
    ///
    /// Patterns and haystacks are UTF-8, so a match can only start on a
    /// character boundary; the returned byte index is therefore also a
    /// valid character position. An empty pattern or haystack yields
    /// `None`.
    pub fn first_index_in(&self, haystack: &str) -> Option<usize> {
        let hay = haystack.as_bytes();
        match &self.backend {
            Backend::Empty => None,
            Backend::Horspool { pattern, skip } => {
                let m = pattern.len();
                if m > hay.len() {
                    return None;
                }
                let mut i = 0;
                while i + m <= hay.len() {
                    if &hay[i..i + m] == pattern.as_slice() {
                        return Some(i);
                    }
                    i += skip[hay[i + m - 1] as usize];
                }
                None
            }
            Backend::Memmem(finder) => finder.find(hay),
        }
    }
}
