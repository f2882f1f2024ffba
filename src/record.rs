//! Country records: the immutable, searchable entities the finder ranks.
//!
//! A [`CountryRecord`] is built once per (locale, country list) snapshot
//! from an ISO code, a dial code, and a localized display name. All search
//! keys are derived at construction; the finder never mutates a record.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

use crate::normalize::{build_search_key, strip_spaces};

/// Curated short-key aliases per ISO code, compiled in as constant data.
///
/// These cover abbreviations users actually type that neither the ISO code
/// nor the name initials produce. Adding a mapping is a source change.
static SHORT_KEY_EXTRAS: Lazy<HashMap<&'static str, &'static [&'static str]>> =
    Lazy::new(|| {
        let mut m: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
        m.insert("US", &["usa"]);
        m.insert("GB", &["uk"]);
        m.insert("SA", &["ksa"]);
        m.insert("AE", &["uae"]);
        m
    });

/// An immutable country entry with its derived search keys.
///
/// Records are cheap to share by reference and are rebuilt on locale
/// change. The derived fields uphold the invariants the finder relies on:
/// `search_key` holds only letters, digits, and single interior spaces;
/// `search_key_no_spaces` is `search_key` with U+0020 removed; and
/// `short_keys` is an insertion-ordered set of non-empty lowercase tokens.
///
/// # Examples
///
/// ```
/// use countrysearch::CountryRecord;
///
/// let record = CountryRecord::new("US", "1", "United States");
/// assert_eq!(record.search_key(), "united states");
/// assert_eq!(record.search_key_no_spaces(), "unitedstates");
/// assert_eq!(record.short_keys(), ["us", "usa"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryRecord {
    iso_code: String,
    dial_code: String,
    display_name: String,
    search_key: String,
    search_key_no_spaces: String,
    short_keys: Vec<String>,
}

impl CountryRecord {
    /// Build a record from an ISO code, dial code, and localized name.
    ///
    /// The dial code is decimal digits without a leading `+`. Empty
    /// inputs are permitted; the resulting record simply never matches
    /// the corresponding search stage.
    pub fn new(iso_code: &str, dial_code: &str, display_name: &str) -> Self {
        let search_key = build_search_key(display_name);
        let search_key_no_spaces = strip_spaces(&search_key);
        let short_keys = derive_short_keys(iso_code, &search_key);
        Self {
            iso_code: iso_code.to_owned(),
            dial_code: dial_code.to_owned(),
            display_name: display_name.to_owned(),
            search_key,
            search_key_no_spaces,
            short_keys,
        }
    }

    /// Two-letter ISO-3166 alpha-2 code; the record's uniqueness key.
    pub fn iso_code(&self) -> &str {
        &self.iso_code
    }

    /// Country calling code: decimal digits, no leading `+`.
    pub fn dial_code(&self) -> &str {
        &self.dial_code
    }

    /// Localized human-readable name, as provided by the host.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Normalized form of the display name (see
    /// [`build_search_key`](crate::build_search_key)).
    pub fn search_key(&self) -> &str {
        &self.search_key
    }

    /// The search key with all spaces removed.
    pub fn search_key_no_spaces(&self) -> &str {
        &self.search_key_no_spaces
    }

    /// Short tokens for abbreviation matches: the lowercased ISO code,
    /// the name initials (when the name has at least two words), and any
    /// curated extras for this ISO code.
    pub fn short_keys(&self) -> &[String] {
        &self.short_keys
    }
}

/// Derive the insertion-ordered short-key set for one record.
fn derive_short_keys(iso_code: &str, search_key: &str) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();

    let iso_lower = iso_code.to_lowercase();
    push_unique(&mut keys, iso_lower);

    // Initials form an initialism only for multi-word names; single-char
    // "initialisms" would collide with half the alphabet.
    if !search_key.is_empty() {
        let tokens: Vec<&str> = search_key.split(' ').collect();
        if tokens.len() >= 2 {
            let initials: String = tokens
                .iter()
                .filter_map(|token| token.chars().next())
                .collect();
            if initials.chars().count() >= 2 {
                push_unique(&mut keys, initials);
            }
        }
    }

    if let Some(extras) = SHORT_KEY_EXTRAS.get(iso_code) {
        for extra in *extras {
            push_unique(&mut keys, (*extra).to_owned());
        }
    }

    keys
}

fn push_unique(keys: &mut Vec<String>, key: String) {
    if !key.is_empty() && !keys.contains(&key) {
        keys.push(key);
    }
}

/// The host-side answer for one ISO code: its localized display name and
/// dial string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCountry {
    /// Localized human-readable country name.
    pub display_name: String,
    /// Country calling code: decimal digits, no leading `+`.
    pub dial_code: String,
}

impl ResolvedCountry {
    /// Convenience constructor from borrowed strings.
    pub fn new(display_name: &str, dial_code: &str) -> Self {
        Self {
            display_name: display_name.to_owned(),
            dial_code: dial_code.to_owned(),
        }
    }
}

/// The seam to the host's localization table.
///
/// The core consumes localized names as already-resolved strings; this
/// trait is how it asks for them. Implementations exist for plain maps
/// and for closures, so hosts with either shape plug in directly.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use countrysearch::{CountryResolver, ResolvedCountry};
///
/// let mut table = HashMap::new();
/// table.insert("DE", ("Germany", "49"));
/// let resolved = table.resolve("DE").unwrap();
/// assert_eq!(resolved.display_name, "Germany");
/// assert_eq!(resolved.dial_code, "49");
/// assert!(table.resolve("ZZ").is_none());
/// ```
pub trait CountryResolver {
    /// Resolve one ISO code to its display name and dial string, or
    /// `None` when the host's catalog has no entry for it.
    fn resolve(&self, iso_code: &str) -> Option<ResolvedCountry>;
}

impl CountryResolver for HashMap<String, ResolvedCountry> {
    fn resolve(&self, iso_code: &str) -> Option<ResolvedCountry> {
        self.get(iso_code).cloned()
    }
}

impl<'a> CountryResolver for HashMap<&'a str, (&'a str, &'a str)> {
    fn resolve(&self, iso_code: &str) -> Option<ResolvedCountry> {
        self.get(iso_code)
            .map(|(name, dial)| ResolvedCountry::new(name, dial))
    }
}

/// Adapter that turns a closure into a [`CountryResolver`].
///
/// # Examples
///
/// ```
/// use countrysearch::{CountryResolver, FnResolver, ResolvedCountry};
///
/// let resolver = FnResolver(|iso: &str| {
///     (iso == "JP").then(|| ResolvedCountry::new("Japan", "81"))
/// });
/// assert!(resolver.resolve("JP").is_some());
/// assert!(resolver.resolve("KR").is_none());
/// ```
pub struct FnResolver<F>(pub F);

impl<F> CountryResolver for FnResolver<F>
where
    F: Fn(&str) -> Option<ResolvedCountry>,
{
    fn resolve(&self, iso_code: &str) -> Option<ResolvedCountry> {
        (self.0)(iso_code)
    }
}

/// Build the record list for a set of ISO codes.
///
/// Codes the resolver cannot resolve are skipped; duplicate codes produce
/// one record (first occurrence wins). The result is sorted by display
/// name under a locale-independent byte-wise comparator, for a
/// deterministic initial presentation.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use countrysearch::build_records;
///
/// let mut table = HashMap::new();
/// table.insert("DE", ("Germany", "49"));
/// table.insert("FR", ("France", "33"));
/// let records = build_records(&table, &["FR", "DE", "ZZ"]);
/// assert_eq!(records.len(), 2);
/// assert_eq!(records[0].display_name(), "France");
/// assert_eq!(records[1].display_name(), "Germany");
/// ```
pub fn build_records<R, S>(resolver: &R, iso_codes: &[S]) -> Vec<CountryRecord>
where
    R: CountryResolver,
    S: AsRef<str>,
{
    let mut seen: HashSet<&str> = HashSet::with_capacity(iso_codes.len());
    let mut records = Vec::with_capacity(iso_codes.len());

    for iso_code in iso_codes {
        let iso_code = iso_code.as_ref();
        if !seen.insert(iso_code) {
            continue;
        }
        if let Some(resolved) = resolver.resolve(iso_code) {
            records.push(CountryRecord::new(
                iso_code,
                &resolved.dial_code,
                &resolved.display_name,
            ));
        }
    }

    records.sort_by(|a, b| a.display_name.cmp(&b.display_name));
    records
}
