//! End-to-end tests over an Arabic-localized country list: tashkeel
//! stripping, hamza and taa-marbuta folding, and dial-code lookups that
//! are script-independent.

use countrysearch::{CountryRecord, Finder, FinderConfig};

// ---------------------------------------------------------------------------
// Fixture
// ---------------------------------------------------------------------------

/// (iso, dial, Arabic display name).
const COUNTRIES: &[(&str, &str, &str)] = &[
    ("AE", "971", "\u{627}\u{644}\u{625}\u{645}\u{627}\u{631}\u{627}\u{62a}"),
    ("BH", "973", "\u{627}\u{644}\u{628}\u{62d}\u{631}\u{64a}\u{646}"),
    ("DZ", "213", "\u{627}\u{644}\u{62c}\u{632}\u{627}\u{626}\u{631}"),
    ("EG", "20", "\u{645}\u{635}\u{631}"),
    ("IQ", "964", "\u{627}\u{644}\u{639}\u{631}\u{627}\u{642}"),
    ("JO", "962", "\u{627}\u{644}\u{623}\u{631}\u{62f}\u{646}"),
    ("KW", "965", "\u{627}\u{644}\u{643}\u{648}\u{64a}\u{62a}"),
    ("LB", "961", "\u{644}\u{628}\u{646}\u{627}\u{646}"),
    ("MA", "212", "\u{627}\u{644}\u{645}\u{63a}\u{631}\u{628}"),
    ("OM", "968", "\u{639}\u{645}\u{627}\u{646}"),
    ("QA", "974", "\u{642}\u{637}\u{631}"),
    ("SA", "966", "\u{627}\u{644}\u{633}\u{639}\u{648}\u{62f}\u{64a}\u{629}"),
    ("SY", "963", "\u{633}\u{648}\u{631}\u{64a}\u{627}"),
    ("TN", "216", "\u{62a}\u{648}\u{646}\u{633}"),
    ("YE", "967", "\u{627}\u{644}\u{64a}\u{645}\u{646}"),
];

fn country_list() -> Vec<CountryRecord> {
    COUNTRIES
        .iter()
        .map(|(iso, dial, name)| CountryRecord::new(iso, dial, name))
        .collect()
}

fn default_finder() -> Finder {
    Finder::new(FinderConfig::default())
}

fn isos<'a>(results: &[&'a CountryRecord]) -> Vec<&'a str> {
    results.iter().map(|record| record.iso_code()).collect()
}

// ---------------------------------------------------------------------------
// Name queries
// ---------------------------------------------------------------------------

#[test]
fn egypt_is_first_for_its_own_name() {
    let records = country_list();
    // "مصر"
    let results = default_finder().where_text("\u{645}\u{635}\u{631}", &records);
    assert_eq!(isos(&results)[0], "EG");
}

#[test]
fn tashkeel_in_the_query_is_stripped() {
    let records = country_list();
    // "عُمان" -- Oman with a damma on the ayn.
    let results =
        default_finder().where_text("\u{639}\u{64f}\u{645}\u{627}\u{646}", &records);
    assert_eq!(isos(&results)[0], "OM");
}

#[test]
fn arabic_prefix_queries_match() {
    let records = country_list();
    // "عما" -- the first three letters of Oman.
    let results = default_finder().where_text("\u{639}\u{645}\u{627}", &records);
    assert_eq!(isos(&results)[0], "OM");
}

#[test]
fn hamza_carrier_variants_collapse() {
    let records = country_list();
    // The Emirates spelled with a plain alef instead of alef-hamza-below.
    let results = default_finder().where_text(
        "\u{627}\u{644}\u{627}\u{645}\u{627}\u{631}\u{627}\u{62a}",
        &records,
    );
    assert_eq!(isos(&results)[0], "AE");
    // Algeria typed with plain yaa instead of yaa-with-hamza.
    let results = default_finder().where_text(
        "\u{627}\u{644}\u{62c}\u{632}\u{627}\u{64a}\u{631}",
        &records,
    );
    assert_eq!(isos(&results)[0], "DZ");
}

#[test]
fn taa_marbuta_and_haa_are_interchangeable() {
    let records = country_list();
    // Saudi Arabia typed ending in haa rather than taa marbuta.
    let results = default_finder().where_text(
        "\u{627}\u{644}\u{633}\u{639}\u{648}\u{62f}\u{64a}\u{647}",
        &records,
    );
    assert_eq!(isos(&results)[0], "SA");
    // And the canonical spelling still matches.
    let results = default_finder().where_text(
        "\u{627}\u{644}\u{633}\u{639}\u{648}\u{62f}\u{64a}\u{629}",
        &records,
    );
    assert_eq!(isos(&results)[0], "SA");
}

// ---------------------------------------------------------------------------
// Dial codes and short keys are script-independent
// ---------------------------------------------------------------------------

#[test]
fn dial_971_finds_the_emirates_first() {
    let records = country_list();
    let results = default_finder().where_text("971", &records);
    assert_eq!(isos(&results)[0], "AE");
}

#[test]
fn iso_short_keys_work_on_an_arabic_list() {
    let records = country_list();
    let results = default_finder().where_text("eg", &records);
    assert_eq!(isos(&results)[0], "EG");
    let results = default_finder().where_text("KSA", &records);
    assert_eq!(isos(&results)[0], "SA");
}

// ---------------------------------------------------------------------------
// Invariants
// ---------------------------------------------------------------------------

#[test]
fn empty_query_returns_the_whole_list() {
    let records = country_list();
    let results = default_finder().where_text("", &records);
    assert_eq!(results.len(), records.len());
}

#[test]
fn arabic_results_are_deduplicated() {
    let records = country_list();
    let finder = default_finder();
    for query in ["\u{627}\u{644}", "\u{645}", "9", "96"] {
        let results = finder.where_text(query, &records);
        let mut seen = std::collections::HashSet::new();
        for record in &results {
            assert!(seen.insert(record.iso_code()), "query {query:?}");
        }
    }
}
