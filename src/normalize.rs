//! Script-aware normalization of display names and queries into search keys.
//!
//! A search key contains only lowercase letters, digits, and single spaces:
//! diacritics, punctuation, and Arabic letter variants are folded away so
//! that a typed query and a localized display name meet on common ground.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Fold one code point per the Arabic normalization rules.
///
/// Returns `None` for code points that are removed outright (tashkeel,
/// Quranic annotation signs, and the tatweel), the collapsed letter for
/// Arabic variant forms, and the input unchanged for everything else --
/// which makes the fold a no-op outside the Arabic block.
fn fold_arabic(c: char) -> Option<char> {
    match c {
        // Tashkeel, honorific/Quranic annotation signs, superscript alef,
        // and the tatweel connector. The tatweel is a modifier letter, not
        // a combining mark, so NFD filtering alone would keep it.
        '\u{0610}'..='\u{061A}'
        | '\u{064B}'..='\u{065F}'
        | '\u{0670}'
        | '\u{06D6}'..='\u{06ED}'
        | '\u{0640}' => None,
        // Alef variants (madda, hamza above/below, wasla) collapse to the
        // bare alef.
        '\u{0622}' | '\u{0623}' | '\u{0625}' | '\u{0671}' => Some('\u{0627}'),
        // Alef maksura is written where yaa is read.
        '\u{0649}' => Some('\u{064A}'),
        // Taa marbuta is pronounced (and typed) as haa at word end.
        '\u{0629}' => Some('\u{0647}'),
        // Hamza carriers keep their carrier letter.
        '\u{0624}' => Some('\u{0648}'),
        '\u{0626}' => Some('\u{064A}'),
        _ => Some(c),
    }
}

/// Fold Latin letters whose mark is part of the glyph rather than a
/// combining code point, so NFD cannot strip it.
fn fold_stroked(c: char) -> char {
    match c {
        '\u{00f8}' => 'o',
        '\u{0142}' => 'l',
        '\u{0111}' => 'd',
        _ => c,
    }
}

/// Build the canonical search key for a display string or query.
///
/// The pipeline, in order:
///
/// 1. NFD decomposition with combining marks dropped, so `é` becomes `e`,
///    `ü` becomes `u`, and Arabic harakat disappear. Stroked letters whose
///    mark is baked into the glyph (`ø`, `ł`, `đ`) are folded to their
///    base letter; letters without any ASCII base (`ß`, `æ`) pass through
///    unchanged.
/// 2. Locale-independent lowercasing.
/// 3. Arabic letter folding: tashkeel and the tatweel are removed, alef
///    variants collapse to the bare alef, alef maksura becomes yaa, taa
///    marbuta becomes haa, and hamza carriers keep their carrier letter.
///    A no-op outside the Arabic block, so it runs unconditionally.
/// 4. Every code point that is not a letter, digit, or whitespace becomes
///    a token separator.
/// 5. Separator runs collapse to a single space; no leading or trailing
///    space survives.
///
/// The function is total and idempotent: it never fails, empty input
/// yields empty output, and re-normalizing a key returns it unchanged.
///
/// # Examples
///
/// ```
/// use countrysearch::build_search_key;
///
/// assert_eq!(build_search_key("S\u{00e3}o Tom\u{00e9}"), "sao tome");
/// assert_eq!(build_search_key("C\u{00f4}te d'Ivoire"), "cote d ivoire");
/// assert_eq!(build_search_key("  United   States  "), "united states");
/// assert_eq!(build_search_key("?!."), "");
/// // Tashkeel is stripped: a vocalized spelling of Oman equals the bare one.
/// assert_eq!(
///     build_search_key("\u{639}\u{64f}\u{645}\u{627}\u{646}"),
///     "\u{639}\u{645}\u{627}\u{646}",
/// );
/// ```
pub fn build_search_key(input: &str) -> String {
    let mut key = String::with_capacity(input.len());
    // True when at least one separator was seen since the last kept char.
    let mut pending_space = false;

    for decomposed in input.nfd() {
        // Lowercasing may expand a single code point into several.
        for lowered in decomposed.to_lowercase() {
            if is_combining_mark(lowered) {
                continue;
            }
            let folded = match fold_arabic(fold_stroked(lowered)) {
                Some(c) => c,
                None => continue,
            };
            if folded.is_alphanumeric() {
                if pending_space && !key.is_empty() {
                    key.push(' ');
                }
                pending_space = false;
                key.push(folded);
            } else {
                // Whitespace and punctuation alike separate tokens.
                pending_space = true;
            }
        }
    }

    key
}

/// Return `key` with every U+0020 removed.
///
/// Search keys contain no other whitespace, so this is the spaceless
/// variant used for run-together queries like `"unitedstates"`.
pub(crate) fn strip_spaces(key: &str) -> String {
    key.chars().filter(|c| *c != ' ').collect()
}
