//! Text cleanup applied between extraction and every downstream stage

use once_cell::sync::Lazy;
use regex::Regex;

/// Anything that is not alphanumeric, whitespace or basic sentence punctuation
static DISALLOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{Alphabetic}\p{N}\s,.!?]").expect("valid regex"));

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Word split by a hyphen at the end of a line
static LINE_HYPHENATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\p{Alphabetic})-[ \t]*\r?\n[ \t]*(\p{Alphabetic})").expect("valid regex"));

/// Typographic glyphs PDF text layers commonly carry, with their plain replacements
const GLYPH_REPLACEMENTS: &[(char, &str)] = &[
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
    ('\u{2010}', "-"),
    ('\u{2011}', "-"),
    ('\u{2013}', "-"),
    ('\u{2014}', " - "),
    ('\u{2018}', "'"),
    ('\u{2019}', "'"),
    ('\u{201C}', "\""),
    ('\u{201D}', "\""),
    ('\u{2026}', "..."),
    ('\u{00A0}', " "),
    ('\u{00AD}', ""),
];

/// Repair extraction artifacts (ligatures, typographic punctuation, NUL
/// bytes, end-of-line hyphenation) while keeping line structure intact
pub fn repair_extraction_artifacts(raw: &str) -> String {
    let mut text = raw.replace('\0', "");
    for (glyph, replacement) in GLYPH_REPLACEMENTS {
        if text.contains(*glyph) {
            text = text.replace(*glyph, replacement);
        }
    }
    LINE_HYPHENATION.replace_all(&text, "$1$2").into_owned()
}

/// Normalize text for language detection and prompt embedding.
///
/// Disallowed characters are removed first so that the removal never leaves
/// two spaces behind; whitespace runs then collapse to a single space.
pub fn normalize(text: &str) -> String {
    let kept = DISALLOWED.replace_all(text, "");
    let collapsed = WHITESPACE_RUN.replace_all(&kept, " ");
    collapsed.trim().to_string()
}

/// Normalize every page and drop the ones left empty
pub fn normalize_pages<S: AsRef<str>>(pages: &[S]) -> Vec<String> {
    pages
        .iter()
        .map(|p| normalize(p.as_ref()))
        .filter(|p| !p.is_empty())
        .collect()
}
