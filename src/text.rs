//! Token normalization and similarity scoring shared by the transcript side
//! and the recognized word stream.

use caseless::default_case_fold_str;
use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+").expect("word pattern is valid"));

// Letters, digits and connector punctuation (Unicode category Pc).
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
        || matches!(
            c,
            '_' | '\u{203F}' | '\u{2040}' | '\u{2054}' | '\u{FE33}' | '\u{FE34}'
                | '\u{FE4D}'..='\u{FE4F}' | '\u{FF3F}'
        )
}

/// Reduce a token to its comparable form: case folded (full folding, so
/// `ß` becomes `ss`), accents removed and every non-word character dropped.
///
/// The result is empty for punctuation-only input; callers must skip such
/// tokens instead of matching them.
pub fn normalize_token(token: &str) -> String {
    default_case_fold_str(token)
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| is_word_char(*c))
        .collect()
}

/// Split a transcript line into normalized tokens, in order.
pub fn tokenize(text: &str) -> Vec<String> {
    WORD_RE
        .find_iter(text)
        .map(|m| normalize_token(m.as_str()))
        .filter(|token| !token.is_empty())
        .collect()
}

/// Position-by-position character agreement divided by the longer length.
///
/// This is not an edit distance: a one character shift near the start of a
/// word scores poorly. The match threshold used by the aligner is tuned
/// against exactly this ratio.
pub fn similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let matches = a.chars().zip(b.chars()).filter(|(x, y)| x == y).count();
    let longest = a.chars().count().max(b.chars().count());

    matches as f64 / longest as f64
}
