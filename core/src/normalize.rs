//! Claim and abstract text canonicalization.
//!
//! `normalize` is referentially transparent: the similarity cache keys on its
//! output together with [`NORMALIZER_VERSION`], so any change to the tables
//! below must bump the version.

use std::collections::HashSet;

use once_cell::sync::Lazy;

pub const NORMALIZER_VERSION: u32 = 1;

const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "of", "to", "in", "on", "at", "by", "for", "with", "from",
    "into", "onto", "as", "is", "are", "be", "being", "been", "it", "its", "this", "that",
    "these", "those", "which", "such", "each", "one", "more", "least", "wherein", "whereby",
    "said", "comprising", "comprises", "comprise", "including", "includes", "having", "has",
    "claim", "claims", "thereof", "therein", "thereto", "thereby", "further", "consisting",
    "essentially", "plurality",
];

// Multi-word boilerplate is removed before tokenization so that the remaining
// words do not survive as stray tokens.
const BOILERPLATE_PHRASES: &[&str] = &[
    "according to any one of the preceding claims",
    "as claimed in claim",
    "as recited in claim",
    "according to claim",
    "characterized in that",
    "characterised in that",
    "consisting essentially of",
    "consisting of",
    "at least one of",
];

const SYNONYMS: &[(&str, &str)] = &[
    ("automobile", "vehicle"),
    ("car", "vehicle"),
    ("ev", "vehicle"),
    ("connected", "coupled"),
    ("attached", "coupled"),
    ("linked", "coupled"),
    ("accumulator", "battery"),
    ("cpu", "processor"),
    ("microprocessor", "processor"),
    ("microcontroller", "controller"),
    ("receptacle", "socket"),
    ("wirelessly", "wireless"),
    ("contactless", "wireless"),
    ("cordless", "wireless"),
    ("configured", "adapted"),
    ("operable", "adapted"),
];

static STOP_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| STOP_WORDS.iter().copied().collect());

/// Lowercased and ASCII-folded. Punctuation is preserved so clause
/// boundaries survive for the decomposer.
pub fn fold_text(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for c in text.chars() {
        fold_char(c, &mut folded);
    }
    folded.to_ascii_lowercase()
}

/// [`fold_text`] with boilerplate phrases blanked out.
pub fn canonical_text(text: &str) -> String {
    let mut out = fold_text(text);
    for phrase in BOILERPLATE_PHRASES {
        if out.contains(phrase) {
            out = out.replace(phrase, " ");
        }
    }
    out
}

/// Tokenize text for comparison. Empty or whitespace-only input yields an
/// empty sequence.
pub fn normalize(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    canonical_text(text)
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .filter(|t| !STOP_SET.contains(*t))
        .map(fold_token)
        .filter(|t| !STOP_SET.contains(t.as_str()))
        .collect()
}

fn fold_token(token: &str) -> String {
    let singular = fold_plural(token);
    for (from, to) in SYNONYMS {
        if singular == *from {
            return (*to).to_string();
        }
    }
    singular.to_string()
}

fn fold_plural(token: &str) -> &str {
    let keeps_trailing_s = token.ends_with("ss")
        || token.ends_with("us")
        || token.ends_with("is")
        || token.bytes().any(|b| b.is_ascii_digit());
    if token.len() > 3 && token.ends_with('s') && !keeps_trailing_s {
        &token[..token.len() - 1]
    } else {
        token
    }
}

fn fold_char(c: char, out: &mut String) {
    if c.is_ascii() {
        out.push(c);
        return;
    }
    let replacement = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => "a",
        'æ' | 'Æ' => "ae",
        'ç' | 'Ç' => "c",
        'è' | 'é' | 'ê' | 'ë' | 'È' | 'É' | 'Ê' | 'Ë' => "e",
        'ì' | 'í' | 'î' | 'ï' | 'Ì' | 'Í' | 'Î' | 'Ï' => "i",
        'ñ' | 'Ñ' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' => "o",
        'ù' | 'ú' | 'û' | 'ü' | 'Ù' | 'Ú' | 'Û' | 'Ü' => "u",
        'ý' | 'ÿ' | 'Ý' => "y",
        'ß' => "ss",
        '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' => "-",
        '\u{2018}' | '\u{2019}' => "'",
        '\u{201C}' | '\u{201D}' => "\"",
        '\u{00B5}' | '\u{03BC}' => "u",
        '\u{03A9}' | '\u{2126}' => "ohm",
        '°' => " deg ",
        _ => " ",
    };
    out.push_str(replacement);
}
