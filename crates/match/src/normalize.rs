use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

// "H&M" and its long form collapse to one token so user corrections and
// statement spellings land on the same pattern key.
static HM_AMPERSAND: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bh\s*&\s*m\b").unwrap());
static HM_LONG_FORM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bhennes\s+and\s+mauritz\b").unwrap());

/// Legal-form and filler tokens that carry no merchant identity.
const BUSINESS_SUFFIXES: &[&str] = &[
    "llc", "inc", "corp", "corporation", "ltd", "limited", "co", "company", "textile",
];

/// Canonicalizes a merchant or description string for comparison.
///
/// Lower-cases, folds diacritics to their base letters (NFKD minus combining
/// marks), collapses punctuation and whitespace runs to single spaces, and
/// drops purely numeric tokens of four or more digits (card masks, reference
/// numbers). Shorter numeric tokens stay — they may be part of a brand name
/// ("7 eleven").
///
/// Total over any input (empty in, empty out) and idempotent:
/// `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(input: &str) -> String {
    let folded: String = input
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();

    let folded = HM_AMPERSAND.replace_all(&folded, "hm");
    let folded = HM_LONG_FORM.replace_all(&folded, "hm");

    // Dots, underscores and all other punctuation become separators, so
    // "YANDEX.GO" and "bus_tbilisi" split into comparable words.
    let spaced: String = folded
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    spaced
        .split_whitespace()
        .filter(|w| !BUSINESS_SUFFIXES.contains(w))
        .filter(|w| !is_masked_number(w))
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_masked_number(word: &str) -> bool {
    word.len() >= 4 && word.chars().all(|c| c.is_ascii_digit())
}
