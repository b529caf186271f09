use regex::Regex;
use std::sync::LazyLock;

use crate::normalize::normalize;

// "Payment electricity - Telmiko - 123456" → the merchant sits between the
// service type and the trailing account number.
static UTILITY_PAYMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^payment\s+(?:for\s+)?(?:electricity|electric|gas|heating|water|internet|phone|mobile|cleaning|elevator|utility|utilities)\s*-\s*(.+)$",
    )
    .unwrap()
});
static TRAILING_ACCOUNT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*-\s*\d+\s*$").unwrap());

static GENERIC_PREFIXES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)^card\s+operation\s+payment\s*-\s*",
        r"(?i)^card\s+operation\s+(?:cash\s+)?withdrawal\s*-\s*",
        r"(?i)^card\s+payment\s*-\s*",
        r"(?i)^pos\s+(?:purchase|payment)\s*[-:]?\s*",
        r"(?i)^payment\s*-\s*",
        r"(?i)^transaction\s*-\s*",
        r"(?i)^payments?\s+",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

// Payment-processor composites: "TpayLLC*Wendys", "Vip Pay*YANDEX.GO".
static PROCESSOR_CAPTURE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:vip\s*pay|tpay|pay)\w*\s*\*\s*([^*]+)").unwrap());
static PROCESSOR_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:vip\s*pay|tpay|pay)").unwrap());
static SUFFIX_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:llc|inc|corp|ltd|limited)\b").unwrap());
static PROCESSOR_STAR_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:vip\s*pay|tpay|pay)\w*\s*\*").unwrap());
static STAR_PROCESSOR_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\*(?:vip\s*pay|tpay)\w*").unwrap());

// Reference noise that shows up inside statement lines.
static CARD_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}[\s-]?\d{4}[\s-]?\d{4}[\s-]?\d{4}").unwrap());
static DATE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{2}[./]\d{2}[./]\d{4}\b").unwrap());
static LEADING_REF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\s*-\s*").unwrap());
static TRAILING_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+\d+[.,]\d{2}\s*(?:gel|usd|eur|gbp)?\s*$").unwrap());
static TRAILING_CURRENCY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+(?:gel|usd|eur|gbp)\s*$").unwrap());

/// Isolates the merchant-identifying substring of a full statement line.
///
/// Strips transaction-type prefixes, payment-processor wrappers, card masks,
/// dates and trailing amount/currency suffixes, then keeps the first five
/// meaningful words. When nothing identifiable remains the normalized full
/// description comes back instead — a non-empty input never extracts to an
/// empty string.
pub fn extract_merchant(description: &str) -> String {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let mut cleaned = trimmed.to_string();

    if let Some(caps) = UTILITY_PAYMENT.captures(&cleaned) {
        cleaned = caps[1].trim().to_string();
        cleaned = TRAILING_ACCOUNT.replace(&cleaned, "").trim().to_string();
    } else {
        for re in GENERIC_PREFIXES.iter() {
            cleaned = re.replace(&cleaned, "").into_owned();
        }
        cleaned = cleaned.trim().to_string();
    }

    let snapshot = cleaned.clone();
    if let Some(caps) = PROCESSOR_CAPTURE.captures(&snapshot) {
        let part = PROCESSOR_TOKEN.replace_all(&caps[1], "").into_owned();
        let part = SUFFIX_TOKEN.replace_all(&part, "").into_owned();
        let part = part.trim();
        if part.chars().count() > 2 {
            cleaned = part.to_string();
        }
    }

    cleaned = PROCESSOR_STAR_PREFIX.replace(&cleaned, "").into_owned();
    cleaned = STAR_PROCESSOR_SUFFIX.replace(&cleaned, "").into_owned();

    cleaned = CARD_NUMBER.replace_all(&cleaned, "").into_owned();
    cleaned = DATE_TOKEN.replace_all(&cleaned, "").into_owned();
    cleaned = LEADING_REF.replace(&cleaned, "").into_owned();
    cleaned = TRAILING_AMOUNT.replace(&cleaned, "").into_owned();
    cleaned = TRAILING_CURRENCY.replace(&cleaned, "").into_owned();

    // Single letters and bare numbers are terminal codes, not identity.
    let words: Vec<&str> = cleaned
        .split_whitespace()
        .filter(|w| w.chars().count() >= 2 && !w.chars().all(|c| c.is_ascii_digit()))
        .take(5)
        .collect();

    let core = words.join(" ").replace('.', " ");
    let core = core.split_whitespace().collect::<Vec<_>>().join(" ");

    if !core.is_empty() {
        return core;
    }

    let fallback = normalize(trimmed);
    if fallback.is_empty() {
        trimmed.to_lowercase()
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_card_payment_prefix() {
        assert_eq!(
            extract_merchant("Card operation payment - minibus_tbilisi 1.00 GEL 11.11.2025"),
            "minibus_tbilisi"
        );
        assert_eq!(extract_merchant("Card payment - STARBUCKS"), "STARBUCKS");
        assert_eq!(extract_merchant("POS purchase: WOLT"), "WOLT");
    }

    #[test]
    fn utility_payment_keeps_provider() {
        assert_eq!(extract_merchant("Payment electricity - Telmiko"), "Telmiko");
        assert_eq!(
            extract_merchant("Payment cleaning - Tbilservice Group - 445566"),
            "Tbilservice Group"
        );
    }

    #[test]
    fn processor_wrapper_yields_merchant_after_asterisk() {
        assert_eq!(extract_merchant("Vip Pay*YANDEX.GO"), "YANDEX GO");
        assert_eq!(extract_merchant("Tpay*Wendys"), "Wendys");
    }

    #[test]
    fn drops_reference_noise() {
        assert_eq!(
            extract_merchant("AMAZON EU SARL 4532 9811 2234 5001"),
            "AMAZON EU SARL"
        );
        assert_eq!(extract_merchant("CARREFOUR 12.03.2025"), "CARREFOUR");
        assert_eq!(extract_merchant("GLOVO 24.50 GEL"), "GLOVO");
    }

    #[test]
    fn caps_merchant_at_five_words() {
        let got = extract_merchant("ALPHA BETA GAMMA DELTA EPSILON ZETA ETA");
        assert_eq!(got, "ALPHA BETA GAMMA DELTA EPSILON");
    }

    #[test]
    fn falls_back_to_normalized_description() {
        // Only short/numeric tokens: no clear merchant core.
        let got = extract_merchant("A 1 2");
        assert!(!got.is_empty());
        assert_eq!(got, "a 1 2");
    }

    #[test]
    fn never_empty_for_non_empty_input() {
        for s in ["9811 2234", "**", "x", "Payments "] {
            assert!(!extract_merchant(s).is_empty(), "empty extraction for {s:?}");
        }
    }

    #[test]
    fn empty_input_extracts_empty() {
        assert_eq!(extract_merchant(""), "");
        assert_eq!(extract_merchant("   "), "");
    }
}
