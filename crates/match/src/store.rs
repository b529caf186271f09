use std::collections::HashMap;

use tally_core::{CategoryId, GlobalMerchantPattern, MerchantPattern};

use crate::normalize::normalize;
use crate::similarity::{similarity, FUZZY_ACCEPT_THRESHOLD};

/// Transaction-shaped words that never identify a merchant. Includes the
/// Georgian bank-statement tokens that survive partial translation.
const STOP_WORDS: &[&str] = &[
    "card",
    "payment",
    "operation",
    "transaction",
    "გადახდა",
    "ოპერაცია",
    "საბარათე",
    "gel",
    "usd",
    "eur",
    "gbp",
    "currency",
    "amount",
    "total",
    "fee",
    "charge",
    "tpay",
    "pay",
    "vip",
    "llc",
    "inc",
    "ltd",
    "limited",
    "corp",
    "corporation",
    "service",
    "services",
    "group",
    "delivery",
    "transfer",
    "transfers",
    "private",
    "გადარიცხვა",
    "ჩარიცხვა",
    "სხვა",
    "სხვადასხვა",
    "ბანკიდან",
];

/// City/country words filtered from descriptions but kept in stored patterns,
/// where they are part of the merchant identity ("tbilisi metro").
const LOCATION_WORDS: &[&str] = &["tbilisi", "georgia", "georgian"];

#[derive(Debug, Clone)]
struct PatternEntry {
    /// Normalized pattern string — the comparison key for every tier.
    pattern: String,
    /// Significant words of the pattern (location words kept).
    words: Vec<String>,
    category_id: CategoryId,
    match_count: i64,
}

/// One pattern store (user-scoped or global) snapshotted into memory.
///
/// Built once per batch from a bulk fetch, then consulted per transaction
/// through the ordered cascade: exact → word-based → fuzzy. Entries are held
/// in a documented total order — match count descending, then pattern string
/// ascending — so fuzzy ties resolve the same way on every run.
#[derive(Debug, Clone, Default)]
pub struct PatternIndex {
    entries: Vec<PatternEntry>,
    /// Exact tier: normalized pattern → index into `entries`.
    by_pattern: HashMap<String, usize>,
    /// Word tier visits patterns most-specific-first: more significant words,
    /// then longer pattern string.
    word_order: Vec<usize>,
}

impl PatternIndex {
    pub fn from_user_patterns(patterns: &[MerchantPattern]) -> Self {
        Self::build(
            patterns
                .iter()
                .map(|p| (p.name_pattern.as_str(), p.category_id, p.match_count)),
        )
    }

    pub fn from_global_patterns(patterns: &[GlobalMerchantPattern]) -> Self {
        Self::build(
            patterns
                .iter()
                .map(|p| (p.name_pattern.as_str(), p.category_id, 0)),
        )
    }

    fn build<'a>(raw: impl Iterator<Item = (&'a str, CategoryId, i64)>) -> Self {
        let mut entries: Vec<PatternEntry> = raw
            .filter_map(|(pattern, category_id, match_count)| {
                let pattern = normalize(pattern);
                if pattern.chars().count() < 2 {
                    return None;
                }
                let words = significant_words(&pattern, false);
                Some(PatternEntry { pattern, words, category_id, match_count })
            })
            .collect();

        // Tie order for the fuzzy tier; also decides which row wins when two
        // rows normalize to the same pattern.
        entries.sort_by(|a, b| {
            b.match_count
                .cmp(&a.match_count)
                .then_with(|| a.pattern.cmp(&b.pattern))
        });

        let mut by_pattern = HashMap::with_capacity(entries.len());
        for (idx, entry) in entries.iter().enumerate() {
            by_pattern.entry(entry.pattern.clone()).or_insert(idx);
        }

        let mut word_order: Vec<usize> = (0..entries.len()).collect();
        word_order.sort_by(|&a, &b| {
            let (ea, eb) = (&entries[a], &entries[b]);
            eb.words
                .len()
                .cmp(&ea.words.len())
                .then_with(|| eb.pattern.chars().count().cmp(&ea.pattern.chars().count()))
                .then_with(|| ea.pattern.cmp(&eb.pattern))
        });

        PatternIndex { entries, by_pattern, word_order }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves a transaction against this store: exact merchant-name match,
    /// then word overlap against the full description, then fuzzy similarity.
    /// Each tier short-circuits. Inputs may be raw; they are normalized here.
    pub fn lookup(&self, description: &str, merchant_name: &str) -> Option<CategoryId> {
        let merchant = normalize(merchant_name);

        // Tier 1: exact.
        if let Some(&idx) = self.by_pattern.get(&merchant) {
            return Some(self.entries[idx].category_id);
        }

        // Tier 2: word overlap, recall booster for superset/subset wordings
        // ("amazon eu" stored vs "amazon eu sarl" on the statement).
        let desc_norm = normalize(description);
        let desc_words = significant_words(&desc_norm, true);
        if !desc_words.is_empty() {
            if let Some(id) = self.lookup_by_words(&desc_norm, &desc_words) {
                return Some(id);
            }
        }

        // Tier 3: fuzzy. Score each pattern against both the merchant name
        // and the full description, keep the better of the two.
        let mut best: Option<(f32, usize)> = None;
        for (idx, entry) in self.entries.iter().enumerate() {
            let score = similarity(&merchant, &entry.pattern)
                .max(similarity(&desc_norm, &entry.pattern));
            // Strict inequality keeps the earliest entry in tie order.
            if best.map_or(true, |(best_score, _)| score > best_score) {
                best = Some((score, idx));
            }
        }

        match best {
            Some((score, idx)) if score >= FUZZY_ACCEPT_THRESHOLD => {
                Some(self.entries[idx].category_id)
            }
            _ => None,
        }
    }

    fn lookup_by_words(&self, desc_norm: &str, desc_words: &[String]) -> Option<CategoryId> {
        for &idx in &self.word_order {
            let entry = &self.entries[idx];

            // Multi-word pattern contained verbatim in the description.
            if desc_norm.contains(&entry.pattern) {
                return Some(entry.category_id);
            }

            // A pattern word of 4+ characters matching a description word
            // exactly or by substantial substring ("yandex" vs "yandexgo").
            for pattern_word in &entry.words {
                if pattern_word.chars().count() < 4 {
                    continue;
                }
                if desc_words.iter().any(|dw| dw == pattern_word) {
                    return Some(entry.category_id);
                }
                if desc_words.iter().any(|dw| {
                    dw.chars().count() >= 4
                        && (dw.contains(pattern_word.as_str()) || pattern_word.contains(dw.as_str()))
                }) {
                    return Some(entry.category_id);
                }
            }

            // Multi-word pattern whose non-location words all appear in the
            // description ("tbilisi metro" when "tbilisi" was filtered out).
            if entry.words.len() > 1 {
                let core_words: Vec<&String> = entry
                    .words
                    .iter()
                    .filter(|w| !LOCATION_WORDS.contains(&w.as_str()))
                    .collect();
                if !core_words.is_empty() && core_words.iter().all(|w| desc_norm.contains(w.as_str()))
                {
                    return Some(entry.category_id);
                }
            }

            // Short description contained in a longer stored pattern.
            if entry.pattern.contains(desc_norm) {
                return Some(entry.category_id);
            }
        }

        None
    }
}

/// Words likely to carry merchant identity: at least three characters, not
/// purely numeric, not a transaction stop word. Location words are filtered
/// from descriptions only — in stored patterns they are part of the name.
pub(crate) fn significant_words(normalized: &str, filter_locations: bool) -> Vec<String> {
    normalized
        .split_whitespace()
        .filter(|w| w.chars().count() >= 3)
        .filter(|w| !w.chars().all(|c| c.is_ascii_digit()))
        .filter(|w| !STOP_WORDS.contains(w))
        .filter(|w| !(filter_locations && LOCATION_WORDS.contains(w)))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tally_core::UserId;

    fn user_pattern(pattern: &str, category: i64, count: i64) -> MerchantPattern {
        MerchantPattern {
            user_id: UserId(1),
            name_pattern: pattern.to_string(),
            category_id: CategoryId(category),
            match_count: count,
            updated_at: Utc::now(),
        }
    }

    fn global(pattern: &str, category: i64) -> GlobalMerchantPattern {
        GlobalMerchantPattern {
            name_pattern: pattern.to_string(),
            category_id: CategoryId(category),
        }
    }

    #[test]
    fn exact_tier_matches_normalized_merchant() {
        let index = PatternIndex::from_user_patterns(&[user_pattern("starbucks", 7, 3)]);
        assert_eq!(
            index.lookup("STARBUCKS 4512", "STARBUCKS"),
            Some(CategoryId(7))
        );
    }

    #[test]
    fn word_tier_matches_superset_wording() {
        // Stored "AMAZON EU" vs statement "AMAZON EU SARL".
        let index = PatternIndex::from_global_patterns(&[global("AMAZON EU", 3)]);
        assert_eq!(
            index.lookup("AMAZON EU SARL", "AMAZON EU SARL"),
            Some(CategoryId(3))
        );
    }

    #[test]
    fn word_tier_matches_subset_wording() {
        // Stored pattern is longer than the statement text.
        let index = PatternIndex::from_global_patterns(&[global("yandex go taxi", 5)]);
        assert_eq!(index.lookup("YANDEX GO", "YANDEX GO"), Some(CategoryId(5)));
    }

    #[test]
    fn word_tier_single_base_word() {
        let index = PatternIndex::from_user_patterns(&[user_pattern("yandex", 5, 1)]);
        assert_eq!(
            index.lookup("Vip Pay*YANDEX.GO 4.50", "YANDEX GO"),
            Some(CategoryId(5))
        );
    }

    #[test]
    fn word_tier_ignores_stop_words() {
        let index = PatternIndex::from_global_patterns(&[global("wolt", 7)]);
        // "payment" and "card" are stop words; only "wolt" can match.
        assert_eq!(
            index.lookup("Card payment - WOLT", "WOLT"),
            Some(CategoryId(7))
        );
        assert_eq!(index.lookup("Card payment", "payments"), None);
    }

    #[test]
    fn fuzzy_tier_accepts_close_spellings() {
        let index = PatternIndex::from_user_patterns(&[user_pattern("carrefour", 2, 1)]);
        // One dropped letter out of nine: similarity ≈ 0.89.
        assert_eq!(index.lookup("carefour", "carefour"), Some(CategoryId(2)));
    }

    #[test]
    fn fuzzy_tier_rejects_unrelated_merchants() {
        let index = PatternIndex::from_user_patterns(&[user_pattern("carrefour", 2, 1)]);
        assert_eq!(index.lookup("gym membership", "gym membership"), None);
    }

    #[test]
    fn fuzzy_tie_prefers_higher_match_count() {
        // Both patterns are one substitution away from the probe.
        let index = PatternIndex::from_user_patterns(&[
            user_pattern("glovva", 1, 1),
            user_pattern("glovvb", 2, 9),
        ]);
        assert_eq!(index.lookup("glovvx", "glovvx"), Some(CategoryId(2)));
    }

    #[test]
    fn fuzzy_tie_without_counts_is_deterministic() {
        let index =
            PatternIndex::from_global_patterns(&[global("glovvb", 4), global("glovva", 3)]);
        // Equal scores and counts: lexicographically smaller pattern wins,
        // regardless of insertion order.
        assert_eq!(index.lookup("glovvx", "glovvx"), Some(CategoryId(3)));

        let reversed =
            PatternIndex::from_global_patterns(&[global("glovva", 3), global("glovvb", 4)]);
        assert_eq!(reversed.lookup("glovvx", "glovvx"), Some(CategoryId(3)));
    }

    #[test]
    fn degenerate_patterns_are_dropped_at_build() {
        let index = PatternIndex::from_global_patterns(&[global("!", 1), global("9811", 2)]);
        assert!(index.is_empty());
    }

    #[test]
    fn lookup_is_idempotent() {
        let index = PatternIndex::from_user_patterns(&[user_pattern("starbucks", 7, 1)]);
        let first = index.lookup("STARBUCKS COFFEE", "STARBUCKS COFFEE");
        let second = index.lookup("STARBUCKS COFFEE", "STARBUCKS COFFEE");
        assert_eq!(first, second);
    }
}
