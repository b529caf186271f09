use serde::{Deserialize, Serialize};

/// One statement line as produced by an import feed (bank export, PDF
/// extraction). The engine annotates these records; it owns none of the
/// surrounding transaction fields (date, currency, ownership).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementTransaction {
    pub description: String,
    /// English rendition of `description` when the feed provides one.
    /// Matching runs in the system's working language, so this is preferred.
    #[serde(default)]
    pub translated_description: Option<String>,
    /// Signed amount in minor units. Non-negative means income.
    pub amount_cents: i64,
    /// Coarse category label attached by an upstream pre-classifier, if any.
    /// Used only as a last-resort fallback.
    #[serde(default)]
    pub suggested_category: Option<String>,
}

impl StatementTransaction {
    pub fn new(description: &str, amount_cents: i64) -> Self {
        StatementTransaction {
            description: description.to_string(),
            translated_description: None,
            amount_cents,
            suggested_category: None,
        }
    }

    pub fn is_income(&self) -> bool {
        self.amount_cents >= 0
    }

    /// Text to match against: the translated description when present and
    /// non-empty, else the raw one.
    pub fn matching_text(&self) -> &str {
        match self.translated_description.as_deref() {
            Some(t) if !t.trim().is_empty() => t,
            _ => &self.description,
        }
    }
}

/// The engine's annotated view of one input transaction. `category` holds
/// a resolved category *name*; `None` means uncategorized, which is a valid
/// terminal outcome and stays user-editable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorizedTransaction {
    pub transaction: StatementTransaction,
    pub category: Option<String>,
}
