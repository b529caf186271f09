use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

/// Version of the compiled-in table. Bump on any entry change: the table is
/// a compatibility surface between this engine and the upstream classifier.
pub const BUILTIN_SYNONYMS_VERSION: u32 = 2;

#[derive(Debug, Error)]
pub enum SynonymError {
    #[error("Failed to parse synonym table: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Synonym table has no entries")]
    Empty,
}

#[derive(Debug, Deserialize)]
struct SynonymFile {
    version: u32,
    labels: HashMap<String, String>,
}

/// Closed, enumerable mapping from upstream classifier labels to category
/// names. A label absent from the table is "no mapping" — the suggestion is
/// treated as no signal, never guessed at.
#[derive(Debug, Clone)]
pub struct SynonymTable {
    version: u32,
    entries: HashMap<String, String>,
}

impl SynonymTable {
    /// The compiled-in table covering the labels the statement pre-classifier
    /// is known to emit.
    pub fn builtin() -> Self {
        let entries = [
            ("groceries", "Groceries"),
            ("food", "Groceries"),
            ("restaurants", "Restaurants"),
            ("dining", "Restaurants"),
            ("transportation", "Transportation"),
            ("transport", "Transportation"),
            ("taxi", "Transportation"),
            ("rent", "Rent"),
            ("housing", "Rent"),
            ("entertainment", "Entertainment"),
            ("fitness", "Fitness"),
            ("clothes", "Clothes"),
            ("clothing", "Clothes"),
            ("technology", "Technology"),
            ("tech", "Technology"),
            ("furniture", "Furniture"),
            ("gifts", "Gifts"),
            ("fees", "Other"),
            ("commission", "Other"),
            ("utilities", "Other"),
            ("other", "Other"),
        ];

        SynonymTable {
            version: BUILTIN_SYNONYMS_VERSION,
            entries: entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Loads a replacement table from TOML:
    ///
    /// ```toml
    /// version = 3
    ///
    /// [labels]
    /// transport = "Transportation"
    /// utilities = "Other"
    /// ```
    pub fn from_toml(text: &str) -> Result<Self, SynonymError> {
        let file: SynonymFile = toml::from_str(text)?;
        if file.labels.is_empty() {
            return Err(SynonymError::Empty);
        }
        Ok(SynonymTable {
            version: file.version,
            entries: file
                .labels
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v))
                .collect(),
        })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Category name for an upstream label, or `None` when the label has no
    /// mapping. Lookup is case-insensitive; surrounding whitespace ignored.
    pub fn resolve(&self, label: &str) -> Option<&str> {
        self.entries
            .get(&label.trim().to_lowercase())
            .map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for SynonymTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_resolves_classifier_labels() {
        let table = SynonymTable::builtin();
        assert_eq!(table.resolve("transport"), Some("Transportation"));
        assert_eq!(table.resolve("utilities"), Some("Other"));
        assert_eq!(table.resolve("Groceries"), Some("Groceries"));
    }

    #[test]
    fn resolve_is_case_insensitive_and_trims() {
        let table = SynonymTable::builtin();
        assert_eq!(table.resolve("  TAXI  "), Some("Transportation"));
    }

    #[test]
    fn unknown_label_has_no_mapping() {
        let table = SynonymTable::builtin();
        assert_eq!(table.resolve("currency exchange"), None);
        assert_eq!(table.resolve("cryptocurrency"), None);
        assert_eq!(table.resolve(""), None);
    }

    #[test]
    fn loads_from_toml() {
        let table = SynonymTable::from_toml(
            r#"
version = 3

[labels]
transport = "Transportation"
SUBSCRIPTIONS = "Entertainment"
"#,
        )
        .unwrap();
        assert_eq!(table.version(), 3);
        assert_eq!(table.resolve("subscriptions"), Some("Entertainment"));
        assert_eq!(table.resolve("transport"), Some("Transportation"));
    }

    #[test]
    fn empty_table_is_rejected() {
        let err = SynonymTable::from_toml("version = 1\n[labels]\n").unwrap_err();
        assert!(matches!(err, SynonymError::Empty));
    }

    #[test]
    fn table_is_enumerable() {
        let table = SynonymTable::builtin();
        assert!(!table.is_empty());
        assert_eq!(table.entries().count(), table.len());
    }
}
