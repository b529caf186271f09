use tally_core::{
    CategorizedTransaction, CategoryDirectory, GlobalMerchantPattern, MerchantPattern,
    StatementTransaction,
};

use crate::extract::extract_merchant;
use crate::special::detect_special_type;
use crate::store::PatternIndex;
use crate::synonyms::SynonymTable;

/// The matching cascade, as an explicit ordered strategy list. The first
/// stage to produce a decision wins; a transaction that falls through every
/// stage is uncategorized.
pub const CASCADE: [Stage; 5] = [
    Stage::SpecialType,
    Stage::IncomeSkip,
    Stage::UserPatterns,
    Stage::GlobalPatterns,
    Stage::UpstreamSuggestion,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    SpecialType,
    IncomeSkip,
    UserPatterns,
    GlobalPatterns,
    UpstreamSuggestion,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::SpecialType => write!(f, "special_type"),
            Stage::IncomeSkip => write!(f, "income_skip"),
            Stage::UserPatterns => write!(f, "user_patterns"),
            Stage::GlobalPatterns => write!(f, "global_patterns"),
            Stage::UpstreamSuggestion => write!(f, "upstream_suggestion"),
        }
    }
}

/// What a single cascade stage decided for one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    /// Assign this category name and stop.
    Assign(String),
    /// Stop with no category. Used by special types and the income skip.
    LeaveUncategorized,
    /// No signal; evaluate the next stage.
    Continue,
}

/// Matches a batch of statement transactions against the loaded knowledge
/// bases. All state is an immutable snapshot taken at construction — the
/// pattern stores are bulk-fetched once per batch, never per transaction —
/// so categorization is pure and re-running a batch yields identical output.
pub struct Categorizer {
    directory: CategoryDirectory,
    user_patterns: PatternIndex,
    global_patterns: PatternIndex,
    synonyms: SynonymTable,
}

impl Categorizer {
    pub fn new(
        directory: CategoryDirectory,
        user_patterns: &[MerchantPattern],
        global_patterns: &[GlobalMerchantPattern],
        synonyms: SynonymTable,
    ) -> Self {
        Categorizer {
            directory,
            user_patterns: PatternIndex::from_user_patterns(user_patterns),
            global_patterns: PatternIndex::from_global_patterns(global_patterns),
            synonyms,
        }
    }

    /// One category decision: a known category name, or `None` for
    /// uncategorized. Never panics on malformed input — an empty
    /// description simply degrades to uncategorized.
    pub fn categorize(&self, tx: &StatementTransaction) -> Option<String> {
        if tx.matching_text().trim().is_empty() {
            return None;
        }

        for stage in CASCADE {
            match self.run_stage(stage, tx) {
                StageOutcome::Assign(name) => {
                    tracing::debug!(stage = %stage, category = %name, "transaction matched");
                    return Some(name);
                }
                StageOutcome::LeaveUncategorized => {
                    tracing::debug!(stage = %stage, "transaction left uncategorized");
                    return None;
                }
                StageOutcome::Continue => {}
            }
        }

        None
    }

    /// Annotates every transaction in order. Output is always 1:1 with the
    /// input — no transaction is ever dropped.
    pub fn categorize_batch(&self, txs: &[StatementTransaction]) -> Vec<CategorizedTransaction> {
        txs.iter()
            .map(|tx| CategorizedTransaction {
                transaction: tx.clone(),
                category: self.categorize(tx),
            })
            .collect()
    }

    /// Evaluates a single cascade stage. Public so each strategy can be
    /// tested in isolation.
    pub fn run_stage(&self, stage: Stage, tx: &StatementTransaction) -> StageOutcome {
        let text = tx.matching_text();

        match stage {
            Stage::SpecialType => match detect_special_type(text) {
                Some(special) => match special.forced_category() {
                    Some(name) => match self.directory.find_by_name(name) {
                        Some(cat) => StageOutcome::Assign(cat.name.clone()),
                        None => {
                            tracing::warn!(
                                special = %special,
                                category = name,
                                "forced category missing from directory"
                            );
                            StageOutcome::LeaveUncategorized
                        }
                    },
                    // Money movement: stays in the batch, stays uncategorized.
                    None => StageOutcome::LeaveUncategorized,
                },
                None => StageOutcome::Continue,
            },

            // Income is never auto-categorized by merchant matching.
            Stage::IncomeSkip => {
                if tx.is_income() {
                    StageOutcome::LeaveUncategorized
                } else {
                    StageOutcome::Continue
                }
            }

            Stage::UserPatterns => self.lookup_patterns(&self.user_patterns, tx),
            Stage::GlobalPatterns => self.lookup_patterns(&self.global_patterns, tx),

            Stage::UpstreamSuggestion => {
                let Some(label) = tx.suggested_category.as_deref() else {
                    return StageOutcome::Continue;
                };
                match self
                    .synonyms
                    .resolve(label)
                    .and_then(|name| self.directory.find_by_name(name))
                {
                    Some(cat) => StageOutcome::Assign(cat.name.clone()),
                    None => StageOutcome::Continue,
                }
            }
        }
    }

    fn lookup_patterns(&self, index: &PatternIndex, tx: &StatementTransaction) -> StageOutcome {
        let text = tx.matching_text();
        let merchant = extract_merchant(text);

        match index.lookup(text, &merchant) {
            Some(category_id) => match self.directory.name_of(category_id) {
                Some(name) => StageOutcome::Assign(name.to_string()),
                None => {
                    // Stale pattern row pointing at a deleted category.
                    tracing::warn!(%category_id, "pattern matched unknown category id");
                    StageOutcome::Continue
                }
            },
            None => StageOutcome::Continue,
        }
    }
}
