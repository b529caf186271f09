use tally_core::{CategorizedTransaction, CategoryDirectory, CategoryId, StatementTransaction, UserId};
use tally_match::{Categorizer, SynonymTable};

use crate::db::{
    self, get_categories, get_global_patterns, get_user_patterns, DbPool, StoreError,
};

/// Per-batch categorization against the database. Knowledge bases are
/// loaded in bulk once per batch; a load failure fails the whole batch
/// rather than silently categorizing against partial data.
pub struct ImportWorkflow {
    pool: DbPool,
    synonyms: SynonymTable,
}

impl ImportWorkflow {
    pub fn new(pool: DbPool) -> Self {
        ImportWorkflow {
            pool,
            synonyms: SynonymTable::builtin(),
        }
    }

    /// Replaces the built-in upstream label table, e.g. with one loaded
    /// from a config file.
    pub fn with_synonyms(mut self, synonyms: SynonymTable) -> Self {
        self.synonyms = synonyms;
        self
    }

    /// Categorizes a statement batch for one user. Output is 1:1 with the
    /// input, uncategorized lines included.
    pub async fn categorize_batch(
        &self,
        user: UserId,
        transactions: &[StatementTransaction],
    ) -> Result<Vec<CategorizedTransaction>, StoreError> {
        let directory = CategoryDirectory::new(get_categories(&self.pool).await?);
        let user_patterns = get_user_patterns(&self.pool, user).await?;
        let global_patterns = get_global_patterns(&self.pool).await?;

        tracing::debug!(
            user = %user,
            transactions = transactions.len(),
            user_patterns = user_patterns.len(),
            global_patterns = global_patterns.len(),
            "categorizing batch"
        );

        let categorizer = Categorizer::new(
            directory,
            &user_patterns,
            &global_patterns,
            self.synonyms.clone(),
        );
        Ok(categorizer.categorize_batch(transactions))
    }

    /// Applies a manual correction and learns from it. The correction
    /// itself is the caller's state; a learning failure is logged and
    /// swallowed so it never blocks the user's edit.
    pub async fn record_correction(
        &self,
        user: UserId,
        description: &str,
        category_id: CategoryId,
    ) {
        match db::learn_merchant_pattern(&self.pool, user, description, category_id).await {
            Ok(Some(pattern)) => {
                tracing::debug!(user = %user, pattern = %pattern.name_pattern, "correction learned");
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(user = %user, error = %err, "failed to learn from correction");
            }
        }
    }
}
