use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::category::CategoryId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A learned (user, normalized pattern) → category association.
///
/// Modeled as a versioned record rather than implicit in-place state:
/// `match_count` counts reinforcing corrections and `updated_at` marks the
/// last write, so concurrent corrections stay auditable. (user_id,
/// name_pattern) is unique — a second correction for the same pattern
/// updates this record instead of creating a duplicate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerchantPattern {
    pub user_id: UserId,
    /// Normalized pattern string, the comparison key for all matching tiers.
    pub name_pattern: String,
    pub category_id: CategoryId,
    pub match_count: i64,
    pub updated_at: DateTime<Utc>,
}

/// A curated pattern shared across all users. Maintained out-of-band;
/// read-only from the engine's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalMerchantPattern {
    pub name_pattern: String,
    pub category_id: CategoryId,
}
