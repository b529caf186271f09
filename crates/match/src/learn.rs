use crate::extract::extract_merchant;
use crate::normalize::normalize;

/// Derives the pattern key stored when a user corrects a category. The key
/// goes through the same extraction and normalization as the matching side,
/// so a learned merchant is found again by the exact tier on the next batch.
///
/// Returns `None` when the description boils down to nothing worth storing
/// (fewer than two characters after normalization).
pub fn learn_key(description: &str) -> Option<String> {
    let key = normalize(&extract_merchant(description));
    if key.chars().count() < 2 {
        None
    } else {
        Some(key)
    }
}
