pub mod category;
pub mod merchant;
pub mod transaction;

pub use category::{Category, CategoryDirectory, CategoryId, CATEGORY_COLORS, DEFAULT_CATEGORIES};
pub use merchant::{GlobalMerchantPattern, MerchantPattern, UserId};
pub use transaction::{CategorizedTransaction, StatementTransaction};
