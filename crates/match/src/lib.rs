//! Merchant matching for bank-statement categorization.
//!
//! Turns raw statement descriptions into category decisions: text
//! normalization, merchant extraction, special-transaction detection,
//! pattern stores with an exact/word/fuzzy lookup cascade, and the
//! stage-ordered [`Categorizer`] that ties them together.

pub mod engine;
pub mod extract;
pub mod learn;
pub mod normalize;
pub mod similarity;
pub mod special;
pub mod store;
pub mod synonyms;

pub use engine::{Categorizer, Stage, StageOutcome, CASCADE};
pub use extract::extract_merchant;
pub use learn::learn_key;
pub use normalize::normalize;
pub use similarity::{similarity, FUZZY_ACCEPT_THRESHOLD};
pub use special::{detect_special_type, SpecialTransactionType};
pub use store::PatternIndex;
pub use synonyms::{SynonymError, SynonymTable, BUILTIN_SYNONYMS_VERSION};
