pub mod db;
pub mod workflow;

pub use db::{
    create_db, get_categories, get_global_patterns, get_user_patterns, insert_global_pattern,
    learn_merchant_pattern, seed_default_categories, DbPool, StoreError,
};
pub use workflow::ImportWorkflow;
