pub mod types;
pub mod scoring;
pub mod penalty;
pub mod builder;
pub mod preseed;
pub mod reconcile;
pub mod engine;
pub mod edit;

pub use types::{Draft, Group, HistoryRecord, RuleBucket};
pub use penalty::PenaltyTable;
pub use engine::generate_draft;
pub use edit::move_participant;
pub use scoring::DEFAULT_GROUP_SIZE;
