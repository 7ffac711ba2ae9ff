//! Entity resolution: merge rules and the engine that applies them.

mod merger;
pub mod policy;

pub use merger::{BatchReport, Merger, Resolution, TagMergeFailure};
pub use policy::{merge_list_unique, merge_rating, TagOracle};
