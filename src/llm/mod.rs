//! Semantic tag-merge oracle.
//!
//! Only constructed when `merger.use_llm` is enabled; otherwise tags are merged
//! as a plain set union and no HTTP client exists.

mod client;
mod error;

pub use client::{LlmTagMerger, TagMerger};
pub use error::{TagMergeError, TagMergeErrorKind};
