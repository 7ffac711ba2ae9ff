//! place-index - restaurant entity resolution
//!
//! Merges place records from several providers into one deduplicated set,
//! matching records by the embedding distance of their names.

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod index;
pub mod llm;
pub mod models;
pub mod providers;
pub mod services;
