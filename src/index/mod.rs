//! Similarity index over embedded place names.
//!
//! # Architecture
//!
//! - [`Embedder`] - Text encoder (see [`backends`])
//! - [`VectorSearch`] - Exact nearest-neighbor store, [`FlatIndex`] by default
//! - [`SimilarityIndex`] - Pairs the two with entity keys for the engine
//!
//! # Usage
//!
//! ```ignore
//! let mut index = SimilarityIndex::flat(embedder);
//! index.insert(&place, &place.name)?;
//!
//! let result = index.query(&candidate)?;
//! if result.distance < threshold { /* same place as result.key */ }
//! ```

mod flat;
mod metric;
mod similarity;
mod traits;

pub mod backends;

pub use flat::FlatIndex;
pub use metric::DistanceMetric;
pub use similarity::{QueryResult, SimilarityIndex, NO_MATCH_DISTANCE};
pub use traits::{Embedder, Neighbor, VectorSearch};
