//! Embedding backends.
//!
//! Each backend implements [`Embedder`](crate::index::Embedder).
//!
//! # Available Backends
//!
//! | Backend | Module | Feature |
//! |---------|--------|---------|
//! | fastembed (ONNX, local) | [`fastembed`] | `fastembed` (default) |

#[cfg(feature = "fastembed")]
pub mod fastembed;
