//! Public facade crate for `websift`.
//!
//! This crate intentionally contains no IO or provider-specific logic.
//! It re-exports the backend-agnostic types/traits from `websift-core`.

pub use websift_core::*;
