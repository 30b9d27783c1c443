//! Field registry and typed per-state storage.
//!
//! - [`manager`]: name / index / declaration registry, derived fields
//! - [`container`]: typed containers, one per storage format

pub mod container;
pub mod manager;
