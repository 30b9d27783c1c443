//! Core XPLT reader module.
//!
//! - [`archive`]: chunk tree reader
//! - [`format`]: header, dispatcher and the two layout strategies
//! - [`data`]: field registry and typed containers
//! - [`mesh`]: nodes, elements, canonical faces and groupings
//! - [`model`] / [`state`]: the loaded result
//! - [`reader`]: entry points

pub mod archive;
pub mod codec;
pub mod data;
pub mod format;
pub mod mesh;
pub mod model;
pub mod reader;
pub mod state;
pub mod types;

pub use reader::{load, load_from_reader, LoadOptions};
