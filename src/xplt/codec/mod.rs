//! Codec layer for compressed chunk payloads.
//!
//! # Submodules
//!
//! - [`compression`][]: Decompression of state chunks (zlib/deflate)

pub mod compression;
