//! # Format Strategy Dispatcher
//!
//! The header decides which layout the rest of the file follows. Each layout
//! has its own [`FormatStrategy`] implementation that reads the dictionary,
//! mesh and states with its own tag table. [`common`] holds the id helpers
//! and the region writers both layouts feed state payloads into.

use std::io::Read;

use crate::xplt::archive::Archive;
use crate::xplt::model::{FaceResolution, Geometry, Model};
use crate::xplt::state::State;
use crate::xplt::types::error::Result;
use crate::xplt::types::models::{Dictionary, FormatEpoch, Header};

pub mod common;
pub mod header;
pub mod legacy;
pub mod tags;
pub mod v2;

pub use legacy::LegacyReader;
pub use v2::XpltReader2;

/// What a strategy reads from the ROOT chunk after the header.
#[derive(Debug, Clone, Default)]
pub struct RootSections {
    pub dictionary: Dictionary,
    /// `None` when the mesh is stored as its own top-level chunk.
    pub geometry: Option<Geometry>,
}

/// Layout-specific section readers.
pub trait FormatStrategy<R: Read> {
    fn epoch(&self) -> FormatEpoch;

    /// How surface faces without a matching mesh face are treated.
    fn face_resolution(&self) -> FaceResolution;

    /// Reads the remaining children of the open ROOT chunk.
    fn read_root(&mut self, ar: &mut Archive<R>) -> Result<RootSections>;

    /// Reads the children of an open mesh (or geometry) chunk.
    fn read_mesh(&mut self, ar: &mut Archive<R>) -> Result<Geometry>;

    /// Reads the children of an open STATE chunk.
    fn read_state(&mut self, ar: &mut Archive<R>, model: &Model) -> Result<State>;
}

/// Picks the reader for the layout named by the header.
pub fn strategy_for<'a, R: Read + 'a>(header: &Header) -> Box<dyn FormatStrategy<R> + 'a> {
    match header.epoch {
        FormatEpoch::Legacy => Box::new(LegacyReader::new(header)),
        FormatEpoch::V2 => Box::new(XpltReader2::new()),
    }
}
