//! Entry points. Opens a file or stream, reads the header and ROOT through
//! the layout's strategy, builds the model, then reads and filters states.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::{debug, info, warn};

use super::archive::{Archive, ChunkStatus};
use super::format::{self, tags::v1, tags::v2};
use super::model::Model;
use super::state::StatePolicy;
use super::types::error::{LoadError, Result, ResultExt, XpltError};

/// Options for [`load`] and [`load_from_reader`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Which states to keep. Defaults to all of them.
    pub states: StatePolicy,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_states(mut self, states: StatePolicy) -> Self {
        self.states = states;
        self
    }
}

/// Loads an XPLT file from a path.
///
/// # Errors
/// Returns a [`LoadError`] listing the failure and the sections being read
/// when it happened if:
/// - the file cannot be opened or is not an XPLT file
/// - the version is unsupported
/// - any section is malformed
pub fn load(path: impl AsRef<Path>, options: &LoadOptions) -> std::result::Result<Model, LoadError> {
    let path = path.as_ref();
    info!("Opening XPLT file: {}", path.display());
    let file = File::open(path)
        .map_err(XpltError::from)
        .with_context(|| format!("Opening {}", path.display()))?;
    load_from_reader(BufReader::new(file), options)
}

/// Loads an XPLT file from any byte stream.
pub fn load_from_reader<R: Read>(reader: R, options: &LoadOptions) -> std::result::Result<Model, LoadError> {
    read_model(reader, options).map_err(LoadError::from)
}

fn read_model<R: Read>(reader: R, options: &LoadOptions) -> Result<Model> {
    let mut ar = Archive::open(reader)?;

    expect_chunk(&mut ar, v1::ROOT, "root")?;
    expect_chunk(&mut ar, v1::HEADER, "header")?;
    let header = format::header::parse(&mut ar).context("Reading header")?;
    ar.close_chunk()?;

    let mut strategy = format::strategy_for::<R>(&header);
    let sections = strategy.read_root(&mut ar)?;
    ar.close_chunk()?;

    let geometry = match sections.geometry {
        Some(geometry) => geometry,
        None => {
            expect_chunk(&mut ar, v2::MESH, "mesh")?;
            let geometry = strategy.read_mesh(&mut ar).context("Reading mesh")?;
            ar.close_chunk()?;
            geometry
        }
    };

    let compression = header.compression;
    let mut model = Model::build(header, sections.dictionary, geometry, strategy.face_resolution())
        .context("Building mesh")?;

    ar.set_compression(compression);
    let mut index = 0;
    while ar.open_chunk()? == ChunkStatus::Open {
        match ar.chunk_id()? {
            v1::STATE => {
                let state = strategy
                    .read_state(&mut ar, &model)
                    .with_context(|| format!("Reading state {}", index + 1))?;
                debug!("State {}: t = {}", index + 1, state.time);
                options.states.retain(model.states_mut(), index, state);
                index += 1;
            }
            tag => warn!("Skipping top-level chunk {:#010x}", tag),
        }
        ar.close_chunk()?;
    }

    info!(
        "XPLT file loaded: {} states read, {} kept, {} unresolved faces",
        index,
        model.state_count(),
        model.unresolved_faces
    );
    Ok(model)
}

/// Opens the next chunk and requires it to be `expected`.
fn expect_chunk<R: Read>(ar: &mut Archive<R>, expected: u32, what: &str) -> Result<()> {
    match ar.open_chunk()? {
        ChunkStatus::Open => {
            let found = ar.chunk_id()?;
            if found != expected {
                return Err(XpltError::UnexpectedChunk { expected, found });
            }
            Ok(())
        }
        ChunkStatus::End => Err(XpltError::InvalidFormat(format!("File has no {} section", what))),
    }
}
