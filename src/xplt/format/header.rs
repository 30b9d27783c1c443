//! XPLT file header parsing.
//!
//! # Header Structure
//! ```text
//! HEADER (0x01010000)
//! ├── HDR_VERSION          u32   (all versions)
//! ├── HDR_NODES            u32   (legacy)
//! ├── HDR_MAX_FACET_NODES  u32   (legacy)
//! ├── HDR_COMPRESSION      u32   (all versions)
//! ├── HDR_AUTHOR           str   (2.0)
//! └── HDR_SOFTWARE         str   (2.0)
//! ```
//!
//! The header is read before the layout epoch is known, so every tag from
//! either epoch is accepted here. Any other tag is fatal.

use std::io::Read;

use log::{debug, info, trace};

use super::tags::{v1, v2, MAX_STRING};
use crate::xplt::archive::{Archive, ChunkStatus};
use crate::xplt::types::{
    error::{Result, XpltError},
    models::{Compression, FormatEpoch, Header},
};

/// Parses the children of an open HEADER chunk.
///
/// # Errors
/// - unknown tag
/// - missing version tag
/// - version 0 or an unknown compression flag
pub fn parse<R: Read>(ar: &mut Archive<R>) -> Result<Header> {
    info!("Parsing XPLT header");

    let mut version = None;
    let mut compression = Compression::None;
    let mut node_count = None;
    let mut max_facet_nodes = None;
    let mut author = None;
    let mut software = None;

    while ar.open_chunk()? == ChunkStatus::Open {
        let id = ar.chunk_id()?;
        trace!("Header tag {:#010x}", id);
        match id {
            v1::HDR_VERSION => version = Some(ar.read_u32()?),
            v1::HDR_NODES => node_count = Some(ar.read_u32()?),
            v1::HDR_MAX_FACET_NODES => max_facet_nodes = Some(ar.read_u32()?),
            v1::HDR_COMPRESSION => compression = Compression::try_from(ar.read_u32()?)?,
            v2::HDR_AUTHOR => author = Some(ar.read_string(MAX_STRING)?),
            v2::HDR_SOFTWARE => software = Some(ar.read_string(MAX_STRING)?),
            tag => return Err(XpltError::UnknownTag { section: "header", tag }),
        }
        ar.close_chunk()?;
    }

    let version = version.ok_or_else(|| XpltError::InvalidFormat("Header has no version tag".to_string()))?;
    let epoch = FormatEpoch::try_from(version)?;
    debug!("XPLT version {:#06x} (parsed as {:?})", version, epoch);

    info!(
        "Header parsed successfully: version={:#06x}, layout={}, compression={:?}",
        version, epoch, compression
    );

    Ok(Header {
        version,
        epoch,
        compression,
        node_count,
        max_facet_nodes,
        author,
        software,
    })
}
