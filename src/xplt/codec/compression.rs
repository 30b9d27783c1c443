//! Decompression of XPLT chunk payloads.
//!
//! XPLT files support two settings for state sections:
//! - None (flag 0): payload stored as is
//! - Zlib (flag 1): each top-level state chunk payload is a zlib stream

use std::io::Read;

use flate2::read::ZlibDecoder;
use log::trace;

use crate::xplt::types::error::{Result, XpltError};
use crate::xplt::types::models::Compression;

/// Decompresses a payload into an output buffer.
///
/// The inflated size is not stored in the file, so the output grows to
/// whatever the stream produces. The buffer is cleared first.
///
/// # Errors
/// Returns an error if the zlib stream is corrupted or truncated.
pub fn decompress_payload_into(
    output: &mut Vec<u8>,
    payload: &[u8],
    compression: Compression,
) -> Result<()> {
    output.clear();

    match compression {
        Compression::None => {
            trace!("No compression, copying {} bytes", payload.len());
            output.extend_from_slice(payload);
        }
        Compression::Zlib => {
            let mut decoder = ZlibDecoder::new(payload);
            decoder.read_to_end(output).map_err(|e| {
                XpltError::DecompressionError(format!("Zlib decompression failed: {}", e))
            })?;
            trace!(
                "Decompressed with Zlib: {} bytes -> {} bytes",
                payload.len(),
                output.len()
            );
        }
    };

    Ok(())
}
