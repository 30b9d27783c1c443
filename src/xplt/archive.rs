//! Chunked archive reader.
//!
//! An XPLT file is a tree of chunks:
//!
//! ```text
//! [4 bytes] file tag 0x00464542 ("FEB\0")
//! chunk := [4 bytes] id   (little-endian u32)
//!          [4 bytes] size (little-endian u32)
//!          [size bytes] payload: raw values or nested chunks
//! ```
//!
//! A level of nesting ends when its parent's payload is used up, when the
//! reserved [`CHUNK_END`] tag is met, or (at top level) at end of file.
//!
//! Each top-level chunk is read into memory in one piece, inflated if
//! compression is on, and nested chunks are bounds-checked cursors into that
//! buffer. Closing a chunk therefore skips whatever its reader left unread.

use std::io::{ErrorKind, Read};

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use log::trace;

use super::codec::compression;
use super::types::error::{Result, XpltError};
use super::types::models::{Compression, ValueType};
use super::types::value::Value;

/// File tag at the start of every XPLT file.
pub const FEBIO_TAG: u32 = 0x0046_4542;

/// Reserved tag that terminates a level of nesting.
pub const CHUNK_END: u32 = 0xFFFF_FFFF;

/// Outcome of [`Archive::open_chunk`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkStatus {
    Open,
    /// No more children at this level.
    End,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    id: u32,
    /// Read cursor into the top-level buffer.
    pos: usize,
    /// One past the last payload byte.
    end: usize,
}

/// Reader over a chunked XPLT byte stream.
#[derive(Debug)]
pub struct Archive<R> {
    stream: R,
    compression: Compression,
    /// Payload of the open top-level chunk.
    buffer: Vec<u8>,
    scratch: Vec<u8>,
    frames: Vec<Frame>,
}

impl<R: Read> Archive<R> {
    /// Wraps a stream and checks the file tag.
    pub fn open(mut stream: R) -> Result<Self> {
        let tag = stream
            .read_u32::<LittleEndian>()
            .map_err(|e| match e.kind() {
                ErrorKind::UnexpectedEof => XpltError::ShortRead("file tag"),
                _ => XpltError::Io(e),
            })?;
        if tag != FEBIO_TAG {
            return Err(XpltError::NotXplt(tag));
        }
        Ok(Self {
            stream,
            compression: Compression::None,
            buffer: Vec::new(),
            scratch: Vec::new(),
            frames: Vec::new(),
        })
    }

    /// Sets how subsequent top-level chunk payloads are decoded.
    pub fn set_compression(&mut self, compression: Compression) {
        self.compression = compression;
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Nesting depth; 0 when no chunk is open.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Id of the innermost open chunk.
    pub fn chunk_id(&self) -> Result<u32> {
        self.frames
            .last()
            .map(|f| f.id)
            .ok_or_else(|| XpltError::NestingViolation("no chunk is open".to_string()))
    }

    /// Unread payload bytes of the innermost open chunk.
    pub fn remaining(&self) -> usize {
        self.frames.last().map_or(0, |f| f.end - f.pos)
    }

    /// Opens the next chunk at the current nesting level.
    pub fn open_chunk(&mut self) -> Result<ChunkStatus> {
        if self.frames.is_empty() {
            return self.open_top_level_chunk();
        }

        let parent = self.frames.len() - 1;
        let Frame { pos, end, .. } = self.frames[parent];
        if pos >= end {
            return Ok(ChunkStatus::End);
        }
        if end - pos < 4 {
            return Err(XpltError::ChunkOverrun {
                context: "chunk id",
                requested: 4,
                available: end - pos,
            });
        }
        let id = LittleEndian::read_u32(&self.buffer[pos..pos + 4]);
        if id == CHUNK_END {
            self.frames[parent].pos = pos + 4;
            return Ok(ChunkStatus::End);
        }
        if end - pos < 8 {
            return Err(XpltError::ChunkOverrun {
                context: "chunk size",
                requested: 8,
                available: end - pos,
            });
        }
        let size = LittleEndian::read_u32(&self.buffer[pos + 4..pos + 8]) as usize;
        let start = pos + 8;
        if size > end - start {
            return Err(XpltError::ChunkOverrun {
                context: "chunk payload",
                requested: size,
                available: end - start,
            });
        }

        // The parent cursor moves past the whole child now, so closing the
        // child never has to seek.
        self.frames[parent].pos = start + size;
        self.frames.push(Frame {
            id,
            pos: start,
            end: start + size,
        });
        trace!("Opened chunk {:#010x} ({} bytes, depth {})", id, size, self.frames.len());
        Ok(ChunkStatus::Open)
    }

    fn open_top_level_chunk(&mut self) -> Result<ChunkStatus> {
        let id = match read_tag(&mut self.stream)? {
            Some(id) => id,
            None => return Ok(ChunkStatus::End),
        };
        if id == CHUNK_END {
            return Ok(ChunkStatus::End);
        }
        let size = self.stream.read_u32::<LittleEndian>().map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => XpltError::ShortRead("chunk size"),
            _ => XpltError::Io(e),
        })? as usize;

        self.scratch.clear();
        self.scratch
            .try_reserve_exact(size)
            .map_err(|_| XpltError::Allocation(format!("a {} byte chunk buffer", size)))?;
        self.scratch.resize(size, 0);
        self.stream.read_exact(&mut self.scratch).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => XpltError::ShortRead("chunk payload"),
            _ => XpltError::Io(e),
        })?;

        match self.compression {
            Compression::None => std::mem::swap(&mut self.buffer, &mut self.scratch),
            Compression::Zlib => {
                compression::decompress_payload_into(&mut self.buffer, &self.scratch, self.compression)?
            }
        }

        self.frames.push(Frame {
            id,
            pos: 0,
            end: self.buffer.len(),
        });
        trace!(
            "Opened top-level chunk {:#010x} ({} bytes stored, {} bytes payload)",
            id,
            size,
            self.buffer.len()
        );
        Ok(ChunkStatus::Open)
    }

    /// Closes the innermost chunk, discarding anything left unread in it.
    pub fn close_chunk(&mut self) -> Result<()> {
        let frame = self
            .frames
            .pop()
            .ok_or_else(|| XpltError::NestingViolation("close without a matching open".to_string()))?;
        if frame.pos < frame.end {
            trace!("Skipping {} unread bytes of chunk {:#010x}", frame.end - frame.pos, frame.id);
        }
        Ok(())
    }

    fn take(&mut self, n: usize, context: &'static str) -> Result<&[u8]> {
        let frame = self
            .frames
            .last_mut()
            .ok_or_else(|| XpltError::NestingViolation(format!("reading {} outside of a chunk", context)))?;
        if n > frame.end - frame.pos {
            return Err(XpltError::ChunkOverrun {
                context,
                requested: n,
                available: frame.end - frame.pos,
            });
        }
        let start = frame.pos;
        frame.pos += n;
        Ok(&self.buffer[start..start + n])
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.take(4, "u32")?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(LittleEndian::read_i32(self.take(4, "i32")?))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(LittleEndian::read_f32(self.take(4, "f32")?))
    }

    pub fn read_u32_array(&mut self, out: &mut [u32]) -> Result<()> {
        let bytes = self.take(out.len() * 4, "u32 array")?;
        LittleEndian::read_u32_into(bytes, out);
        Ok(())
    }

    pub fn read_i32_array(&mut self, out: &mut [i32]) -> Result<()> {
        let bytes = self.take(out.len() * 4, "i32 array")?;
        LittleEndian::read_i32_into(bytes, out);
        Ok(())
    }

    pub fn read_f32_array(&mut self, out: &mut [f32]) -> Result<()> {
        let bytes = self.take(out.len() * 4, "f32 array")?;
        LittleEndian::read_f32_into(bytes, out);
        Ok(())
    }

    /// Reads every remaining payload byte of the chunk as `f32`s.
    pub fn read_f32_remaining(&mut self) -> Result<Vec<f32>> {
        let n = self.remaining();
        if n % 4 != 0 {
            return Err(XpltError::SizeMismatch {
                context: "f32 array".to_string(),
                expected: (n / 4 * 4) as u64,
                found: n as u64,
            });
        }
        let mut out = vec![0.0f32; n / 4];
        self.read_f32_array(&mut out)?;
        Ok(out)
    }

    /// Reads every remaining payload byte of the chunk as `i32`s.
    pub fn read_i32_remaining(&mut self) -> Result<Vec<i32>> {
        let n = self.remaining();
        if n % 4 != 0 {
            return Err(XpltError::SizeMismatch {
                context: "i32 array".to_string(),
                expected: (n / 4 * 4) as u64,
                found: n as u64,
            });
        }
        let mut out = vec![0i32; n / 4];
        self.read_i32_array(&mut out)?;
        Ok(out)
    }

    /// Reads a length-prefixed string (u32 byte count, then the bytes).
    pub fn read_string(&mut self, max_len: usize) -> Result<String> {
        let len = self.read_u32()? as usize;
        if len > max_len {
            return Err(XpltError::InvalidFormat(format!(
                "String length {} exceeds the maximum of {}",
                len, max_len
            )));
        }
        let bytes = self.take(len, "string")?;
        Ok(decode_text(bytes))
    }

    /// Reads a NUL-padded string occupying exactly `width` bytes.
    pub fn read_fixed_string(&mut self, width: usize) -> Result<String> {
        let bytes = self.take(width, "fixed string")?;
        Ok(decode_text(bytes))
    }

    /// Reads `count` values of `value_type`, requiring the chunk to hold
    /// exactly that much data.
    pub fn read_values(&mut self, value_type: ValueType, count: usize) -> Result<Vec<Value>> {
        let stride = value_type.components();
        let expected = count * stride * 4;
        if self.remaining() != expected {
            return Err(XpltError::SizeMismatch {
                context: format!("{} {} values", count, value_type),
                expected: expected as u64,
                found: self.remaining() as u64,
            });
        }
        let mut raw = vec![0.0f32; count * stride];
        self.read_f32_array(&mut raw)?;
        raw.chunks_exact(stride)
            .map(|c| Value::from_components(value_type, c))
            .collect()
    }
}

/// Reads a top-level tag, returning `None` on a clean end of file.
fn read_tag<R: Read>(stream: &mut R) -> Result<Option<u32>> {
    let mut tag = [0u8; 4];
    let mut filled = 0;
    while filled < tag.len() {
        match stream.read(&mut tag[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    match filled {
        0 => Ok(None),
        4 => Ok(Some(LittleEndian::read_u32(&tag))),
        _ => Err(XpltError::ShortRead("chunk id")),
    }
}

/// Strings are ASCII in practice; stop at the first NUL.
fn decode_text(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}
