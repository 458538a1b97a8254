//! Listing loading and low-level byte access.
//!
//! This module covers the two places where the weaver touches raw bytes:
//!
//! - Loading a disassembled listing from disk or memory through the [`Backend`] trait, with
//!   [`read_listing`] handling the encodings a disassembler emits (UTF-8 with or without a
//!   byte order mark, and UTF-16LE as produced by `ildasm /UNICODE`).
//! - Decoding custom attribute blobs recovered from `.custom` lines, through the
//!   [`parser::Parser`] cursor and the [`io`] primitives.
//!
//! # Examples
//!
//! ```rust,no_run
//! use ilweave::file::read_listing;
//!
//! let listing = read_listing("Demo.il")?;
//! assert!(listing.contains(".assembly"));
//! # Ok::<(), ilweave::Error>(())
//! ```

pub mod io;
pub mod parser;

mod memory;
mod physical;

use std::path::Path;

use crate::{file::io::read_le, Error, Result};
use memory::Memory;
use physical::Physical;

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];
const UTF16LE_BOM: [u8; 2] = [0xFF, 0xFE];

/// Backend trait for listing data sources.
///
/// Abstracts over listings mapped from disk and listings already held in memory. All
/// implementations must be thread-safe so listings can be woven in parallel.
pub trait Backend: Send + Sync {
    /// Returns the entire data buffer.
    fn data(&self) -> &[u8];

    /// Returns the total length of the data buffer.
    fn len(&self) -> usize;

    /// Returns `true` if the buffer holds no data.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Loads a listing from disk and decodes it to text.
///
/// # Errors
/// Returns [`crate::Error::FileError`] if the file cannot be read, [`crate::Error::Empty`] for
/// an empty file and [`crate::Error::Malformed`] if the content is not valid UTF-8 or UTF-16LE.
pub fn read_listing(path: impl AsRef<Path>) -> Result<String> {
    let backend = Physical::new(path)?;
    decode_backend(&backend)
}

/// Decodes a listing captured in memory, such as a disassembler's standard output.
///
/// # Errors
/// Returns [`crate::Error::Empty`] for an empty buffer and [`crate::Error::Malformed`] if the
/// content is not valid UTF-8 or UTF-16LE.
pub fn decode_listing(data: Vec<u8>) -> Result<String> {
    let backend = Memory::new(data);
    decode_backend(&backend)
}

fn decode_backend(backend: &dyn Backend) -> Result<String> {
    if backend.is_empty() {
        return Err(Error::Empty);
    }

    let data = backend.data();
    if let Some(body) = data.strip_prefix(&UTF16LE_BOM) {
        return decode_utf16le(body);
    }

    let body = data.strip_prefix(&UTF8_BOM).unwrap_or(data);
    match std::str::from_utf8(body) {
        Ok(text) => Ok(text.to_string()),
        Err(error) => Err(malformed_error!("Listing is not valid UTF-8: {}", error)),
    }
}

fn decode_utf16le(body: &[u8]) -> Result<String> {
    if body.len() % 2 != 0 {
        return Err(malformed_error!(
            "UTF-16 listing has odd length - {}",
            body.len()
        ));
    }

    let mut units = Vec::with_capacity(body.len() / 2);
    for chunk in body.chunks_exact(2) {
        units.push(read_le::<u16>(chunk)?);
    }

    match String::from_utf16(&units) {
        Ok(text) => Ok(text),
        Err(error) => Err(malformed_error!("Listing is not valid UTF-16: {}", error)),
    }
}
