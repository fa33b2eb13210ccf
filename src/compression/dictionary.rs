//! Compression dictionary loading.
//!
//! # Responsibilities
//! - Read the pre-trained dictionary blob
//! - Reject empty blobs, unsupported levels and corrupt formatted dictionaries
//! - Digest the blob once into prepared encoder/decoder contexts

use std::fmt;
use std::io::{self, Read};
use std::path::Path;

use thiserror::Error;
use zstd::dict::{DecoderDictionary, EncoderDictionary};

use crate::compression::compressor::CompressionError;

/// Level used when none is configured.
pub const DEFAULT_LEVEL: i32 = 9;

/// Little-endian magic prefix of a formatted (trained) zstd dictionary.
const DICTIONARY_MAGIC: u32 = 0xEC30_A437;

/// Errors raised while building a [`Dictionary`]. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("failed to read dictionary file: {0}")]
    Io(#[from] io::Error),

    #[error("dictionary is empty")]
    Empty,

    #[error("compression level {level} outside supported range {min}..={max}")]
    InvalidLevel { level: i32, min: i32, max: i32 },

    #[error("dictionary is malformed: {0}")]
    Malformed(#[source] io::Error),
}

/// Immutable, prepared zstd dictionary shared by every compression call.
pub struct Dictionary {
    encoder: EncoderDictionary<'static>,
    decoder: DecoderDictionary<'static>,
    level: i32,
    size: usize,
    id: Option<u32>,
}

impl Dictionary {
    /// Build a dictionary from raw bytes at the given compression level.
    pub fn load(bytes: &[u8], level: i32) -> Result<Self, DictionaryError> {
        if bytes.is_empty() {
            return Err(DictionaryError::Empty);
        }

        let range = zstd::compression_level_range();
        if !range.contains(&level) {
            return Err(DictionaryError::InvalidLevel {
                level,
                min: *range.start(),
                max: *range.end(),
            });
        }

        // Formatted dictionaries are only parsed when a frame is started, so a
        // trial frame surfaces corrupt entropy tables here instead of on a request.
        zstd::bulk::Compressor::with_dictionary(level, bytes)
            .and_then(|mut trial| trial.compress(&[]))
            .map_err(DictionaryError::Malformed)?;

        Ok(Self {
            encoder: EncoderDictionary::copy(bytes, level),
            decoder: DecoderDictionary::copy(bytes),
            level,
            size: bytes.len(),
            id: formatted_dictionary_id(bytes),
        })
    }

    /// Read and build a dictionary from a file on disk.
    pub fn from_file(path: &Path, level: i32) -> Result<Self, DictionaryError> {
        let bytes = std::fs::read(path)?;
        Self::load(&bytes, level)
    }

    /// Decompress a frame produced with this dictionary back into text.
    pub fn decompress(&self, frame: &[u8]) -> Result<String, CompressionError> {
        let mut decoder = zstd::stream::Decoder::with_prepared_dictionary(frame, &self.decoder)?;
        let mut out = Vec::new();
        decoder.read_to_end(&mut out)?;
        Ok(String::from_utf8(out)?)
    }

    pub(crate) fn encoder(&self) -> &EncoderDictionary<'static> {
        &self.encoder
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    /// Size of the source blob in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Dictionary id from the header, `None` for raw-content dictionaries.
    pub fn id(&self) -> Option<u32> {
        self.id
    }
}

impl fmt::Debug for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dictionary")
            .field("level", &self.level)
            .field("size", &self.size)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

fn formatted_dictionary_id(bytes: &[u8]) -> Option<u32> {
    let header: [u8; 8] = bytes.get(..8)?.try_into().ok()?;
    let magic = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
    if magic != DICTIONARY_MAGIC {
        return None;
    }
    Some(u32::from_le_bytes([header[4], header[5], header[6], header[7]]))
}
