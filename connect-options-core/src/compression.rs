//! Compression capability.
//!
//! This module provides the [`Compressor`] trait for per-message compression
//! and one implementation:
//! - [`GzipCompressor`]: Gzip compression (requires `compression-gzip` feature)
//!
//! Negotiating which registered compressor a call uses is left to the
//! call-execution logic.

use std::io;
use std::sync::Arc;

use bytes::Bytes;

#[cfg(feature = "compression-gzip")]
use std::io::{Read, Write};

#[cfg(feature = "compression-gzip")]
use flate2::Compression as GzipLevel;
#[cfg(feature = "compression-gzip")]
use flate2::read::GzDecoder;
#[cfg(feature = "compression-gzip")]
use flate2::write::GzEncoder;

/// Registered name of the gzip compressor.
pub const COMPRESSION_GZIP: &str = "gzip";

/// Compressor trait for per-message compression.
///
/// # Example
///
/// ```ignore
/// use connect_options_core::Compressor;
/// use bytes::Bytes;
/// use std::io;
///
/// struct Lz4Compressor;
///
/// impl Compressor for Lz4Compressor {
///     fn compress(&self, data: &[u8]) -> io::Result<Bytes> {
///         // ... lz4 compression
///     }
///
///     fn decompress(&self, data: &[u8]) -> io::Result<Bytes> {
///         // ... lz4 decompression
///     }
/// }
/// ```
pub trait Compressor: Send + Sync + 'static {
    /// Compress data.
    fn compress(&self, data: &[u8]) -> io::Result<Bytes>;

    /// Decompress data.
    fn decompress(&self, data: &[u8]) -> io::Result<Bytes>;

    /// Whether a message is worth compressing.
    ///
    /// Callers send the message uncompressed when this returns false.
    fn should_compress(&self, data: &[u8]) -> bool {
        let _ = data;
        true
    }
}

/// A shared, type-erased compressor.
#[derive(Clone)]
pub struct BoxedCompressor(Arc<dyn Compressor>);

impl BoxedCompressor {
    /// Create a new boxed compressor.
    pub fn new<C: Compressor>(compressor: C) -> Self {
        BoxedCompressor(Arc::new(compressor))
    }

    /// Compress data.
    pub fn compress(&self, data: &[u8]) -> io::Result<Bytes> {
        self.0.compress(data)
    }

    /// Decompress data.
    pub fn decompress(&self, data: &[u8]) -> io::Result<Bytes> {
        self.0.decompress(data)
    }

    /// Whether a message is worth compressing.
    pub fn should_compress(&self, data: &[u8]) -> bool {
        self.0.should_compress(data)
    }

    /// Returns true if both handles point at the same compressor instance.
    pub fn ptr_eq(&self, other: &BoxedCompressor) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<C: Compressor> From<C> for BoxedCompressor {
    fn from(compressor: C) -> Self {
        BoxedCompressor::new(compressor)
    }
}

impl std::fmt::Debug for BoxedCompressor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("BoxedCompressor").finish_non_exhaustive()
    }
}

/// Gzip compressor using flate2.
///
/// Messages shorter than `min_bytes` are left uncompressed.
///
/// Requires the `compression-gzip` feature.
#[cfg(feature = "compression-gzip")]
#[derive(Debug, Clone, Copy)]
pub struct GzipCompressor {
    /// Compression level (0-9). Default is 6.
    pub level: u32,
    /// Smallest message worth compressing. Default is 1 KiB.
    pub min_bytes: usize,
}

#[cfg(feature = "compression-gzip")]
impl Default for GzipCompressor {
    fn default() -> Self {
        Self {
            level: 6,
            min_bytes: 1024,
        }
    }
}

#[cfg(feature = "compression-gzip")]
impl GzipCompressor {
    /// Create a gzip compressor with the specified compression level.
    ///
    /// Level ranges from 0 (no compression) to 9 (best compression).
    pub fn with_level(level: u32) -> Self {
        Self {
            level: level.min(9),
            ..Self::default()
        }
    }

    /// Set the smallest message size worth compressing.
    pub fn min_bytes(mut self, min_bytes: usize) -> Self {
        self.min_bytes = min_bytes;
        self
    }
}

#[cfg(feature = "compression-gzip")]
impl Compressor for GzipCompressor {
    fn compress(&self, data: &[u8]) -> io::Result<Bytes> {
        let mut encoder = GzEncoder::new(Vec::new(), GzipLevel::new(self.level));
        encoder.write_all(data)?;
        Ok(Bytes::from(encoder.finish()?))
    }

    fn decompress(&self, data: &[u8]) -> io::Result<Bytes> {
        let mut decoder = GzDecoder::new(data);
        let mut decompressed = Vec::new();
        decoder.read_to_end(&mut decompressed)?;
        Ok(Bytes::from(decompressed))
    }

    fn should_compress(&self, data: &[u8]) -> bool {
        data.len() >= self.min_bytes
    }
}
