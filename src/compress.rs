//! Raw DEFLATE compression collaborator.

use std::io::{self, Read};

use async_trait::async_trait;
use flate2::Compression;
use flate2::read::{DeflateDecoder, DeflateEncoder};

/// Trait for compressing and decompressing raw DEFLATE streams
/// (no zlib or gzip framing).
#[async_trait]
pub trait Compressor: Send + Sync {
    /// Compress `data` into a raw DEFLATE stream.
    async fn compress(&self, data: &[u8]) -> io::Result<Vec<u8>>;

    /// Inflate a raw DEFLATE stream.
    async fn decompress(&self, data: &[u8]) -> io::Result<Vec<u8>>;
}

/// [`Compressor`] backed by `flate2`, run on tokio's blocking pool.
///
/// Both operations call `tokio::task::spawn_blocking` and therefore panic
/// when polled outside a Tokio runtime.
#[derive(Debug, Clone, Copy)]
pub struct DeflateCompressor {
    level: Compression,
}

impl DeflateCompressor {
    pub fn new(level: Compression) -> Self {
        Self { level }
    }

    pub fn level(&self) -> Compression {
        self.level
    }
}

impl Default for DeflateCompressor {
    fn default() -> Self {
        Self::new(Compression::default())
    }
}

async fn run_blocking<F>(f: F) -> io::Result<Vec<u8>>
where
    F: FnOnce() -> io::Result<Vec<u8>> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(io::Error::other)?
}

#[async_trait]
impl Compressor for DeflateCompressor {
    async fn compress(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        let data = data.to_vec();
        let level = self.level;
        run_blocking(move || {
            let mut out = Vec::with_capacity(data.len() / 2);
            DeflateEncoder::new(data.as_slice(), level).read_to_end(&mut out)?;
            Ok(out)
        })
        .await
    }

    async fn decompress(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        let data = data.to_vec();
        run_blocking(move || {
            let mut out = Vec::with_capacity(data.len() * 2);
            DeflateDecoder::new(data.as_slice()).read_to_end(&mut out)?;
            Ok(out)
        })
        .await
    }
}
