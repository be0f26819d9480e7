use crate::{Error, Result};
use image::ImageFormat;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    bytes: Vec<u8>,
    format: ImageFormat,
    width: u32,
    height: u32,
}

impl GeneratedImage {
    /// Validate that `bytes` hold a complete, decodable image.
    pub fn decode(bytes: Vec<u8>) -> Result<Self> {
        let format = image::guess_format(&bytes).map_err(|e| {
            tracing::warn!(
                "Unrecognized image format (first 4 bytes: {:02X?})",
                &bytes[..bytes.len().min(4)]
            );
            Error::InvalidImageData(format!("Unrecognized image format: {}", e))
        })?;

        let decoded = image::load_from_memory_with_format(&bytes, format)
            .map_err(|e| Error::InvalidImageData(format!("Failed to decode {:?}: {}", format, e)))?;

        Ok(Self {
            width: decoded.width(),
            height: decoded.height(),
            bytes,
            format,
        })
    }

    /// Decode on the blocking pool; full-size webp decoding is CPU bound.
    pub async fn decode_in_background(bytes: Vec<u8>) -> Result<Self> {
        tokio::task::spawn_blocking(move || Self::decode(bytes))
            .await
            .map_err(|e| Error::Invariant(format!("Image decode task join error: {}", e)))?
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }

    pub fn extension(&self) -> &'static str {
        self.format.extensions_str().first().copied().unwrap_or("bin")
    }
}
