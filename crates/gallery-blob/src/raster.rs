//! Uncompressed RGB raster images and a nearest-neighbour transformer.
//!
//! Encoding:
//!
//! ```text
//! [4 bytes: magic "GRAW"]
//! [4 bytes: width  (little-endian u32)]
//! [4 bytes: height (little-endian u32)]
//! [width * height * 3 bytes: RGB pixels, row-major]
//! ```

use crate::error::{BlobError, BlobResult};
use crate::traits::{Dimensions, ImageTransformer};

const MAGIC: &[u8; 4] = b"GRAW";
const HEADER_LEN: usize = 12;
const CHANNELS: usize = 3;

/// A decoded raster image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RawImage {
    /// An image filled with a single colour.
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let count = width as usize * height as usize;
        let pixels = rgb.iter().copied().cycle().take(count * CHANNELS).collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.pixels.len());
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&self.width.to_le_bytes());
        out.extend_from_slice(&self.height.to_le_bytes());
        out.extend_from_slice(&self.pixels);
        out
    }

    pub fn decode(bytes: &[u8]) -> BlobResult<Self> {
        let dims = read_header(bytes)?;
        let expected = pixel_len(dims)?;
        let pixels = &bytes[HEADER_LEN..];
        if pixels.len() != expected {
            return Err(BlobError::InvalidImage(format!(
                "expected {expected} pixel bytes for {}x{}, found {}",
                dims.width,
                dims.height,
                pixels.len()
            )));
        }
        Ok(Self {
            width: dims.width,
            height: dims.height,
            pixels: pixels.to_vec(),
        })
    }

    fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let offset = (y as usize * self.width as usize + x as usize) * CHANNELS;
        &self.pixels[offset..offset + CHANNELS]
    }
}

fn read_header(bytes: &[u8]) -> BlobResult<Dimensions> {
    if bytes.len() < HEADER_LEN || &bytes[..4] != MAGIC {
        return Err(BlobError::InvalidImage("missing raster header".into()));
    }
    let width = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    let height = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
    if width == 0 || height == 0 {
        return Err(BlobError::InvalidImage(format!("empty image {width}x{height}")));
    }
    Ok(Dimensions::new(width, height))
}

fn pixel_len(dims: Dimensions) -> BlobResult<usize> {
    (dims.width as usize)
        .checked_mul(dims.height as usize)
        .and_then(|n| n.checked_mul(CHANNELS))
        .ok_or_else(|| {
            BlobError::InvalidImage(format!("image too large: {}x{}", dims.width, dims.height))
        })
}

/// Transformer for [`RawImage`] bytes.
#[derive(Clone, Copy, Debug, Default)]
pub struct RawImageTransformer;

impl ImageTransformer for RawImageTransformer {
    fn dimensions(&self, bytes: &[u8]) -> BlobResult<Dimensions> {
        read_header(bytes)
    }

    fn resize(&self, bytes: &[u8], target: Dimensions) -> BlobResult<Vec<u8>> {
        if target.width == 0 || target.height == 0 {
            return Err(BlobError::InvalidImage(format!(
                "cannot resize to {}x{}",
                target.width, target.height
            )));
        }
        let source = RawImage::decode(bytes)?;
        let mut pixels = Vec::with_capacity(pixel_len(target)?);
        for y in 0..target.height {
            let sy = (y as u64 * source.height as u64 / target.height as u64) as u32;
            for x in 0..target.width {
                let sx = (x as u64 * source.width as u64 / target.width as u64) as u32;
                pixels.extend_from_slice(source.pixel(sx, sy));
            }
        }
        Ok(RawImage {
            width: target.width,
            height: target.height,
            pixels,
        }
        .encode())
    }
}
