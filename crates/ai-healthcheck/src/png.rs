//! In-memory PNG encoder for the vision probe image.
//!
//! Produces the smallest well-formed RGBA file we can send to an image
//! analysis service: signature, one IHDR, one IDAT, and an empty IEND.

use std::io::{self, Write};

use flate2::Crc;
use flate2::Compression;
use flate2::write::ZlibEncoder;

pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

const BIT_DEPTH: u8 = 8;
const COLOR_TYPE_RGBA: u8 = 6;
const BYTES_PER_PIXEL: usize = 4;
// Chunk lengths are limited to 2^31 - 1.
const MAX_CHUNK_LEN: usize = i32::MAX as usize;

/// Which synthetic image to submit to the vision endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProbeImage {
    /// 50x50, the smallest size Image Analysis accepts.
    #[default]
    MinSize,
    /// 1x1. Usually rejected by the service with `InvalidImageSize`, but
    /// still proves the key and endpoint are accepted.
    Tiny,
}

impl ProbeImage {
    pub fn from_min_size(use_min_size_image: bool) -> Self {
        if use_min_size_image {
            Self::MinSize
        } else {
            Self::Tiny
        }
    }

    /// `(width, height)` in pixels.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Self::MinSize => (50, 50),
            Self::Tiny => (1, 1),
        }
    }

    pub fn encode(self) -> io::Result<Vec<u8>> {
        let (width, height) = self.dimensions();
        encode_rgba_png(width, height)
    }
}

/// Encode a fully transparent RGBA image of the given size as PNG.
///
/// Every scanline is filter type 0 followed by `width * 4` zero bytes,
/// compressed into a single zlib stream.
pub fn encode_rgba_png(width: u32, height: u32) -> io::Result<Vec<u8>> {
    if width == 0 || height == 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("PNG dimensions must be non-zero, got {width}x{height}"),
        ));
    }

    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&width.to_be_bytes());
    ihdr.extend_from_slice(&height.to_be_bytes());
    // bit depth, colour type, compression, filter, interlace
    ihdr.extend_from_slice(&[BIT_DEPTH, COLOR_TYPE_RGBA, 0, 0, 0]);

    let idat = deflate_scanlines(width, height)?;

    let mut png = Vec::with_capacity(PNG_SIGNATURE.len() + 3 * 12 + ihdr.len() + idat.len());
    png.extend_from_slice(&PNG_SIGNATURE);
    write_chunk(&mut png, b"IHDR", &ihdr)?;
    write_chunk(&mut png, b"IDAT", &idat)?;
    write_chunk(&mut png, b"IEND", &[])?;
    Ok(png)
}

fn deflate_scanlines(width: u32, height: u32) -> io::Result<Vec<u8>> {
    let too_large = || io::Error::new(io::ErrorKind::InvalidInput, "PNG dimensions too large");

    let row_len = (width as usize)
        .checked_mul(BYTES_PER_PIXEL)
        .and_then(|n| n.checked_add(1))
        .ok_or_else(too_large)?;

    // Filter byte 0 (None) followed by transparent black pixels, so the
    // whole row is zeros.
    let row = vec![0u8; row_len];

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    for _ in 0..height {
        encoder.write_all(&row)?;
    }
    encoder.finish()
}

/// Append one chunk: length, type, data, CRC-32 over type and data.
fn write_chunk(out: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) -> io::Result<()> {
    if data.len() > MAX_CHUNK_LEN {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} chunk exceeds the PNG length limit", String::from_utf8_lossy(chunk_type)),
        ));
    }

    let mut crc = Crc::new();
    crc.update(chunk_type);
    crc.update(data);

    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(chunk_type);
    out.extend_from_slice(data);
    out.extend_from_slice(&crc.sum().to_be_bytes());
    Ok(())
}
