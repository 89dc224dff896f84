//! Channel-mask driven unpacking of uncompressed pixels.

use ddslook_common::BinaryReader;

use crate::format::ChannelMasks;
use crate::{Error, Result};

/// Expand one packed pixel to RGBA8.
///
/// `raw` holds exactly `bytes_per_pixel` little-endian bytes. Color channels
/// with a zero mask come out as 0, a zero alpha mask yields opaque 255.
pub fn unpack(bytes_per_pixel: usize, masks: &ChannelMasks, raw: &[u8]) -> Result<[u8; 4]> {
    if !(1..=4).contains(&bytes_per_pixel) || raw.len() != bytes_per_pixel {
        return Err(Error::Decode(format!(
            "cannot unpack {} bytes as a {bytes_per_pixel}-byte pixel",
            raw.len()
        )));
    }

    let pixel = BinaryReader::new(raw).read_uint(bytes_per_pixel)?;
    Ok(unpack_value(pixel, masks))
}

/// Expand an already assembled pixel value to RGBA8.
pub(crate) fn unpack_value(pixel: u32, masks: &ChannelMasks) -> [u8; 4] {
    [
        channel(pixel, masks.r).unwrap_or(0),
        channel(pixel, masks.g).unwrap_or(0),
        channel(pixel, masks.b).unwrap_or(0),
        channel(pixel, masks.a).unwrap_or(255),
    ]
}

/// Extract the bits under `mask` and rescale them to 0..=255.
#[inline]
fn channel(pixel: u32, mask: u32) -> Option<u8> {
    if mask == 0 {
        return None;
    }

    let shift = mask.trailing_zeros();
    let bits = mask.count_ones();
    let value = (pixel & mask) >> shift;

    if bits == 8 {
        return Some(value.min(255) as u8);
    }

    let max = (1u64 << bits) - 1;
    let scaled = (value as u64 * 255 + max / 2) / max;
    Some(scaled.min(255) as u8)
}
