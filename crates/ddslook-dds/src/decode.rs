//! Surface decoding: mip selection and whole-surface expansion to RGBA8.

use ddslook_common::BinaryReader;
use tracing::{debug, trace};

use crate::block::decode_block;
use crate::format::{classify, codec_name, BlockFormat, ChannelMasks, CodecDescriptor};
use crate::header::{parse, Headers};
use crate::layout::{plan, MipLevel, SurfaceLayout};
use crate::unpack::unpack_value;
use crate::{Error, Result};

/// Decoding preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Smallest acceptable width; `None` means no preference.
    pub preferred_width: Option<u32>,
    /// Smallest acceptable height; `None` means no preference.
    pub preferred_height: Option<u32>,
    /// Rows decoded between cancellation polls.
    pub cancel_interval_rows: u32,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            preferred_width: None,
            preferred_height: None,
            cancel_interval_rows: 64,
        }
    }
}

impl DecodeOptions {
    /// Options with no size preference.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefer the smallest mip at least `width` x `height`.
    pub fn with_preferred_size(mut self, width: u32, height: u32) -> Self {
        self.preferred_width = Some(width);
        self.preferred_height = Some(height);
        self
    }

    pub fn with_preferred_width(mut self, width: u32) -> Self {
        self.preferred_width = Some(width);
        self
    }

    pub fn with_preferred_height(mut self, height: u32) -> Self {
        self.preferred_height = Some(height);
        self
    }

    /// Poll for cancellation every `rows` decoded rows (minimum 1).
    pub fn with_cancel_interval(mut self, rows: u32) -> Self {
        self.cancel_interval_rows = rows.max(1);
        self
    }
}

/// A fully decoded mip level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSurface {
    pub width: u32,
    pub height: u32,
    /// Mip level the pixels came from.
    pub level: u32,
    /// Row-major RGBA8, `4 * width * height` bytes.
    pub rgba: Vec<u8>,
}

/// A horizontal band of decoded rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowStrip {
    /// First row of the strip.
    pub y: u32,
    /// Number of rows in the strip.
    pub rows: u32,
    /// Row-major RGBA8, `4 * width * rows` bytes.
    pub rgba: Vec<u8>,
}

/// Pick the mip level to decode.
///
/// Chooses the smallest level whose width and height both reach the
/// preferred size. Level 0 is used when nothing qualifies or when no
/// preference is given. A missing axis places no constraint on that axis.
pub fn select_mip(levels: &[MipLevel], preferred_width: Option<u32>, preferred_height: Option<u32>) -> usize {
    if preferred_width.is_none() && preferred_height.is_none() {
        return 0;
    }

    let min_width = preferred_width.unwrap_or(0);
    let min_height = preferred_height.unwrap_or(0);

    levels
        .iter()
        .rposition(|l| l.width >= min_width && l.height >= min_height)
        .unwrap_or(0)
}

/// A parsed, classified and planned surface ready for pixel decoding.
#[derive(Debug, Clone)]
pub struct SurfaceDecoder<'a> {
    container: &'a [u8],
    headers: Headers,
    codec: CodecDescriptor,
    layout: SurfaceLayout,
    level: MipLevel,
}

impl<'a> SurfaceDecoder<'a> {
    /// Parse, classify and plan `container`, then select a mip level.
    ///
    /// Errors from each phase are returned unchanged; no pixel work happens
    /// here.
    pub fn new(container: &'a [u8], options: &DecodeOptions) -> Result<Self> {
        let headers = parse(container)?;
        let codec = classify(&headers.header, headers.dx10.as_ref())?;
        let layout = plan(&headers, &codec, container.len())?;

        let levels = layout.primary();
        let index = select_mip(levels, options.preferred_width, options.preferred_height);
        let level = *levels
            .get(index)
            .ok_or_else(|| Error::CorruptLayout("surface has no mip levels".into()))?;

        debug!(
            level = level.level,
            width = level.width,
            height = level.height,
            "selected mip level"
        );

        Ok(Self {
            container,
            headers,
            codec,
            layout,
            level,
        })
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn codec(&self) -> &CodecDescriptor {
        &self.codec
    }

    pub fn layout(&self) -> &SurfaceLayout {
        &self.layout
    }

    /// The mip level that will be decoded.
    pub fn level(&self) -> &MipLevel {
        &self.level
    }

    /// Display name of the codec.
    pub fn codec_name(&self) -> String {
        codec_name(&self.headers.header, self.headers.dx10.as_ref())
    }

    /// Iterate decoded strips top to bottom.
    ///
    /// Each call starts over from the first row.
    pub fn rows(&self) -> Rows<'_> {
        Rows {
            data: &self.container[self.level.first_slice()],
            codec: &self.codec,
            width: self.level.width,
            height: self.level.height,
            y: 0,
            done: false,
        }
    }

    /// Decode the selected level.
    pub fn decode(&self) -> Result<DecodedSurface> {
        self.decode_with_cancel(u32::MAX, || false)
    }

    /// Decode the selected level, polling `is_cancelled` every
    /// `interval_rows` rows.
    pub fn decode_with_cancel<F>(&self, interval_rows: u32, is_cancelled: F) -> Result<DecodedSurface>
    where
        F: Fn() -> bool,
    {
        let (width, height) = (self.level.width, self.level.height);
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| Error::CorruptLayout(format!("{width}x{height} output overflows")))?;

        let mut rgba = Vec::with_capacity(expected);
        let mut since_poll = 0u32;

        for strip in self.rows() {
            let strip = strip?;
            rgba.extend_from_slice(&strip.rgba);

            since_poll = since_poll.saturating_add(strip.rows);
            if since_poll >= interval_rows {
                since_poll = 0;
                if is_cancelled() {
                    debug!(row = strip.y + strip.rows, "decode canceled");
                    return Err(Error::Canceled);
                }
            }
        }

        if rgba.len() != expected {
            return Err(Error::Decode(format!(
                "decoded {} bytes, expected {expected}",
                rgba.len()
            )));
        }

        Ok(DecodedSurface {
            width,
            height,
            level: self.level.level,
            rgba,
        })
    }
}

/// Iterator over the decoded strips of one mip level.
///
/// Block formats yield one strip per block row (up to 4 pixel rows),
/// uncompressed formats yield single rows. Stops after the first error.
#[derive(Debug, Clone)]
pub struct Rows<'s> {
    data: &'s [u8],
    codec: &'s CodecDescriptor,
    width: u32,
    height: u32,
    y: u32,
    done: bool,
}

impl Rows<'_> {
    fn block_strip(&self, kind: BlockFormat, block_size: usize) -> Result<RowStrip> {
        let width = self.width as usize;
        let rows = (self.height - self.y).min(4);
        let blocks_x = self.width.div_ceil(4) as usize;
        let row_start = (self.y / 4) as usize * blocks_x * block_size;

        let mut rgba = vec![0u8; width * rows as usize * 4];
        for bx in 0..blocks_x {
            let start = row_start + bx * block_size;
            let block = self
                .data
                .get(start..start + block_size)
                .ok_or_else(|| Error::Decode(format!("block at byte {start} outside level data")))?;
            let tile = decode_block(kind, block)?;

            for ty in 0..rows as usize {
                for tx in 0..4 {
                    let x = bx * 4 + tx;
                    if x >= width {
                        break;
                    }
                    let dst = (ty * width + x) * 4;
                    rgba[dst..dst + 4].copy_from_slice(&tile[ty * 4 + tx]);
                }
            }
        }

        Ok(RowStrip {
            y: self.y,
            rows,
            rgba,
        })
    }

    fn pixel_row(&self, bits_per_pixel: u32, masks: &ChannelMasks) -> Result<RowStrip> {
        let bytes_per_pixel = bits_per_pixel.div_ceil(8) as usize;
        let width = self.width as usize;
        let row_start = self.y as usize * width * bytes_per_pixel;

        let mut reader = BinaryReader::new_at(self.data, row_start);
        let mut rgba = Vec::with_capacity(width * 4);
        for _ in 0..width {
            let pixel = reader
                .read_uint(bytes_per_pixel)
                .map_err(|e| Error::Decode(format!("row {}: {e}", self.y)))?;
            rgba.extend_from_slice(&unpack_value(pixel, masks));
        }

        Ok(RowStrip {
            y: self.y,
            rows: 1,
            rgba,
        })
    }
}

impl Iterator for Rows<'_> {
    type Item = Result<RowStrip>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.y >= self.height {
            return None;
        }

        let strip = match *self.codec {
            CodecDescriptor::Compressed { kind, block_size } => self.block_strip(kind, block_size),
            CodecDescriptor::Uncompressed {
                bits_per_pixel,
                ref masks,
            } => self.pixel_row(bits_per_pixel, masks),
        };

        match &strip {
            Ok(s) => {
                trace!(y = s.y, rows = s.rows, "decoded strip");
                self.y += s.rows;
            }
            Err(_) => self.done = true,
        }
        Some(strip)
    }
}

/// Decode `bytes` into an RGBA8 surface.
///
/// With no preferred size, mip level 0 is decoded.
pub fn decode(bytes: &[u8], preferred_width: Option<u32>, preferred_height: Option<u32>) -> Result<DecodedSurface> {
    let options = DecodeOptions {
        preferred_width,
        preferred_height,
        ..DecodeOptions::default()
    };
    SurfaceDecoder::new(bytes, &options)?.decode()
}

/// Decode `bytes`, polling `is_cancelled` after planning and then every
/// [`DecodeOptions::cancel_interval_rows`] rows.
///
/// Returns [`Error::Canceled`] as soon as a poll reports cancellation.
pub fn decode_with<F>(bytes: &[u8], options: &DecodeOptions, is_cancelled: F) -> Result<DecodedSurface>
where
    F: Fn() -> bool,
{
    let decoder = SurfaceDecoder::new(bytes, options)?;
    if is_cancelled() {
        return Err(Error::Canceled);
    }
    decoder.decode_with_cancel(options.cancel_interval_rows.max(1), is_cancelled)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levels(dims: &[(u32, u32)]) -> Vec<MipLevel> {
        dims.iter()
            .enumerate()
            .map(|(i, &(width, height))| MipLevel {
                level: i as u32,
                width,
                height,
                depth: 1,
                byte_offset: 0,
                byte_length: 0,
            })
            .collect()
    }

    #[test]
    fn test_select_mip_without_preference() {
        let chain = levels(&[(64, 64), (32, 32), (16, 16)]);
        assert_eq!(select_mip(&chain, None, None), 0);
    }

    #[test]
    fn test_select_smallest_sufficient_level() {
        let chain = levels(&[(64, 32), (32, 16), (16, 8), (8, 4)]);

        assert_eq!(select_mip(&chain, Some(20), Some(10)), 1);
        assert_eq!(select_mip(&chain, Some(16), Some(8)), 2);
        assert_eq!(select_mip(&chain, Some(1), Some(1)), 3);
        // one axis too large for everything but the base
        assert_eq!(select_mip(&chain, Some(8), Some(20)), 0);
    }

    #[test]
    fn test_select_larger_than_base_uses_base() {
        let chain = levels(&[(64, 64), (32, 32)]);
        assert_eq!(select_mip(&chain, Some(128), Some(128)), 0);
    }

    #[test]
    fn test_select_single_axis() {
        let chain = levels(&[(64, 16), (32, 8), (16, 4)]);
        assert_eq!(select_mip(&chain, Some(30), None), 1);
        assert_eq!(select_mip(&chain, None, Some(4)), 2);
    }

    #[test]
    fn test_options_builder() {
        let options = DecodeOptions::new()
            .with_preferred_size(32, 16)
            .with_cancel_interval(0);

        assert_eq!(options.preferred_width, Some(32));
        assert_eq!(options.preferred_height, Some(16));
        assert_eq!(options.cancel_interval_rows, 1);
    }
}
