//! BC1-BC5 block decompression.
//!
//! Every block covers a 4x4 tile of texels. Texel `i` of a tile sits at
//! `x = i % 4`, `y = i / 4`, and its index bits are the `i`-th group counted
//! from the least significant bit of the little-endian index field.

use byteorder::{ByteOrder, LittleEndian};

use crate::format::BlockFormat;
use crate::{Error, Result};

/// Decoded 4x4 texels in row-major order, RGBA8 each.
pub type Tile = [[u8; 4]; 16];

/// Expand one compressed block into a tile.
///
/// `block` must be exactly [`BlockFormat::block_size`] bytes.
pub fn decode_block(kind: BlockFormat, block: &[u8]) -> Result<Tile> {
    if block.len() != kind.block_size() {
        return Err(Error::Decode(format!(
            "{kind} block must be {} bytes, got {}",
            kind.block_size(),
            block.len()
        )));
    }

    let mut tile = [[0u8; 4]; 16];
    match kind {
        BlockFormat::Bc1 => decode_color(block, true, &mut tile),
        BlockFormat::Bc2 => {
            decode_color(&block[8..], false, &mut tile);
            let alpha = LittleEndian::read_u64(&block[..8]);
            for (i, texel) in tile.iter_mut().enumerate() {
                texel[3] = ((alpha >> (4 * i)) & 0xF) as u8 * 17;
            }
        }
        BlockFormat::Bc3 => {
            decode_color(&block[8..], false, &mut tile);
            let alpha = decode_channel(&block[..8]);
            for (texel, a) in tile.iter_mut().zip(alpha) {
                texel[3] = a;
            }
        }
        BlockFormat::Bc4 => {
            let value = decode_channel(block);
            for (texel, v) in tile.iter_mut().zip(value) {
                *texel = [v, v, v, 255];
            }
        }
        BlockFormat::Bc5 => {
            let red = decode_channel(&block[..8]);
            let green = decode_channel(&block[8..]);
            for (i, texel) in tile.iter_mut().enumerate() {
                *texel = [red[i], green[i], 0, 255];
            }
        }
    }

    Ok(tile)
}

/// Expand an RGB565 color to 8 bits per channel.
#[inline]
pub fn rgb565(color: u16) -> [u8; 3] {
    let r = ((color >> 11) & 0x1F) as u8;
    let g = ((color >> 5) & 0x3F) as u8;
    let b = (color & 0x1F) as u8;
    [(r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2)]
}

/// Build the four-entry palette of a color block.
///
/// With `punch_through` set and `c0 <= c1`, entry 2 is the midpoint and
/// entry 3 is transparent black. Otherwise entries 2 and 3 sit at 1/3 and
/// 2/3 between the endpoints.
fn color_table(c0: u16, c1: u16, punch_through: bool) -> [[u8; 4]; 4] {
    let a = rgb565(c0);
    let b = rgb565(c1);
    let mix = |wa: u16, wb: u16| -> [u8; 4] {
        let d = wa + wb;
        let ch = |i: usize| ((wa * a[i] as u16 + wb * b[i] as u16) / d) as u8;
        [ch(0), ch(1), ch(2), 255]
    };

    let e0 = [a[0], a[1], a[2], 255];
    let e1 = [b[0], b[1], b[2], 255];
    if c0 > c1 || !punch_through {
        [e0, e1, mix(2, 1), mix(1, 2)]
    } else {
        [e0, e1, mix(1, 1), [0, 0, 0, 0]]
    }
}

/// Decode an 8-byte color block into `tile`, RGBA.
fn decode_color(block: &[u8], punch_through: bool, tile: &mut Tile) {
    let c0 = LittleEndian::read_u16(&block[0..2]);
    let c1 = LittleEndian::read_u16(&block[2..4]);
    let table = color_table(c0, c1, punch_through);
    let indices = LittleEndian::read_u32(&block[4..8]);

    for (i, texel) in tile.iter_mut().enumerate() {
        *texel = table[((indices >> (2 * i)) & 0x3) as usize];
    }
}

/// Build the eight-entry palette of an interpolated channel block.
fn channel_table(e0: u8, e1: u8) -> [u8; 8] {
    let (a, b) = (e0 as u16, e1 as u16);
    let mut table = [e0, e1, 0, 0, 0, 0, 0, 255];

    if e0 > e1 {
        for i in 1..7u16 {
            table[i as usize + 1] = (((7 - i) * a + i * b) / 7) as u8;
        }
    } else {
        for i in 1..5u16 {
            table[i as usize + 1] = (((5 - i) * a + i * b) / 5) as u8;
        }
    }
    table
}

/// Decode an 8-byte interpolated channel block (BC3 alpha, BC4, BC5 halves).
fn decode_channel(block: &[u8]) -> [u8; 16] {
    let table = channel_table(block[0], block[1]);
    let indices = LittleEndian::read_u48(&block[2..8]);

    let mut out = [0u8; 16];
    for (i, value) in out.iter_mut().enumerate() {
        *value = table[((indices >> (3 * i)) & 0x7) as usize];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bc1(c0: u16, c1: u16, indices: u32) -> [u8; 8] {
        let mut block = [0u8; 8];
        block[0..2].copy_from_slice(&c0.to_le_bytes());
        block[2..4].copy_from_slice(&c1.to_le_bytes());
        block[4..8].copy_from_slice(&indices.to_le_bytes());
        block
    }

    #[test]
    fn test_rgb565_expansion() {
        assert_eq!(rgb565(0xF800), [255, 0, 0]);
        assert_eq!(rgb565(0x07E0), [0, 255, 0]);
        assert_eq!(rgb565(0x001F), [0, 0, 255]);
        assert_eq!(rgb565(0xFFFF), [255, 255, 255]);
        assert_eq!(rgb565(0x0000), [0, 0, 0]);
    }

    #[test]
    fn test_bc1_uniform_endpoint() {
        // 0x8410 = (16, 32, 16) in 565
        let tile = decode_block(BlockFormat::Bc1, &bc1(0x8410, 0x0000, 0)).unwrap();
        let expected = [132, 130, 132, 255];

        assert!(tile.iter().all(|t| *t == expected));
    }

    #[test]
    fn test_bc1_four_color_interpolation() {
        // index 2 on texel 0, index 3 on texel 1
        let tile = decode_block(BlockFormat::Bc1, &bc1(0xFFFF, 0x0000, 0b11_10)).unwrap();

        assert_eq!(tile[0], [170, 170, 170, 255]);
        assert_eq!(tile[1], [85, 85, 85, 255]);
        assert_eq!(tile[2], [255, 255, 255, 255]);
    }

    #[test]
    fn test_bc1_punch_through_alpha() {
        // c0 <= c1: index 2 is the midpoint, index 3 transparent
        let tile = decode_block(BlockFormat::Bc1, &bc1(0x0000, 0xFFFF, 0b11_10_01)).unwrap();

        assert_eq!(tile[0], [255, 255, 255, 255]);
        assert_eq!(tile[1], [127, 127, 127, 255]);
        assert_eq!(tile[2], [0, 0, 0, 0]);
        assert_eq!(tile[3], [0, 0, 0, 255]);
    }

    #[test]
    fn test_bc2_explicit_alpha_and_opaque_color() {
        let mut block = [0u8; 16];
        // texel 0 alpha 0xF, texel 1 alpha 0x8, texel 15 alpha 0x1
        block[0] = 0x8F;
        block[7] = 0x10;
        // c0 <= c1 must still use the four-color table
        block[8..16].copy_from_slice(&bc1(0x0000, 0xFFFF, 0xFFFF_FFFF));

        let tile = decode_block(BlockFormat::Bc2, &block).unwrap();

        assert_eq!(tile[0], [170, 170, 170, 255]);
        assert_eq!(tile[1][3], 136);
        assert_eq!(tile[2][3], 0);
        assert_eq!(tile[15][3], 17);
    }

    #[test]
    fn test_channel_table_eight_step() {
        let table = channel_table(255, 0);
        assert_eq!(table, [255, 0, 218, 182, 145, 109, 72, 36]);
    }

    #[test]
    fn test_channel_table_six_step() {
        let table = channel_table(0, 255);
        assert_eq!(table, [0, 255, 51, 102, 153, 204, 0, 255]);
    }

    #[test]
    fn test_bc3_alpha_indices() {
        let mut block = [0u8; 16];
        block[0] = 200;
        block[1] = 100;
        // texel 0 index 1, texel 1 index 7
        block[2] = 0b00_111_001;
        block[8..16].copy_from_slice(&bc1(0xF800, 0x0000, 0));

        let tile = decode_block(BlockFormat::Bc3, &block).unwrap();

        assert_eq!(tile[0], [255, 0, 0, 100]);
        // (200 + 6 * 100) / 7
        assert_eq!(tile[1][3], 114);
        assert_eq!(tile[2][3], 200);
    }

    #[test]
    fn test_bc4_replicates_gray() {
        let mut block = [0u8; 8];
        block[0] = 10;
        block[1] = 20;
        // texel 15 index 1: bits 45..48
        block[7] = 0b0010_0000;

        let tile = decode_block(BlockFormat::Bc4, &block).unwrap();

        assert_eq!(tile[0], [10, 10, 10, 255]);
        assert_eq!(tile[15], [20, 20, 20, 255]);
    }

    #[test]
    fn test_bc5_two_channels() {
        let mut block = [0u8; 16];
        block[0] = 255;
        block[1] = 0;
        block[8] = 0;
        block[9] = 128;
        block[10] = 0b001;

        let tile = decode_block(BlockFormat::Bc5, &block).unwrap();

        assert_eq!(tile[0], [255, 128, 0, 255]);
        assert_eq!(tile[1], [255, 0, 0, 255]);
    }

    #[test]
    fn test_wrong_block_length() {
        assert!(matches!(
            decode_block(BlockFormat::Bc3, &[0u8; 8]),
            Err(Error::Decode(_))
        ));
    }
}
