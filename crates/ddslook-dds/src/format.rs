//! Texture format classification.

use std::fmt;

use tracing::debug;

use crate::header::{pf_flags, DdsHeader, Dx10Header, FourCC};
use crate::{Error, Result};

/// DXGI format codes with a decoder.
pub mod dxgi {
    pub const BC1_UNORM: u32 = 71;
    pub const BC2_UNORM: u32 = 74;
    pub const BC3_UNORM: u32 = 77;
    pub const BC4_UNORM: u32 = 80;
    pub const BC5_UNORM: u32 = 83;
}

/// Block compression family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum BlockFormat {
    /// DXT1: RGB565 endpoints, optional 1-bit alpha.
    Bc1,
    /// DXT2/DXT3: explicit 4-bit alpha + BC1 color.
    Bc2,
    /// DXT4/DXT5: interpolated alpha + BC1 color.
    Bc3,
    /// ATI1: one interpolated channel.
    Bc4,
    /// ATI2: two interpolated channels.
    Bc5,
}

impl BlockFormat {
    /// Bytes per 4x4 block.
    pub const fn block_size(self) -> usize {
        match self {
            BlockFormat::Bc1 | BlockFormat::Bc4 => 8,
            BlockFormat::Bc2 | BlockFormat::Bc3 | BlockFormat::Bc5 => 16,
        }
    }

    /// Short display name.
    pub const fn name(self) -> &'static str {
        match self {
            BlockFormat::Bc1 => "BC1",
            BlockFormat::Bc2 => "BC2",
            BlockFormat::Bc3 => "BC3",
            BlockFormat::Bc4 => "BC4",
            BlockFormat::Bc5 => "BC5",
        }
    }

    /// Map a DXGI format code.
    pub fn from_dxgi(format: u32) -> Option<Self> {
        match format {
            dxgi::BC1_UNORM => Some(BlockFormat::Bc1),
            dxgi::BC2_UNORM => Some(BlockFormat::Bc2),
            dxgi::BC3_UNORM => Some(BlockFormat::Bc3),
            dxgi::BC4_UNORM => Some(BlockFormat::Bc4),
            dxgi::BC5_UNORM => Some(BlockFormat::Bc5),
            _ => None,
        }
    }

    /// Map a legacy FourCC code.
    pub fn from_four_cc(four_cc: FourCC) -> Option<Self> {
        match four_cc {
            FourCC::DXT1 => Some(BlockFormat::Bc1),
            FourCC::DXT2 | FourCC::DXT3 => Some(BlockFormat::Bc2),
            FourCC::DXT4 | FourCC::DXT5 => Some(BlockFormat::Bc3),
            FourCC::ATI1 | FourCC::BC4U => Some(BlockFormat::Bc4),
            FourCC::ATI2 | FourCC::BC5U => Some(BlockFormat::Bc5),
            _ => None,
        }
    }
}

impl fmt::Display for BlockFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Bit masks locating each channel inside a packed pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ChannelMasks {
    pub r: u32,
    pub g: u32,
    pub b: u32,
    /// Zero when the format carries no alpha.
    pub a: u32,
}

/// How the surface bytes are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum CodecDescriptor {
    /// 4x4 block compression.
    Compressed { kind: BlockFormat, block_size: usize },
    /// Packed pixels described by channel masks.
    Uncompressed {
        bits_per_pixel: u32,
        masks: ChannelMasks,
    },
}

impl CodecDescriptor {
    fn compressed(kind: BlockFormat) -> Self {
        CodecDescriptor::Compressed {
            kind,
            block_size: kind.block_size(),
        }
    }

    /// Whole bytes per pixel for uncompressed formats.
    pub fn bytes_per_pixel(&self) -> Option<usize> {
        match self {
            CodecDescriptor::Compressed { .. } => None,
            CodecDescriptor::Uncompressed { bits_per_pixel, .. } => {
                Some(bits_per_pixel.div_ceil(8) as usize)
            }
        }
    }

    /// The block family, if compressed.
    pub fn block_format(&self) -> Option<BlockFormat> {
        match *self {
            CodecDescriptor::Compressed { kind, .. } => Some(kind),
            CodecDescriptor::Uncompressed { .. } => None,
        }
    }

    /// Check if format is block-compressed.
    pub fn is_compressed(&self) -> bool {
        matches!(self, CodecDescriptor::Compressed { .. })
    }
}

/// Classify the surface encoding from the header bits.
///
/// A DX10 header takes precedence over the legacy pixel format.
pub fn classify(header: &DdsHeader, dx10: Option<&Dx10Header>) -> Result<CodecDescriptor> {
    let pf = &header.pixel_format;

    let codec = if let Some(dx10) = dx10 {
        let kind = BlockFormat::from_dxgi(dx10.dxgi_format).ok_or_else(|| {
            Error::UnsupportedFormat(format!("DXGI format {}", dx10.dxgi_format))
        })?;
        CodecDescriptor::compressed(kind)
    } else if pf.has(pf_flags::FOURCC) {
        let kind = BlockFormat::from_four_cc(pf.four_cc)
            .ok_or_else(|| Error::UnsupportedFormat(format!("FourCC {:?}", pf.four_cc.to_string())))?;
        CodecDescriptor::compressed(kind)
    } else if pf.has(pf_flags::RGB) {
        let a = if pf.has(pf_flags::ALPHAPIXELS) {
            pf.a_bit_mask
        } else {
            0
        };
        uncompressed(
            pf.rgb_bit_count,
            ChannelMasks {
                r: pf.r_bit_mask,
                g: pf.g_bit_mask,
                b: pf.b_bit_mask,
                a,
            },
        )?
    } else if pf.has(pf_flags::LUMINANCE) {
        let a = if pf.has(pf_flags::ALPHAPIXELS) {
            pf.a_bit_mask
        } else {
            0
        };
        let l = pf.r_bit_mask;
        uncompressed(pf.rgb_bit_count, ChannelMasks { r: l, g: l, b: l, a })?
    } else {
        return Err(Error::UnsupportedFormat(format!(
            "pixel format flags {:#x}",
            pf.flags
        )));
    };

    debug!(?codec, "classified DDS format");
    Ok(codec)
}

fn uncompressed(bits_per_pixel: u32, masks: ChannelMasks) -> Result<CodecDescriptor> {
    if bits_per_pixel == 0 || bits_per_pixel > 32 {
        return Err(Error::UnsupportedFormat(format!(
            "{bits_per_pixel} bits per pixel"
        )));
    }
    Ok(CodecDescriptor::Uncompressed {
        bits_per_pixel,
        masks,
    })
}

/// Human-readable codec name for titles and metadata.
///
/// Only looks at the header bits, so unknown codecs still get a name.
pub fn codec_name(header: &DdsHeader, dx10: Option<&Dx10Header>) -> String {
    let pf = &header.pixel_format;

    if let Some(dx10) = dx10 {
        return match BlockFormat::from_dxgi(dx10.dxgi_format) {
            Some(kind) => kind.name().to_string(),
            None => FourCC::DX10.to_string(),
        };
    }

    if pf.has(pf_flags::FOURCC) {
        pf.four_cc.to_string()
    } else if pf.has(pf_flags::RGB) {
        let name = if pf.has(pf_flags::ALPHAPIXELS) { "RGBA" } else { "RGB" };
        name.to_string()
    } else if pf.has(pf_flags::LUMINANCE) {
        let name = if pf.has(pf_flags::ALPHAPIXELS) { "LA" } else { "L" };
        name.to_string()
    } else {
        "???".to_string()
    }
}
