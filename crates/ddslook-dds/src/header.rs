//! DDS header structures and parsing.
//!
//! The on-disk records are declared with little-endian integer fields so the
//! layout and byte order are fixed regardless of the host. [`parse`] reads
//! them once and converts them into plain value types.

use std::fmt;

use ddslook_common::BinaryReader;
use tracing::{debug, warn};
use zerocopy::byteorder::little_endian::U32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::{Error, Result, DDS_MAGIC};

/// Size of the legacy header including the 4-byte magic.
pub const HEADER_LEN: usize = 4 + RawHeader::SIZE;

/// Size of the DX10 extension header.
pub const DX10_HEADER_LEN: usize = RawDx10Header::SIZE;

/// DDS header flags.
pub mod flags {
    pub const CAPS: u32 = 0x1;
    pub const HEIGHT: u32 = 0x2;
    pub const WIDTH: u32 = 0x4;
    pub const PITCH: u32 = 0x8;
    pub const PIXEL_FORMAT: u32 = 0x1000;
    pub const MIPMAP_COUNT: u32 = 0x20000;
    pub const LINEAR_SIZE: u32 = 0x80000;
    pub const DEPTH: u32 = 0x800000;
}

/// Pixel format flags.
pub mod pf_flags {
    pub const ALPHAPIXELS: u32 = 0x1;
    pub const FOURCC: u32 = 0x4;
    pub const RGB: u32 = 0x40;
    pub const LUMINANCE: u32 = 0x20000;
}

/// Caps flags.
pub mod caps {
    pub const COMPLEX: u32 = 0x8;
    pub const TEXTURE: u32 = 0x1000;
    pub const MIPMAP: u32 = 0x400000;
}

/// Caps2 flags.
pub mod caps2 {
    pub const CUBEMAP: u32 = 0x200;
    pub const CUBEMAP_POSITIVEX: u32 = 0x400;
    pub const CUBEMAP_NEGATIVEX: u32 = 0x800;
    pub const CUBEMAP_POSITIVEY: u32 = 0x1000;
    pub const CUBEMAP_NEGATIVEY: u32 = 0x2000;
    pub const CUBEMAP_POSITIVEZ: u32 = 0x4000;
    pub const CUBEMAP_NEGATIVEZ: u32 = 0x8000;
    pub const CUBEMAP_ALLFACES: u32 = CUBEMAP
        | CUBEMAP_POSITIVEX
        | CUBEMAP_NEGATIVEX
        | CUBEMAP_POSITIVEY
        | CUBEMAP_NEGATIVEY
        | CUBEMAP_POSITIVEZ
        | CUBEMAP_NEGATIVEZ;
    pub const VOLUME: u32 = 0x200000;
}

/// Four-character code identifying a compressed codec.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned,
)]
#[repr(transparent)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    pub const DXT1: Self = Self(*b"DXT1");
    pub const DXT2: Self = Self(*b"DXT2");
    pub const DXT3: Self = Self(*b"DXT3");
    pub const DXT4: Self = Self(*b"DXT4");
    pub const DXT5: Self = Self(*b"DXT5");
    pub const ATI1: Self = Self(*b"ATI1");
    pub const ATI2: Self = Self(*b"ATI2");
    pub const BC4U: Self = Self(*b"BC4U");
    pub const BC5U: Self = Self(*b"BC5U");
    /// DX10 extended header follows.
    pub const DX10: Self = Self(*b"DX10");
}

impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Debug for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCC({:?})", self.to_string())
    }
}

/// On-disk DDS header, following the magic.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct RawHeader {
    /// Header size (should be 124).
    pub size: U32,
    /// Header flags.
    pub flags: U32,
    /// Image height.
    pub height: U32,
    /// Image width.
    pub width: U32,
    /// Pitch or linear size.
    pub pitch_or_linear_size: U32,
    /// Depth (for volume textures).
    pub depth: U32,
    /// Number of mipmap levels.
    pub mipmap_count: U32,
    /// Reserved.
    pub reserved1: [U32; 11],
    /// Pixel format.
    pub pixel_format: RawPixelFormat,
    /// Surface capabilities.
    pub caps: U32,
    /// Surface capabilities 2.
    pub caps2: U32,
    /// Surface capabilities 3.
    pub caps3: U32,
    /// Surface capabilities 4.
    pub caps4: U32,
    /// Reserved.
    pub reserved2: U32,
}

impl RawHeader {
    /// Expected header size.
    pub const SIZE: usize = 124;
}

/// On-disk pixel format sub-record.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct RawPixelFormat {
    /// Structure size (should be 32).
    pub size: U32,
    /// Pixel format flags.
    pub flags: U32,
    /// Four-character code for compression.
    pub four_cc: FourCC,
    /// Number of bits per pixel (for uncompressed).
    pub rgb_bit_count: U32,
    /// Red (or luminance) bit mask.
    pub r_bit_mask: U32,
    /// Green bit mask.
    pub g_bit_mask: U32,
    /// Blue bit mask.
    pub b_bit_mask: U32,
    /// Alpha bit mask.
    pub a_bit_mask: U32,
}

impl RawPixelFormat {
    /// Expected structure size.
    pub const SIZE: usize = 32;
}

/// On-disk DX10 extension header.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct RawDx10Header {
    /// DXGI format.
    pub dxgi_format: U32,
    /// Resource dimension.
    pub resource_dimension: U32,
    /// Misc flags.
    pub misc_flag: U32,
    /// Array size.
    pub array_size: U32,
    /// Misc flags 2.
    pub misc_flags2: U32,
}

impl RawDx10Header {
    /// Expected header size.
    pub const SIZE: usize = 20;
}

const _: () = assert!(std::mem::size_of::<RawHeader>() == RawHeader::SIZE);
const _: () = assert!(std::mem::size_of::<RawPixelFormat>() == RawPixelFormat::SIZE);
const _: () = assert!(std::mem::size_of::<RawDx10Header>() == RawDx10Header::SIZE);

/// Pixel format description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelFormat {
    pub size: u32,
    pub flags: u32,
    pub four_cc: FourCC,
    pub rgb_bit_count: u32,
    pub r_bit_mask: u32,
    pub g_bit_mask: u32,
    pub b_bit_mask: u32,
    pub a_bit_mask: u32,
}

impl PixelFormat {
    /// Check a pixel format flag.
    #[inline]
    pub fn has(&self, flag: u32) -> bool {
        self.flags & flag != 0
    }
}

impl From<&RawPixelFormat> for PixelFormat {
    fn from(raw: &RawPixelFormat) -> Self {
        Self {
            size: raw.size.get(),
            flags: raw.flags.get(),
            four_cc: raw.four_cc,
            rgb_bit_count: raw.rgb_bit_count.get(),
            r_bit_mask: raw.r_bit_mask.get(),
            g_bit_mask: raw.g_bit_mask.get(),
            b_bit_mask: raw.b_bit_mask.get(),
            a_bit_mask: raw.a_bit_mask.get(),
        }
    }
}

/// Legacy DDS header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DdsHeader {
    pub size: u32,
    pub flags: u32,
    pub height: u32,
    pub width: u32,
    pub pitch_or_linear_size: u32,
    pub depth: u32,
    pub mipmap_count: u32,
    pub pixel_format: PixelFormat,
    pub caps: u32,
    pub caps2: u32,
}

impl DdsHeader {
    /// Number of mip levels stored per face.
    ///
    /// The declared count only counts when the MIPMAPCOUNT flag is set.
    pub fn mip_count(&self) -> u32 {
        if self.flags & flags::MIPMAP_COUNT != 0 && self.mipmap_count > 0 {
            self.mipmap_count
        } else {
            1
        }
    }

    /// Check if this is a cubemap.
    pub fn is_cubemap(&self) -> bool {
        self.caps2 & caps2::CUBEMAP != 0
    }

    /// Check if this is a volume texture.
    pub fn is_volume(&self) -> bool {
        self.caps2 & caps2::VOLUME != 0
    }

    /// Check if this is a DX10 extended header.
    pub fn is_dx10(&self) -> bool {
        self.pixel_format.four_cc == FourCC::DX10
    }
}

impl From<&RawHeader> for DdsHeader {
    fn from(raw: &RawHeader) -> Self {
        Self {
            size: raw.size.get(),
            flags: raw.flags.get(),
            height: raw.height.get(),
            width: raw.width.get(),
            pitch_or_linear_size: raw.pitch_or_linear_size.get(),
            depth: raw.depth.get(),
            mipmap_count: raw.mipmap_count.get(),
            pixel_format: PixelFormat::from(&raw.pixel_format),
            caps: raw.caps.get(),
            caps2: raw.caps2.get(),
        }
    }
}

/// DX10 extension header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dx10Header {
    pub dxgi_format: u32,
    pub resource_dimension: u32,
    pub misc_flag: u32,
    pub array_size: u32,
    pub misc_flags2: u32,
}

impl Dx10Header {
    /// `D3D11_RESOURCE_MISC_TEXTURECUBE`.
    pub const MISC_TEXTURECUBE: u32 = 0x4;
    /// `D3D10_RESOURCE_DIMENSION_TEXTURE3D`.
    pub const DIMENSION_TEXTURE3D: u32 = 4;

    /// Check if the resource is an array of cubes.
    pub fn is_cubemap(&self) -> bool {
        self.misc_flag & Self::MISC_TEXTURECUBE != 0
    }

    /// Check if the resource is a 3D texture.
    pub fn is_volume(&self) -> bool {
        self.resource_dimension == Self::DIMENSION_TEXTURE3D
    }
}

impl From<&RawDx10Header> for Dx10Header {
    fn from(raw: &RawDx10Header) -> Self {
        Self {
            dxgi_format: raw.dxgi_format.get(),
            resource_dimension: raw.resource_dimension.get(),
            misc_flag: raw.misc_flag.get(),
            array_size: raw.array_size.get(),
            misc_flags2: raw.misc_flags2.get(),
        }
    }
}

/// Everything the header area of a DDS file declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Headers {
    pub header: DdsHeader,
    pub dx10: Option<Dx10Header>,
}

impl Headers {
    /// Offset of the first surface byte.
    pub fn data_offset(&self) -> usize {
        match self.dx10 {
            Some(_) => HEADER_LEN + DX10_HEADER_LEN,
            None => HEADER_LEN,
        }
    }

    /// Check if the surface has cube faces, via either header.
    pub fn is_cubemap(&self) -> bool {
        self.header.is_cubemap() || self.dx10.is_some_and(|dx10| dx10.is_cubemap())
    }

    /// Check if the surface is a volume, via either header.
    pub fn is_volume(&self) -> bool {
        self.header.is_volume() || self.dx10.is_some_and(|dx10| dx10.is_volume())
    }
}

/// Report a magic mismatch with the bytes actually found.
fn bad_magic(err: ddslook_common::Error) -> Error {
    if let ddslook_common::Error::InvalidMagic { actual, .. } = &err {
        if let Ok(magic) = <[u8; 4]>::try_from(actual.as_slice()) {
            return Error::BadMagic(magic);
        }
    }
    Error::Common(err)
}

/// Parse the legacy header and, when the FourCC asks for it, the DX10 header.
///
/// Never reads past `bytes`.
pub fn parse(bytes: &[u8]) -> Result<Headers> {
    if bytes.len() < HEADER_LEN {
        return Err(Error::TooShort {
            needed: HEADER_LEN,
            available: bytes.len(),
        });
    }

    let mut reader = BinaryReader::new(bytes);

    reader.expect_magic(DDS_MAGIC).map_err(bad_magic)?;

    let raw: RawHeader = reader.read_struct()?;
    let header = DdsHeader::from(&raw);

    if header.size as usize != RawHeader::SIZE {
        warn!(size = header.size, "unexpected DDS header size field");
    }
    if header.pixel_format.size as usize != RawPixelFormat::SIZE {
        warn!(size = header.pixel_format.size, "unexpected pixel format size field");
    }

    let dx10 = if header.is_dx10() {
        let needed = HEADER_LEN + DX10_HEADER_LEN;
        if bytes.len() < needed {
            return Err(Error::TooShort {
                needed,
                available: bytes.len(),
            });
        }
        let raw: RawDx10Header = reader.read_struct()?;
        Some(Dx10Header::from(&raw))
    } else {
        None
    };

    debug!(
        width = header.width,
        height = header.height,
        mips = header.mipmap_count,
        four_cc = %header.pixel_format.four_cc,
        pf_flags = format_args!("{:#x}", header.pixel_format.flags),
        dxgi = ?dx10.map(|h| h.dxgi_format),
        "parsed DDS header"
    );

    Ok(Headers { header, dx10 })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_header(four_cc: FourCC) -> RawHeader {
        let zero = U32::new(0);
        RawHeader {
            size: U32::new(124),
            flags: U32::new(flags::CAPS | flags::HEIGHT | flags::WIDTH | flags::PIXEL_FORMAT),
            height: U32::new(64),
            width: U32::new(32),
            pitch_or_linear_size: zero,
            depth: zero,
            mipmap_count: U32::new(3),
            reserved1: [zero; 11],
            pixel_format: RawPixelFormat {
                size: U32::new(32),
                flags: U32::new(pf_flags::FOURCC),
                four_cc,
                rgb_bit_count: zero,
                r_bit_mask: zero,
                g_bit_mask: zero,
                b_bit_mask: zero,
                a_bit_mask: zero,
            },
            caps: U32::new(caps::TEXTURE),
            caps2: zero,
            caps3: zero,
            caps4: zero,
            reserved2: zero,
        }
    }

    fn file(header: &RawHeader) -> Vec<u8> {
        let mut bytes = DDS_MAGIC.to_vec();
        bytes.extend_from_slice(header.as_bytes());
        bytes
    }

    #[test]
    fn test_parse_legacy_header() {
        let bytes = file(&raw_header(FourCC::DXT1));
        let headers = parse(&bytes).unwrap();

        assert_eq!(headers.header.width, 32);
        assert_eq!(headers.header.height, 64);
        assert_eq!(headers.header.pixel_format.four_cc, FourCC::DXT1);
        assert!(headers.dx10.is_none());
        assert_eq!(headers.data_offset(), 128);
    }

    #[test]
    fn test_fields_are_little_endian() {
        let mut bytes = file(&raw_header(FourCC::DXT1));
        // width lives at byte 16
        bytes[16..20].copy_from_slice(&[0x00, 0x01, 0x00, 0x00]);
        let headers = parse(&bytes).unwrap();

        assert_eq!(headers.header.width, 256);
    }

    #[test]
    fn test_parse_dx10_header() {
        let mut bytes = file(&raw_header(FourCC::DX10));
        let dx10 = RawDx10Header {
            dxgi_format: U32::new(71),
            resource_dimension: U32::new(3),
            misc_flag: U32::new(Dx10Header::MISC_TEXTURECUBE),
            array_size: U32::new(1),
            misc_flags2: U32::new(0),
        };
        bytes.extend_from_slice(dx10.as_bytes());

        let headers = parse(&bytes).unwrap();
        let parsed = headers.dx10.unwrap();

        assert_eq!(parsed.dxgi_format, 71);
        assert!(parsed.is_cubemap());
        assert!(headers.is_cubemap());
        assert_eq!(headers.data_offset(), 148);
    }

    #[test]
    fn test_dx10_header_truncated() {
        let mut bytes = file(&raw_header(FourCC::DX10));
        bytes.extend_from_slice(&[0u8; 10]);

        assert!(matches!(
            parse(&bytes),
            Err(Error::TooShort { needed: 148, available: 138 })
        ));
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = file(&raw_header(FourCC::DXT1));
        bytes[..4].copy_from_slice(b"PNG ");

        assert!(matches!(parse(&bytes), Err(Error::BadMagic(m)) if &m == b"PNG "));
    }

    #[test]
    fn test_too_short() {
        assert!(matches!(
            parse(b"DDS "),
            Err(Error::TooShort { needed: 128, available: 4 })
        ));
    }

    #[test]
    fn test_mip_count_requires_flag() {
        let mut header = DdsHeader::from(&raw_header(FourCC::DXT1));
        assert_eq!(header.mip_count(), 1);

        header.flags |= flags::MIPMAP_COUNT;
        assert_eq!(header.mip_count(), 3);

        header.mipmap_count = 0;
        assert_eq!(header.mip_count(), 1);
    }
}
