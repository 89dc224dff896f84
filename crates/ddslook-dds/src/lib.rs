//! DDS (DirectDraw Surface) texture decoding.
//!
//! Turns the bytes of a `.dds` file into a flat RGBA8 image:
//!
//! 1. [`parse`] reads the 128-byte legacy header and, for `DX10` files, the
//!    20-byte extension header.
//! 2. [`classify`] maps the header onto a [`CodecDescriptor`]: one of the
//!    BC1-BC5 block formats (DXT1/DXT3/DXT5/ATI1/ATI2) or a mask-described
//!    uncompressed RGB(A)/luminance layout.
//! 3. [`plan`] computes where every mip level of every face lives.
//! 4. [`decode`] picks a mip level and expands it with [`decode_block`] or
//!    [`unpack`].
//!
//! [`probe`] stops after step 1 for callers that only need metadata.
//!
//! # Example
//!
//! ```no_run
//! use ddslook_dds::{decode, probe};
//!
//! let data = std::fs::read("texture.dds")?;
//!
//! let info = probe(&data)?;
//! println!("{} {}x{} ({} mips)", info.codec_name, info.width, info.height, info.mip_count);
//!
//! // Smallest mip that is still at least 256x256
//! let surface = decode(&data, Some(256), Some(256))?;
//! assert_eq!(surface.rgba.len(), 4 * surface.width as usize * surface.height as usize);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod block;
mod decode;
mod error;
mod format;
mod header;
mod layout;
mod probe;
mod unpack;

pub use block::{decode_block, rgb565, Tile};
pub use decode::{
    decode, decode_with, select_mip, DecodeOptions, DecodedSurface, RowStrip, Rows,
    SurfaceDecoder,
};
pub use error::{Error, Result};
pub use format::{classify, codec_name, dxgi, BlockFormat, ChannelMasks, CodecDescriptor};
pub use header::{
    caps, caps2, flags, parse, pf_flags, DdsHeader, Dx10Header, FourCC, Headers, PixelFormat,
    RawDx10Header, RawHeader, RawPixelFormat, DX10_HEADER_LEN, HEADER_LEN,
};
pub use layout::{level_length, mip_dimension, plan, CubeFace, FaceChain, MipLevel, SurfaceLayout};
pub use probe::{probe, Probe};
pub use unpack::unpack;

/// DDS file magic bytes ("DDS ").
pub const DDS_MAGIC: &[u8; 4] = b"DDS ";
