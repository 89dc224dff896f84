//! Header-only metadata extraction.

use crate::format::codec_name;
use crate::header::parse;
use crate::Result;

/// Descriptive facts about a DDS file, without decoding any pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Probe {
    /// Codec display name, e.g. `DXT5`, `BC4`, `RGBA`.
    pub codec_name: String,
    pub width: u32,
    pub height: u32,
    /// Mip levels per face.
    pub mip_count: u32,
    pub is_cubemap: bool,
}

/// Read the headers of `bytes` and describe the texture.
///
/// Succeeds for any well-formed header, including codecs that
/// [`decode`](crate::decode) would reject.
pub fn probe(bytes: &[u8]) -> Result<Probe> {
    let headers = parse(bytes)?;
    let header = &headers.header;

    Ok(Probe {
        codec_name: codec_name(header, headers.dx10.as_ref()),
        width: header.width,
        height: header.height,
        mip_count: header.mip_count(),
        is_cubemap: headers.is_cubemap(),
    })
}
