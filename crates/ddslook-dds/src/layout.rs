//! Mip chain and face layout within the file.
//!
//! Surfaces are stored face-major: every face (or array element) carries its
//! own complete mip chain, and chains follow each other directly after the
//! headers. Volume textures keep one chain whose levels hold all depth slices.

use std::ops::Range;

use tracing::debug;

use crate::format::CodecDescriptor;
use crate::header::{caps2, Headers};
use crate::{Error, Result};

/// One of the six cube directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubeFace {
    /// All faces in storage order.
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];

    /// The caps2 bit announcing this face.
    pub const fn caps2_bit(self) -> u32 {
        match self {
            CubeFace::PositiveX => caps2::CUBEMAP_POSITIVEX,
            CubeFace::NegativeX => caps2::CUBEMAP_NEGATIVEX,
            CubeFace::PositiveY => caps2::CUBEMAP_POSITIVEY,
            CubeFace::NegativeY => caps2::CUBEMAP_NEGATIVEY,
            CubeFace::PositiveZ => caps2::CUBEMAP_POSITIVEZ,
            CubeFace::NegativeZ => caps2::CUBEMAP_NEGATIVEZ,
        }
    }
}

/// Placement of one mip level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MipLevel {
    /// Level index, 0 = full size.
    pub level: u32,
    pub width: u32,
    pub height: u32,
    /// Depth slices stored in this level (1 unless volume).
    pub depth: u32,
    /// Absolute offset in the container.
    pub byte_offset: usize,
    /// Length covering all depth slices.
    pub byte_length: usize,
}

impl MipLevel {
    /// Byte range within the container.
    pub fn range(&self) -> Range<usize> {
        self.byte_offset..self.byte_offset + self.byte_length
    }

    /// Byte range of the first depth slice.
    pub fn first_slice(&self) -> Range<usize> {
        let slice_length = self.byte_length / self.depth.max(1) as usize;
        self.byte_offset..self.byte_offset + slice_length
    }
}

/// A mip chain for one face or array element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceChain {
    /// Cube direction, when the surface is a cubemap.
    pub face: Option<CubeFace>,
    /// Array element index (0 for non-array surfaces).
    pub element: u32,
    pub levels: Vec<MipLevel>,
}

impl FaceChain {
    /// Sum of all level lengths.
    pub fn byte_length(&self) -> usize {
        self.levels.iter().map(|l| l.byte_length).sum()
    }
}

/// Where every surface lives in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceLayout {
    /// Chains in storage order; never empty.
    pub faces: Vec<FaceChain>,
    /// Offset of the first surface byte.
    pub data_offset: usize,
}

impl SurfaceLayout {
    /// Mip levels per chain.
    pub fn mip_count(&self) -> usize {
        self.faces.first().map_or(0, |f| f.levels.len())
    }

    /// Levels of the first stored chain.
    pub fn primary(&self) -> &[MipLevel] {
        self.faces.first().map_or(&[], |f| f.levels.as_slice())
    }

    /// Total bytes covered by every chain.
    pub fn byte_length(&self) -> usize {
        self.faces.iter().map(FaceChain::byte_length).sum()
    }

    /// Check if the chains are cube faces.
    pub fn is_cubemap(&self) -> bool {
        self.faces.iter().any(|f| f.face.is_some())
    }
}

/// Byte length of a single mip level.
pub fn level_length(codec: &CodecDescriptor, width: u32, height: u32, depth: u32) -> Option<usize> {
    let slice = match *codec {
        CodecDescriptor::Compressed { block_size, .. } => (width.div_ceil(4) as usize)
            .checked_mul(height.div_ceil(4) as usize)?
            .checked_mul(block_size)?,
        CodecDescriptor::Uncompressed { bits_per_pixel, .. } => (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(bits_per_pixel.div_ceil(8) as usize)?,
    };
    slice.checked_mul(depth.max(1) as usize)
}

/// Halve a dimension `level` times, never dropping below 1.
#[inline]
pub fn mip_dimension(size: u32, level: u32) -> u32 {
    size.checked_shr(level).unwrap_or(0).max(1)
}

/// The chains stored in the file, in order.
///
/// Every chain occupies at least one byte, so more chains than
/// `container_len` cannot fit.
fn chains(headers: &Headers, container_len: usize) -> Result<Vec<(Option<CubeFace>, u32)>> {
    if let Some(dx10) = headers.dx10 {
        let elements = dx10.array_size.max(1);
        let per_element = if dx10.is_cubemap() { 6 } else { 1 };
        if (elements as usize).saturating_mul(per_element) > container_len {
            return Err(Error::CorruptLayout(format!(
                "{elements} array elements cannot fit in {container_len} bytes"
            )));
        }

        let mut chains = Vec::new();
        for element in 0..elements {
            if dx10.is_cubemap() {
                chains.extend(CubeFace::ALL.iter().map(|&face| (Some(face), element)));
            } else {
                chains.push((None, element));
            }
        }
        return Ok(chains);
    }

    let header = &headers.header;
    if header.is_cubemap() {
        let faces: Vec<_> = CubeFace::ALL
            .iter()
            .filter(|face| header.caps2 & face.caps2_bit() != 0)
            .map(|&face| (Some(face), 0))
            .collect();
        if faces.is_empty() {
            return Err(Error::CorruptLayout("cubemap declares no faces".into()));
        }
        return Ok(faces);
    }

    Ok(vec![(None, 0)])
}

/// Compute the offset and length of every mip level of every face.
///
/// Fails with [`Error::CorruptLayout`] when dimensions are zero, when sizes
/// overflow, or when any level would extend past `container_len`.
pub fn plan(headers: &Headers, codec: &CodecDescriptor, container_len: usize) -> Result<SurfaceLayout> {
    let header = &headers.header;

    if header.width == 0 || header.height == 0 {
        return Err(Error::CorruptLayout(format!(
            "zero dimensions {}x{}",
            header.width, header.height
        )));
    }

    let mip_count = header.mip_count();
    let volume = headers.is_volume();
    let data_offset = headers.data_offset();
    let mut offset = data_offset;
    let mut faces = Vec::new();

    for (face, element) in chains(headers, container_len)? {
        let mut levels = Vec::new();

        for level in 0..mip_count {
            let width = mip_dimension(header.width, level);
            let height = mip_dimension(header.height, level);
            let depth = if volume {
                mip_dimension(header.depth, level)
            } else {
                1
            };

            let byte_length = level_length(codec, width, height, depth).ok_or_else(|| {
                Error::CorruptLayout(format!("level {level} size overflows"))
            })?;
            let end = offset
                .checked_add(byte_length)
                .filter(|&end| end <= container_len)
                .ok_or_else(|| {
                    Error::CorruptLayout(format!(
                        "level {level} of {face:?} needs bytes {offset}..{} but file has {container_len}",
                        offset.saturating_add(byte_length)
                    ))
                })?;

            levels.push(MipLevel {
                level,
                width,
                height,
                depth,
                byte_offset: offset,
                byte_length,
            });
            offset = end;
        }

        faces.push(FaceChain {
            face,
            element,
            levels,
        });
    }

    debug!(
        chains = faces.len(),
        mips = mip_count,
        data_end = offset,
        container_len,
        "planned DDS layout"
    );

    Ok(SurfaceLayout { faces, data_offset })
}
