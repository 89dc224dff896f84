//! Synthetic DDS files for integration tests.

#![allow(dead_code)]

use ddslook_dds::{caps, caps2, flags, pf_flags, FourCC, RawDx10Header, RawHeader, DDS_MAGIC};
use zerocopy::byteorder::little_endian::U32;
use zerocopy::{FromZeros, IntoBytes};

pub const RED: u16 = 0xF800;
pub const BLUE: u16 = 0x001F;

/// Builds a DDS header and appends a caller-supplied payload.
#[derive(Clone)]
pub struct DdsBuilder {
    header: RawHeader,
    dx10: Option<RawDx10Header>,
}

impl DdsBuilder {
    pub fn new(width: u32, height: u32) -> Self {
        let mut header = RawHeader::new_zeroed();
        header.size = U32::new(RawHeader::SIZE as u32);
        header.flags = U32::new(flags::CAPS | flags::HEIGHT | flags::WIDTH | flags::PIXEL_FORMAT);
        header.width = U32::new(width);
        header.height = U32::new(height);
        header.pixel_format.size = U32::new(32);
        header.caps = U32::new(caps::TEXTURE);
        Self { header, dx10: None }
    }

    pub fn four_cc(mut self, four_cc: FourCC) -> Self {
        self.header.pixel_format.flags = U32::new(pf_flags::FOURCC);
        self.header.pixel_format.four_cc = four_cc;
        self
    }

    pub fn rgb(mut self, bits: u32, r: u32, g: u32, b: u32, a: u32) -> Self {
        let pf = &mut self.header.pixel_format;
        let alpha = if a != 0 { pf_flags::ALPHAPIXELS } else { 0 };
        pf.flags = U32::new(pf_flags::RGB | alpha);
        pf.rgb_bit_count = U32::new(bits);
        pf.r_bit_mask = U32::new(r);
        pf.g_bit_mask = U32::new(g);
        pf.b_bit_mask = U32::new(b);
        pf.a_bit_mask = U32::new(a);
        self
    }

    pub fn argb8888(self) -> Self {
        self.rgb(32, 0x00FF_0000, 0x0000_FF00, 0x0000_00FF, 0xFF00_0000)
    }

    pub fn luminance8(mut self) -> Self {
        let pf = &mut self.header.pixel_format;
        pf.flags = U32::new(pf_flags::LUMINANCE);
        pf.rgb_bit_count = U32::new(8);
        pf.r_bit_mask = U32::new(0xFF);
        self
    }

    pub fn mips(mut self, count: u32) -> Self {
        self.header.flags = U32::new(self.header.flags.get() | flags::MIPMAP_COUNT);
        self.header.mipmap_count = U32::new(count);
        self.header.caps = U32::new(caps::TEXTURE | caps::COMPLEX | caps::MIPMAP);
        self
    }

    pub fn cubemap(mut self, face_bits: u32) -> Self {
        self.header.caps2 = U32::new(caps2::CUBEMAP | face_bits);
        self.header.caps = U32::new(self.header.caps.get() | caps::COMPLEX);
        self
    }

    pub fn volume(mut self, depth: u32) -> Self {
        self.header.flags = U32::new(self.header.flags.get() | flags::DEPTH);
        self.header.depth = U32::new(depth);
        self.header.caps2 = U32::new(caps2::VOLUME);
        self.header.caps = U32::new(self.header.caps.get() | caps::COMPLEX);
        self
    }

    pub fn dx10(mut self, dxgi_format: u32, misc_flag: u32, array_size: u32) -> Self {
        let mut ext = RawDx10Header::new_zeroed();
        ext.dxgi_format = U32::new(dxgi_format);
        ext.resource_dimension = U32::new(3);
        ext.misc_flag = U32::new(misc_flag);
        ext.array_size = U32::new(array_size);
        self.dx10 = Some(ext);
        self.four_cc(FourCC::DX10)
    }

    pub fn build(&self, payload: &[u8]) -> Vec<u8> {
        let mut bytes = DDS_MAGIC.to_vec();
        bytes.extend_from_slice(self.header.as_bytes());
        if let Some(ext) = &self.dx10 {
            bytes.extend_from_slice(ext.as_bytes());
        }
        bytes.extend_from_slice(payload);
        bytes
    }
}

/// An 8-byte BC1 block.
pub fn bc1_block(c0: u16, c1: u16, indices: u32) -> [u8; 8] {
    let mut block = [0u8; 8];
    block[0..2].copy_from_slice(&c0.to_le_bytes());
    block[2..4].copy_from_slice(&c1.to_le_bytes());
    block[4..8].copy_from_slice(&indices.to_le_bytes());
    block
}

/// RGBA value of the pixel at (`x`, `y`).
pub fn texel(rgba: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * width + x) * 4) as usize;
    [rgba[i], rgba[i + 1], rgba[i + 2], rgba[i + 3]]
}
