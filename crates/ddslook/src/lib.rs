//! ddslook - DDS texture previews, thumbnails and metadata.
//!
//! This crate bundles the ddslook library ecosystem and the adapters that
//! feed decoded textures to a host.
//!
//! # Crates
//!
//! - [`ddslook_common`] - Bounds-checked little-endian binary reading
//! - [`ddslook_dds`] - DDS header parsing and BC1-BC5 / RGB decoding
//!
//! # Example
//!
//! ```no_run
//! use ddslook::prelude::*;
//!
//! let data = std::fs::read("Rock_Albedo.dds")?;
//!
//! let info = probe(&data)?;
//! println!("{} {}x{}", info.codec_name, info.width, info.height);
//!
//! let surface = decode(&data, Some(128), Some(128))?;
//! println!("decoded mip {} at {}x{}", surface.level, surface.width, surface.height);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export all sub-crates
pub use ddslook_common as common;
pub use ddslook_dds as dds;

pub mod host;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::host::{
        generate_preview, generate_thumbnail, import_metadata, Attribute, MetadataIndex,
        NeverCancelled, PreviewSurface, RequestStatus, ThumbnailSurface,
    };
    pub use ddslook_common::BinaryReader;
    pub use ddslook_dds::{
        decode, decode_with, probe, DecodeOptions, DecodedSurface, Error, Probe, SurfaceDecoder,
    };
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
