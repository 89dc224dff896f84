//! Common utilities for ddslook.
//!
//! This crate provides the foundational pieces shared by the ddslook crates:
//!
//! - [`BinaryReader`] - Bounds-checked, zero-copy little-endian reading from byte slices
//! - [`Error`] - Errors raised while reading

mod error;
mod reader;

pub use error::{Error, Result};
pub use reader::BinaryReader;
