//! Core types shared by the `aruco-gen-*` crates.
//!
//! This crate is intentionally small: an owned 8-bit grayscale raster with the
//! handful of drawing primitives marker and board rendering need, plus the
//! logger used by the command-line tool.

mod image;
mod logger;

pub use image::{GrayImage, GrayImageView, ImageError, MAX_PIXELS};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
