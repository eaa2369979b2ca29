//! PNG encoding and decoding for generated artifacts.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use aruco_gen_core::{GrayImage, ImageError};

#[derive(thiserror::Error, Debug)]
pub enum PrintIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("png encoding failed: {0}")]
    PngEncode(#[from] png::EncodingError),
    #[error("png decoding failed: {0}")]
    PngDecode(#[from] png::DecodingError),
    #[error("unsupported png layout: {0:?}")]
    UnsupportedColor(png::ColorType),
    #[error(transparent)]
    Image(#[from] ImageError),
}

/// Shape of a decoded image, reported as `(height, width, channels)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageInfo {
    pub height: usize,
    pub width: usize,
    pub channels: usize,
}

impl std::fmt::Display for ImageInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.height, self.width, self.channels)
    }
}

/// Write an 8-bit grayscale PNG.
pub fn write_png(path: impl AsRef<Path>, img: &GrayImage) -> Result<(), PrintIoError> {
    let file = File::create(path)?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), img.width as u32, img.height as u32);
    encoder.set_color(png::ColorType::Grayscale);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&img.data)?;
    writer.finish()?;
    Ok(())
}

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * 299 + g as u32 * 587 + b as u32 * 114 + 500) / 1000) as u8
}

/// Read a PNG back as grayscale.
///
/// Palette and sub-byte images are expanded and 16-bit samples stripped to 8
/// bits; color input is converted to luma. The returned [`ImageInfo`]
/// describes the file as decoded, before the luma conversion.
pub fn read_png(path: impl AsRef<Path>) -> Result<(GrayImage, ImageInfo), PrintIoError> {
    let file = File::open(path)?;
    let mut decoder = png::Decoder::new(BufReader::new(file));
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info()?;

    let (color, _) = reader.output_color_type();
    let (width, height) = {
        let info = reader.info();
        (info.width as usize, info.height as usize)
    };
    let channels = color.samples();
    let mut buf = vec![0u8; width * height * channels];
    let frame = reader.next_frame(&mut buf)?;
    buf.truncate(frame.buffer_size());

    let data: Vec<u8> = match color {
        png::ColorType::Grayscale => buf,
        png::ColorType::GrayscaleAlpha => buf.chunks_exact(2).map(|px| px[0]).collect(),
        png::ColorType::Rgb => buf
            .chunks_exact(3)
            .map(|px| luma(px[0], px[1], px[2]))
            .collect(),
        png::ColorType::Rgba => buf
            .chunks_exact(4)
            .map(|px| luma(px[0], px[1], px[2]))
            .collect(),
        other => return Err(PrintIoError::UnsupportedColor(other)),
    };

    let img = GrayImage::from_raw(width, height, data)?;
    Ok((
        img,
        ImageInfo {
            height,
            width,
            channels,
        },
    ))
}
