//! JPEG codec for the pictdb image database.
//!
//! Implements [`pictdb::Codec`] with the [`image`] crate: dimension
//! extraction decodes only the JPEG header, while variant generation
//! decodes the full raster, scales it with triangle filtering, and
//! re-encodes it as JPEG.

use std::io::Cursor;

use image::ImageFormat;
use image::imageops::FilterType;
use pictdb::{Codec, Error, Result};

/// JPEG implementation of the engine's codec interface.
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegCodec;

/// Maps any `image` error into the engine's codec error kind.
fn codec_err(e: image::ImageError) -> Error {
    Error::Codec(e.to_string())
}

impl Codec for JpegCodec {
    fn dimensions(&self, bytes: &[u8]) -> Result<(u32, u32)> {
        image::ImageReader::with_format(Cursor::new(bytes), ImageFormat::Jpeg)
            .into_dimensions()
            .map_err(codec_err)
    }

    fn resize(&self, bytes: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
        let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)
            .map_err(codec_err)?;
        let resized = decoded.resize_exact(width, height, FilterType::Triangle);

        let mut out = Cursor::new(Vec::new());
        resized
            .write_to(&mut out, ImageFormat::Jpeg)
            .map_err(codec_err)?;
        Ok(out.into_inner())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Encodes a small synthetic raster as JPEG.
    fn tiny_jpeg(width: u32, height: u32) -> Vec<u8> {
        let raster = image::RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x * 16) as u8, (y * 16) as u8, 128])
        });
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(raster)
            .write_to(&mut out, ImageFormat::Jpeg)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn extracts_dimensions() {
        let jpeg = tiny_jpeg(8, 6);
        assert_eq!(JpegCodec.dimensions(&jpeg).unwrap(), (8, 6));
    }

    #[test]
    fn resize_produces_requested_dimensions() {
        let jpeg = tiny_jpeg(16, 12);
        let variant = JpegCodec.resize(&jpeg, 4, 3).unwrap();
        assert!(!variant.is_empty());
        assert_eq!(JpegCodec.dimensions(&variant).unwrap(), (4, 3));
    }

    #[test]
    fn rejects_non_jpeg_bytes() {
        let garbage = b"definitely not a jpeg";
        assert!(matches!(
            JpegCodec.dimensions(garbage),
            Err(Error::Codec(_))
        ));
        assert!(matches!(
            JpegCodec.resize(garbage, 4, 4),
            Err(Error::Codec(_))
        ));
    }
}
