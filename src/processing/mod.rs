//! Decode, resize and encode of a single image file

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use tracing::debug;

use crate::error::{Result, ScalerError};

pub mod resize;

pub use resize::*;

/// Outputs are always JPEG at this quality
pub const JPEG_QUALITY: u8 = 100;

/// Turns one source file into one resized destination file.
///
/// Holds no per-file state, so one instance is shared by every worker.
#[derive(Debug, Clone, Default)]
pub struct ImageTransformer {
    resizer: ImageResizer,
}

impl ImageTransformer {
    pub fn new(filter: FilterType) -> Self {
        Self {
            resizer: ImageResizer::with_filter(filter),
        }
    }

    /// Read, decode, resize, encode and write one image.
    ///
    /// The destination is only created once encoding has succeeded, so a
    /// failed item never leaves a partial output behind. Returns the
    /// dimensions written.
    pub fn transform(
        &self,
        source: &Path,
        dest: &Path,
        width: u32,
        height: u32,
    ) -> Result<(u32, u32)> {
        let bytes = read_source(source)?;
        let image = decode(&bytes, source)?;
        let resized = self.resizer.resize_exact(&image, width, height)?;
        let encoded = encode_jpeg(&resized, dest)?;

        std::fs::write(dest, &encoded).map_err(|source| ScalerError::WriteFailed {
            file: dest.to_path_buf(),
            source,
        })?;

        debug!("Wrote {:?} ({} bytes)", dest, encoded.len());
        Ok((resized.width(), resized.height()))
    }
}

/// Read the whole source file; the handle is closed on return
fn read_source(path: &Path) -> Result<Vec<u8>> {
    let unreadable = |source: std::io::Error| ScalerError::SourceUnreadable {
        file: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(unreadable)?;
    let mut reader = BufReader::new(file);
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).map_err(unreadable)?;
    Ok(bytes)
}

fn decode(bytes: &[u8], path: &Path) -> Result<DynamicImage> {
    image::load_from_memory(bytes).map_err(|source| ScalerError::Decode {
        file: path.to_path_buf(),
        source,
    })
}

/// Encode to JPEG in memory; alpha is dropped
pub fn encode_jpeg(image: &DynamicImage, dest: &Path) -> Result<Vec<u8>> {
    let rgb = image.to_rgb8();
    let mut buffer = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY);
    encoder.encode_image(&rgb).map_err(|source| ScalerError::Encode {
        file: dest.to_path_buf(),
        source,
    })?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb, Rgba};
    use tempfile::TempDir;

    fn write_jpeg(path: &Path, width: u32, height: u32) {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        img.save(path).unwrap();
    }

    #[test]
    fn test_transform_writes_exact_dimensions() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("wide.jpg");
        let dst = dir.path().join("out.jpg");
        write_jpeg(&src, 320, 90);

        let dims = ImageTransformer::default().transform(&src, &dst, 64, 64).unwrap();
        assert_eq!(dims, (64, 64));
        assert_eq!(image::image_dimensions(&dst).unwrap(), (64, 64));
    }

    #[test]
    fn test_missing_source_is_unreadable() {
        let dir = TempDir::new().unwrap();
        let err = ImageTransformer::default()
            .transform(&dir.path().join("nope.jpg"), &dir.path().join("out.jpg"), 8, 8)
            .unwrap_err();
        assert!(matches!(err, ScalerError::SourceUnreadable { .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_corrupt_source_leaves_no_output() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("broken.jpg");
        let dst = dir.path().join("out.jpg");
        std::fs::write(&src, [0xFF, 0xD8, 0xFF, 0xE0, 0x00]).unwrap();

        let err = ImageTransformer::default().transform(&src, &dst, 8, 8).unwrap_err();
        assert!(matches!(err, ScalerError::Decode { .. }));
        assert!(!dst.exists());
    }

    #[test]
    fn test_missing_destination_dir_is_write_failure() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("a.jpg");
        write_jpeg(&src, 16, 16);

        let err = ImageTransformer::default()
            .transform(&src, &dir.path().join("missing").join("a.jpg"), 8, 8)
            .unwrap_err();
        assert!(matches!(err, ScalerError::WriteFailed { .. }));
    }

    #[test]
    fn test_encode_drops_alpha() {
        let rgba = DynamicImage::ImageRgba8(ImageBuffer::from_pixel(4, 4, Rgba([1, 2, 3, 4])));
        let bytes = encode_jpeg(&rgba, Path::new("x.jpg")).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_transform_is_deterministic() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("a.jpg");
        write_jpeg(&src, 100, 50);
        let first = dir.path().join("one.jpg");
        let second = dir.path().join("two.jpg");

        let transformer = ImageTransformer::default();
        transformer.transform(&src, &first, 32, 32).unwrap();
        transformer.transform(&src, &second, 32, 32).unwrap();
        assert_eq!(std::fs::read(first).unwrap(), std::fs::read(second).unwrap());
    }
}
