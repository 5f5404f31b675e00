//! Image-format converter.

use std::path::Path;

use image::DynamicImage;
use tracing::{debug, info};

use crate::error::{Error, Result};

pub use image::ImageFormat;

/// Target format from the output file extension.
pub fn format_for_path(path: &Path) -> Result<ImageFormat> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| Error::InvalidInput(format!("{} has no file extension", path.display())))?;
    let format = ImageFormat::from_extension(ext)
        .ok_or_else(|| Error::InvalidInput(format!("unsupported image format: .{}", ext)))?;
    if !format.can_write() {
        return Err(Error::InvalidInput(format!("cannot write .{} images", ext)));
    }
    Ok(format)
}

/// Decode `input` and write it to `output` as `format`, or the format
/// implied by `output`'s extension.
pub fn convert_image(input: &Path, output: &Path, format: Option<ImageFormat>) -> Result<()> {
    let format = match format {
        Some(f) => f,
        None => format_for_path(output)?,
    };

    let image = image::open(input)?;
    debug!(
        "Decoded {} ({}x{}, {:?})",
        input.display(),
        image.width(),
        image.height(),
        image.color()
    );

    let image = flatten_for(format, image);
    image.save_with_format(output, format)?;
    info!("Converted {} -> {}", input.display(), output.display());
    Ok(())
}

/// Formats without an alpha channel get plain RGB8.
fn flatten_for(format: ImageFormat, image: DynamicImage) -> DynamicImage {
    match format {
        ImageFormat::Jpeg | ImageFormat::Bmp => DynamicImage::ImageRgb8(image.to_rgb8()),
        _ => image,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ColorType, Rgba, RgbaImage};
    use tempfile::TempDir;

    fn write_png(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("icon.png");
        let mut img = RgbaImage::new(4, 3);
        for (x, _, pixel) in img.enumerate_pixels_mut() {
            *pixel = Rgba([x as u8 * 60, 10, 200, 128]);
        }
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn test_png_to_jpeg_drops_alpha() {
        let dir = TempDir::new().unwrap();
        let input = write_png(dir.path());
        let output = dir.path().join("icon.jpg");

        convert_image(&input, &output, None).unwrap();
        let converted = image::open(&output).unwrap();
        assert_eq!((converted.width(), converted.height()), (4, 3));
        assert_eq!(converted.color(), ColorType::Rgb8);
    }

    #[test]
    fn test_explicit_format_overrides_extension() {
        let dir = TempDir::new().unwrap();
        let input = write_png(dir.path());
        let output = dir.path().join("icon.out");

        convert_image(&input, &output, Some(ImageFormat::Bmp)).unwrap();
        let bytes = std::fs::read(&output).unwrap();
        assert_eq!(&bytes[..2], b"BM");
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let input = write_png(dir.path());

        let err = convert_image(&input, &dir.path().join("icon.xyz"), None).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        let err = convert_image(&input, &dir.path().join("icon"), None).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_undecodable_input() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("broken.png");
        std::fs::write(&input, b"not an image").unwrap();

        let err = convert_image(&input, &dir.path().join("out.jpg"), None).unwrap_err();
        assert!(matches!(err, Error::Image(_)));
    }
}
