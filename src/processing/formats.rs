//! Destination format detection

use std::path::Path;

use crate::error::{ImageUtilError, Result};

/// Image formats the resize pipeline can encode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    WebP,
    Gif,
    Tiff,
    Bmp,
}

impl ImageFormat {
    /// Whether the encoder accepts an alpha channel
    pub fn supports_alpha(self) -> bool {
        !matches!(self, Self::Jpeg)
    }
}

/// Convert our ImageFormat to image crate format
impl From<ImageFormat> for image::ImageFormat {
    fn from(format: ImageFormat) -> Self {
        match format {
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::WebP => image::ImageFormat::WebP,
            ImageFormat::Gif => image::ImageFormat::Gif,
            ImageFormat::Tiff => image::ImageFormat::Tiff,
            ImageFormat::Bmp => image::ImageFormat::Bmp,
        }
    }
}

/// Detect the output format implied by a destination's extension
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<ImageFormat> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or_else(|| {
            ImageUtilError::unsupported_format("Unknown".to_string(), Some(path.to_path_buf()))
        })?;

    match extension.to_lowercase().as_str() {
        "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
        "png" => Ok(ImageFormat::Png),
        "webp" => Ok(ImageFormat::WebP),
        "gif" => Ok(ImageFormat::Gif),
        "tiff" | "tif" => Ok(ImageFormat::Tiff),
        "bmp" => Ok(ImageFormat::Bmp),
        _ => Err(ImageUtilError::unsupported_format(
            extension.to_string(),
            Some(path.to_path_buf()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(detect_format_from_path("a/b.PNG").unwrap(), ImageFormat::Png);
        assert_eq!(detect_format_from_path("b.jpeg").unwrap(), ImageFormat::Jpeg);
        assert_eq!(detect_format_from_path("b.tif").unwrap(), ImageFormat::Tiff);
        assert!(matches!(
            detect_format_from_path("b.json"),
            Err(ImageUtilError::UnsupportedFormat { .. })
        ));
        assert!(detect_format_from_path("noextension").is_err());
    }

    #[test]
    fn test_alpha_support() {
        assert!(!ImageFormat::Jpeg.supports_alpha());
        assert!(ImageFormat::Png.supports_alpha());
        assert!(ImageFormat::WebP.supports_alpha());
    }
}
