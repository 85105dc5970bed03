//! Resize and metadata pipeline

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use image::DynamicImage;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::{Config, ResizeMode};
use crate::error::{ErrorContext, ImageUtilError, Result};

pub mod formats;
pub mod metadata;
pub mod options;
pub mod resize;
pub mod validation;

pub use formats::*;
pub use metadata::*;
pub use options::*;
pub use resize::*;
pub use validation::*;

/// Runs resize requests and metadata lookups
#[derive(Debug, Clone, Default)]
pub struct ImageProcessor {
    strictness: Strictness,
    resizer: ImageResizer,
}

impl ImageProcessor {
    /// Create a processor with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a processor from loaded configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            strictness: config.options.strictness,
            resizer: ImageResizer::with_filter(config.processing.filter),
        }
    }

    /// Set how unrecognized option keys are treated
    pub fn strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    /// Read size, MD5 and dimensions of an image file
    pub async fn image_information<P: AsRef<Path>>(&self, path: P) -> Result<ImageInformation> {
        read_image_information(path.as_ref()).await
    }

    /// Validate raw options, then resize
    pub async fn resize_value(&self, options: &Value) -> Result<ResizeOutcome> {
        let request = ResizeRequest::from_value(options, self.strictness)?;
        self.run(request).await
    }

    /// Resize using a request built in code
    pub async fn resize(&self, request: ResizeRequest) -> Result<ResizeOutcome> {
        let request = request.validate()?;
        self.run(request).await
    }

    async fn run(&self, request: ResizeRequest) -> Result<ResizeOutcome> {
        let start_time = Instant::now();
        debug!(
            "Resize request: {:?} -> {:?} ({}x{}, {})",
            request.source, request.destination, request.width, request.height, request.resize_mode
        );

        let destination = check_preconditions(&request).await?;
        ensure_parent_directory(&destination).await?;

        let format = detect_format_from_path(&destination)?;
        let image = self.load_image(&request.source).await?;
        let resized = self
            .resize_image(&request.source, image, request.resize_mode, request.width, request.height)
            .await?;
        self.save_image(resized, &destination, format).await?;

        let information = if request.information {
            Some(read_image_information(&destination).await?)
        } else {
            None
        };

        info!(
            "Resized {:?} -> {:?} in {:.2?}",
            request.source,
            destination,
            start_time.elapsed()
        );

        Ok(ResizeOutcome {
            path: destination,
            information,
        })
    }

    /// Decode an image, sniffing the format from its content
    async fn load_image(&self, path: &Path) -> Result<DynamicImage> {
        debug!("Loading image: {:?}", path);

        let path = path.to_path_buf();
        let task_path = path.clone();
        tokio::task::spawn_blocking(move || -> Result<DynamicImage> {
            image::io::Reader::open(&path)
                .with_file_context(&path)?
                .with_guessed_format()
                .with_file_context(&path)?
                .decode()
                .with_file_context(&path)
        })
        .await
        .map_err(|e| ImageUtilError::task(task_path, e))?
        .map_err(ImageUtilError::into_source)
    }

    async fn resize_image(
        &self,
        source: &Path,
        image: DynamicImage,
        mode: ResizeMode,
        width: u32,
        height: u32,
    ) -> Result<DynamicImage> {
        let resizer = self.resizer;
        tokio::task::spawn_blocking(move || resizer.resize(&image, mode, width, height))
            .await
            .map_err(|e| ImageUtilError::task(source, e))
    }

    /// Encode into a temporary sibling of `destination`, then move it into place
    async fn save_image(
        &self,
        image: DynamicImage,
        destination: &Path,
        format: ImageFormat,
    ) -> Result<()> {
        debug!("Saving image: {:?} ({:?})", destination, format);

        let destination = destination.to_path_buf();
        let task_path = destination.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let image = if format.supports_alpha() {
                image
            } else {
                DynamicImage::ImageRgb8(image.to_rgb8())
            };

            let directory = match destination.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };

            let mut staged = tempfile::Builder::new()
                .prefix(".imgutil-")
                .tempfile_in(&directory)
                .with_file_context(&directory)?;
            {
                let mut writer = BufWriter::new(staged.as_file_mut());
                image
                    .write_to(&mut writer, image::ImageFormat::from(format))
                    .with_file_context(&destination)?;
                writer.flush().with_file_context(&destination)?;
            }

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                staged
                    .as_file()
                    .set_permissions(std::fs::Permissions::from_mode(0o644))
                    .with_file_context(&destination)?;
            }

            staged
                .persist(&destination)
                .map_err(|e| ImageUtilError::io(&destination, e.error))?;
            Ok(())
        })
        .await
        .map_err(|e| ImageUtilError::task(task_path, e))?
    }
}

/// Result of a successful resize
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResizeOutcome {
    /// Where the resized image was written
    pub path: PathBuf,
    /// Metadata of the written file, when requested
    #[serde(flatten)]
    pub information: Option<ImageInformation>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use serde_json::json;
    use tempfile::TempDir;

    fn write_sample(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        RgbImage::from_fn(4, 3, |x, y| Rgb([(x * 60) as u8, (y * 80) as u8, 90]))
            .save(&path)
            .unwrap();
        path
    }

    #[tokio::test]
    async fn test_resize_with_information() {
        let dir = TempDir::new().unwrap();
        let source = write_sample(dir.path(), "test.png");
        let destination = dir.path().join("temp/test_resized.png");

        let outcome = ImageProcessor::new()
            .resize(ResizeRequest::new(&source, &destination, 8, 6))
            .await
            .unwrap();

        assert_eq!(outcome.path, destination);
        let info = outcome.information.unwrap();
        assert_eq!((info.width, info.height), (8, 6));
        assert_eq!(info, read_image_information(&destination).await.unwrap());
    }

    #[tokio::test]
    async fn test_resize_value_without_information() {
        let dir = TempDir::new().unwrap();
        let source = write_sample(dir.path(), "test.png");
        let destination = dir.path().join("out.jpg");

        let outcome = ImageProcessor::new()
            .resize_value(&json!({
                "source": source,
                "destination": destination,
                "width": 8,
                "height": 8,
                "resizeMode": "contain",
                "information": false
            }))
            .await
            .unwrap();

        assert_eq!(outcome.path, destination);
        assert!(outcome.information.is_none());
        assert_eq!(image::image_dimensions(&destination).unwrap(), (8, 8));
        assert_eq!(serde_json::to_value(&outcome).unwrap(), json!({ "path": destination }));
    }

    #[tokio::test]
    async fn test_unsupported_destination_format() {
        let dir = TempDir::new().unwrap();
        let source = write_sample(dir.path(), "test.png");

        let err = ImageProcessor::new()
            .resize(ResizeRequest::new(&source, dir.path().join("out.xyz"), 8, 6))
            .await
            .unwrap_err();
        assert!(matches!(err, ImageUtilError::UnsupportedFormat { .. }));
        assert!(!dir.path().join("out.xyz").exists());
    }

    #[tokio::test]
    async fn test_lenient_processor_drops_extra_keys() {
        let dir = TempDir::new().unwrap();
        let source = write_sample(dir.path(), "test.png");
        let options = json!({
            "source": source,
            "destination": dir.path().join("out.png"),
            "width": 8,
            "height": 6,
            "quality": 90
        });

        assert!(ImageProcessor::new().resize_value(&options).await.is_err());

        let outcome = ImageProcessor::new()
            .strictness(Strictness::Lenient)
            .resize_value(&options)
            .await
            .unwrap();
        assert!(outcome.information.is_some());
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = ResizeOutcome {
            path: PathBuf::from("out.png"),
            information: Some(ImageInformation {
                file_size: 213,
                md5: "dcf4e631bc95f7ad1c5547b19ac0cbbf".to_string(),
                width: 8,
                height: 6,
            }),
        };

        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({
                "path": "out.png",
                "fileSize": 213,
                "md5": "dcf4e631bc95f7ad1c5547b19ac0cbbf",
                "width": 8,
                "height": 6
            })
        );
    }
}
