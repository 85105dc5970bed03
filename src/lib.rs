//! imgutil - image metadata and validated single-file resizing
//!
//! Two operations over raster image files:
//!
//! - [`get_image_information`] reports file size, MD5 content hash and pixel
//!   dimensions of an image.
//! - [`resize_image`] validates a set of resize options, checks the
//!   filesystem (source exists and is a file, destination is not the source,
//!   overwrite policy), creates the destination directory, resizes with one of
//!   four [`ResizeMode`]s and optionally reads back the result's metadata.
//!
//! Each step runs in order and the first failure ends the call.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use serde_json::json;
//!
//! # async fn run() -> imgutil::Result<()> {
//! let outcome = imgutil::resize_image(&json!({
//!     "source": "photos/cat.png",
//!     "destination": "thumbs",
//!     "width": 160,
//!     "height": 120,
//!     "resizeMode": "cover"
//! }))
//! .await?;
//!
//! println!("wrote {}", outcome.path.display());
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod processing;

use std::path::Path;

pub use config::{Config, ResizeMode};
pub use error::{ErrorCategory, ImageUtilError, Result};
pub use processing::{
    FilterType, ImageInformation, ImageProcessor, ResizeOutcome, ResizeRequest, Strictness,
};

use tracing::info;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Read file size, MD5 hash and pixel dimensions of the image at `path`
pub async fn get_image_information<P: AsRef<Path>>(path: P) -> Result<ImageInformation> {
    ImageProcessor::new().image_information(path).await
}

/// Validate raw resize options and resize the image they describe.
///
/// `options` must be a JSON object with `source`, `destination`, `width` and
/// `height`, plus optional `resizeMode`, `overwrite` and `information`.
/// Unrecognized keys are rejected.
pub async fn resize_image(options: &serde_json::Value) -> Result<ResizeOutcome> {
    ImageProcessor::new().resize_value(options).await
}

/// Initialize logging with default settings
///
/// Installs a global subscriber filtered by `RUST_LOG`. Calling this more
/// than once is harmless.
pub fn init() -> Result<()> {
    if tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .finish(),
    )
    .is_ok()
    {
        info!("imgutil v{} initialized", VERSION);
    }

    Ok(())
}

/// Initialize logging from configuration
pub fn init_with_config(config: &Config) -> Result<()> {
    config.validate()?;

    let filter = tracing_subscriber::EnvFilter::try_new(&config.logging.level)
        .map_err(|e| ImageUtilError::config(format!("Invalid log level: {}", e)))?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match (&config.logging.file, config.logging.json_format) {
        (Some(file), json) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file)
                .map_err(|e| {
                    ImageUtilError::config(format!("Failed to open log file {:?}: {}", file, e))
                })?;
            let builder = builder.with_writer(std::sync::Mutex::new(file)).with_ansi(false);
            if json {
                tracing::subscriber::set_global_default(builder.json().finish())
            } else {
                tracing::subscriber::set_global_default(builder.finish())
            }
        }
        (None, true) => tracing::subscriber::set_global_default(
            builder.with_writer(std::io::stderr).json().finish(),
        ),
        (None, false) => tracing::subscriber::set_global_default(
            builder.with_writer(std::io::stderr).finish(),
        ),
    };

    if installed.is_ok() {
        info!("imgutil v{} initialized with custom config", VERSION);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
        assert!(VERSION.contains('.'));
    }

    #[test]
    fn test_init() {
        // Should not fail on multiple calls
        let _ = init();
        assert!(init().is_ok());
    }

    #[test]
    fn test_init_with_invalid_config() {
        let mut config = Config::default();
        config.logging.level = String::new();
        assert!(init_with_config(&config).is_err());
    }

    #[tokio::test]
    async fn test_empty_path_is_rejected() {
        let err = get_image_information("").await.unwrap_err();
        assert_eq!(err.to_string(), "Missing or invalid image file path!");
    }

    #[tokio::test]
    async fn test_invalid_mode_is_reported() {
        let err = resize_image(&serde_json::json!({
            "source": "a.png",
            "destination": "b.png",
            "width": 8,
            "height": 6,
            "resizeMode": "scalar"
        }))
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Invalid image resize mode: 'scalar'!");
    }
}
