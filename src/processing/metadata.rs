//! File size, content hash and pixel dimensions of an image file

use std::io;
use std::path::{Path, PathBuf};

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use crate::error::{ErrorContext, ImageUtilError, Result};

/// Metadata of an image file on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInformation {
    /// Size in bytes
    pub file_size: u64,
    /// Lowercase hex MD5 of the file content
    pub md5: String,
    pub width: u32,
    pub height: u32,
}

/// Read size, MD5 and dimensions of the image at `path`.
///
/// Every failure past the path check is reported as [`ImageUtilError::Metadata`].
pub async fn read_image_information(path: &Path) -> Result<ImageInformation> {
    if path.as_os_str().is_empty() || path.to_str().is_some_and(|s| s.trim().is_empty()) {
        return Err(ImageUtilError::MissingPath);
    }

    collect_information(path)
        .await
        .map_err(|e| e.into_metadata(path))
}

async fn collect_information(path: &Path) -> Result<ImageInformation> {
    debug!("Reading image information: {:?}", path);

    let metadata = fs::metadata(path).await.with_file_context(path)?;
    if !metadata.is_file() {
        return Err(ImageUtilError::Io {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
        });
    }

    let md5 = file_md5(path).await?;
    let (width, height) = probe_dimensions(path.to_path_buf()).await?;

    let info = ImageInformation {
        file_size: metadata.len(),
        md5,
        width,
        height,
    };

    debug!("Image information for {:?}: {:?}", path, info);
    Ok(info)
}

/// Lowercase hex MD5 digest of the whole file
pub async fn file_md5(path: &Path) -> Result<String> {
    let data = fs::read(path).await.with_file_context(path)?;
    Ok(format!("{:x}", Md5::digest(&data)))
}

/// Pixel dimensions from the image header, without decoding pixel data
async fn probe_dimensions(path: PathBuf) -> Result<(u32, u32)> {
    let task_path = path.clone();
    tokio::task::spawn_blocking(move || -> Result<(u32, u32)> {
        image::io::Reader::open(&path)
            .with_file_context(&path)?
            .with_guessed_format()
            .with_file_context(&path)?
            .into_dimensions()
            .with_file_context(&path)
    })
    .await
    .map_err(|e| ImageUtilError::task(task_path, e))?
}
