//! Filesystem precondition checks run before an image is written

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use crate::error::{ErrorContext, ImageUtilError, Result};
use crate::processing::options::ResizeRequest;

/// Check that `request` can be carried out and resolve its final destination.
///
/// A destination without a file extension is taken to be a directory and the
/// source file name is appended to it. Identity between source and destination
/// is decided by the filesystem, never by comparing path strings.
pub async fn check_preconditions(request: &ResizeRequest) -> Result<PathBuf> {
    let source = request.source.as_path();

    let source_metadata = fs::metadata(source)
        .await
        .with_file_context(source)
        .map_err(ImageUtilError::into_source)?;
    if source_metadata.is_dir() {
        return Err(ImageUtilError::InvalidSource {
            path: source.to_path_buf(),
        });
    }

    stat_if_exists(&request.destination).await?;
    let destination = resolve_destination(source, &request.destination);

    if stat_if_exists(&destination).await?.is_some() {
        if refers_to_same_file(source, &destination).await? {
            return Err(ImageUtilError::SameFile {
                source_path: source.to_path_buf(),
                destination,
            });
        }

        if !request.overwrite {
            return Err(ImageUtilError::AlreadyExists { path: destination });
        }

        debug!("Overwriting existing destination: {:?}", destination);
    }

    Ok(destination)
}

/// Append the source file name when `destination` has no extension
pub fn resolve_destination(source: &Path, destination: &Path) -> PathBuf {
    if destination.extension().is_some() {
        return destination.to_path_buf();
    }

    match source.file_name() {
        Some(name) => destination.join(name),
        None => destination.to_path_buf(),
    }
}

/// Create every missing directory above `destination`
pub async fn ensure_parent_directory(destination: &Path) -> Result<()> {
    let parent = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => return Ok(()),
    };

    debug!("Ensuring directory exists: {:?}", parent);

    fs::create_dir_all(parent)
        .await
        .map_err(|source| ImageUtilError::DirectoryCreation {
            path: parent.to_path_buf(),
            source,
        })
}

async fn stat_if_exists(path: &Path) -> Result<Option<std::fs::Metadata>> {
    match fs::metadata(path).await {
        Ok(metadata) => Ok(Some(metadata)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ImageUtilError::io(path, e)),
    }
}

async fn refers_to_same_file(source: &Path, destination: &Path) -> Result<bool> {
    let (a, b) = (source.to_path_buf(), destination.to_path_buf());
    tokio::task::spawn_blocking(move || same_file::is_same_file(&a, &b))
        .await
        .map_err(|e| ImageUtilError::task(destination, e))?
        .with_file_context(destination)
}
