//! Error types and handling for imgutil

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for imgutil operations
pub type Result<T> = std::result::Result<T, ImageUtilError>;

/// Main error type for imgutil operations
#[derive(Debug, Error)]
pub enum ImageUtilError {
    /// Resize options failed schema validation
    #[error("{message}")]
    Validation { message: String },

    /// Image path argument was empty or unusable
    #[error("Missing or invalid image file path!")]
    MissingPath,

    /// A file that must exist was not found
    #[error("File not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Source path exists but cannot be used as an image source
    #[error("Source image path cannot be a directory!")]
    InvalidSource { path: PathBuf },

    /// Source exists but could not be read
    #[error("Cannot read source image {}: {source}", path.display())]
    UnreadableSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Source and destination resolve to the same underlying file
    #[error("Source and destination file are the same!")]
    SameFile {
        source_path: PathBuf,
        destination: PathBuf,
    },

    /// Destination exists and overwriting was not requested
    #[error("Destination file already exists!")]
    AlreadyExists { path: PathBuf },

    /// Destination parent directory could not be created
    #[error("Failed to create directory {}: {source}", path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Destination extension does not map to an encodable format
    #[error("Unsupported image format: {format} (file: {file:?})")]
    UnsupportedFormat { format: String, file: Option<PathBuf> },

    /// Image decode or encode failure
    #[error("Image processing error for {}: {source}", path.display())]
    Codec {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Any other filesystem failure
    #[error("I/O error for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failure while reading size, hash or dimensions of an image file
    #[error("Failed to read image information for {}: {source}", path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: Box<ImageUtilError>,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serde(String),
}

/// Coarse grouping of errors by the pipeline step that raised them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Source,
    DestinationConflict,
    DirectoryCreation,
    Codec,
    Metadata,
    Filesystem,
    Configuration,
}

impl ImageUtilError {
    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new unsupported format error
    pub fn unsupported_format<S: Into<String>>(format: S, file: Option<PathBuf>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
            file,
        }
    }

    /// Wrap an I/O error for `path`, promoting `NotFound` to its own variant
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Io { path, source }
        }
    }

    /// Wrap a failed blocking task that was working on `path`
    pub fn task(path: impl Into<PathBuf>, err: tokio::task::JoinError) -> Self {
        Self::Io {
            path: path.into(),
            source: io::Error::new(io::ErrorKind::Other, format!("Task join error: {}", err)),
        }
    }

    /// Attribute a filesystem failure to the source image
    pub fn into_source(self) -> Self {
        match self {
            Self::Io { path, source } => Self::UnreadableSource { path, source },
            other => other,
        }
    }

    /// Attribute an error to the metadata reader working on `path`
    pub fn into_metadata(self, path: &Path) -> Self {
        match self {
            Self::MissingPath | Self::Metadata { .. } => self,
            other => Self::Metadata {
                path: path.to_path_buf(),
                source: Box::new(other),
            },
        }
    }

    /// Pipeline step this error belongs to
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } | Self::MissingPath => ErrorCategory::Validation,
            Self::NotFound { .. } | Self::InvalidSource { .. } | Self::UnreadableSource { .. } => {
                ErrorCategory::Source
            }
            Self::SameFile { .. } | Self::AlreadyExists { .. } => {
                ErrorCategory::DestinationConflict
            }
            Self::DirectoryCreation { .. } => ErrorCategory::DirectoryCreation,
            Self::UnsupportedFormat { .. } | Self::Codec { .. } => ErrorCategory::Codec,
            Self::Metadata { .. } => ErrorCategory::Metadata,
            Self::Io { .. } => ErrorCategory::Filesystem,
            Self::Config { .. } | Self::Serde(_) => ErrorCategory::Configuration,
        }
    }

    /// True when the error reports a missing file
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Metadata { source, .. } => source.is_not_found(),
            Self::Io { source, .. }
            | Self::UnreadableSource { source, .. }
            | Self::DirectoryCreation { source, .. } => {
                source.kind() == io::ErrorKind::NotFound
            }
            Self::Codec {
                source: image::ImageError::IoError(e),
                ..
            } => e.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// Get the associated file path if available
    pub fn file_path(&self) -> Option<&Path> {
        match self {
            Self::NotFound { path }
            | Self::InvalidSource { path }
            | Self::AlreadyExists { path }
            | Self::DirectoryCreation { path, .. }
            | Self::Codec { path, .. }
            | Self::UnreadableSource { path, .. }
            | Self::Metadata { path, .. }
            | Self::Io { path, .. } => Some(path),
            Self::SameFile { destination, .. } => Some(destination),
            Self::UnsupportedFormat { file, .. } => file.as_deref(),
            _ => None,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound { path } => format!("No such file: {}", path.display()),
            Self::UnsupportedFormat { format, .. } => format!(
                "Unsupported image format: {}. Supported formats: JPEG, PNG, WebP, GIF, TIFF, BMP",
                format
            ),
            Self::Codec { path, source } => {
                format!("Could not process image {}: {}", path.display(), source)
            }
            Self::Metadata { source, .. } => source.user_message(),
            other => other.to_string(),
        }
    }
}

impl From<toml::de::Error> for ImageUtilError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serde(format!("TOML parsing error: {}", err))
    }
}

impl From<serde_yaml::Error> for ImageUtilError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serde(format!("YAML parsing error: {}", err))
    }
}

/// Error context extension for attaching the file path to low-level errors
pub trait ErrorContext<T> {
    /// Add file context to an error
    fn with_file_context(self, file: &Path) -> Result<T>;
}

impl<T> ErrorContext<T> for std::result::Result<T, io::Error> {
    fn with_file_context(self, file: &Path) -> Result<T> {
        self.map_err(|e| ImageUtilError::io(file, e))
    }
}

impl<T> ErrorContext<T> for std::result::Result<T, image::ImageError> {
    fn with_file_context(self, file: &Path) -> Result<T> {
        self.map_err(|e| match e {
            image::ImageError::IoError(io) => ImageUtilError::io(file, io),
            image::ImageError::Unsupported(u) => {
                ImageUtilError::unsupported_format(u.to_string(), Some(file.to_path_buf()))
            }
            other => ImageUtilError::Codec {
                path: file.to_path_buf(),
                source: other,
            },
        })
    }
}
