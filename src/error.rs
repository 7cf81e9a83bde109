//! Error types and handling for ImageScaler

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ImageScaler operations
pub type Result<T> = std::result::Result<T, ScalerError>;

/// Main error type for ImageScaler operations
#[derive(Debug, Error)]
pub enum ScalerError {
    /// I/O related errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Invalid resize parameters
    #[error("Invalid resize parameters: {message}")]
    InvalidParameters { message: String },

    /// The input directory could not be listed
    #[error("Cannot read input directory {path:?}: {source}")]
    InputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output directory could not be created
    #[error("Cannot prepare output directory {path:?}: {source}")]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source file could not be opened or read
    #[error("Cannot read source file {file:?}: {source}")]
    SourceUnreadable {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source bytes are not a decodable image
    #[error("Failed to decode {file:?}: {source}")]
    Decode {
        file: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Resized raster could not be encoded
    #[error("Failed to encode {file:?}: {source}")]
    Encode {
        file: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Encoded bytes could not be written to the destination
    #[error("Failed to write {file:?}: {source}")]
    WriteFailed {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Pipeline stage failures (panicked or unspawnable threads)
    #[error("Parallel processing error: {message}")]
    ParallelError { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    SerdeError(String),
}

impl ScalerError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new invalid parameters error
    pub fn invalid_parameters<S: Into<String>>(message: S) -> Self {
        Self::InvalidParameters {
            message: message.into(),
        }
    }

    /// Create a new parallel processing error
    pub fn parallel<S: Into<String>>(message: S) -> Self {
        Self::ParallelError {
            message: message.into(),
        }
    }

    /// Check if this error only affects a single work item.
    ///
    /// Recoverable errors are skipped by the transform pool; everything
    /// else aborts the run.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::SourceUnreadable { .. }
            | Self::Decode { .. }
            | Self::Encode { .. }
            | Self::WriteFailed { .. } => true,

            Self::IoError(_)
            | Self::ConfigError { .. }
            | Self::InvalidParameters { .. }
            | Self::InputDirectory { .. }
            | Self::OutputDirectory { .. }
            | Self::ParallelError { .. }
            | Self::SerdeError(_) => false,
        }
    }

    /// Get the associated file path if available
    pub fn file_path(&self) -> Option<&PathBuf> {
        match self {
            Self::SourceUnreadable { file, .. }
            | Self::Decode { file, .. }
            | Self::Encode { file, .. }
            | Self::WriteFailed { file, .. } => Some(file),

            Self::InputDirectory { path, .. } | Self::OutputDirectory { path, .. } => Some(path),

            _ => None,
        }
    }

    /// Short reason used when a work item is skipped
    pub fn skip_reason(&self) -> &'static str {
        match self {
            Self::SourceUnreadable { .. } => "unreadable",
            Self::Decode { .. } => "undecodable",
            Self::Encode { .. } => "unencodable",
            Self::WriteFailed { .. } => "unwritable",
            _ => "failed",
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::InputDirectory { path, source } => {
                format!("Input directory {} could not be read: {}", path.display(), source)
            }
            Self::OutputDirectory { path, source } => {
                format!("Output directory {} could not be created: {}", path.display(), source)
            }
            Self::Decode { file, .. } => {
                format!("{} is not a readable image", file.display())
            }
            other => other.to_string(),
        }
    }
}

impl From<toml::de::Error> for ScalerError {
    fn from(err: toml::de::Error) -> Self {
        Self::SerdeError(format!("TOML parsing error: {}", err))
    }
}

impl From<serde_yaml::Error> for ScalerError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::SerdeError(format!("YAML parsing error: {}", err))
    }
}
