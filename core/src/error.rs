use thiserror::Error;

/// bpack error types
#[derive(Error, Debug)]
pub enum BpackError {
    /// Caller-supplied tag does not match `name:version`
    #[error("invalid tag '{tag}': tag must be in format 'name:version'")]
    TagFormat { tag: String },

    /// Final artifact name or version could not be resolved
    #[error("{field} is required: provide via tag or metadata")]
    MissingMetadata { field: &'static str },

    /// Embedded metadata file could not be parsed
    #[error("failed to parse metadata file {file}: {message}")]
    MetadataParse { file: String, message: String },

    /// Archive serialization error
    #[error("archive error: {0}")]
    ArchiveError(String),

    /// OCI image construction error
    #[error("OCI image error: {0}")]
    OciImageError(String),

    /// Container registry error
    #[error("registry error: {registry} - {message}")]
    RegistryError { registry: String, message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for BpackError {
    fn from(err: serde_json::Error) -> Self {
        BpackError::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for BpackError {
    fn from(err: serde_yaml::Error) -> Self {
        BpackError::SerializationError(err.to_string())
    }
}

/// Result type alias for bpack operations
pub type Result<T> = std::result::Result<T, BpackError>;
