//! Error types for the registration definition pipeline.

use std::path::PathBuf;

/// Pipeline errors.
#[derive(Debug, thiserror::Error)]
pub enum RegdefError {
    /// Template file does not exist.
    #[error("cannot find registration definition template: {}", path.display())]
    TemplateMissing { path: PathBuf },

    /// Template file exists but could not be read.
    #[error("cannot read registration definition template {}: {message}", path.display())]
    TemplateUnreadable { path: PathBuf, message: String },

    /// Template is not a JSON object.
    #[error("corrupted registration definition template {}: {message}", path.display())]
    TemplateCorrupt { path: PathBuf, message: String },

    /// Trust inspection could not be run or exited non-zero.
    #[error("unable to inspect the container image '{repository}': {message}")]
    InspectionFailed { repository: String, message: String },

    /// Trust inspection output did not have the expected shape.
    #[error("problem inspecting the container image '{repository}': {message}")]
    MalformedOutput { repository: String, message: String },

    /// No `Root` administrative key with an ID.
    #[error("unable to find ID of Root signing key for '{repository}'")]
    RootKeyNotFound { repository: String },

    /// No metadata file exists for the repository.
    #[error("no trust metadata for '{repository}' under {}", store.display())]
    KeyFileNotFound { repository: String, store: PathBuf },

    /// Metadata file could not be read or parsed.
    #[error("cannot read container metadata file {}: {message}", path.display())]
    KeyFileCorrupt { path: PathBuf, message: String },

    /// Metadata files exist but none carries the key.
    #[error("root key {key_id} not found in trust metadata for '{repository}'")]
    KeyIdNotFound { repository: String, key_id: String },

    /// Vendor key file does not exist.
    #[error("cannot find vendor key file '{}'", path.display())]
    FileMissing { path: PathBuf },

    /// Vendor key file could not be read.
    #[error("cannot read vendor key file '{}': {message}", path.display())]
    FileUnreadable { path: PathBuf, message: String },

    /// A required output field ended up empty.
    #[error("registration definition field '{field}' is empty")]
    IncompleteDefinition { field: &'static str },

    /// Interactive password entry failed.
    #[error("password prompt failed: {message}")]
    CredentialPrompt { message: String },

    /// The assembled document could not be serialized.
    #[error("failed to serialize registration definition: {message}")]
    Serialize { message: String },
}

impl RegdefError {
    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            // Template / local configuration
            Self::TemplateMissing { .. } => 1,
            Self::TemplateUnreadable { .. } => 1,
            Self::TemplateCorrupt { .. } => 1,
            Self::IncompleteDefinition { .. } => 1,
            Self::Serialize { .. } => 1,

            // Trust inspection
            Self::InspectionFailed { .. } => 7,
            Self::MalformedOutput { .. } => 7,

            // Key resolution
            Self::RootKeyNotFound { .. } => 3,
            Self::KeyFileNotFound { .. } => 3,
            Self::KeyFileCorrupt { .. } => 3,
            Self::KeyIdNotFound { .. } => 3,

            // Vendor key
            Self::FileMissing { .. } => 4,
            Self::FileUnreadable { .. } => 4,

            // Interaction
            Self::CredentialPrompt { .. } => 5,
        }
    }

    /// Pipeline stage that produced the error, for diagnostics.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::TemplateMissing { .. }
            | Self::TemplateUnreadable { .. }
            | Self::TemplateCorrupt { .. } => "template",
            Self::InspectionFailed { .. } | Self::MalformedOutput { .. } => "trust inspection",
            Self::RootKeyNotFound { .. } => "root key",
            Self::KeyFileNotFound { .. }
            | Self::KeyFileCorrupt { .. }
            | Self::KeyIdNotFound { .. } => "public key",
            Self::FileMissing { .. } | Self::FileUnreadable { .. } => "vendor key",
            Self::IncompleteDefinition { .. } | Self::Serialize { .. } => "assembly",
            Self::CredentialPrompt { .. } => "credentials",
        }
    }
}

/// Result type for pipeline operations.
pub type RegdefResult<T> = Result<T, RegdefError>;
