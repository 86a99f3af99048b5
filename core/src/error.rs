use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Codec errors
// ---------------------------------------------------------------------------

/// Errors raised while decoding or encoding a parameter document.
///
/// These carry no file location; the store attaches one with
/// [`CodecError::at`] before handing the error to callers.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The text is not well-formed YAML.
    #[error("not well-formed YAML: {0}")]
    Parse(#[source] serde_yaml::Error),
    /// Well-formed YAML, but the fixed envelope is not there.
    #[error("{0}")]
    Malformed(String),
    /// The parameter block could not be serialised.
    #[error("cannot serialise document: {0}")]
    Encode(#[source] serde_yaml::Error),
}

impl CodecError {
    /// Attach the document location, producing the store-level error.
    pub fn at(self, path: impl Into<PathBuf>) -> SettingsError {
        let path = path.into();
        match self {
            CodecError::Parse(source) => SettingsError::Parse { path, source },
            CodecError::Malformed(reason) => SettingsError::MalformedDocument { path, reason },
            CodecError::Encode(e) => SettingsError::Encode(format!("{}: {}", path.display(), e)),
        }
    }
}

// ---------------------------------------------------------------------------
// Settings errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SettingsError {
    /// A registered document does not exist on disk.
    #[error("{subsystem} document not found: {}", path.display())]
    DocumentNotFound { subsystem: String, path: PathBuf },

    /// A document is not well-formed YAML.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A document parses but lacks the expected envelope.
    #[error("malformed document {}: {reason}", path.display())]
    MalformedDocument { path: PathBuf, reason: String },

    /// A write targets a parameter absent from the existing block.
    #[error("parameter '{parameter}' not found in {subsystem} parameters")]
    UnknownParameter { subsystem: String, parameter: String },

    /// A key names a subsystem with no registered document.
    #[error("unknown subsystem: {0}")]
    UnknownSubsystem(String),

    /// A dotted key could not be split into subsystem and parameter.
    #[error("invalid parameter key '{0}': expected <subsystem>.<parameter>")]
    InvalidKey(String),

    /// A value was rejected by the parameter schema.
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    /// Filesystem I/O failure.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("encode error: {0}")]
    Encode(String),

    /// Application configuration is missing or invalid.
    #[error("config error: {0}")]
    Config(String),

    /// The process-wide registry was already installed.
    #[error("settings registry already installed")]
    RegistryInstalled,
}

impl SettingsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SettingsError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SettingsError>;
