//! Unified error type.

use std::path::PathBuf;

/// Boxed error produced by user-supplied factories and hosts.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The error type returned by the loader's fallible operations.
///
/// Which of these abort startup depends on the stage that raised them: scan
/// and middleware errors are fatal, controller and model errors are logged
/// and the offending file is skipped.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot create directory {}: {source}", .path.display())]
    Bootstrap {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no module registered for {}", .path.display())]
    ModuleNotFound { path: PathBuf },

    #[error("module {} is {found}, expected {expected}", .path.display())]
    ModuleKind {
        path: PathBuf,
        expected: &'static str,
        found: &'static str,
    },

    #[error("failed to load {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    #[error("failed to instantiate {}: {source}", .path.display())]
    Instantiate {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    #[error("malformed middleware descriptors in {origin}: {source}")]
    Descriptor {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown HTTP method `{0}`")]
    UnknownMethod(String),

    #[error("invalid route `{path}`: {reason}")]
    Route { path: String, reason: String },

    #[error("duplicate route name `{name}` in group `{group}`")]
    DuplicateName { name: String, group: String },

    #[error("config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("host rejected registration: {0}")]
    Host(#[source] BoxError),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}
