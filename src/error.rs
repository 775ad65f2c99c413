use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PkglogError {
    #[error("{}: '#!porg' header missing", .path.display())]
    FormatError { path: PathBuf },

    #[error("{}: {source}", .path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("package not found: {0}")]
    PackageNotFound(String),

    #[error("TOML deserialization error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl PkglogError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PkglogError::IoError { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, PkglogError>;
