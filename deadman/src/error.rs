//! Error types for configuration loading and file deletion.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading the switch configuration. Fatal to startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file {} not found", path.display())]
    Missing { path: PathBuf },

    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors recorded while deleting files under a root.
///
/// These are collected into a [`DeletionReport`](crate::deletion::DeletionReport)
/// and logged; they never reach request handlers.
#[derive(Error, Debug)]
pub enum DeletionError {
    /// The root itself could not be traversed; nothing under it was touched.
    #[error("cannot walk {}: {source}", root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A directory below the root could not be read; its siblings are still visited.
    #[error("cannot read entry under {}: {source}", root.display())]
    Entry {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// A single file could not be removed.
    #[error("failed to remove {}: {source}", path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
