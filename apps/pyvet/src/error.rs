//! Tool-level errors.
//!
//! Lint findings and fatal module-load failures are data (`Message`,
//! `ErrorDescription`), not errors. This enum covers everything that stops
//! the tool itself: unreadable configuration, bad option values, unknown
//! message ids and so on.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not valid TOML: {source}", path.display())]
    ConfigToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("{} is not valid YAML: {source}", path.display())]
    ConfigYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("unknown configuration section [{0}]")]
    UnknownSection(String),

    #[error("unknown option '{option}' in section [{section}]")]
    UnknownOption { section: String, option: String },

    #[error("option '{option}' expects {expected}, got {found}")]
    OptionType {
        option: String,
        expected: String,
        found: String,
    },

    #[error("option '{option}' has an invalid regular expression: {source}")]
    OptionPattern {
        option: String,
        #[source]
        source: regex::Error,
    },

    #[error("unknown message '{0}'")]
    UnknownMessage(String),

    #[error("message '{0}' is already registered")]
    DuplicateMessage(String),

    #[error("'{0}' is not a valid message id")]
    InvalidMsgid(String),

    #[error("invalid message category '{0}'")]
    InvalidCategory(String),

    #[error("invalid error key '{0}', expected 'fatal'")]
    InvalidErrorKey(String),

    #[error("path does not exist: {}", .0.display())]
    MissingPath(PathBuf),

    #[error("{record}.{field} must not be empty")]
    EmptyField {
        record: &'static str,
        field: &'static str,
    },

    #[error("invalid glob pattern '{pattern}': {source}")]
    Glob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
