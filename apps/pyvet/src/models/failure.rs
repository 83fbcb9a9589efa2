//! Fatal module-load failures.
//!
//! A module that cannot be read or decoded is not analyzed at all. That is
//! reported through an `ErrorDescription` rather than an ordinary message so
//! the reporter can tell "this file has findings" apart from "this file could
//! not be checked".

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// The only key an `ErrorDescription` can carry.
pub enum ErrorKey {
    #[default]
    Fatal,
}

impl ErrorKey {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKey::Fatal => "fatal",
        }
    }
}

impl FromStr for ErrorKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fatal" => Ok(ErrorKey::Fatal),
            other => Err(Error::InvalidErrorKey(other.to_string())),
        }
    }
}

impl fmt::Display for ErrorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
/// Why a module could not be loaded.
pub enum LoadFailure {
    /// The file could not be found or read.
    ImportFailure { message: String },
    /// The file was read but its contents are not valid source.
    SyntaxFailure {
        message: String,
        line: Option<u32>,
        column: Option<u32>,
    },
}

impl LoadFailure {
    pub fn message(&self) -> &str {
        match self {
            LoadFailure::ImportFailure { message } | LoadFailure::SyntaxFailure { message, .. } => {
                message
            }
        }
    }
}

impl fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadFailure::ImportFailure { message } => f.write_str(message),
            LoadFailure::SyntaxFailure {
                message,
                line: Some(line),
                ..
            } => write!(f, "{} (line {})", message, line),
            LoadFailure::SyntaxFailure { message, .. } => f.write_str(message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A module that could not be analyzed.
pub struct ErrorDescription {
    pub key: ErrorKey,
    #[serde(rename = "mod")]
    pub module: String,
    pub ex: LoadFailure,
}

impl ErrorDescription {
    pub fn import_failure(module: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            key: ErrorKey::Fatal,
            module: module.into(),
            ex: LoadFailure::ImportFailure {
                message: message.into(),
            },
        }
    }

    pub fn syntax_failure(
        module: impl Into<String>,
        message: impl Into<String>,
        line: Option<u32>,
        column: Option<u32>,
    ) -> Self {
        Self {
            key: ErrorKey::Fatal,
            module: module.into(),
            ex: LoadFailure::SyntaxFailure {
                message: message.into(),
                line,
                column,
            },
        }
    }
}
