//! Message categories, locations and managed-message snapshots.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// All possible message categories.
pub enum MessageCategory {
    Convention,
    Error,
    Fatal,
    Info,
    Refactor,
    Statement,
    Warning,
}

impl MessageCategory {
    pub const ALL: [MessageCategory; 7] = [
        MessageCategory::Convention,
        MessageCategory::Error,
        MessageCategory::Fatal,
        MessageCategory::Info,
        MessageCategory::Refactor,
        MessageCategory::Statement,
        MessageCategory::Warning,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MessageCategory::Convention => "convention",
            MessageCategory::Error => "error",
            MessageCategory::Fatal => "fatal",
            MessageCategory::Info => "info",
            MessageCategory::Refactor => "refactor",
            MessageCategory::Statement => "statement",
            MessageCategory::Warning => "warning",
        }
    }

    /// The msgid prefix letter. `Statement` is a stats-only category.
    pub fn letter(self) -> Option<char> {
        match self {
            MessageCategory::Convention => Some('C'),
            MessageCategory::Error => Some('E'),
            MessageCategory::Fatal => Some('F'),
            MessageCategory::Info => Some('I'),
            MessageCategory::Refactor => Some('R'),
            MessageCategory::Warning => Some('W'),
            MessageCategory::Statement => None,
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        let up = letter.to_ascii_uppercase();
        Self::ALL.into_iter().find(|c| c.letter() == Some(up))
    }

    /// Category of a msgid such as `W0611`.
    pub fn from_msgid(msgid: &str) -> Option<Self> {
        msgid.chars().next().and_then(Self::from_letter)
    }

    /// Bit contributed to the process exit status.
    pub fn exit_bit(self) -> i32 {
        match self {
            MessageCategory::Fatal => 1,
            MessageCategory::Error => 2,
            MessageCategory::Warning => 4,
            MessageCategory::Refactor => 8,
            MessageCategory::Convention => 16,
            MessageCategory::Info | MessageCategory::Statement => 0,
        }
    }
}

impl FromStr for MessageCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| Error::InvalidCategory(s.to_string()))
    }
}

impl fmt::Display for MessageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Where a to-be-displayed message points.
///
/// `end_line` and `end_column` are independently optional; see
/// [`MessageLocation::end`] for the paired view.
pub struct MessageLocation {
    pub abspath: String,
    pub path: String,
    pub module: String,
    /// Enclosing scope name, empty at module level.
    pub obj: String,
    pub line: u32,
    pub column: u32,
    pub end_line: Option<u32>,
    pub end_column: Option<u32>,
}

impl MessageLocation {
    pub fn new(
        abspath: impl Into<String>,
        path: impl Into<String>,
        module: impl Into<String>,
        obj: impl Into<String>,
        line: u32,
        column: u32,
    ) -> Self {
        Self {
            abspath: abspath.into(),
            path: path.into(),
            module: module.into(),
            obj: obj.into(),
            line,
            column,
            end_line: None,
            end_column: None,
        }
    }

    pub fn with_end(mut self, end_line: Option<u32>, end_column: Option<u32>) -> Self {
        self.end_line = end_line;
        self.end_column = end_column;
        self
    }

    /// The end position, only when both halves are known.
    pub fn end(&self) -> Option<(u32, u32)> {
        Some((self.end_line?, self.end_column?))
    }

    /// False when a known end position precedes the start.
    pub fn has_ordered_span(&self) -> bool {
        match (self.end_line, self.end_column) {
            (Some(l), _) if l < self.line => false,
            (Some(l), Some(c)) if l == self.line => c >= self.column,
            _ => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Snapshot of an enable/disable request made for a message.
pub struct ManagedMessage {
    /// Module being checked when the request was made.
    pub name: Option<String>,
    pub msgid: String,
    pub symbol: String,
    /// Line the request applies from, `None` for a global request.
    pub line: Option<u32>,
    pub is_disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A message emitted by a checker, ready for display.
pub struct Message {
    pub msg_id: String,
    pub symbol: String,
    pub msg: String,
    pub category: MessageCategory,
    pub location: MessageLocation,
}
