//! Shared records passed between discovery, loading, checking and reporting.
//!
//! These are plain values: building one does no I/O beyond the existence
//! check on `ModuleDescription::new`.

pub mod failure;
pub mod file;
pub mod message;

pub use failure::{ErrorDescription, ErrorKey, LoadFailure};
pub use file::{FileItem, ModuleDescription};
pub use message::{ManagedMessage, Message, MessageCategory, MessageLocation};
