//! pyvet core library.
//!
//! This crate exposes the shared vocabulary of a Python linter (file items,
//! module descriptions, fatal load errors, message locations, managed
//! messages, message categories, option declarations and AST callbacks) and
//! the components that produce and consume it.
//!
//! High-level modules:
//! - `models`: Record types passed between components.
//! - `options`: Option declarations (`OptionDict`, `Options`) and resolution.
//! - `ast`: Syntax-tree callback contract and the walker that drives it.
//! - `registry`: Message definitions by msgid and symbol.
//! - `state`: Enable/disable state, inline pragmas, managed-message log.
//! - `discover`: Expansion of path arguments into module descriptions.
//! - `loader`: Parallel module loading.
//! - `checkers`: Checker traits and the built-in checkers.
//! - `lint`: Orchestration, message emission and stats.
//! - `config`: Discovery and loading of `pyvet.toml|yaml`.
//! - `output`: Human/JSON printers.
//! - `cli`: CLI argument parsing (binary uses this).
//! - `error`: Tool-level error type.
pub mod ast;
pub mod checkers;
pub mod cli;
pub mod config;
pub mod discover;
pub mod error;
pub mod lint;
pub mod loader;
pub mod models;
pub mod options;
pub mod output;
pub mod registry;
pub mod state;
