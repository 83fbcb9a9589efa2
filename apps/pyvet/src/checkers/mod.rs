//! Checker contracts and the built-in checkers.
//!
//! - `main`: the linter's own messages and options (ignore rules, jobs,
//!   output format, enable/disable).
//! - `format`: raw-source checks on line length and whitespace.
//!
//! AST-driven checkers implement [`crate::ast::AstChecker`] on top of
//! [`Checker`].

pub mod format;
pub mod main;

use crate::error::Result;
use crate::lint::Emitter;
use crate::loader::LoadedModule;
use crate::options::{OptionValue, Options};
use crate::registry::MessageSpec;

pub use format::FormatChecker;
pub use main::{MainChecker, MainSettings};

/// Anything that declares messages and options.
pub trait Checker {
    fn name(&self) -> &'static str;

    fn msgs(&self) -> &'static [MessageSpec];

    fn options(&self) -> Options {
        Vec::new()
    }

    /// Receive the resolved value of one of the declared options.
    fn set_option(&mut self, _name: &str, _value: &OptionValue) -> Result<()> {
        Ok(())
    }
}

/// A checker that works on the raw source of a module.
pub trait RawChecker: Checker + Send {
    fn process_module(&mut self, module: &LoadedModule, emitter: &mut Emitter<'_>);
}

/// Raw checkers enabled by default.
pub fn default_raw_checkers() -> Vec<Box<dyn RawChecker>> {
    vec![Box::new(FormatChecker::default())]
}
