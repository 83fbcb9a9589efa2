//! The linter's own checker: messages about the run itself and the options
//! that steer it.

use super::Checker;
use crate::discover::IgnoreRules;
use crate::error::{Error, Result};
use crate::options::{OptionDict, OptionValue, Options, SeqItem};
use crate::output::OutputFormat;
use crate::registry::MessageSpec;
use crate::state::{DisableAction, EnableAction};
use regex::Regex;
use std::sync::Arc;

const MSGS: &[MessageSpec] = &[
    MessageSpec::new("F0001", "fatal", "Used when an error occurred preventing the analysis of a module."),
    MessageSpec::new("E0001", "syntax-error", "Used when a module's source could not be decoded."),
    MessageSpec::new(
        "W0012",
        "unknown-option-value",
        "Used when an unknown value is encountered in an inline pragma.",
    ),
    MessageSpec::new(
        "I0011",
        "locally-disabled",
        "Used when an inline pragma disables a message.",
    )
    .disabled_by_default(),
    MessageSpec::new(
        "I0023",
        "use-symbolic-message-instead",
        "Used when a message is enabled or disabled by id.",
    )
    .disabled_by_default(),
];

#[derive(Debug, Clone)]
/// Resolved values of the `main` options.
pub struct MainSettings {
    pub ignore: Vec<String>,
    pub ignore_patterns: Vec<Regex>,
    pub ignore_paths: Vec<Regex>,
    /// Worker threads for loading; 0 picks one per CPU.
    pub jobs: usize,
    pub output_format: OutputFormat,
    pub exit_zero: bool,
}

impl Default for MainSettings {
    fn default() -> Self {
        Self {
            ignore: vec!["CVS".to_string()],
            ignore_patterns: Vec::new(),
            ignore_paths: Vec::new(),
            jobs: 1,
            output_format: OutputFormat::Human,
            exit_zero: false,
        }
    }
}

impl MainSettings {
    pub fn ignore_rules(&self) -> IgnoreRules {
        IgnoreRules {
            names: self.ignore.clone(),
            patterns: self.ignore_patterns.clone(),
            paths: self.ignore_paths.clone(),
        }
    }
}

#[derive(Debug, Default)]
pub struct MainChecker {
    pub settings: MainSettings,
}

fn kind(t: &str) -> OptionValue {
    OptionValue::Str(t.to_string())
}

fn help(h: &str) -> OptionValue {
    OptionValue::Str(h.to_string())
}

impl Checker for MainChecker {
    fn name(&self) -> &'static str {
        "main"
    }

    fn msgs(&self) -> &'static [MessageSpec] {
        MSGS
    }

    fn options(&self) -> Options {
        let dot_hash = Regex::new(r"^\.#").map(SeqItem::Pattern);
        vec![
            (
                "ignore".into(),
                OptionDict::new()
                    .with("type", kind("csv"))
                    .with("metavar", kind("<file>[,<file>...]"))
                    .with("default", OptionValue::Seq(vec![SeqItem::Str("CVS".into())]))
                    .with("help", help("Files or directories to be skipped. They should be base names, not paths.")),
            ),
            (
                "ignore-patterns".into(),
                OptionDict::new()
                    .with("type", kind("regexp_csv"))
                    .with("metavar", kind("<pattern>[,<pattern>...]"))
                    .with("default", OptionValue::Seq(dot_hash.into_iter().collect()))
                    .with("help", help("Files or directories matching these regular expressions are skipped. The regex matches against base names.")),
            ),
            (
                "ignore-paths".into(),
                OptionDict::new()
                    .with("type", kind("regexp_csv"))
                    .with("metavar", kind("<pattern>[,<pattern>...]"))
                    .with("default", OptionValue::Seq(Vec::new()))
                    .with("help", help("Files or directories whose paths match these regular expressions are skipped.")),
            ),
            (
                "jobs".into(),
                OptionDict::new()
                    .with("type", kind("int"))
                    .with("metavar", kind("<n-processes>"))
                    .with("default", OptionValue::Int(1))
                    .with("help", help("Number of threads used to load modules. 0 uses one per CPU.")),
            ),
            (
                "output-format".into(),
                OptionDict::new()
                    .with("type", kind("choice"))
                    .with(
                        "choices",
                        OptionValue::Seq(vec![SeqItem::Str("human".into()), SeqItem::Str("json".into())]),
                    )
                    .with("default", OptionValue::Str("human".into()))
                    .with("help", help("Set the output format.")),
            ),
            (
                "exit-zero".into(),
                OptionDict::new()
                    .with("type", kind("yn"))
                    .with("default", OptionValue::Bool(false))
                    .with("help", help("Always return a 0 exit code, even when messages were emitted.")),
            ),
            (
                "disable".into(),
                OptionDict::new()
                    .with("type", kind("csv"))
                    .with("metavar", kind("<msg ids>"))
                    .with("action", OptionValue::Action(Arc::new(DisableAction)))
                    .with("help", help("Disable the given messages, categories or checkers.")),
            ),
            (
                "enable".into(),
                OptionDict::new()
                    .with("type", kind("csv"))
                    .with("metavar", kind("<msg ids>"))
                    .with("action", OptionValue::Action(Arc::new(EnableAction)))
                    .with("help", help("Enable the given messages, categories or checkers.")),
            ),
        ]
    }

    fn set_option(&mut self, name: &str, value: &OptionValue) -> Result<()> {
        let s = &mut self.settings;
        match name {
            "ignore" => s.ignore = value.strings(),
            "ignore-patterns" => s.ignore_patterns = value.patterns(),
            "ignore-paths" => s.ignore_paths = value.patterns(),
            "jobs" => {
                let n = value.as_int().unwrap_or(1);
                s.jobs = usize::try_from(n).map_err(|_| Error::OptionType {
                    option: name.to_string(),
                    expected: "a non-negative int".to_string(),
                    found: n.to_string(),
                })?;
            }
            "output-format" => {
                if let Some(f) = value.as_str() {
                    s.output_format = f.parse()?;
                }
            }
            "exit-zero" => s.exit_zero = value.as_bool().unwrap_or(false),
            _ => {}
        }
        Ok(())
    }
}
