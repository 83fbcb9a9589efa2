//! Line length and whitespace checks on raw source.

use super::{Checker, RawChecker};
use crate::error::Result;
use crate::lint::Emitter;
use crate::loader::LoadedModule;
use crate::options::{OptionDict, OptionValue, Options};
use crate::registry::MessageSpec;
use regex::Regex;

const MSGS: &[MessageSpec] = &[
    MessageSpec::new("C0301", "line-too-long", "Used when a line is longer than a given number of characters."),
    MessageSpec::new("C0303", "trailing-whitespace", "Used when there is whitespace between the end of a line and the newline."),
    MessageSpec::new("C0304", "missing-final-newline", "Used when the last line in a file is missing a newline."),
    MessageSpec::new("C0305", "trailing-newlines", "Used when there are trailing blank lines in a file."),
];

const DEFAULT_MAX_LINE_LENGTH: usize = 100;
const DEFAULT_IGNORE_LONG_LINES: &str = r"^\s*(# )?<?https?://\S+>?$";

#[derive(Debug)]
pub struct FormatChecker {
    max_line_length: usize,
    ignore_long_lines: Option<Regex>,
}

impl Default for FormatChecker {
    fn default() -> Self {
        Self {
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            ignore_long_lines: Regex::new(DEFAULT_IGNORE_LONG_LINES).ok(),
        }
    }
}

impl Checker for FormatChecker {
    fn name(&self) -> &'static str {
        "format"
    }

    fn msgs(&self) -> &'static [MessageSpec] {
        MSGS
    }

    fn options(&self) -> Options {
        let mut ignore = OptionDict::new()
            .with("type", OptionValue::Str("regexp".into()))
            .with("metavar", OptionValue::Str("<regexp>".into()))
            .with(
                "help",
                OptionValue::Str("Regexp for a line that is allowed to be longer than the limit.".into()),
            );
        if let Ok(re) = Regex::new(DEFAULT_IGNORE_LONG_LINES) {
            ignore.insert("default", OptionValue::Pattern(re));
        }
        vec![
            (
                "max-line-length".into(),
                OptionDict::new()
                    .with("type", OptionValue::Str("int".into()))
                    .with("metavar", OptionValue::Str("<int>".into()))
                    .with("default", OptionValue::Int(DEFAULT_MAX_LINE_LENGTH as i64))
                    .with("help", OptionValue::Str("Maximum number of characters on a single line.".into())),
            ),
            ("ignore-long-lines".into(), ignore),
        ]
    }

    fn set_option(&mut self, name: &str, value: &OptionValue) -> Result<()> {
        match name {
            "max-line-length" => {
                if let Some(n) = value.as_int() {
                    self.max_line_length = n.max(0) as usize;
                }
            }
            "ignore-long-lines" => self.ignore_long_lines = value.as_pattern().cloned(),
            _ => {}
        }
        Ok(())
    }
}

impl RawChecker for FormatChecker {
    fn process_module(&mut self, module: &LoadedModule, emitter: &mut Emitter<'_>) {
        let lines: Vec<&str> = module.lines().collect();
        for (idx, line) in lines.iter().enumerate() {
            let lineno = idx as u32 + 1;
            let len = line.chars().count();
            if len > self.max_line_length
                && !self
                    .ignore_long_lines
                    .as_ref()
                    .is_some_and(|re| re.is_match(line))
            {
                emitter.add_message(
                    "line-too-long",
                    lineno,
                    0,
                    format!("Line too long ({}/{})", len, self.max_line_length),
                );
            }
            let stripped = line.trim_end_matches([' ', '\t', '\x0c']);
            if stripped.len() != line.len() {
                emitter.add_message(
                    "trailing-whitespace",
                    lineno,
                    stripped.chars().count() as u32,
                    "Trailing whitespace",
                );
            }
        }

        let source = module.source.as_str();
        if source.is_empty() {
            return;
        }
        if !source.ends_with('\n') {
            emitter.add_message(
                "missing-final-newline",
                lines.len() as u32,
                0,
                "Final newline missing",
            );
            return;
        }
        let blank_tail = lines.iter().rev().take_while(|l| l.trim().is_empty()).count();
        if blank_tail > 0 && blank_tail < lines.len() {
            emitter.add_message(
                "trailing-newlines",
                (lines.len() - blank_tail + 1) as u32,
                0,
                "Trailing newlines",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lint::{ModuleRef, Reporter};
    use crate::models::FileItem;
    use crate::registry::MessageRegistry;
    use crate::state::{MessageStateHandler, Target};

    fn run(checker: &mut FormatChecker, source: &str, disable: &[&str]) -> Vec<(String, u32, u32, String)> {
        let mut registry = MessageRegistry::new();
        registry.register_checker("format", MSGS).unwrap();
        let mut state = MessageStateHandler::new();
        for id in disable {
            state.disable(&registry, id, Target::Global).unwrap();
        }
        let module = LoadedModule {
            item: FileItem::new("m", "/tmp/m.py", "m").unwrap(),
            source: source.to_string(),
        };
        let mut reporter = Reporter::default();
        let target = ModuleRef::new("m", "/tmp/m.py", "m.py");
        let mut emitter = Emitter::new(&registry, &state, &target, &mut reporter);
        checker.process_module(&module, &mut emitter);
        reporter
            .into_messages()
            .into_iter()
            .map(|m| (m.symbol, m.location.line, m.location.column, m.msg))
            .collect()
    }

    #[test]
    fn test_line_too_long_respects_option_and_urls() {
        let mut checker = FormatChecker::default();
        checker.set_option("max-line-length", &OptionValue::Int(10)).unwrap();
        let src = "x = 'abcdefghij'\n# https://example.com/a/very/long/url\ny = 1\n";
        let got = run(&mut checker, src, &[]);
        assert_eq!(
            got,
            vec![("line-too-long".to_string(), 1, 0, "Line too long (16/10)".to_string())]
        );
    }

    #[test]
    fn test_whitespace_messages() {
        let mut checker = FormatChecker::default();
        let got = run(&mut checker, "x = 1  \ny = 2\n\n\n", &[]);
        let symbols: Vec<(&str, u32, u32)> = got.iter().map(|(s, l, c, _)| (s.as_str(), *l, *c)).collect();
        assert_eq!(
            symbols,
            vec![("trailing-whitespace", 1, 5), ("trailing-newlines", 3, 0)]
        );

        let got = run(&mut checker, "x = 1\ny = 2", &[]);
        assert_eq!(got.len(), 1);
        assert_eq!((got[0].0.as_str(), got[0].1), ("missing-final-newline", 2));
    }

    #[test]
    fn test_disabled_messages_are_dropped() {
        let mut checker = FormatChecker::default();
        let got = run(&mut checker, "x = 1  \ny = 2", &["C0303", "missing-final-newline"]);
        assert!(got.is_empty());
    }
}
