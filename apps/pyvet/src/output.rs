//! Output rendering for check results, message listings and option listings.
//!
//! Supports `human` (default) and `json` outputs. The JSON form includes
//! per-message fields and a top-level summary.

use crate::error::Error;
use crate::lint::LintResult;
use crate::models::{Message, MessageCategory};
use crate::options::Options;
use crate::registry::MessageRegistry;
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;
use std::fmt::Write as _;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Human => "human",
            OutputFormat::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "human" => Ok(OutputFormat::Human),
            "json" => Ok(OutputFormat::Json),
            other => Err(Error::OptionType {
                option: "output-format".to_string(),
                expected: "one of human|json".to_string(),
                found: format!("'{}'", other),
            }),
        }
    }
}

pub fn use_colors(output: OutputFormat) -> bool {
    output != OutputFormat::Json && std::env::var_os("NO_COLOR").is_none()
}

pub fn error_prefix() -> String {
    if use_colors(OutputFormat::Human) {
        "error:".red().bold().to_string()
    } else {
        "error:".to_string()
    }
}

pub fn note_prefix() -> String {
    if use_colors(OutputFormat::Human) {
        "note:".cyan().bold().to_string()
    } else {
        "note:".to_string()
    }
}

fn paint_msgid(m: &Message, color: bool) -> String {
    if !color {
        return m.msg_id.clone();
    }
    match m.category {
        MessageCategory::Fatal | MessageCategory::Error => m.msg_id.red().bold().to_string(),
        MessageCategory::Warning => m.msg_id.yellow().bold().to_string(),
        MessageCategory::Refactor | MessageCategory::Convention => m.msg_id.blue().bold().to_string(),
        MessageCategory::Info | MessageCategory::Statement => m.msg_id.bright_black().to_string(),
    }
}

fn summary_line(res: &LintResult) -> String {
    let s = &res.stats;
    format!(
        "— Summary — fatal={} error={} warning={} refactor={} convention={} info={} modules={} statements={}",
        s.count(MessageCategory::Fatal),
        s.count(MessageCategory::Error),
        s.count(MessageCategory::Warning),
        s.count(MessageCategory::Refactor),
        s.count(MessageCategory::Convention),
        s.count(MessageCategory::Info),
        s.modules,
        s.statements
    )
}

/// Render check results for a terminal.
pub fn render_lint(res: &LintResult, color: bool) -> String {
    let mut out = String::new();
    let mut current: Option<&str> = None;
    for m in &res.messages {
        if current != Some(m.location.module.as_str()) {
            current = Some(m.location.module.as_str());
            let header = format!("************* Module {}", m.location.module);
            if color {
                let _ = writeln!(out, "{}", header.bold());
            } else {
                let _ = writeln!(out, "{}", header);
            }
        }
        let _ = writeln!(
            out,
            "{}:{}:{}: {}: {} ({})",
            m.location.path,
            m.location.line,
            m.location.column,
            paint_msgid(m, color),
            m.msg,
            m.symbol
        );
    }
    let summary = summary_line(res);
    if color {
        let _ = writeln!(out, "{}", summary.bold());
    } else {
        let _ = writeln!(out, "{}", summary);
    }
    out
}

/// Print check results in the requested format.
pub fn print_lint(res: &LintResult, output: OutputFormat) {
    match output {
        OutputFormat::Json => println!("{}", pretty(&compose_lint_json(res))),
        OutputFormat::Human => print!("{}", render_lint(res, use_colors(output))),
    }
}

/// Compose lint JSON object (pure) for testing/snapshot purposes.
pub fn compose_lint_json(res: &LintResult) -> JsonVal {
    let items: Vec<_> = res
        .messages
        .iter()
        .map(|m| {
            let loc = &m.location;
            json!({
                "type": m.category.as_str(),
                "module": loc.module,
                "obj": loc.obj,
                "line": loc.line,
                "column": loc.column,
                "endLine": loc.end_line,
                "endColumn": loc.end_column,
                "path": loc.path,
                "symbol": m.symbol,
                "message": m.msg,
                "message-id": m.msg_id,
            })
        })
        .collect();
    let mut summary = serde_json::Map::new();
    for cat in MessageCategory::ALL {
        if cat != MessageCategory::Statement {
            summary.insert(cat.as_str().to_string(), json!(res.stats.count(cat)));
        }
    }
    summary.insert("modules".into(), json!(res.stats.modules));
    summary.insert("statements".into(), json!(res.stats.statements));
    summary.insert("fatalErrors".into(), json!(res.errors.len()));
    json!({"messages": items, "summary": summary})
}

/// Compose the message listing (pure).
pub fn compose_msgs_json(registry: &MessageRegistry) -> JsonVal {
    let items: Vec<_> = registry
        .iter()
        .map(|d| {
            json!({
                "msgid": d.msgid,
                "symbol": d.symbol,
                "category": d.category.as_str(),
                "checker": d.checker,
                "description": d.description,
                "enabledByDefault": d.default_enabled,
            })
        })
        .collect();
    JsonVal::Array(items)
}

/// Print every registered message, grouped by checker.
pub fn print_msgs(registry: &MessageRegistry, output: OutputFormat) {
    match output {
        OutputFormat::Json => println!("{}", pretty(&compose_msgs_json(registry))),
        OutputFormat::Human => {
            let color = use_colors(output);
            let mut checker: Option<&str> = None;
            for d in registry.iter() {
                if checker != Some(d.checker.as_str()) {
                    checker = Some(d.checker.as_str());
                    let title = format!("{} checker", d.checker);
                    if color {
                        println!("{}", title.bold());
                    } else {
                        println!("{}", title);
                    }
                }
                let off = if d.default_enabled { "" } else { " [disabled by default]" };
                println!("  :{} ({}){}", d.symbol, d.msgid, off);
                println!("      {}", d.description);
            }
        }
    }
}

/// Render declared options per section.
pub fn render_options(sections: &[(&str, Options)]) -> String {
    let mut out = String::new();
    for (section, options) in sections {
        let _ = writeln!(out, "[{}]", section);
        for (name, dict) in options {
            let metavar = dict.metavar().unwrap_or("<value>");
            let _ = write!(out, "  --{}={}", name, metavar);
            if let Some(help) = dict.help() {
                let _ = write!(out, "  {}", help);
            }
            let default = dict.default_value();
            if !default.is_none() {
                let _ = write!(out, " (default: {})", default.display());
            }
            out.push('\n');
        }
    }
    out
}

pub fn print_options(sections: &[(&str, Options)]) {
    print!("{}", render_options(sections));
}

fn pretty(v: &JsonVal) -> String {
    serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ErrorDescription, MessageLocation};
    use crate::options::{OptionDict, OptionValue};

    fn message(module: &str, path: &str, line: u32, msg_id: &str, symbol: &str, cat: MessageCategory) -> Message {
        Message {
            msg_id: msg_id.into(),
            symbol: symbol.into(),
            msg: "text".into(),
            category: cat,
            location: MessageLocation::new(format!("/r/{}", path), path, module, "", line, 0),
        }
    }

    fn result() -> LintResult {
        LintResult {
            messages: vec![
                message("a", "a.py", 1, "C0303", "trailing-whitespace", MessageCategory::Convention),
                message("a", "a.py", 3, "W0012", "unknown-option-value", MessageCategory::Warning),
                message("b", "b.py", 2, "E0001", "syntax-error", MessageCategory::Error),
            ],
            errors: vec![ErrorDescription::syntax_failure("b", "bad", Some(2), Some(0))],
            stats: Default::default(),
        }
    }

    #[test]
    fn test_render_lint_groups_by_module() {
        let out = render_lint(&result(), false);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "************* Module a");
        assert_eq!(lines[1], "a.py:1:0: C0303: text (trailing-whitespace)");
        assert_eq!(lines[3], "************* Module b");
        assert_eq!(lines[4], "b.py:2:0: E0001: text (syntax-error)");
        assert!(lines[5].starts_with("— Summary — fatal=0"));
    }

    #[test]
    fn test_compose_lint_json_shape() {
        let out = compose_lint_json(&result());
        let first = &out["messages"][0];
        assert_eq!(first["type"], "convention");
        assert_eq!(first["message-id"], "C0303");
        assert_eq!(first["path"], "a.py");
        assert!(first["endLine"].is_null());
        assert_eq!(out["summary"]["fatalErrors"], 1);
        assert!(out["summary"].get("statement").is_none());
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("xml".parse::<OutputFormat>().is_err());
        assert!(!use_colors(OutputFormat::Json));
    }

    #[test]
    fn test_render_options() {
        let opts = vec![(
            "jobs".to_string(),
            OptionDict::new()
                .with("metavar", OptionValue::Str("<n>".into()))
                .with("help", OptionValue::Str("Threads.".into()))
                .with("default", OptionValue::Int(1)),
        )];
        let out = render_options(&[("main", opts)]);
        assert_eq!(out, "[main]\n  --jobs=<n>  Threads. (default: 1)\n");
    }
}
