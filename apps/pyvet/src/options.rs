//! Option declarations and their resolution against configuration values.
//!
//! A checker declares its configuration surface as [`Options`]: an ordered
//! list of `(name, OptionDict)` pairs. Each `OptionDict` maps attribute names
//! (`type`, `default`, `help`, `metavar`, `choices`, `action`, `callback`) to
//! an [`OptionValue`]. Order matters: options are resolved, registered and
//! listed in declaration order.

use crate::error::{Error, Result};
use crate::registry::MessageRegistry;
use crate::state::MessageStateHandler;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// An option whose value triggers an effect on the message state.
pub trait CallbackAction: Send + Sync {
    fn name(&self) -> &'static str;

    fn call(
        &self,
        registry: &MessageRegistry,
        state: &mut MessageStateHandler,
        value: &OptionValue,
    ) -> Result<()>;
}

pub type UnaryCallback = Arc<dyn Fn(&OptionValue) + Send + Sync>;

/// Receives the option name, its declaration, the value being set and the
/// values resolved so far for the same section.
pub type QuaternaryCallback =
    Arc<dyn Fn(&str, &OptionDict, &OptionValue, &mut OptionValues) + Send + Sync>;

/// Resolved option values keyed by option name.
pub type OptionValues = BTreeMap<String, OptionValue>;

#[derive(Debug, Clone)]
/// One element of a sequence-valued option.
pub enum SeqItem {
    Str(String),
    Int(i64),
    Pattern(Regex),
}

#[derive(Clone)]
pub enum OptionValue {
    None,
    Str(String),
    Bool(bool),
    Int(i64),
    Pattern(Regex),
    Seq(Vec<SeqItem>),
    Action(Arc<dyn CallbackAction>),
    Callback(UnaryCallback),
    Callback4(QuaternaryCallback),
}

impl OptionValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            OptionValue::None => "none",
            OptionValue::Str(_) => "string",
            OptionValue::Bool(_) => "bool",
            OptionValue::Int(_) => "int",
            OptionValue::Pattern(_) => "pattern",
            OptionValue::Seq(_) => "sequence",
            OptionValue::Action(_) => "action",
            OptionValue::Callback(_) => "callback",
            OptionValue::Callback4(_) => "callback4",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, OptionValue::None)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            OptionValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_pattern(&self) -> Option<&Regex> {
        match self {
            OptionValue::Pattern(re) => Some(re),
            _ => None,
        }
    }

    /// String and integer items of a sequence, rendered as strings.
    pub fn strings(&self) -> Vec<String> {
        match self {
            OptionValue::Seq(items) => items
                .iter()
                .filter_map(|it| match it {
                    SeqItem::Str(s) => Some(s.clone()),
                    SeqItem::Int(i) => Some(i.to_string()),
                    SeqItem::Pattern(_) => None,
                })
                .collect(),
            OptionValue::Str(s) => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    /// Pattern items of a sequence.
    pub fn patterns(&self) -> Vec<Regex> {
        match self {
            OptionValue::Seq(items) => items
                .iter()
                .filter_map(|it| match it {
                    SeqItem::Pattern(re) => Some(re.clone()),
                    _ => None,
                })
                .collect(),
            OptionValue::Pattern(re) => vec![re.clone()],
            _ => Vec::new(),
        }
    }

    /// Human-readable rendering used by `list-options`.
    pub fn display(&self) -> String {
        match self {
            OptionValue::None => String::new(),
            OptionValue::Str(s) => s.clone(),
            OptionValue::Bool(b) => (if *b { "yes" } else { "no" }).to_string(),
            OptionValue::Int(i) => i.to_string(),
            OptionValue::Pattern(re) => re.as_str().to_string(),
            OptionValue::Seq(items) => items
                .iter()
                .map(|it| match it {
                    SeqItem::Str(s) => s.clone(),
                    SeqItem::Int(i) => i.to_string(),
                    SeqItem::Pattern(re) => re.as_str().to_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            OptionValue::Action(a) => format!("<action {}>", a.name()),
            OptionValue::Callback(_) => "<callback>".to_string(),
            OptionValue::Callback4(_) => "<callback/4>".to_string(),
        }
    }
}

impl fmt::Debug for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::None => f.write_str("None"),
            OptionValue::Str(s) => f.debug_tuple("Str").field(s).finish(),
            OptionValue::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            OptionValue::Int(i) => f.debug_tuple("Int").field(i).finish(),
            OptionValue::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
            OptionValue::Seq(items) => f.debug_tuple("Seq").field(items).finish(),
            OptionValue::Action(a) => f.debug_tuple("Action").field(&a.name()).finish(),
            OptionValue::Callback(_) => f.write_str("Callback(..)"),
            OptionValue::Callback4(_) => f.write_str("Callback4(..)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Value types understood by the `type` attribute.
pub enum OptionKind {
    String,
    Choice,
    Int,
    YesNo,
    Csv,
    Regexp,
    RegexpCsv,
}

impl OptionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OptionKind::String => "string",
            OptionKind::Choice => "choice",
            OptionKind::Int => "int",
            OptionKind::YesNo => "yn",
            OptionKind::Csv => "csv",
            OptionKind::Regexp => "regexp",
            OptionKind::RegexpCsv => "regexp_csv",
        }
    }

    /// Convert a configuration value into the value this kind stores.
    pub fn convert(self, option: &str, dict: &OptionDict, raw: &toml::Value) -> Result<OptionValue> {
        let mismatch = || Error::OptionType {
            option: option.to_string(),
            expected: self.as_str().to_string(),
            found: raw.type_str().to_string(),
        };
        match self {
            OptionKind::String => match raw {
                toml::Value::String(s) => Ok(OptionValue::Str(s.clone())),
                _ => Err(mismatch()),
            },
            OptionKind::Choice => {
                let s = raw.as_str().ok_or_else(mismatch)?;
                let choices = dict.choices();
                if choices.iter().any(|c| c == s) {
                    Ok(OptionValue::Str(s.to_string()))
                } else {
                    Err(Error::OptionType {
                        option: option.to_string(),
                        expected: format!("one of {}", choices.join("|")),
                        found: format!("'{}'", s),
                    })
                }
            }
            OptionKind::Int => match raw {
                toml::Value::Integer(i) => Ok(OptionValue::Int(*i)),
                toml::Value::String(s) => s.trim().parse().map(OptionValue::Int).map_err(|_| mismatch()),
                _ => Err(mismatch()),
            },
            OptionKind::YesNo => match raw {
                toml::Value::Boolean(b) => Ok(OptionValue::Bool(*b)),
                toml::Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "y" | "yes" | "true" => Ok(OptionValue::Bool(true)),
                    "n" | "no" | "false" => Ok(OptionValue::Bool(false)),
                    _ => Err(mismatch()),
                },
                _ => Err(mismatch()),
            },
            OptionKind::Csv => {
                let items = csv_items(raw).ok_or_else(mismatch)?;
                Ok(OptionValue::Seq(
                    items
                        .into_iter()
                        .map(|it| match it {
                            RawItem::Str(s) => SeqItem::Str(s),
                            RawItem::Int(i) => SeqItem::Int(i),
                        })
                        .collect(),
                ))
            }
            OptionKind::Regexp => {
                let s = raw.as_str().ok_or_else(mismatch)?;
                compile(option, s).map(OptionValue::Pattern)
            }
            OptionKind::RegexpCsv => {
                let items = csv_items(raw).ok_or_else(mismatch)?;
                let mut out = Vec::with_capacity(items.len());
                for it in items {
                    match it {
                        RawItem::Str(s) => out.push(SeqItem::Pattern(compile(option, &s)?)),
                        RawItem::Int(_) => return Err(mismatch()),
                    }
                }
                Ok(OptionValue::Seq(out))
            }
        }
    }
}

impl FromStr for OptionKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(OptionKind::String),
            "choice" => Ok(OptionKind::Choice),
            "int" => Ok(OptionKind::Int),
            "yn" => Ok(OptionKind::YesNo),
            "csv" => Ok(OptionKind::Csv),
            "regexp" => Ok(OptionKind::Regexp),
            "regexp_csv" => Ok(OptionKind::RegexpCsv),
            _ => Err(()),
        }
    }
}

enum RawItem {
    Str(String),
    Int(i64),
}

// Accepts either a TOML array or a comma-separated string.
fn csv_items(raw: &toml::Value) -> Option<Vec<RawItem>> {
    match raw {
        toml::Value::String(s) => Some(
            s.split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(|p| RawItem::Str(p.to_string()))
                .collect(),
        ),
        toml::Value::Array(arr) => arr
            .iter()
            .map(|v| match v {
                toml::Value::String(s) => Some(RawItem::Str(s.clone())),
                toml::Value::Integer(i) => Some(RawItem::Int(*i)),
                _ => None,
            })
            .collect(),
        _ => None,
    }
}

fn compile(option: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| Error::OptionPattern {
        option: option.to_string(),
        source,
    })
}

#[derive(Debug, Clone, Default)]
/// Attributes of a single option. Keys are unique; inserting an existing key
/// replaces its value.
pub struct OptionDict(BTreeMap<String, OptionValue>);

impl OptionDict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: OptionValue) -> Self {
        self.0.insert(key.to_string(), value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: OptionValue) -> Option<OptionValue> {
        self.0.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The declared `type`, `string` when absent or unrecognised.
    pub fn kind(&self) -> OptionKind {
        self.get("type")
            .and_then(OptionValue::as_str)
            .and_then(|s| s.parse().ok())
            .unwrap_or(OptionKind::String)
    }

    pub fn default_value(&self) -> OptionValue {
        self.get("default").cloned().unwrap_or(OptionValue::None)
    }

    pub fn help(&self) -> Option<&str> {
        self.get("help").and_then(OptionValue::as_str)
    }

    pub fn metavar(&self) -> Option<&str> {
        self.get("metavar").and_then(OptionValue::as_str)
    }

    pub fn choices(&self) -> Vec<String> {
        self.get("choices").map(OptionValue::strings).unwrap_or_default()
    }

    pub fn action(&self) -> Option<&Arc<dyn CallbackAction>> {
        match self.get("action") {
            Some(OptionValue::Action(a)) => Some(a),
            _ => None,
        }
    }
}

/// Ordered option declarations of one checker.
pub type Options = Vec<(String, OptionDict)>;

/// Resolve every declared option of `section` against an optional config
/// table. Values come from the table when present, else from the `default`
/// attribute. Keys in the table that are not declared are rejected.
pub fn resolve_options(
    section: &str,
    options: &Options,
    table: Option<&toml::Table>,
) -> Result<Vec<(String, OptionValue)>> {
    if let Some(table) = table {
        if let Some(unknown) = table
            .keys()
            .find(|k| !options.iter().any(|(name, _)| name == *k))
        {
            return Err(Error::UnknownOption {
                section: section.to_string(),
                option: unknown.clone(),
            });
        }
    }
    let mut out = Vec::with_capacity(options.len());
    for (name, dict) in options {
        let value = match table.and_then(|t| t.get(name)) {
            Some(raw) => dict.kind().convert(name, dict, raw)?,
            None => dict.default_value(),
        };
        out.push((name.clone(), value));
    }
    Ok(out)
}

/// Convert a command-line string for a declared option.
pub fn parse_cli_value(name: &str, dict: &OptionDict, raw: &str) -> Result<OptionValue> {
    dict.kind()
        .convert(name, dict, &toml::Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Noop;

    impl CallbackAction for Noop {
        fn name(&self) -> &'static str {
            "noop"
        }

        fn call(
            &self,
            _registry: &MessageRegistry,
            _state: &mut MessageStateHandler,
            _value: &OptionValue,
        ) -> Result<()> {
            Ok(())
        }
    }

    fn csv(items: &[&str]) -> OptionValue {
        OptionValue::Seq(items.iter().map(|s| SeqItem::Str(s.to_string())).collect())
    }

    #[test]
    fn test_option_dict_covers_every_value_kind() {
        let hits = Arc::new(AtomicUsize::new(0));
        let h1 = hits.clone();
        let h4 = hits.clone();
        let dict = OptionDict::new()
            .with("metavar", OptionValue::Str("<n>".into()))
            .with("enabled", OptionValue::Bool(true))
            .with("default", OptionValue::Int(4))
            .with("pattern", OptionValue::Pattern(Regex::new("^_").unwrap()))
            .with(
                "choices",
                OptionValue::Seq(vec![
                    SeqItem::Str("a".into()),
                    SeqItem::Int(2),
                    SeqItem::Pattern(Regex::new("b+").unwrap()),
                ]),
            )
            .with("action", OptionValue::Action(Arc::new(Noop)))
            .with(
                "callback",
                OptionValue::Callback(Arc::new(move |_| {
                    h1.fetch_add(1, Ordering::SeqCst);
                })),
            )
            .with(
                "callback4",
                OptionValue::Callback4(Arc::new(move |_, _, _, _| {
                    h4.fetch_add(10, Ordering::SeqCst);
                })),
            )
            .with("help", OptionValue::None);

        let kinds: Vec<&str> = dict.iter().map(|(_, v)| v.kind_name()).collect();
        for k in [
            "string", "bool", "int", "pattern", "sequence", "action", "callback", "callback4",
        ] {
            assert!(kinds.contains(&k), "missing {}", k);
        }

        if let Some(OptionValue::Callback(cb)) = dict.get("callback") {
            cb(&OptionValue::Int(1));
        }
        if let Some(OptionValue::Callback4(cb)) = dict.get("callback4") {
            let mut values = OptionValues::new();
            cb("x", &dict, &OptionValue::Int(1), &mut values);
        }
        assert_eq!(hits.load(Ordering::SeqCst), 11);
        assert_eq!(dict.action().map(|a| a.name()), Some("noop"));
        assert_eq!(dict.choices(), vec!["a", "2"]);
    }

    #[test]
    fn test_option_dict_keys_are_unique() {
        let mut dict = OptionDict::new().with("default", OptionValue::Int(1));
        let old = dict.insert("default", OptionValue::Int(2));
        assert_matches!(old, Some(OptionValue::Int(1)));
        assert_eq!(dict.len(), 1);
        assert_eq!(dict.default_value().as_int(), Some(2));
    }

    #[test]
    fn test_options_preserve_declaration_order() {
        let options: Options = vec![
            ("zeta".into(), OptionDict::new()),
            ("alpha".into(), OptionDict::new()),
            ("mid".into(), OptionDict::new()),
            ("beta".into(), OptionDict::new()),
        ];
        let resolved = resolve_options("s", &options, None).unwrap();
        let names: Vec<&str> = resolved.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid", "beta"]);
    }

    #[test]
    fn test_resolve_uses_table_then_default() {
        let options: Options = vec![
            (
                "max".into(),
                OptionDict::new()
                    .with("type", OptionValue::Str("int".into()))
                    .with("default", OptionValue::Int(100)),
            ),
            (
                "ignore".into(),
                OptionDict::new()
                    .with("type", OptionValue::Str("csv".into()))
                    .with("default", csv(&["CVS"])),
            ),
            (
                "skip".into(),
                OptionDict::new().with("type", OptionValue::Str("regexp_csv".into())),
            ),
            (
                "quiet".into(),
                OptionDict::new().with("type", OptionValue::Str("yn".into())),
            ),
        ];
        let table: toml::Table = toml::from_str(
            r#"
ignore = "build, dist"
skip = ["^test_", "_old$"]
quiet = "yes"
"#,
        )
        .unwrap();
        let resolved = resolve_options("main", &options, Some(&table)).unwrap();
        assert_eq!(resolved[0].1.as_int(), Some(100));
        assert_eq!(resolved[1].1.strings(), vec!["build", "dist"]);
        let pats = resolved[2].1.patterns();
        assert!(pats[0].is_match("test_x") && pats[1].is_match("x_old"));
        assert_eq!(resolved[3].1.as_bool(), Some(true));
    }

    #[test]
    fn test_resolve_rejects_unknown_and_mistyped() {
        let options: Options = vec![(
            "max".into(),
            OptionDict::new().with("type", OptionValue::Str("int".into())),
        )];
        let unknown: toml::Table = toml::from_str("other = 1").unwrap();
        assert_matches!(
            resolve_options("format", &options, Some(&unknown)),
            Err(Error::UnknownOption { option, .. }) if option == "other"
        );
        let wrong: toml::Table = toml::from_str("max = true").unwrap();
        assert_matches!(
            resolve_options("format", &options, Some(&wrong)),
            Err(Error::OptionType { found, .. }) if found == "boolean"
        );
    }

    #[test]
    fn test_choice_and_bad_regexp() {
        let dict = OptionDict::new()
            .with("type", OptionValue::Str("choice".into()))
            .with("choices", csv(&["human", "json"]));
        assert_eq!(parse_cli_value("output-format", &dict, "json").unwrap().as_str(), Some("json"));
        assert_matches!(
            parse_cli_value("output-format", &dict, "xml"),
            Err(Error::OptionType { .. })
        );

        let re = OptionDict::new().with("type", OptionValue::Str("regexp".into()));
        assert_matches!(parse_cli_value("p", &re, "(unclosed"), Err(Error::OptionPattern { .. }));
    }
}
