//! Enable/disable state of messages.
//!
//! State lives at two levels: global (from configuration and the command
//! line) and per line of the module being checked (from inline pragmas).
//! Line state wins over global state, which wins over a message's default.
//!
//! Requests that name a message by msgid instead of symbol are logged as
//! [`ManagedMessage`] snapshots so the linter can suggest the symbolic name.

use crate::error::Result;
use crate::loader::ScanState;
use crate::models::{ManagedMessage, MessageCategory};
use crate::options::{CallbackAction, OptionValue};
use crate::registry::{MessageDefinition, MessageRegistry};
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Lines a state change applies to.
pub enum Target {
    Global,
    /// The given line and every later one.
    From(u32),
    /// The given line only.
    Only(u32),
}

impl Target {
    fn line(self) -> Option<u32> {
        match self {
            Target::Global => None,
            Target::From(l) | Target::Only(l) => Some(l),
        }
    }
}

#[derive(Debug, Default)]
struct LineState {
    from: BTreeMap<u32, bool>,
    only: HashMap<u32, bool>,
}

#[derive(Debug, Default)]
pub struct MessageStateHandler {
    global: HashMap<String, bool>,
    module: HashMap<String, LineState>,
    current_module: Option<String>,
    managed: Vec<ManagedMessage>,
}

impl MessageStateHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new module: line-level state from the previous one is dropped.
    pub fn set_current_module(&mut self, name: Option<&str>) {
        self.current_module = name.map(str::to_string);
        self.module.clear();
    }

    pub fn current_module(&self) -> Option<&str> {
        self.current_module.as_deref()
    }

    pub fn enable(&mut self, registry: &MessageRegistry, id: &str, target: Target) -> Result<()> {
        self.set_status(registry, id, target, true)
    }

    pub fn disable(&mut self, registry: &MessageRegistry, id: &str, target: Target) -> Result<()> {
        self.set_status(registry, id, target, false)
    }

    fn set_status(
        &mut self,
        registry: &MessageRegistry,
        id: &str,
        target: Target,
        enabled: bool,
    ) -> Result<()> {
        let defs = messages_for(registry, id)?;
        for def in &defs {
            match target {
                Target::Global => {
                    self.global.insert(def.msgid.clone(), enabled);
                }
                Target::From(line) => {
                    self.module
                        .entry(def.msgid.clone())
                        .or_default()
                        .from
                        .insert(line, enabled);
                }
                Target::Only(line) => {
                    self.module
                        .entry(def.msgid.clone())
                        .or_default()
                        .only
                        .insert(line, enabled);
                }
            }
        }
        if registry.is_msgid(id) {
            if let Some(def) = defs.first() {
                self.managed.push(ManagedMessage {
                    name: self.current_module.clone(),
                    msgid: def.msgid.clone(),
                    symbol: def.symbol.clone(),
                    line: target.line(),
                    is_disabled: !enabled,
                });
            }
        }
        log::debug!(
            "{} {} ({} messages) at {:?}",
            if enabled { "enabled" } else { "disabled" },
            id,
            defs.len(),
            target
        );
        Ok(())
    }

    /// Whether `id` is enabled, at `line` when given. Unknown ids count as
    /// enabled.
    pub fn is_message_enabled(&self, registry: &MessageRegistry, id: &str, line: Option<u32>) -> bool {
        let Some(def) = registry.get(id) else {
            return true;
        };
        if let (Some(line), Some(ls)) = (line, self.module.get(&def.msgid)) {
            if let Some(&state) = ls.only.get(&line) {
                return state;
            }
            if let Some((_, &state)) = ls.from.range(..=line).next_back() {
                return state;
            }
        }
        self.global
            .get(&def.msgid)
            .copied()
            .unwrap_or(def.default_enabled)
    }

    pub fn managed_messages(&self) -> &[ManagedMessage] {
        &self.managed
    }

    pub fn clear_managed_messages(&mut self) {
        self.managed.clear();
    }

    /// Apply the inline pragmas of `source` to the current module.
    pub fn collect_pragmas(&mut self, registry: &MessageRegistry, source: &str) -> Vec<PragmaEvent> {
        let mut events = Vec::new();
        for pragma in parse_pragmas(source) {
            let target = match (pragma.action, pragma.trailing) {
                (PragmaAction::DisableNext, _) => Target::Only(pragma.line + 1),
                (_, true) => Target::Only(pragma.line),
                (_, false) => Target::From(pragma.line),
            };
            let enabled = pragma.action == PragmaAction::Enable;
            for id in pragma.ids {
                match self.set_status(registry, &id, target, enabled) {
                    Ok(()) if !enabled => events.push(PragmaEvent::Disabled {
                        line: pragma.line,
                        id,
                    }),
                    Ok(()) => {}
                    Err(_) => events.push(PragmaEvent::Unknown {
                        line: pragma.line,
                        id,
                    }),
                }
            }
        }
        events
    }
}

/// Messages an id refers to: `all`, a category name or letter, a checker
/// name, a msgid or a symbol.
pub fn messages_for<'a>(registry: &'a MessageRegistry, id: &str) -> Result<Vec<&'a MessageDefinition>> {
    if id == "all" {
        return Ok(registry.iter().collect());
    }
    if let Ok(cat) = id.parse::<MessageCategory>() {
        return Ok(registry.by_category(cat).collect());
    }
    let mut chars = id.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if let Some(cat) = MessageCategory::from_letter(c) {
            return Ok(registry.by_category(cat).collect());
        }
    }
    if registry.has_checker(id) {
        return Ok(registry.by_checker(id));
    }
    registry.require(id).map(|d| vec![d])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PragmaAction {
    Disable,
    Enable,
    DisableNext,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// An inline `# pyvet: <action>=<ids>` comment.
pub struct Pragma {
    pub line: u32,
    pub action: PragmaAction,
    pub ids: Vec<String>,
    /// The pragma follows code on the same line.
    pub trailing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Outcome of a pragma the linter reports on.
pub enum PragmaEvent {
    Disabled { line: u32, id: String },
    Unknown { line: u32, id: String },
}

fn pragma_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"#\s*pyvet:\s*(disable-next|disable|enable)\s*=\s*([\w\-]+(?:\s*,\s*[\w\-]+)*)")
            .expect("pragma regex is valid")
    })
}

/// Pragmas found in comments of `source`. Text inside string literals and
/// docstrings is never read as a pragma.
pub fn parse_pragmas(source: &str) -> Vec<Pragma> {
    let re = pragma_re();
    let mut scan = ScanState::default();
    let mut out = Vec::new();
    for (idx, text) in source.lines().enumerate() {
        let Some(start) = scan.scan(text).comment else {
            continue;
        };
        let Some(caps) = re.captures(&text[start..]) else {
            continue;
        };
        let (Some(action), Some(ids)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let action = match action.as_str() {
            "disable-next" => PragmaAction::DisableNext,
            "enable" => PragmaAction::Enable,
            _ => PragmaAction::Disable,
        };
        out.push(Pragma {
            line: idx as u32 + 1,
            action,
            ids: ids
                .as_str()
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            trailing: !text[..start].trim().is_empty(),
        });
    }
    out
}

/// `disable` option action.
pub struct DisableAction;

/// `enable` option action.
pub struct EnableAction;

fn apply_ids(
    registry: &MessageRegistry,
    state: &mut MessageStateHandler,
    value: &OptionValue,
    enabled: bool,
) -> Result<()> {
    for id in value.strings() {
        if enabled {
            state.enable(registry, &id, Target::Global)?;
        } else {
            state.disable(registry, &id, Target::Global)?;
        }
    }
    Ok(())
}

impl CallbackAction for DisableAction {
    fn name(&self) -> &'static str {
        "disable"
    }

    fn call(&self, registry: &MessageRegistry, state: &mut MessageStateHandler, value: &OptionValue) -> Result<()> {
        apply_ids(registry, state, value, false)
    }
}

impl CallbackAction for EnableAction {
    fn name(&self) -> &'static str {
        "enable"
    }

    fn call(&self, registry: &MessageRegistry, state: &mut MessageStateHandler, value: &OptionValue) -> Result<()> {
        apply_ids(registry, state, value, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::options::SeqItem;
    use crate::registry::MessageSpec;
    use assert_matches::assert_matches;

    fn registry() -> MessageRegistry {
        let mut reg = MessageRegistry::new();
        reg.register_checker(
            "format",
            &[
                MessageSpec::new("C0301", "line-too-long", ""),
                MessageSpec::new("C0303", "trailing-whitespace", ""),
            ],
        )
        .unwrap();
        reg.register_checker(
            "main",
            &[
                MessageSpec::new("W0012", "unknown-option-value", ""),
                MessageSpec::new("I0011", "locally-disabled", "").disabled_by_default(),
            ],
        )
        .unwrap();
        reg
    }

    #[test]
    fn test_global_and_default_state() {
        let reg = registry();
        let mut st = MessageStateHandler::new();
        assert!(st.is_message_enabled(&reg, "line-too-long", None));
        assert!(!st.is_message_enabled(&reg, "I0011", None));
        assert!(st.is_message_enabled(&reg, "no-such-message", Some(1)));

        st.disable(&reg, "line-too-long", Target::Global).unwrap();
        assert!(!st.is_message_enabled(&reg, "C0301", Some(10)));
        st.enable(&reg, "info", Target::Global).unwrap();
        assert!(st.is_message_enabled(&reg, "locally-disabled", None));
    }

    #[test]
    fn test_ids_resolve_to_groups() {
        let reg = registry();
        assert_eq!(messages_for(&reg, "all").unwrap().len(), 4);
        assert_eq!(messages_for(&reg, "C").unwrap().len(), 2);
        assert_eq!(messages_for(&reg, "convention").unwrap().len(), 2);
        assert_eq!(messages_for(&reg, "main").unwrap().len(), 2);
        assert_eq!(messages_for(&reg, "c0303").unwrap()[0].symbol, "trailing-whitespace");
        assert_matches!(messages_for(&reg, "bogus"), Err(Error::UnknownMessage(_)));
    }

    #[test]
    fn test_line_state_scopes() {
        let reg = registry();
        let mut st = MessageStateHandler::new();
        st.set_current_module(Some("pkg.mod"));
        st.disable(&reg, "line-too-long", Target::From(5)).unwrap();
        st.enable(&reg, "line-too-long", Target::From(9)).unwrap();
        st.disable(&reg, "line-too-long", Target::Only(12)).unwrap();
        assert!(st.is_message_enabled(&reg, "line-too-long", Some(4)));
        assert!(!st.is_message_enabled(&reg, "line-too-long", Some(5)));
        assert!(!st.is_message_enabled(&reg, "line-too-long", Some(8)));
        assert!(st.is_message_enabled(&reg, "line-too-long", Some(9)));
        assert!(!st.is_message_enabled(&reg, "line-too-long", Some(12)));
        assert!(st.is_message_enabled(&reg, "line-too-long", Some(13)));

        st.set_current_module(Some("pkg.other"));
        assert!(st.is_message_enabled(&reg, "line-too-long", Some(6)));
    }

    #[test]
    fn test_managed_messages_record_msgid_requests() {
        let reg = registry();
        let mut st = MessageStateHandler::new();
        st.disable(&reg, "C0301", Target::Global).unwrap();
        st.disable(&reg, "trailing-whitespace", Target::Global).unwrap();
        st.set_current_module(Some("pkg.mod"));
        st.enable(&reg, "c0303", Target::From(3)).unwrap();

        let managed = st.managed_messages();
        assert_eq!(managed.len(), 2);
        assert_eq!(managed[0].name, None);
        assert_eq!(managed[0].symbol, "line-too-long");
        assert_eq!(managed[0].line, None);
        assert!(managed[0].is_disabled);
        assert_eq!(managed[1].name.as_deref(), Some("pkg.mod"));
        assert_eq!(managed[1].msgid, "C0303");
        assert_eq!(managed[1].line, Some(3));
        assert!(!managed[1].is_disabled);

        st.clear_managed_messages();
        assert!(st.managed_messages().is_empty());
    }

    #[test]
    fn test_parse_pragmas() {
        let src = "# pyvet: disable=line-too-long, C0303\nx = 1  # pyvet: enable=all\n# pyvet:disable-next=trailing-whitespace\n# plain comment\n";
        let pragmas = parse_pragmas(src);
        assert_eq!(pragmas.len(), 3);
        assert_eq!(pragmas[0].ids, vec!["line-too-long", "C0303"]);
        assert!(!pragmas[0].trailing);
        assert_eq!(pragmas[1].action, PragmaAction::Enable);
        assert!(pragmas[1].trailing);
        assert_eq!(pragmas[2].action, PragmaAction::DisableNext);
        assert_eq!(pragmas[2].line, 3);
    }

    #[test]
    fn test_pragmas_in_strings_are_ignored() {
        let src = concat!(
            "\"\"\"Usage:\n",
            "# pyvet: disable=all\n",
            "\"\"\"\n",
            "s = '# pyvet: disable=all'\n",
            "t = \"x\"  # pyvet: disable=line-too-long\n",
        );
        let pragmas = parse_pragmas(src);
        assert_eq!(pragmas.len(), 1);
        assert_eq!(pragmas[0].line, 5);
        assert_eq!(pragmas[0].ids, vec!["line-too-long"]);
        assert!(pragmas[0].trailing);
    }

    #[test]
    fn test_collect_pragmas_reports_events() {
        let reg = registry();
        let mut st = MessageStateHandler::new();
        st.set_current_module(Some("m"));
        let src = "x = 1  # pyvet: disable=line-too-long\n# pyvet: disable-next=trailing-whitespace,bogus\ny = 2\n";
        let events = st.collect_pragmas(&reg, src);
        assert_eq!(
            events,
            vec![
                PragmaEvent::Disabled { line: 1, id: "line-too-long".into() },
                PragmaEvent::Disabled { line: 2, id: "trailing-whitespace".into() },
                PragmaEvent::Unknown { line: 2, id: "bogus".into() },
            ]
        );
        assert!(!st.is_message_enabled(&reg, "line-too-long", Some(1)));
        assert!(st.is_message_enabled(&reg, "line-too-long", Some(2)));
        assert!(st.is_message_enabled(&reg, "trailing-whitespace", Some(2)));
        assert!(!st.is_message_enabled(&reg, "trailing-whitespace", Some(3)));
    }

    #[test]
    fn test_option_actions() {
        let reg = registry();
        let mut st = MessageStateHandler::new();
        let ids = OptionValue::Seq(vec![SeqItem::Str("format".into())]);
        DisableAction.call(&reg, &mut st, &ids).unwrap();
        assert!(!st.is_message_enabled(&reg, "C0301", None));
        assert!(!st.is_message_enabled(&reg, "C0303", None));
        EnableAction
            .call(&reg, &mut st, &OptionValue::Seq(vec![SeqItem::Str("C0301".into())]))
            .unwrap();
        assert!(st.is_message_enabled(&reg, "C0301", None));
        let bad = OptionValue::Seq(vec![SeqItem::Str("nope".into())]);
        assert_matches!(DisableAction.call(&reg, &mut st, &bad), Err(Error::UnknownMessage(_)));
    }
}
