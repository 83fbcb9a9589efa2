//! Message definitions known to the linter.
//!
//! Checkers declare their messages as static [`MessageSpec`] tables; the
//! registry validates them once at registration and answers lookups by msgid
//! (case-insensitive) or symbol.

use crate::error::{Error, Result};
use crate::models::MessageCategory;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
/// A message as declared by a checker.
pub struct MessageSpec {
    pub msgid: &'static str,
    pub symbol: &'static str,
    pub description: &'static str,
    pub default_enabled: bool,
}

impl MessageSpec {
    pub const fn new(msgid: &'static str, symbol: &'static str, description: &'static str) -> Self {
        Self {
            msgid,
            symbol,
            description,
            default_enabled: true,
        }
    }

    pub const fn disabled_by_default(mut self) -> Self {
        self.default_enabled = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A registered message.
pub struct MessageDefinition {
    pub msgid: String,
    pub symbol: String,
    pub description: String,
    pub category: MessageCategory,
    pub checker: String,
    pub default_enabled: bool,
}

#[derive(Debug, Default)]
pub struct MessageRegistry {
    defs: Vec<MessageDefinition>,
    by_msgid: HashMap<String, usize>,
    by_symbol: HashMap<String, usize>,
}

impl MessageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every message of `checker`.
    pub fn register_checker(&mut self, checker: &str, specs: &[MessageSpec]) -> Result<()> {
        for spec in specs {
            self.register(checker, spec)?;
        }
        Ok(())
    }

    pub fn register(&mut self, checker: &str, spec: &MessageSpec) -> Result<()> {
        let category = parse_msgid(spec.msgid)?;
        let key = spec.msgid.to_ascii_uppercase();
        if self.by_msgid.contains_key(&key) {
            return Err(Error::DuplicateMessage(spec.msgid.to_string()));
        }
        if self.by_symbol.contains_key(spec.symbol) {
            return Err(Error::DuplicateMessage(spec.symbol.to_string()));
        }
        let idx = self.defs.len();
        self.defs.push(MessageDefinition {
            msgid: key.clone(),
            symbol: spec.symbol.to_string(),
            description: spec.description.to_string(),
            category,
            checker: checker.to_string(),
            default_enabled: spec.default_enabled,
        });
        self.by_msgid.insert(key, idx);
        self.by_symbol.insert(spec.symbol.to_string(), idx);
        log::debug!("registered message {} ({}) for {}", spec.msgid, spec.symbol, checker);
        Ok(())
    }

    /// Look up by msgid or symbol.
    pub fn get(&self, id: &str) -> Option<&MessageDefinition> {
        self.by_msgid
            .get(&id.to_ascii_uppercase())
            .or_else(|| self.by_symbol.get(id))
            .map(|&i| &self.defs[i])
    }

    pub fn require(&self, id: &str) -> Result<&MessageDefinition> {
        self.get(id).ok_or_else(|| Error::UnknownMessage(id.to_string()))
    }

    /// True when `id` names a message by msgid rather than by symbol.
    pub fn is_msgid(&self, id: &str) -> bool {
        self.by_msgid.contains_key(&id.to_ascii_uppercase()) && !self.by_symbol.contains_key(id)
    }

    pub fn by_checker(&self, checker: &str) -> Vec<&MessageDefinition> {
        self.defs.iter().filter(|d| d.checker == checker).collect()
    }

    pub fn by_category(&self, category: MessageCategory) -> impl Iterator<Item = &MessageDefinition> {
        self.defs.iter().filter(move |d| d.category == category)
    }

    pub fn has_checker(&self, checker: &str) -> bool {
        self.defs.iter().any(|d| d.checker == checker)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MessageDefinition> {
        self.defs.iter()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

// A msgid is a category letter followed by four digits.
fn parse_msgid(msgid: &str) -> Result<MessageCategory> {
    let mut chars = msgid.chars();
    let category = chars.next().and_then(MessageCategory::from_letter);
    let digits: Vec<char> = chars.collect();
    match category {
        Some(cat) if digits.len() == 4 && digits.iter().all(char::is_ascii_digit) => Ok(cat),
        _ => Err(Error::InvalidMsgid(msgid.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const SPECS: &[MessageSpec] = &[
        MessageSpec::new("C0301", "line-too-long", "Line too long (%s/%s)"),
        MessageSpec::new("W0012", "unknown-option-value", "Unknown option value"),
        MessageSpec::new("I0011", "locally-disabled", "Locally disabling %s").disabled_by_default(),
    ];

    #[test]
    fn test_lookup_by_msgid_and_symbol() {
        let mut reg = MessageRegistry::new();
        reg.register_checker("format", SPECS).unwrap();
        let by_id = reg.get("c0301").unwrap();
        let by_sym = reg.get("line-too-long").unwrap();
        assert_eq!(by_id, by_sym);
        assert_eq!(by_id.category, MessageCategory::Convention);
        assert_eq!(by_id.checker, "format");
        assert!(reg.is_msgid("C0301"));
        assert!(!reg.is_msgid("line-too-long"));
        assert!(!reg.get("I0011").unwrap().default_enabled);
        assert_eq!(reg.by_category(MessageCategory::Warning).count(), 1);
        assert_eq!(reg.by_checker("format").len(), 3);
    }

    #[test]
    fn test_rejects_duplicates_and_bad_ids() {
        let mut reg = MessageRegistry::new();
        reg.register_checker("format", SPECS).unwrap();
        assert_matches!(
            reg.register("other", &MessageSpec::new("C0301", "x", "")),
            Err(Error::DuplicateMessage(_))
        );
        assert_matches!(
            reg.register("other", &MessageSpec::new("C0999", "line-too-long", "")),
            Err(Error::DuplicateMessage(_))
        );
        for bad in ["X0001", "C01", "C0a01", ""] {
            assert_matches!(
                reg.register("other", &MessageSpec::new(bad, "fresh", "")),
                Err(Error::InvalidMsgid(_))
            );
        }
        assert_matches!(reg.require("nope"), Err(Error::UnknownMessage(_)));
    }
}
