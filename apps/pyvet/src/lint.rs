//! Lint orchestration.
//!
//! The `Linter` owns the message registry, the enable/disable state and the
//! checkers. `check` runs discovery, loading, pragma collection and every raw
//! checker, and collects the emitted messages and stats into a `LintResult`.

use crate::checkers::{default_raw_checkers, Checker, MainChecker, MainSettings, RawChecker};
use crate::config::PyvetConfig;
use crate::discover;
use crate::error::{Error, Result};
use crate::loader::{self, LoadedModule};
use crate::models::{ErrorDescription, FileItem, LoadFailure, Message, MessageCategory, MessageLocation};
use crate::options::{parse_cli_value, resolve_options, OptionDict, OptionValue, OptionValues, Options};
use crate::registry::MessageRegistry;
use crate::state::{MessageStateHandler, PragmaEvent};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
/// The module messages are being emitted for.
pub struct ModuleRef {
    pub name: String,
    pub abspath: String,
    /// Display path.
    pub path: String,
}

impl ModuleRef {
    pub fn new(name: impl Into<String>, abspath: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            abspath: abspath.into(),
            path: path.into(),
        }
    }

    /// Display path is relative to `cwd` when one can be computed.
    pub fn for_item(item: &FileItem, cwd: &Path) -> Self {
        Self::for_path(&item.name, Path::new(&item.filepath), cwd)
    }

    /// Module `name` at `file`; a relative `file` is taken from `cwd`.
    pub fn for_path(name: &str, file: &Path, cwd: &Path) -> Self {
        let abs = if file.is_absolute() {
            file.to_path_buf()
        } else {
            cwd.join(file)
        };
        let abspath = abs.to_string_lossy().into_owned();
        let path = pathdiff::diff_paths(&abs, cwd)
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|| abspath.clone());
        Self::new(name, abspath, path)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Run statistics.
pub struct LinterStats {
    by_category: BTreeMap<MessageCategory, usize>,
    pub statements: usize,
    pub modules: usize,
}

impl LinterStats {
    pub fn count(&self, category: MessageCategory) -> usize {
        self.by_category.get(&category).copied().unwrap_or(0)
    }

    fn record(&mut self, category: MessageCategory) {
        *self.by_category.entry(category).or_default() += 1;
    }

    pub fn total(&self) -> usize {
        self.by_category.values().sum()
    }

    /// Exit status: one bit per category that produced messages.
    pub fn exit_code(&self, exit_zero: bool) -> i32 {
        if exit_zero {
            return 0;
        }
        self.by_category
            .iter()
            .filter(|(_, n)| **n > 0)
            .fold(0, |acc, (cat, _)| acc | cat.exit_bit())
    }
}

#[derive(Debug, Default)]
/// Collects emitted messages.
pub struct Reporter {
    messages: Vec<Message>,
    stats: LinterStats,
}

impl Reporter {
    pub fn add(&mut self, message: Message) {
        self.stats.record(message.category);
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn stats(&self) -> &LinterStats {
        &self.stats
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}

/// Message sink handed to checkers while one module is processed.
pub struct Emitter<'a> {
    registry: &'a MessageRegistry,
    state: &'a MessageStateHandler,
    target: &'a ModuleRef,
    reporter: &'a mut Reporter,
}

impl<'a> Emitter<'a> {
    pub fn new(
        registry: &'a MessageRegistry,
        state: &'a MessageStateHandler,
        target: &'a ModuleRef,
        reporter: &'a mut Reporter,
    ) -> Self {
        Self {
            registry,
            state,
            target,
            reporter,
        }
    }

    /// Emit a module-level message at a single position.
    pub fn add_message(&mut self, symbol: &str, line: u32, column: u32, text: impl Into<String>) {
        self.add_message_span(symbol, line, column, None, None, "", text);
    }

    /// Emit a message. Dropped when the message is disabled at `line`.
    #[allow(clippy::too_many_arguments)]
    pub fn add_message_span(
        &mut self,
        symbol: &str,
        line: u32,
        column: u32,
        end_line: Option<u32>,
        end_column: Option<u32>,
        obj: &str,
        text: impl Into<String>,
    ) {
        let Some(def) = self.registry.get(symbol) else {
            log::warn!("dropping unregistered message '{}'", symbol);
            return;
        };
        if !self.state.is_message_enabled(self.registry, &def.msgid, Some(line)) {
            return;
        }
        let location = MessageLocation::new(
            &self.target.abspath,
            &self.target.path,
            &self.target.name,
            obj,
            line,
            column,
        )
        .with_end(end_line, end_column);
        if !location.has_ordered_span() {
            log::warn!(
                "{}:{}:{}: {} ends before it starts ({:?}:{:?})",
                location.path,
                line,
                column,
                def.symbol,
                end_line,
                end_column
            );
        }
        self.reporter.add(Message {
            msg_id: def.msgid.clone(),
            symbol: def.symbol.clone(),
            msg: text.into(),
            category: def.category,
            location,
        });
    }
}

#[derive(Debug, Clone, Default)]
/// Outcome of `Linter::check`.
pub struct LintResult {
    /// Sorted by path, line and column.
    pub messages: Vec<Message>,
    /// Modules that could not be analyzed.
    pub errors: Vec<ErrorDescription>,
    pub stats: LinterStats,
}

pub struct Linter {
    registry: MessageRegistry,
    state: MessageStateHandler,
    main: MainChecker,
    raw_checkers: Vec<Box<dyn RawChecker>>,
    cwd: PathBuf,
}

impl Linter {
    /// A linter with the built-in checkers and default option values.
    pub fn new() -> Result<Self> {
        Self::with_checkers(default_raw_checkers())
    }

    pub fn with_checkers(raw_checkers: Vec<Box<dyn RawChecker>>) -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|source| Error::Io {
            path: PathBuf::from("."),
            source,
        })?;
        let mut linter = Self {
            registry: MessageRegistry::new(),
            state: MessageStateHandler::new(),
            main: MainChecker::default(),
            raw_checkers: Vec::new(),
            cwd,
        };
        linter.registry.register_checker(linter.main.name(), linter.main.msgs())?;
        for checker in raw_checkers {
            linter.register_checker(checker)?;
        }
        linter.load_configuration(&PyvetConfig::default())?;
        Ok(linter)
    }

    /// Register a raw checker's messages and apply its option defaults.
    pub fn register_checker(&mut self, mut checker: Box<dyn RawChecker>) -> Result<()> {
        if checker.name() == "main" || self.raw_checkers.iter().any(|c| c.name() == checker.name()) {
            return Err(Error::DuplicateMessage(checker.name().to_string()));
        }
        self.registry.register_checker(checker.name(), checker.msgs())?;
        apply_options(checker.as_mut(), &self.registry, &mut self.state, None)?;
        log::debug!("registered checker {}", checker.name());
        self.raw_checkers.push(checker);
        Ok(())
    }

    /// Directory display paths are made relative to.
    pub fn set_cwd(&mut self, cwd: impl Into<PathBuf>) {
        self.cwd = cwd.into();
    }

    pub fn registry(&self) -> &MessageRegistry {
        &self.registry
    }

    pub fn state(&self) -> &MessageStateHandler {
        &self.state
    }

    pub fn settings(&self) -> &MainSettings {
        &self.main.settings
    }

    /// Declared options per checker, `main` first.
    pub fn options(&self) -> Vec<(&'static str, Options)> {
        let mut out = vec![(self.main.name(), self.main.options())];
        out.extend(self.raw_checkers.iter().map(|c| (c.name(), c.options())));
        out
    }

    fn has_section(&self, name: &str) -> bool {
        name == self.main.name() || self.raw_checkers.iter().any(|c| c.name() == name)
    }

    /// Resolve every checker's options against its section of `config`.
    pub fn load_configuration(&mut self, config: &PyvetConfig) -> Result<()> {
        if let Some(unknown) = config.sections().find(|s| !self.has_section(s)) {
            return Err(Error::UnknownSection(unknown.to_string()));
        }
        let Self {
            registry,
            state,
            main,
            raw_checkers,
            ..
        } = self;
        apply_options(main, registry, state, config.section("main"))?;
        for checker in raw_checkers.iter_mut() {
            let table = config.section(checker.name());
            apply_options(checker.as_mut(), registry, state, table)?;
        }
        Ok(())
    }

    /// Set one option from a command-line string.
    pub fn set_option(&mut self, section: &str, name: &str, raw: &str) -> Result<()> {
        let Self {
            registry,
            state,
            main,
            raw_checkers,
            ..
        } = self;
        if section == main.name() {
            return set_cli_option(main, registry, state, name, raw);
        }
        match raw_checkers.iter_mut().find(|c| c.name() == section) {
            Some(checker) => set_cli_option(checker.as_mut(), registry, state, name, raw),
            None => Err(Error::UnknownSection(section.to_string())),
        }
    }

    /// Check every module found under `paths`.
    pub fn check(&mut self, paths: &[PathBuf]) -> Result<LintResult> {
        let rules = self.main.settings.ignore_rules();
        let (descrs, arg_errors) = discover::expand_modules(paths, &rules)?;
        let items: Vec<FileItem> = descrs.iter().map(FileItem::from).collect();
        let (modules, load_errors) = loader::load_modules(&items, self.main.settings.jobs)?;

        let mut failed: Vec<(ModuleRef, ErrorDescription)> = arg_errors
            .into_iter()
            .map(|(arg, err)| (ModuleRef::for_path(&err.module, &arg, &self.cwd), err))
            .collect();
        failed.extend(
            load_errors
                .into_iter()
                .map(|(item, err)| (ModuleRef::for_item(&item, &self.cwd), err)),
        );

        let mut reporter = Reporter::default();
        for (target, err) in &failed {
            self.report_error(target, err, &mut reporter);
        }
        let errors: Vec<ErrorDescription> = failed.into_iter().map(|(_, err)| err).collect();
        for module in &modules {
            self.check_module(module, &mut reporter);
        }
        self.state.set_current_module(None);

        let Reporter {
            mut messages,
            mut stats,
        } = reporter;
        stats.modules = modules.len();
        stats.statements = modules.iter().map(LoadedModule::statements).sum();
        messages.sort_by(|a, b| {
            (&a.location.path, a.location.line, a.location.column).cmp(&(
                &b.location.path,
                b.location.line,
                b.location.column,
            ))
        });
        log::debug!(
            "checked {} modules: {} messages, {} fatal load errors",
            stats.modules,
            messages.len(),
            errors.len()
        );
        Ok(LintResult {
            messages,
            errors,
            stats,
        })
    }

    fn report_error(&mut self, target: &ModuleRef, err: &ErrorDescription, reporter: &mut Reporter) {
        self.state.set_current_module(Some(&err.module));
        let mut emitter = Emitter::new(&self.registry, &self.state, target, reporter);
        match &err.ex {
            LoadFailure::ImportFailure { message } => emitter.add_message("fatal", 1, 0, message.as_str()),
            LoadFailure::SyntaxFailure {
                message,
                line,
                column,
            } => emitter.add_message(
                "syntax-error",
                line.unwrap_or(1),
                column.unwrap_or(0),
                format!("Parsing failed: '{}'", message),
            ),
        }
    }

    fn check_module(&mut self, module: &LoadedModule, reporter: &mut Reporter) {
        let target = ModuleRef::for_item(&module.item, &self.cwd);
        self.state.set_current_module(Some(&module.item.name));
        self.state.clear_managed_messages();
        let events = self.state.collect_pragmas(&self.registry, &module.source);

        let mut emitter = Emitter::new(&self.registry, &self.state, &target, reporter);
        for event in &events {
            match event {
                PragmaEvent::Unknown { line, id } => emitter.add_message(
                    "unknown-option-value",
                    *line,
                    0,
                    format!(
                        "Unknown option value in pragma, expected a message, category or checker name, got '{}'",
                        id
                    ),
                ),
                PragmaEvent::Disabled { line, id } => {
                    let text = match self.registry.get(id) {
                        Some(def) => format!("Locally disabling {} ({})", def.symbol, def.msgid),
                        None => format!("Locally disabling {}", id),
                    };
                    emitter.add_message("locally-disabled", *line, 0, text);
                }
            }
        }

        for checker in self.raw_checkers.iter_mut() {
            checker.process_module(module, &mut emitter);
        }

        for managed in self.state.managed_messages() {
            if managed.name.as_deref() != Some(module.item.name.as_str()) {
                continue;
            }
            let action = if managed.is_disabled { "disable" } else { "enable" };
            emitter.add_message(
                "use-symbolic-message-instead",
                managed.line.unwrap_or(1),
                0,
                format!(
                    "'{}' is cryptic: use '# pyvet: {}={}' instead",
                    managed.msgid, action, managed.symbol
                ),
            );
        }
    }
}

fn run_callbacks(
    name: &str,
    dict: &OptionDict,
    value: &OptionValue,
    registry: &MessageRegistry,
    state: &mut MessageStateHandler,
    values: &mut OptionValues,
) -> Result<()> {
    if value.is_none() {
        return Ok(());
    }
    if let Some(action) = dict.action() {
        action.call(registry, state, value)?;
    }
    match dict.get("callback") {
        Some(OptionValue::Callback(cb)) => cb(value),
        Some(OptionValue::Callback4(cb)) => cb(name, dict, value, values),
        _ => {}
    }
    Ok(())
}

fn apply_options<C: Checker + ?Sized>(
    checker: &mut C,
    registry: &MessageRegistry,
    state: &mut MessageStateHandler,
    table: Option<&toml::Table>,
) -> Result<()> {
    let options = checker.options();
    let mut values = OptionValues::new();
    for ((name, value), (_, dict)) in resolve_options(checker.name(), &options, table)?
        .into_iter()
        .zip(options.iter())
    {
        run_callbacks(&name, dict, &value, registry, state, &mut values)?;
        checker.set_option(&name, &value)?;
        values.insert(name, value);
    }
    Ok(())
}

fn set_cli_option<C: Checker + ?Sized>(
    checker: &mut C,
    registry: &MessageRegistry,
    state: &mut MessageStateHandler,
    name: &str,
    raw: &str,
) -> Result<()> {
    let options = checker.options();
    let Some((_, dict)) = options.iter().find(|(n, _)| n == name) else {
        return Err(Error::UnknownOption {
            section: checker.name().to_string(),
            option: name.to_string(),
        });
    };
    let value = parse_cli_value(name, dict, raw)?;
    run_callbacks(name, dict, &value, registry, state, &mut OptionValues::new())?;
    checker.set_option(name, &value)
}
