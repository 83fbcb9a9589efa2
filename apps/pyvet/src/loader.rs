//! Module loading.
//!
//! Reads each discovered file and either returns its decoded source or an
//! `ErrorDescription` explaining why the module cannot be analyzed. Loading
//! runs on a rayon pool; results keep the order of the input items.

use crate::error::Result;
use crate::models::{ErrorDescription, FileItem};
use rayon::prelude::*;
use std::fs;

#[derive(Debug, Clone)]
/// Decoded source of a module.
pub struct LoadedModule {
    pub item: FileItem,
    pub source: String,
}

impl LoadedModule {
    pub fn lines(&self) -> std::str::Lines<'_> {
        self.source.lines()
    }

    /// Logical statement lines: non-blank, non-comment lines that do not
    /// continue a bracketed or backslash-continued expression, outside of
    /// triple-quoted strings.
    pub fn statements(&self) -> usize {
        let mut count = 0;
        let mut scan = ScanState::default();
        let mut continued = false;
        for line in self.lines() {
            let trimmed = line.trim();
            let starts_statement = scan.depth == 0 && !continued && !scan.in_string();
            if starts_statement && !trimmed.is_empty() && !trimmed.starts_with('#') {
                count += 1;
            }
            continued = scan.scan(line).continued;
        }
        count
    }
}

#[derive(Debug, Default, Clone, Copy)]
/// Bracket depth and open triple-quoted string carried from line to line.
pub struct ScanState {
    depth: i32,
    triple: Option<char>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
/// What scanning one line found.
pub struct LineScan {
    /// Byte offset of a `#` that starts a real comment.
    pub comment: Option<usize>,
    /// Ends in a backslash continuation.
    pub continued: bool,
}

impl ScanState {
    /// Inside a triple-quoted string.
    pub fn in_string(&self) -> bool {
        self.triple.is_some()
    }

    /// Scan one line and advance the state past it.
    pub fn scan(&mut self, line: &str) -> LineScan {
        let chars: Vec<(usize, char)> = line.char_indices().collect();
        let mut out = LineScan::default();
        let mut single: Option<char> = None;
        let mut i = 0;
        while i < chars.len() {
            let (at, c) = chars[i];
            let is_triple = (c == '"' || c == '\'')
                && i + 2 < chars.len()
                && chars[i + 1].1 == c
                && chars[i + 2].1 == c;
            if let Some(q) = self.triple {
                if is_triple && c == q {
                    self.triple = None;
                    i += 3;
                    continue;
                }
            } else if let Some(q) = single {
                if c == '\\' {
                    i += 1;
                } else if c == q {
                    single = None;
                }
            } else {
                match c {
                    '#' => {
                        out.comment = Some(at);
                        break;
                    }
                    '"' | '\'' if is_triple => {
                        self.triple = Some(c);
                        i += 3;
                        continue;
                    }
                    '"' | '\'' => single = Some(c),
                    '(' | '[' | '{' => self.depth += 1,
                    ')' | ']' | '}' => self.depth = (self.depth - 1).max(0),
                    '\\' if i + 1 == chars.len() => out.continued = true,
                    _ => {}
                }
            }
            i += 1;
        }
        out
    }
}

/// Read and decode one module.
pub fn load_module(item: &FileItem) -> Result<LoadedModule, ErrorDescription> {
    let bytes = fs::read(&item.filepath).map_err(|e| {
        ErrorDescription::import_failure(
            &item.name,
            format!("Unable to load file {}: {}", item.filepath, e),
        )
    })?;
    if let Some(pos) = bytes.iter().position(|&b| b == 0) {
        let (line, column) = position_of(&bytes, pos);
        return Err(ErrorDescription::syntax_failure(
            &item.name,
            "source code cannot contain null bytes",
            Some(line),
            Some(column),
        ));
    }
    let mut source = String::from_utf8(bytes).map_err(|e| {
        let pos = e.utf8_error().valid_up_to();
        let bytes = e.as_bytes();
        let (line, column) = position_of(bytes, pos);
        ErrorDescription::syntax_failure(
            &item.name,
            format!(
                "'utf-8' codec can't decode byte 0x{:02x} in position {}",
                bytes.get(pos).copied().unwrap_or(0),
                pos
            ),
            Some(line),
            Some(column),
        )
    })?;
    if source.starts_with('\u{feff}') {
        source.replace_range(..'\u{feff}'.len_utf8(), "");
    }
    log::debug!("loaded {} ({} bytes)", item.filepath, source.len());
    Ok(LoadedModule {
        item: item.clone(),
        source,
    })
}

/// Load every item on a pool of `jobs` threads (0: one per CPU). Failures
/// stay paired with the item that produced them.
pub fn load_modules(
    items: &[FileItem],
    jobs: usize,
) -> Result<(Vec<LoadedModule>, Vec<(FileItem, ErrorDescription)>)> {
    let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;
    let results: Vec<_> = pool.install(|| items.par_iter().map(load_module).collect());
    let mut modules = Vec::with_capacity(results.len());
    let mut errors = Vec::new();
    for (item, r) in items.iter().zip(results) {
        match r {
            Ok(m) => modules.push(m),
            Err(e) => {
                log::debug!("failed to load {}: {}", item.filepath, e.ex);
                errors.push((item.clone(), e));
            }
        }
    }
    Ok((modules, errors))
}

// 1-based line and 0-based column of a byte offset.
fn position_of(bytes: &[u8], pos: usize) -> (u32, u32) {
    let before = &bytes[..pos.min(bytes.len())];
    let line = before.iter().filter(|&&b| b == b'\n').count() as u32 + 1;
    let col = match before.iter().rposition(|&b| b == b'\n') {
        Some(nl) => pos - nl - 1,
        None => pos,
    };
    (line, col as u32)
}
