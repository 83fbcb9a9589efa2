//! Module discovery.
//!
//! Expands command-line path arguments into `ModuleDescription`s. Files are
//! taken as-is; directories are walked for `*.py` files. Module names follow
//! package structure: a directory belongs to its parent package while it
//! holds an `__init__.py`.

use crate::error::{Error, Result};
use crate::models::{ErrorDescription, ModuleDescription};
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
/// Files and directories excluded from discovery.
pub struct IgnoreRules {
    /// Exact base names.
    pub names: Vec<String>,
    /// Matched against base names.
    pub patterns: Vec<Regex>,
    /// Matched against full paths.
    pub paths: Vec<Regex>,
}

impl IgnoreRules {
    pub fn is_ignored(&self, path: &Path) -> bool {
        let base = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.names.iter().any(|n| *n == base) || self.patterns.iter().any(|re| re.is_match(&base)) {
            return true;
        }
        let full = path.to_string_lossy();
        self.paths.iter().any(|re| re.is_match(&full))
    }

    // True when `path` or any directory between `root` and it is ignored.
    fn covers(&self, root: &Path, path: &Path) -> bool {
        let Ok(rel) = path.strip_prefix(root) else {
            return self.is_ignored(path);
        };
        let mut cur = root.to_path_buf();
        for comp in rel.components() {
            cur.push(comp);
            if self.is_ignored(&cur) {
                return true;
            }
        }
        false
    }
}

/// Dotted module name of a `.py` file.
pub fn module_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut parts = Vec::new();
    if stem != "__init__" {
        parts.push(stem.clone());
    }
    let mut dir = path.parent();
    while let Some(d) = dir {
        if !d.join("__init__.py").is_file() {
            break;
        }
        match d.file_name() {
            Some(n) => parts.push(n.to_string_lossy().into_owned()),
            None => break,
        }
        dir = d.parent();
    }
    if parts.is_empty() {
        return stem;
    }
    parts.reverse();
    parts.join(".")
}

/// Expand path arguments into module descriptions, sorted by path.
///
/// Arguments that do not exist come back as import failures, paired with
/// the argument, rather than errors so the rest of the run can proceed.
pub fn expand_modules(
    args: &[PathBuf],
    ignore: &IgnoreRules,
) -> Result<(Vec<ModuleDescription>, Vec<(PathBuf, ErrorDescription)>)> {
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut result = Vec::new();
    let mut errors = Vec::new();

    for arg in args {
        let abs = match arg.canonicalize() {
            Ok(p) => p,
            Err(e) => {
                let name = arg
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| arg.to_string_lossy().into_owned());
                log::debug!("cannot resolve {}: {}", arg.display(), e);
                errors.push((
                    arg.clone(),
                    ErrorDescription::import_failure(name.clone(), format!("No module named {}", name)),
                ));
                continue;
            }
        };
        if ignore.is_ignored(&abs) {
            log::debug!("ignoring argument {}", abs.display());
            continue;
        }

        if abs.is_file() {
            let name = module_name(&abs);
            if seen.insert(abs.clone()) {
                result.push(ModuleDescription::new(&abs, name.clone(), true, &abs, name)?);
            }
            continue;
        }

        let init = abs.join("__init__.py");
        let is_package = init.is_file();
        let (basepath, basename) = if is_package {
            (init.clone(), module_name(&init))
        } else {
            let name = abs
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| abs.to_string_lossy().into_owned());
            (abs.clone(), name)
        };

        let pattern = format!("{}/**/*.py", glob::Pattern::escape(&abs.to_string_lossy()));
        let entries = glob::glob(&pattern).map_err(|source| Error::Glob {
            pattern: pattern.clone(),
            source,
        })?;
        for entry in entries {
            let path = match entry {
                Ok(p) => p,
                Err(e) => {
                    log::warn!("skipping {}: {}", e.path().display(), e.error());
                    continue;
                }
            };
            if !path.is_file() || ignore.covers(&abs, &path) {
                continue;
            }
            if !seen.insert(path.clone()) {
                continue;
            }
            let isarg = is_package && path == init;
            let name = module_name(&path);
            result.push(ModuleDescription::new(&path, name, isarg, &basepath, basename.clone())?);
        }
    }

    result.sort_by(|a, b| a.path.cmp(&b.path));
    log::debug!("discovered {} modules, {} failures", result.len(), errors.len());
    Ok((result, errors))
}
