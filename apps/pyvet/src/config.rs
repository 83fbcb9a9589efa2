//! Configuration discovery and effective settings resolution.
//!
//! pyvet reads `pyvet.toml|yaml|yml` from the repository root (or closest
//! ancestor). The file holds one table per checker, keyed by checker name:
//!
//! ```toml
//! [main]
//! disable = ["trailing-whitespace"]
//! jobs = 0
//!
//! [format]
//! max-line-length = 120
//! ```
//!
//! Values are typed by the option declarations of the checker that owns the
//! section. Overrides precedence: CLI > config file > option defaults.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILES: [&str; 3] = ["pyvet.toml", "pyvet.yaml", "pyvet.yml"];

#[derive(Debug, Default, Deserialize, Clone, PartialEq)]
#[serde(transparent)]
/// Root configuration: checker name to option table.
pub struct PyvetConfig {
    sections: BTreeMap<String, toml::Table>,
}

impl PyvetConfig {
    pub fn section(&self, name: &str) -> Option<&toml::Table> {
        self.sections.get(name)
    }

    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

#[derive(Debug, Clone)]
/// Repository root and the configuration found there.
pub struct Effective {
    pub repo_root: PathBuf,
    /// File the configuration was read from, if any.
    pub config_path: Option<PathBuf>,
    pub config: PyvetConfig,
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when a `pyvet.toml|yaml|yml` or a `.git` entry is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_FILES.iter().any(|f| cur.join(f).exists()) || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Path of the configuration file under `root`, TOML first.
pub fn config_file(root: &Path) -> Option<PathBuf> {
    CONFIG_FILES
        .iter()
        .map(|f| root.join(f))
        .find(|p| p.is_file())
}

/// Load the configuration under `root`. `Ok(None)` when there is no file.
pub fn load_config(root: &Path) -> Result<Option<PyvetConfig>> {
    let Some(path) = config_file(root) else {
        return Ok(None);
    };
    let s = fs::read_to_string(&path).map_err(|source| Error::Io {
        path: path.clone(),
        source,
    })?;
    let is_toml = path.extension().is_some_and(|e| e == "toml");
    let cfg = if is_toml {
        toml::from_str(&s).map_err(|source| Error::ConfigToml {
            path: path.clone(),
            source,
        })?
    } else if s.trim().is_empty() {
        log::warn!("{} is empty; using defaults", path.display());
        PyvetConfig::default()
    } else {
        serde_yaml::from_str(&s).map_err(|source| Error::ConfigYaml {
            path: path.clone(),
            source,
        })?
    };
    log::debug!("loaded configuration from {}", path.display());
    Ok(Some(cfg))
}

/// Resolve the repository root from the CLI flag (default: current dir) and
/// load its configuration.
pub fn resolve_effective(cli_repo_root: Option<&str>) -> Result<Effective> {
    let start = PathBuf::from(cli_repo_root.unwrap_or("."));
    let start = start.canonicalize().unwrap_or(start);
    let repo_root = detect_repo_root(&start);
    let config_path = config_file(&repo_root);
    let config = load_config(&repo_root)?.unwrap_or_default();
    Ok(Effective {
        repo_root,
        config_path,
        config,
    })
}
