//! Descriptors produced by module discovery and consumed by the loader.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// A source file handed to the analysis driver.
pub struct FileItem {
    /// Full dotted name of the module.
    pub name: String,
    /// Path of the file.
    pub filepath: String,
    /// Module name of the argument the file was discovered under.
    pub modpath: String,
}

impl FileItem {
    /// Build an item, refusing empty fields.
    pub fn new(
        name: impl Into<String>,
        filepath: impl Into<String>,
        modpath: impl Into<String>,
    ) -> Result<Self> {
        let item = Self {
            name: name.into(),
            filepath: filepath.into(),
            modpath: modpath.into(),
        };
        non_empty("FileItem", "name", &item.name)?;
        non_empty("FileItem", "filepath", &item.filepath)?;
        non_empty("FileItem", "modpath", &item.modpath)?;
        Ok(item)
    }
}

impl From<&ModuleDescription> for FileItem {
    fn from(descr: &ModuleDescription) -> Self {
        Self {
            name: descr.name.clone(),
            filepath: descr.path.clone(),
            modpath: descr.basename.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// A module found while expanding command-line arguments.
pub struct ModuleDescription {
    pub path: String,
    pub name: String,
    /// Whether the module was named directly on the command line.
    pub isarg: bool,
    pub basepath: String,
    pub basename: String,
}

impl ModuleDescription {
    /// Build a description for a file that exists on disk.
    pub fn new(
        path: &Path,
        name: impl Into<String>,
        isarg: bool,
        basepath: &Path,
        basename: impl Into<String>,
    ) -> Result<Self> {
        if !path.exists() {
            return Err(Error::MissingPath(path.to_path_buf()));
        }
        let descr = Self {
            path: path.to_string_lossy().into_owned(),
            name: name.into(),
            isarg,
            basepath: basepath.to_string_lossy().into_owned(),
            basename: basename.into(),
        };
        non_empty("ModuleDescription", "name", &descr.name)?;
        non_empty("ModuleDescription", "basename", &descr.basename)?;
        Ok(descr)
    }
}

fn non_empty(record: &'static str, field: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::EmptyField { record, field });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn test_file_item_keeps_fields() {
        let item = FileItem::new("pkg.mod", "/a/pkg/mod.py", "pkg.mod").unwrap();
        assert_eq!(item.name, "pkg.mod");
        assert_eq!(item.filepath, "/a/pkg/mod.py");
        assert_eq!(item.modpath, "pkg.mod");
    }

    #[test]
    fn test_file_item_rejects_empty_fields() {
        assert_matches!(
            FileItem::new("", "/a/mod.py", "mod"),
            Err(Error::EmptyField { field: "name", .. })
        );
        assert_matches!(
            FileItem::new("mod", "/a/mod.py", ""),
            Err(Error::EmptyField { field: "modpath", .. })
        );
    }

    #[test]
    fn test_module_description_requires_existing_path() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.py");
        assert_matches!(
            ModuleDescription::new(&missing, "nope", true, &missing, "nope"),
            Err(Error::MissingPath(_))
        );

        let file = dir.path().join("mod.py");
        std::fs::write(&file, "x = 1\n").unwrap();
        let descr = ModuleDescription::new(&file, "mod", true, &file, "mod").unwrap();
        assert!(descr.isarg);
        assert_eq!(descr.path, file.to_string_lossy());
        assert_eq!(descr.basename, "mod");

        let item = FileItem::from(&descr);
        assert_eq!(item.modpath, "mod");
        assert_eq!(item.filepath, descr.path);
    }
}
