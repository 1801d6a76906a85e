//! File-backed storage for named menu documents.
//!
//! Documents live as `<name>.json` files in a single documents directory.
//! The directory defaults to whatever the host passes in, with the
//! `MENUBUILDER_CONFIG_PATH` environment variable taking precedence when it
//! names an existing directory. Loading never mutates anything: a failed
//! load simply returns, leaving the caller's current tree untouched.

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::document;
use crate::core::error::{FormatError, MenubuilderError, Result};
use crate::core::tree::MenuTree;

/// Environment variable that overrides the documents directory.
pub const CONFIG_PATH_ENV: &str = "MENUBUILDER_CONFIG_PATH";

/// Reads and writes named menu documents in a documents directory.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    documents_dir: PathBuf,
}

impl DocumentStore {
    /// Creates a store bound to `documents_dir`.
    #[must_use]
    pub fn new(documents_dir: impl Into<PathBuf>) -> Self {
        Self {
            documents_dir: documents_dir.into(),
        }
    }

    /// Creates a store bound to the `MENUBUILDER_CONFIG_PATH` directory when
    /// that variable is set and exists, falling back to `default_dir`.
    #[must_use]
    pub fn resolve(default_dir: impl Into<PathBuf>) -> Self {
        if let Ok(env_dir) = std::env::var(CONFIG_PATH_ENV) {
            let env_path = PathBuf::from(&env_dir);
            if env_path.is_dir() {
                log::info!("Using documents directory from {CONFIG_PATH_ENV}: {env_dir}");
                return Self::new(env_path);
            }
        }
        let dir = default_dir.into();
        log::info!("Using default documents directory: {}", dir.display());
        Self::new(dir)
    }

    /// The directory this store reads from and writes to.
    #[must_use]
    pub fn documents_dir(&self) -> &Path {
        &self.documents_dir
    }

    fn document_path(&self, name: &str) -> PathBuf {
        self.documents_dir.join(format!("{name}.json"))
    }

    /// Loads and validates the document `name` (no `.json` suffix).
    ///
    /// # Errors
    ///
    /// [`MenubuilderError::DocumentNotFound`] if no such file exists,
    /// [`MenubuilderError::Io`] for read failures, or
    /// [`MenubuilderError::Format`] when the content fails parsing or
    /// invariant re-validation.
    pub fn load(&self, name: &str) -> Result<MenuTree> {
        let path = self.document_path(name);
        if !path.exists() {
            return Err(MenubuilderError::DocumentNotFound(name.to_string()));
        }
        let text = fs::read_to_string(&path)?;
        let tree = document::deserialize(&text)?;
        log::info!("Loaded {} entries from {}", tree.len(), path.display());
        Ok(tree)
    }

    /// Serializes `tree` to `<name>.json`, creating the directory as needed.
    ///
    /// The output is pretty-printed so documents stay diffable and
    /// hand-editable.
    ///
    /// # Errors
    ///
    /// [`MenubuilderError::Io`] for directory or write failures.
    pub fn save(&self, name: &str, tree: &MenuTree) -> Result<()> {
        fs::create_dir_all(&self.documents_dir)?;
        let document = document::serialize(tree);
        let json = serde_json::to_string_pretty(&document).map_err(FormatError::Json)?;
        let path = self.document_path(name);
        fs::write(&path, json)?;
        log::info!("Saved {} entries to {}", tree.len(), path.display());
        Ok(())
    }

    /// Names of all documents in the directory, sorted alphabetically.
    ///
    /// A missing directory yields an empty list rather than an error.
    ///
    /// # Errors
    ///
    /// [`MenubuilderError::Io`] for directory read failures other than the
    /// directory being absent.
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.documents_dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.documents_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}
