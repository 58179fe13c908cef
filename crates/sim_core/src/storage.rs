//! Where sessions and telemetry files go. The simulation only ever reads and
//! writes whole files by name.

use anyhow::{Context, Result, anyhow};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub trait Storage {
    fn write(&self, name: &str, contents: &str) -> Result<()>;
    fn read(&self, name: &str) -> Result<String>;
    fn exists(&self, name: &str) -> bool;
}

/// Files under one directory, created on first write.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl Storage for FileStorage {
    fn write(&self, name: &str, contents: &str) -> Result<()> {
        std::fs::create_dir_all(&self.root)
            .with_context(|| format!("create {}", self.root.display()))?;
        let path = self.path_of(name);
        std::fs::write(&path, contents).with_context(|| format!("write {}", path.display()))
    }

    fn read(&self, name: &str) -> Result<String> {
        let path = self.path_of(name);
        std::fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))
    }

    fn exists(&self, name: &str) -> bool {
        self.path_of(name).is_file()
    }
}

/// In-process store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: RefCell<BTreeMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        self.files.borrow().get(name).cloned()
    }

    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.files.borrow().keys().cloned().collect()
    }
}

impl Storage for MemoryStorage {
    fn write(&self, name: &str, contents: &str) -> Result<()> {
        self.files
            .borrow_mut()
            .insert(name.to_string(), contents.to_string());
        Ok(())
    }

    fn read(&self, name: &str) -> Result<String> {
        self.get(name).ok_or_else(|| anyhow!("no such file: {name}"))
    }

    fn exists(&self, name: &str) -> bool {
        self.files.borrow().contains_key(name)
    }
}
