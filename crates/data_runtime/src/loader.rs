//! Path resolution and file readers for everything under `data/`.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Workspace `data/` directory, so tests and tools can run from any crate.
#[must_use]
pub fn data_root() -> PathBuf {
    let here = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    let ws = here.join("../../data");
    if ws.is_dir() { ws } else { here.join("data") }
}

/// Read a raw text file and return its string.
pub fn read_text(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

/// Read and deserialize a JSON file.
pub fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let txt = read_text(path)?;
    serde_json::from_str(&txt).with_context(|| format!("parse json {}", path.display()))
}

/// Deserialize `config/<name>.toml` under `root`, or the type's defaults when
/// the file is absent.
pub fn read_toml_or_default<T: DeserializeOwned + Default>(root: &Path, name: &str) -> Result<T> {
    let path = root.join("config").join(format!("{name}.toml"));
    if !path.is_file() {
        return Ok(T::default());
    }
    let txt = read_text(&path)?;
    toml::from_str::<T>(&txt).with_context(|| format!("parse {name} TOML"))
}

/// Parsed env var, ignoring unset or malformed values.
pub(crate) fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
