//! Logging configuration loaded from data/config/telemetry.toml with env overrides.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::loader::{env_parse, read_toml_or_default};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryCfg {
    /// `EnvFilter` directive, e.g. "info" or "client_core=debug,info".
    pub log_level: String,
    /// Human-readable output; JSON lines otherwise.
    pub pretty: bool,
}

impl Default for TelemetryCfg {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            pretty: true,
        }
    }
}

pub fn load_from(root: &Path) -> Result<TelemetryCfg> {
    let mut cfg: TelemetryCfg = read_toml_or_default(root, "telemetry")?;
    if let Ok(lvl) = std::env::var("LOG_LEVEL") {
        cfg.log_level = lvl;
    }
    if let Some(p) = env_parse("LOG_PRETTY") {
        cfg.pretty = p;
    }
    Ok(cfg)
}

