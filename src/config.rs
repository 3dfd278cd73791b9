//! # Configuration Module
//!
//! Server configuration loaded from an optional YAML file, then overridden by
//! environment variables.
//!
//! ## Environment Variables
//!
//! | Variable | Field | Default |
//! |---|---|---|
//! | `PIGEON_ADDR` | `addr` | `127.0.0.1:8080` |
//! | `PIGEON_TEMPLATES_DIR` | `templates_dir` | `templates` |
//! | `PIGEON_WORKERS` | `workers` | `4` |
//! | `PIGEON_MAX_BODY_SIZE` | `max_body_size` | `1048576` (1 MiB) |
//! | `PIGEON_DEFAULT_CONTENT_TYPE` | `default_content_type` | `text/html` |
//!
//! `PIGEON_WORKERS` and `PIGEON_MAX_BODY_SIZE` accept decimal (`8192`) or
//! hexadecimal (`0x2000`). Both must be greater than zero.
//!
//! ## Example Configuration
//!
//! ```yaml
//! addr: 0.0.0.0:8080
//! templates_dir: ./templates
//! workers: 8
//! max_body_size: 65536
//! default_content_type: text/html
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

const DEFAULT_WORKERS: usize = 4;
const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Runtime configuration for the server and router glue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    pub addr: String,
    /// Directory the template engine loads templates from
    pub templates_dir: PathBuf,
    /// Worker threads pulling requests off the listener
    pub workers: usize,
    /// Largest request body accepted; bigger bodies get 413
    pub max_body_size: usize,
    /// Content type routed on when the request has no usable `Accept` header
    pub default_content_type: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8080".to_string(),
            templates_dir: PathBuf::from("templates"),
            workers: DEFAULT_WORKERS,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            default_content_type: "text/html".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration: YAML file (if given) then environment overrides
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, is not valid YAML for this struct,
    /// or holds values rejected by [`ServerConfig::validate`].
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Read a YAML file; missing fields take their defaults
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, parsed or validated.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&source)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// # Errors
    ///
    /// Fails if `source` is not valid YAML for this struct or a value is
    /// out of range.
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that deserialize fine but cannot run a server
    ///
    /// # Errors
    ///
    /// Fails if `workers` or `max_body_size` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            bail!("workers must be greater than 0");
        }
        if self.max_body_size == 0 {
            bail!("max_body_size must be greater than 0");
        }
        Ok(())
    }

    /// Apply `PIGEON_*` overrides using `lookup` to read variables
    ///
    /// Unparseable or zero numeric values are ignored with a warning.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("PIGEON_ADDR") {
            self.addr = addr;
        }
        if let Some(dir) = lookup("PIGEON_TEMPLATES_DIR") {
            self.templates_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup("PIGEON_WORKERS") {
            match parse_size(&raw) {
                Some(n) if n > 0 => self.workers = n,
                _ => warn!(value = %raw, "Ignoring invalid PIGEON_WORKERS"),
            }
        }
        if let Some(raw) = lookup("PIGEON_MAX_BODY_SIZE") {
            match parse_size(&raw) {
                Some(size) if size > 0 => self.max_body_size = size,
                _ => warn!(value = %raw, "Ignoring invalid PIGEON_MAX_BODY_SIZE"),
            }
        }
        if let Some(content_type) = lookup("PIGEON_DEFAULT_CONTENT_TYPE") {
            self.default_content_type = content_type;
        }
    }
}

fn parse_size(val: &str) -> Option<usize> {
    let val = val.trim();
    if let Some(hex) = val.strip_prefix("0x") {
        usize::from_str_radix(hex, 16).ok()
    } else {
        val.parse().ok()
    }
}
