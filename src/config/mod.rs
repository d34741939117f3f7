//! Configuration overrides for preflight checks.
//!
//! Overrides are resolved from three sources, lowest precedence first:
//! - A TOML file (`--config <FILE>`)
//! - `VM_PREFLIGHT_*` environment variables
//! - `--set KEY=VALUE` command line assignments
//!
//! Missing keys resolve to `false` / empty string, so a check with no
//! configuration runs with its built-in severity.

pub mod keys;

use crate::PreflightError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Prefix of environment variables that carry overrides
pub const ENV_PREFIX: &str = "VM_PREFLIGHT_";

/// Read-only view of the override store consumed by checks.
pub trait Overrides {
    /// Resolve a boolean override; absent keys are `false`
    fn lookup_bool(&self, key: &str) -> bool;

    /// Resolve a string override; absent keys are empty
    fn lookup_string(&self, key: &str) -> String;
}

/// A single override value as written in a config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OverrideValue {
    Bool(bool),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    preflight: BTreeMap<String, OverrideValue>,
    #[serde(flatten)]
    top_level: BTreeMap<String, OverrideValue>,
}

/// Resolved override store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreflightSettings {
    values: BTreeMap<String, OverrideValue>,
}

impl PreflightSettings {
    /// Create an empty settings store
    pub fn new() -> Self {
        Self::default()
    }

    /// Build settings from the process environment, an optional config file,
    /// and command line assignments.
    pub fn load(config: Option<&Path>, assignments: &[String]) -> Result<Self, PreflightError> {
        let mut settings = match config {
            Some(path) => Self::load_file(path)?,
            None => Self::new(),
        };
        settings.apply_env(std::env::vars())?;
        for assignment in assignments {
            settings.apply_assignment(assignment)?;
        }
        Ok(settings)
    }

    /// Load settings from a TOML file
    pub fn load_file(path: &Path) -> Result<Self, PreflightError> {
        let content = fs::read_to_string(path)
            .map_err(|e| PreflightError::io(format!("reading {}", path.display()), e))?;
        let settings = Self::parse_toml(&content, path)?;
        debug!(path = %path.display(), keys = settings.values.len(), "Loaded configuration file");
        Ok(settings)
    }

    /// Parse settings from TOML text.
    ///
    /// Keys may sit at the top level or in a `[preflight]` table; the table
    /// wins when both name the same key. Toggle keys must hold a boolean or
    /// one of the accepted boolean spellings.
    pub fn from_toml_str(content: &str) -> Result<Self, PreflightError> {
        Self::parse_toml(content, Path::new("<inline>"))
    }

    fn parse_toml(content: &str, origin: &Path) -> Result<Self, PreflightError> {
        let file: SettingsFile = toml::from_str(content).map_err(|source| PreflightError::Config {
            path: origin.to_path_buf(),
            source,
        })?;
        let mut merged = file.top_level;
        merged.extend(file.preflight);

        let mut settings = PreflightSettings::new();
        for (key, value) in merged {
            match value {
                OverrideValue::Bool(flag) => settings.set_bool(&key, flag),
                OverrideValue::Text(text) => settings.set_raw(&key, &text)?,
            }
        }
        Ok(settings)
    }

    /// Apply `VM_PREFLIGHT_*` variables from an iterator of `(name, value)` pairs.
    ///
    /// `VM_PREFLIGHT_SKIP_CHECK_KVM_DRIVER=true` sets `skip-check-kvm-driver`.
    pub fn apply_env<I, K, V>(&mut self, vars: I) -> Result<(), PreflightError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (name, value) in vars {
            let Some(suffix) = name.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            if suffix.is_empty() {
                continue;
            }
            let key = suffix.to_ascii_lowercase().replace('_', "-");
            self.set_raw(&key, value.as_ref())?;
        }
        Ok(())
    }

    /// Apply a `KEY=VALUE` assignment
    pub fn apply_assignment(&mut self, assignment: &str) -> Result<(), PreflightError> {
        let (key, value) = assignment
            .split_once('=')
            .ok_or_else(|| PreflightError::InvalidOverride {
                key: assignment.to_string(),
                value: String::new(),
            })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(PreflightError::InvalidOverride {
                key: String::new(),
                value: value.to_string(),
            });
        }
        self.set_raw(key, value.trim())
    }

    /// Set a boolean override
    pub fn set_bool(&mut self, key: &str, value: bool) {
        self.values.insert(key.to_string(), OverrideValue::Bool(value));
    }

    /// Set a string override
    pub fn set_string(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), OverrideValue::Text(value.into()));
    }

    /// Get the raw value of an override
    pub fn get(&self, key: &str) -> Option<&OverrideValue> {
        self.values.get(key)
    }

    /// Toggle keys only accept boolean spellings; everything else is kept as text.
    fn set_raw(&mut self, key: &str, value: &str) -> Result<(), PreflightError> {
        if keys::is_toggle(key) {
            let parsed = parse_bool(value).ok_or_else(|| PreflightError::InvalidOverride {
                key: key.to_string(),
                value: value.to_string(),
            })?;
            self.set_bool(key, parsed);
        } else {
            self.set_string(key, value);
        }
        Ok(())
    }
}

impl Overrides for PreflightSettings {
    fn lookup_bool(&self, key: &str) -> bool {
        match self.values.get(key) {
            Some(OverrideValue::Bool(value)) => *value,
            Some(OverrideValue::Text(text)) => parse_bool(text).unwrap_or(false),
            None => false,
        }
    }

    fn lookup_string(&self, key: &str) -> String {
        match self.values.get(key) {
            Some(OverrideValue::Text(text)) => text.clone(),
            Some(OverrideValue::Bool(value)) => value.to_string(),
            None => String::new(),
        }
    }
}

/// Parse the boolean spellings accepted for toggles
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
