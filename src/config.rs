//! Extension configuration.
//!
//! Example `disksize.toml`:
//! ```toml
//! [variables]
//! datadir = "/var/lib/mysql/"
//! log_bin_basename = "/var/lib/mysql/binlog"
//! tmpdir = "/tmp"
//!
//! [access]
//! user = "monitor"
//! privilege = "SENSITIVE_VARIABLES_OBSERVER"
//! grants = ["SENSITIVE_VARIABLES_OBSERVER"]
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::{PrivilegeGate, Session};
use crate::error::{DisksizeError, Result};
use crate::resolver::ConfigResolver;
use crate::snapshot::VARIABLES_TO_PARSE;

pub const DEFAULT_CONFIG_PATH: &str = "disksize.toml";
pub const CONFIG_PATH_ENV: &str = "DISKSIZE_CONFIG";
/// Per-variable overrides are read from `DISKSIZE_<NAME>`, e.g. `DISKSIZE_DATADIR`.
pub const VARIABLE_ENV_PREFIX: &str = "DISKSIZE_";
pub const DEFAULT_PRIVILEGE: &str = "SENSITIVE_VARIABLES_OBSERVER";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisksizeConfig {
    /// Server variable name → configured path.
    #[serde(default)]
    pub variables: BTreeMap<String, String>,

    #[serde(default)]
    pub access: AccessConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Global privilege required to read the table.
    #[serde(default = "default_privilege")]
    pub privilege: String,
    #[serde(default = "default_user")]
    pub user: String,
    /// Privileges granted to the querying session.
    #[serde(default = "default_grants")]
    pub grants: Vec<String>,
}

fn default_privilege() -> String {
    DEFAULT_PRIVILEGE.to_string()
}

fn default_user() -> String {
    "duckdb".to_string()
}

fn default_grants() -> Vec<String> {
    vec![DEFAULT_PRIVILEGE.to_string()]
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            privilege: default_privilege(),
            user: default_user(),
            grants: default_grants(),
        }
    }
}

impl DisksizeConfig {
    /// Loads the file named by `DISKSIZE_CONFIG` (or `disksize.toml`), then
    /// applies `DISKSIZE_<NAME>` environment overrides. A missing file yields
    /// the defaults.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        let mut config = Self::load_file(&path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("no config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|source| DisksizeError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents).map_err(|source| DisksizeError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Overrides each known variable from `lookup("DISKSIZE_<UPPERCASE_NAME>")`.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for name in VARIABLES_TO_PARSE {
            let key = format!("{VARIABLE_ENV_PREFIX}{}", name.to_uppercase());
            if let Some(value) = lookup(&key) {
                self.variables.insert(name.to_string(), value);
            }
        }
    }

    pub fn resolver(&self) -> ConfigResolver {
        ConfigResolver::new(self.variables.clone())
    }

    pub fn gate(&self) -> PrivilegeGate {
        PrivilegeGate::new(self.access.privilege.clone())
    }

    pub fn session(&self) -> Session {
        Session::new(self.access.user.clone(), self.access.grants.iter().cloned())
    }
}
