use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Key prefix that routes a general setting to the storage backend.
pub const STORAGE_KEY_PREFIX: &str = "s3_";

const REDACTED: &str = "***";
const SENSITIVE_KEY_MARKERS: [&str; 4] = ["token", "password", "secret", "access_key"];

pub type ConfigMap = BTreeMap<String, Value>;

#[derive(Debug, Error)]
pub enum WorkflowConfigError {
    #[error("File I/O error for '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{}': {source}", path.display())]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("JSON parsing error for '{}': {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// The user-facing settings document describing the workflow service.
///
/// Both sections are optional. Keys in `workflow_config` that start with
/// `s3_` belong to the storage backend; `workflow_s3_config` holds storage
/// keys without the prefix.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSettings {
    #[serde(default)]
    pub workflow_config: Option<ConfigMap>,
    #[serde(default)]
    pub workflow_s3_config: Option<ConfigMap>,
}

impl WorkflowSettings {
    /// Loads settings from a `.json` file, or from TOML for any other extension.
    pub fn from_path(path: &Path) -> Result<Self, WorkflowConfigError> {
        debug!("Loading workflow settings from {:?}", path);
        let content = std::fs::read_to_string(path).map_err(|e| WorkflowConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            serde_json::from_str(&content).map_err(|e| WorkflowConfigError::Json {
                path: path.to_path_buf(),
                source: e,
            })
        } else {
            toml::from_str(&content).map_err(|e| WorkflowConfigError::Toml {
                path: path.to_path_buf(),
                source: e,
            })
        }
    }
}

/// Resolved configuration of the workflow service, split into general and
/// storage-backend settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkflowConfig {
    general: ConfigMap,
    storage: ConfigMap,
}

impl WorkflowConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a configuration from both settings sections, general first.
    pub fn from_settings(settings: &WorkflowSettings) -> Self {
        let mut config = Self::new();
        if let Some(data) = &settings.workflow_config {
            config.apply_config(data);
        }
        if let Some(data) = &settings.workflow_s3_config {
            config.apply_storage_config(data);
        }
        config
    }

    /// Merges a general settings dictionary.
    ///
    /// Keys starting with `s3_` are stored, without the prefix, as storage
    /// settings; every other key is a general setting. Existing values are
    /// overwritten and `data` is left untouched.
    pub fn apply_config(&mut self, data: &ConfigMap) {
        for (key, value) in data {
            match key.strip_prefix(STORAGE_KEY_PREFIX) {
                Some("") => warn!("Ignoring workflow setting with empty storage key '{}'.", key),
                Some(storage_key) => {
                    self.storage.insert(storage_key.to_string(), value.clone());
                }
                None => {
                    self.general.insert(key.clone(), value.clone());
                }
            }
        }
    }

    /// Merges a dictionary whose keys are all storage settings.
    pub fn apply_storage_config(&mut self, data: &ConfigMap) {
        for (key, value) in data {
            self.storage.insert(key.clone(), value.clone());
        }
    }

    pub fn general(&self) -> &ConfigMap {
        &self.general
    }

    pub fn storage(&self) -> &ConfigMap {
        &self.storage
    }

    pub fn general_str(&self, key: &str) -> Option<&str> {
        self.general.get(key).and_then(Value::as_str)
    }

    pub fn storage_str(&self, key: &str) -> Option<&str> {
        self.storage.get(key).and_then(Value::as_str)
    }

    /// Address of the workflow server.
    pub fn host(&self) -> Option<&str> {
        self.general_str("host")
    }

    pub fn k8s_api_server(&self) -> Option<&str> {
        self.general_str("k8s_api_server")
    }

    pub fn token(&self) -> Option<&str> {
        self.general_str("token")
    }

    pub fn namespace(&self) -> Option<&str> {
        self.general_str("namespace")
    }

    pub fn storage_endpoint(&self) -> Option<&str> {
        self.storage_str("endpoint")
    }

    pub fn bucket_name(&self) -> Option<&str> {
        self.storage_str("bucket_name")
    }

    pub fn access_key(&self) -> Option<&str> {
        self.storage_str("access_key")
    }

    pub fn secret_key(&self) -> Option<&str> {
        self.storage_str("secret_key")
    }

    /// A copy with credential values masked, suitable for display or logs.
    pub fn redacted(&self) -> Self {
        Self {
            general: redact_map(&self.general),
            storage: redact_map(&self.storage),
        }
    }
}

fn is_sensitive(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    SENSITIVE_KEY_MARKERS.iter().any(|m| key.contains(m))
}

fn redact_map(map: &ConfigMap) -> ConfigMap {
    map.iter()
        .map(|(k, v)| {
            let value = if is_sensitive(k) && !v.is_null() {
                Value::String(REDACTED.to_string())
            } else {
                v.clone()
            };
            (k.clone(), value)
        })
        .collect()
}
