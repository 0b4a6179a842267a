use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::{Actor, ActorRole};

/// The signed-in actor, as recorded by whatever onboarding flow wrote the
/// config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorConfig {
    pub id: String,
    pub role: ActorRole,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub actor: Option<ActorConfig>,
    /// Where consultation and expert records live. Overridable per install;
    /// `AGRICALL_HOME` wins over everything.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(skip)]
    pub data_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            actor: None,
            data_dir: None,
            data_path: PathBuf::new(),
        }
    }
}

impl Config {
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let path = config_path.unwrap_or_else(Self::default_config_path);

        let mut config = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            serde_yaml::from_str::<Config>(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Config::default()
        };

        config.data_path = Self::resolve_data_path(config.data_dir.clone());
        Ok(config)
    }

    pub fn default_config_path() -> PathBuf {
        if let Some(config_path) = std::env::var_os("AGRICALL_CONFIG") {
            PathBuf::from(config_path)
        } else {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("agricall")
                .join("config.yaml")
        }
    }

    fn resolve_data_path(configured: Option<PathBuf>) -> PathBuf {
        if let Some(home) = std::env::var_os("AGRICALL_HOME") {
            return PathBuf::from(home);
        }
        configured.unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("agricall")
        })
    }

    #[allow(dead_code)]
    pub fn with_data_path(mut self, data_path: PathBuf) -> Self {
        self.data_path = data_path;
        self
    }

    #[allow(dead_code)]
    pub fn with_actor(mut self, id: impl Into<String>, role: ActorRole) -> Self {
        self.actor = Some(ActorConfig {
            id: id.into(),
            role,
        });
        self
    }

    pub fn actor(&self) -> Option<Actor> {
        self.actor
            .as_ref()
            .map(|a| Actor::new(a.id.clone(), a.role))
    }
}
