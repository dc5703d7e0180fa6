use crate::constants::{API_URL_ENV, CONFIG_DIR_NAME, DEFAULT_API_URL};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const SETTINGS_FILE: &str = "settings.yaml";

/// Color theme of the console
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Theme {
    #[default]
    PinkDark,
    PinkLight,
    DarkBlue,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::PinkDark, Theme::PinkLight, Theme::DarkBlue];

    pub fn key(&self) -> &'static str {
        match self {
            Theme::PinkDark => "pink-dark",
            Theme::PinkLight => "pink-light",
            Theme::DarkBlue => "dark-blue",
        }
    }

    /// Unknown keys fall back to the default theme
    pub fn from_key(key: &str) -> Theme {
        Theme::ALL
            .into_iter()
            .find(|t| t.key() == key.trim())
            .unwrap_or_default()
    }

    pub fn next(&self) -> Theme {
        match self {
            Theme::PinkDark => Theme::PinkLight,
            Theme::PinkLight => Theme::DarkBlue,
            Theme::DarkBlue => Theme::PinkDark,
        }
    }
}

fn lenient_theme<'de, D: serde::Deserializer<'de>>(d: D) -> Result<Theme, D::Error> {
    Ok(Option::<String>::deserialize(d)?
        .map(|key| Theme::from_key(&key))
        .unwrap_or_default())
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

/// Operator settings persisted as YAML
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_api_url")]
    pub api_base_url: String,
    #[serde(default, deserialize_with = "lenient_theme")]
    pub theme: Theme,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            api_base_url: default_api_url(),
            theme: Theme::default(),
        }
    }
}

/// Loads and saves [`Settings`] under the config directory
pub struct Storage {
    pub settings: Settings,
    config_dir: PathBuf,
}

impl Storage {
    pub fn new() -> Self {
        let config_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_DIR_NAME);
        Self::at(config_dir)
    }

    /// Storage rooted at an explicit directory
    pub fn at(config_dir: impl Into<PathBuf>) -> Self {
        let mut storage = Storage {
            settings: Settings::default(),
            config_dir: config_dir.into(),
        };

        // Missing or broken files leave the defaults in place
        if let Err(e) = storage.load() {
            tracing::warn!(error = %e, "Could not read settings, using defaults");
        }
        storage
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    fn settings_path(&self) -> PathBuf {
        self.config_dir.join(SETTINGS_FILE)
    }

    /// Ensure config directory exists
    fn ensure_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    pub fn load(&mut self) -> Result<()> {
        let path = self.settings_path();
        if !path.exists() {
            return Ok(());
        }
        let content = fs::read_to_string(&path)?;
        self.settings = serde_yaml::from_str::<Option<Settings>>(&content)?.unwrap_or_default();
        tracing::debug!(path = %path.display(), "Settings loaded");
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        self.ensure_dir()?;
        let content = serde_yaml::to_string(&self.settings)?;
        fs::write(self.settings_path(), content)?;
        tracing::info!(path = %self.settings_path().display(), "Settings saved");
        Ok(())
    }

    /// Base URL for this session: the environment override wins over the file
    pub fn api_base_url(&self) -> String {
        resolve_api_url(std::env::var(API_URL_ENV).ok(), &self.settings)
    }
}

impl Default for Storage {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve_api_url(env_override: Option<String>, settings: &Settings) -> String {
    env_override
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| settings.api_base_url.clone())
}
