use anyhow::{Context, Result};
use directories::ProjectDirs;
use docformat::FileFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs::try_exists;

const MAX_TAB_WIDTH: usize = 16;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub editor: EditorConfig,
    pub plugins: PluginConfig,
    pub files: FilesConfig,
    pub theme: Theme,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Spaces inserted by the Tab key.
    pub tab_width: usize,
    pub highlight_current_line: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    pub enabled: bool,
    pub directory: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    pub default_format: FileFormat,
}

/// Colour names understood by the terminal renderer, e.g. `"cyan"` or
/// `"#005F87"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub menu_foreground: String,
    pub menu_background: String,
    pub dropdown_foreground: String,
    pub dropdown_background: String,
    pub selection_foreground: String,
    pub selection_background: String,
    pub status_foreground: String,
    pub status_background: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            editor: EditorConfig::default(),
            plugins: PluginConfig::default(),
            files: FilesConfig::default(),
            theme: Theme::default(),
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tab_width: 4,
            highlight_current_line: true,
        }
    }
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: PathBuf::from("./plugins"),
        }
    }
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            default_format: FileFormat::Txt,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            menu_foreground: String::from("black"),
            menu_background: String::from("cyan"),
            dropdown_foreground: String::from("white"),
            dropdown_background: String::from("blue"),
            selection_foreground: String::from("black"),
            selection_background: String::from("white"),
            status_foreground: String::from("black"),
            status_background: String::from("cyan"),
        }
    }
}

impl Config {
    /// Load from the resolved config location, creating it when missing.
    pub async fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path).await,
            None => {
                log::warn!("No config directory available, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub async fn load_from(config_path: &Path) -> Result<Self> {
        if !try_exists(config_path).await.unwrap_or(false) {
            log::info!(
                "Config file does not exist, creating default at {}",
                config_path.display()
            );
            let default_config = Self::default();
            if let Err(e) = default_config.save_to(config_path).await {
                log::warn!("Failed to write default config: {e:#}");
            }
            return Ok(default_config);
        }

        let content = match tokio::fs::read_to_string(config_path).await {
            Ok(content) => content,
            Err(e) => {
                log::error!("Failed to read config file: {e}");
                return Ok(Self::default());
            }
        };

        if content.trim().is_empty() {
            log::warn!("Config file is empty, using defaults");
            return Ok(Self::default());
        }

        match serde_json::from_str::<Self>(&content) {
            Ok(mut config) => {
                config.validate();
                log::info!("Loaded config from: {}", config_path.display());
                Ok(config)
            }
            Err(json_err) => {
                log::error!("Failed to parse config file: {json_err}");

                let backup_path = config_path.with_extension("bak");
                match tokio::fs::copy(config_path, &backup_path).await {
                    Ok(_) => log::info!("Backed up broken config to: {}", backup_path.display()),
                    Err(e) => log::warn!("Failed to backup broken config: {e}"),
                }
                Ok(Self::default())
            }
        }
    }

    pub async fn save_to(&self, config_path: &Path) -> Result<()> {
        let mut config_to_save = self.clone();
        config_to_save.validate();

        if let Some(parent) = config_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Cannot create config directory {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(&config_to_save)
            .context("Cannot serialize config")?;
        tokio::fs::write(config_path, content)
            .await
            .with_context(|| format!("Cannot write config file {}", config_path.display()))?;
        log::debug!("Saved config to: {}", config_path.display());
        Ok(())
    }

    /// Replace out-of-range values with their defaults.
    pub fn validate(&mut self) {
        if self.editor.tab_width == 0 || self.editor.tab_width > MAX_TAB_WIDTH {
            log::warn!("Invalid tab width: {}, using default", self.editor.tab_width);
            self.editor.tab_width = EditorConfig::default().tab_width;
        }

        if self.plugins.directory.as_os_str().is_empty() {
            log::warn!("Empty plugin directory, using default");
            self.plugins.directory = PluginConfig::default().directory;
        }
    }

    pub fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("NOTEPAD_CONFIG_PATH") {
            return Some(PathBuf::from(path));
        }

        if let Ok(dir) = std::env::var("NOTEPAD_CONFIG_DIR") {
            return Some(PathBuf::from(dir).join("config.json"));
        }

        ProjectDirs::from("com", "notepad", "notepad")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }
}
