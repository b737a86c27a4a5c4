use anyhow::{Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_DIR_NAME: &str = "pyconsole";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub config_path: PathBuf,
    pub config_is_explicit: bool,
    pub startup_file: Option<PathBuf>,
    pub banner: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFileConfig {
    startup_file: Option<String>,
    banner: Option<bool>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::load_with_path(None)
    }

    pub fn load_with_path(explicit: Option<&Path>) -> Result<Self> {
        let (config_path, config_is_explicit) = match explicit {
            Some(path) => (path.to_path_buf(), true),
            None => (discover_config_path()?, false),
        };
        let file_config = load_file_config(&config_path)?;

        dotenvy::dotenv().ok();

        let file_startup = file_config
            .as_ref()
            .and_then(|cfg| cfg.startup_file.as_ref())
            .and_then(|value| non_empty(value).map(PathBuf::from));
        let banner = file_config
            .as_ref()
            .and_then(|cfg| cfg.banner)
            .unwrap_or(true);

        Ok(Self {
            startup_file: env_non_empty("PYCONSOLE_STARTUP_FILE")
                .map(PathBuf::from)
                .or(file_startup),
            banner,
            config_path,
            config_is_explicit,
        })
    }
}

fn discover_config_path() -> Result<PathBuf> {
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        let trimmed = xdg.trim();
        if trimmed.is_empty() {
            bail!("Failed to resolve config path: XDG_CONFIG_HOME is set but empty");
        }

        return Ok(PathBuf::from(trimmed)
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME));
    }

    let home = dirs::home_dir()
        .ok_or_else(|| anyhow!("Failed to resolve config path: HOME directory is unavailable"))?;

    Ok(home
        .join(".config")
        .join(CONFIG_DIR_NAME)
        .join(CONFIG_FILE_NAME))
}

fn load_file_config(config_path: &Path) -> Result<Option<RawFileConfig>> {
    if !config_path.is_file() {
        return Ok(None);
    }

    let config_text = fs::read_to_string(config_path).map_err(|err| {
        anyhow!(
            "Failed to load config {}: unable to read file: {err}",
            config_path.display()
        )
    })?;

    toml::from_str(&config_text)
        .map(Some)
        .map_err(|err| anyhow!("Failed to load config {}: {err}", config_path.display()))
}

fn env_non_empty(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
