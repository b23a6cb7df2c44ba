use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use directories::BaseDirs;
use serde::Deserialize;

use crate::models::{Field, SortOrder};
use crate::view::DEFAULT_PAGE_SIZE;

/// Folder name used beneath the user's home directory for settings and logs.
const APP_DIR_NAME: &str = ".jornada-manager";
const CONFIG_FILE_NAME: &str = "config.toml";
const LOG_FILE_NAME: &str = "jornadas.log";

/// Status values offered by the forms when the config does not list any.
pub const DEFAULT_STATUSES: &[&str] = &["Pendiente", "En curso", "Completado", "Aplazado", "Cancelado"];

/// User settings read from `config.toml`. Every key is optional.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub page_size: usize,
    pub sort_field: Field,
    pub sort_order: SortOrder,
    pub statuses: Vec<String>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            sort_field: Field::Project,
            sort_order: SortOrder::Desc,
            statuses: DEFAULT_STATUSES.iter().map(|s| s.to_string()).collect(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load from `path`, or from the default location when `None`. A missing
    /// file is not an error and yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => config_path()?,
        };

        if !path.exists() {
            return Ok(Config::default());
        }

        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Config::from_toml(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Config> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            bail!("page_size must be at least 1");
        }
        if self.statuses.iter().all(|s| s.trim().is_empty()) {
            bail!("statuses must contain at least one value");
        }
        Ok(())
    }

    /// Apply the `--page-size` command-line override.
    pub fn with_page_size(mut self, page_size: Option<usize>) -> Result<Config> {
        if let Some(size) = page_size {
            self.page_size = size;
            self.validate()?;
        }
        Ok(self)
    }
}

/// Directory holding the config file and the log.
pub fn app_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(APP_DIR_NAME))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(app_dir()?.join(CONFIG_FILE_NAME))
}

pub fn log_path() -> Result<PathBuf> {
    Ok(app_dir()?.join(LOG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn keys_use_the_file_vocabulary() {
        let config = Config::from_toml(
            r#"
            page_size = 25
            sort_field = "fecha"
            sort_order = "asc"
            statuses = ["Abierta", "Cerrada"]
            "#,
        )
        .unwrap();
        assert_eq!(config.page_size, 25);
        assert_eq!(config.sort_field, Field::Date);
        assert_eq!(config.sort_order, SortOrder::Asc);
        assert_eq!(config.statuses, vec!["Abierta", "Cerrada"]);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn zero_page_size_is_rejected() {
        assert!(Config::from_toml("page_size = 0").is_err());
        assert!(Config::default().with_page_size(Some(0)).is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::from_toml("theme = \"dark\"").is_err());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }
}
