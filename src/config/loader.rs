use crate::Result;
use crate::config::types::Config;
use std::fs;
use std::path::Path;

/// Configuration file loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Configuration file name
    const CONFIG_FILE: &'static str = "scriptest.toml";

    /// Load a configuration file from an explicit path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Config> {
        let content = fs::read_to_string(path.as_ref())?;
        let config = toml::from_str(&content)?;
        tracing::debug!(path = %path.as_ref().display(), "Loaded scriptest config");
        Ok(config)
    }

    /// Find and load the configuration file.
    /// Lookup order:
    /// 1. current directory and its parents
    /// 2. user config directory ~/.config/scriptest/
    ///
    /// Environment overrides are applied to whatever was found, or to the
    /// defaults when no file exists.
    pub fn find_and_load() -> Config {
        let mut config = Self::try_load_from_current_dir()
            .or_else(Self::try_load_from_user_dir)
            .unwrap_or_default();
        config.apply_env_overrides();
        config
    }

    fn try_load_from_current_dir() -> Option<Config> {
        let mut current = std::env::current_dir().ok()?;

        loop {
            let config_path = current.join(Self::CONFIG_FILE);
            if config_path.exists() {
                return Self::load_logged(&config_path);
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    fn try_load_from_user_dir() -> Option<Config> {
        let home = dirs::home_dir()?;
        let config_path = home
            .join(".config")
            .join("scriptest")
            .join(Self::CONFIG_FILE);

        if config_path.exists() {
            Self::load_logged(&config_path)
        } else {
            None
        }
    }

    fn load_logged(path: &Path) -> Option<Config> {
        match Self::load_from_path(path) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable config file");
                None
            }
        }
    }
}
