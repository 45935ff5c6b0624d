use config::{Config, ConfigError, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[cfg(not(test))]
use etcetera::base_strategy::{BaseStrategy, choose_base_strategy};

/// Default name of the single process track.
pub const DEFAULT_PROCESS_NAME: &str = "Gradle Build Operation Trace";

/// Default name of every lane track.
pub const DEFAULT_LANE_NAME: &str = "abstract thread";

/// Names written into the trace's track descriptors.
///
/// The defaults match what existing tooling expects, so most users never
/// need a config file.
///
/// # Examples
///
/// ```toml
/// process-name = "CI build #4312"
/// lane-name = "lane"
/// ```
///
/// Config file location:
/// - Linux: `$XDG_CONFIG_HOME/gtc/config.toml` or `~/.config/gtc/config.toml`
/// - macOS: `$XDG_CONFIG_HOME/gtc/config.toml` or `~/.config/gtc/config.toml`
/// - Windows: `%APPDATA%\gtc\config.toml`
///
/// Environment variables: `GTC_PROCESS_NAME`, `GTC_LANE_NAME`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterConfig {
    #[serde(rename = "process-name")]
    pub process_name: String,

    #[serde(rename = "lane-name")]
    pub lane_name: String,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            process_name: DEFAULT_PROCESS_NAME.to_string(),
            lane_name: DEFAULT_LANE_NAME.to_string(),
        }
    }
}

impl ConverterConfig {
    /// Load configuration from config file and environment variables.
    ///
    /// Configuration is loaded in the following order (later sources override earlier ones):
    /// 1. Default values
    /// 2. Config file (see struct documentation for platform-specific paths)
    /// 3. Environment variables (GTC_*)
    pub fn load() -> Result<Self, ConfigError> {
        let path = get_config_path();
        Self::load_layered(path.as_deref(), |key| std::env::var(key).ok())
    }

    /// Like [`load`](Self::load), reading `path` instead of the default config file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::load_layered(Some(path), |key| std::env::var(key).ok())
    }

    /// Like [`load`](Self::load), with the file location and environment
    /// lookup supplied by the caller.
    pub fn load_layered(
        path: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let mut builder = Config::builder()
            .set_default("process-name", defaults.process_name)?
            .set_default("lane-name", defaults.lane_name)?;

        if let Some(config_path) = path
            && config_path.exists()
        {
            log::debug!("Reading config from {}", config_path.display());
            builder = builder.add_source(File::from(config_path).format(FileFormat::Toml));
        }

        // Keys contain dashes, which an `Environment` source cannot express
        builder = builder
            .set_override_option("process-name", env("GTC_PROCESS_NAME"))?
            .set_override_option("lane-name", env("GTC_LANE_NAME"))?;

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.process_name.trim().is_empty() {
            return Err(ConfigError::Message("process-name cannot be empty".into()));
        }
        if self.lane_name.trim().is_empty() {
            return Err(ConfigError::Message("lane-name cannot be empty".into()));
        }
        Ok(())
    }
}

fn get_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("GTC_CONFIG_PATH") {
        return Some(PathBuf::from(path));
    }

    // Unit tests never read the user's real config
    #[cfg(test)]
    return None;

    // choose_base_strategy uses:
    // - XDG on Linux (respects XDG_CONFIG_HOME, falls back to ~/.config)
    // - XDG on macOS (~/.config instead of ~/Library/Application Support)
    // - Windows conventions on Windows (%APPDATA%)
    #[cfg(not(test))]
    {
        let strategy = choose_base_strategy().ok()?;
        Some(strategy.config_dir().join("gtc").join("config.toml"))
    }
}
