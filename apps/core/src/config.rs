use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::hotkey::parse_hotkey;

pub const DEFAULT_HOTKEY: &str = "Ctrl+Alt+O";
pub const DEFAULT_BACKEND_PROGRAM: &str = "keyspring-ranker";
pub const DEFAULT_CHANNEL_NAME: &str = "keyspring-ranker";

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Encode(toml::ser::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(error) => write!(f, "config io error: {error}"),
            Self::Parse(error) => write!(f, "config parse error: {error}"),
            Self::Encode(error) => write!(f, "config encode error: {error}"),
            Self::Invalid(detail) => write!(f, "invalid config: {detail}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub hotkey: String,
    pub backend_program: String,
    pub channel_name: String,
    pub registry_path: PathBuf,
    pub config_path: PathBuf,
    pub launch_at_startup: bool,
}

impl Default for Config {
    fn default() -> Self {
        let base = stable_app_data_dir();
        Self {
            hotkey: DEFAULT_HOTKEY.to_string(),
            backend_program: DEFAULT_BACKEND_PROGRAM.to_string(),
            channel_name: DEFAULT_CHANNEL_NAME.to_string(),
            registry_path: base.join("commands.toml"),
            config_path: base.join("config.toml"),
            launch_at_startup: false,
        }
    }
}

/// On-disk shape; every field optional so a sparse document works and
/// unknown keys are ignored.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigDoc {
    #[serde(default)]
    hotkey: Option<String>,
    #[serde(default)]
    backend_program: Option<String>,
    #[serde(default)]
    channel_name: Option<String>,
    #[serde(default)]
    registry_path: Option<PathBuf>,
    #[serde(default)]
    launch_at_startup: Option<bool>,
}

pub fn load(path: Option<PathBuf>) -> Result<Config, ConfigError> {
    let mut config = Config::default();
    if let Some(path) = path {
        config.config_path = path;
    }

    if !config.config_path.exists() {
        return Ok(config);
    }

    let raw = std::fs::read_to_string(&config.config_path)?;
    let doc: ConfigDoc = toml::from_str(&raw).map_err(ConfigError::Parse)?;

    if let Some(hotkey) = doc.hotkey {
        config.hotkey = hotkey;
    }
    if let Some(backend_program) = doc.backend_program {
        config.backend_program = backend_program;
    }
    if let Some(channel_name) = doc.channel_name {
        config.channel_name = channel_name;
    }
    if let Some(registry_path) = doc.registry_path {
        config.registry_path = registry_path;
    }
    if let Some(launch_at_startup) = doc.launch_at_startup {
        config.launch_at_startup = launch_at_startup;
    }

    Ok(config)
}

pub fn save(config: &Config) -> Result<(), ConfigError> {
    let doc = ConfigDoc {
        hotkey: Some(config.hotkey.clone()),
        backend_program: Some(config.backend_program.clone()),
        channel_name: Some(config.channel_name.clone()),
        registry_path: Some(config.registry_path.clone()),
        launch_at_startup: Some(config.launch_at_startup),
    };

    let encoded = toml::to_string_pretty(&doc).map_err(ConfigError::Encode)?;
    if let Some(parent) = config.config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&config.config_path, encoded)?;
    Ok(())
}

pub fn validate(config: &Config) -> Result<(), ConfigError> {
    parse_hotkey(&config.hotkey).map_err(ConfigError::Invalid)?;

    if config.backend_program.trim().is_empty() {
        return Err(ConfigError::Invalid("backend_program is required".into()));
    }
    if config.channel_name.trim().is_empty() {
        return Err(ConfigError::Invalid("channel_name is required".into()));
    }
    if config.registry_path.as_os_str().is_empty() {
        return Err(ConfigError::Invalid("registry_path is required".into()));
    }
    if config.config_path.as_os_str().is_empty() {
        return Err(ConfigError::Invalid("config_path is required".into()));
    }

    Ok(())
}

/// Per-user application data directory; temp is the last resort so the app
/// still comes up on stripped-down accounts.
pub fn stable_app_data_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("KeySpring");
        }
    }

    #[cfg(not(target_os = "windows"))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("keyspring");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".config").join("keyspring");
        }
    }

    std::env::temp_dir().join("keyspring")
}
