use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use color_eyre::eyre::{eyre, Result, WrapErr};
use serde::Deserialize;
use tokio::fs;

use crate::entry_editor::MoodPolicy;

pub const APP_NAME: &str = "mood-journal";

const CONFIG_ENV: &str = "MOOD_JOURNAL_CONFIG";

/// Settings read from `config.toml`. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where entries, the theme flag and the log file live.
    pub data_dir: Option<PathBuf>,

    /// Refuse to save an entry without a mood.
    pub require_mood: bool,

    /// How many entries the journal screen lists under the form.
    pub recent_limit: usize,

    /// Remember dark/light mode across restarts.
    pub persist_theme: bool,

    /// Initial theme when nothing has been persisted.
    pub dark_mode: bool,

    /// Default tracing filter; `RUST_LOG` wins when set.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: None,
            require_mood: true,
            recent_limit: 5,
            persist_theme: true,
            dark_mode: false,
            log_level: "info".to_owned(),
        }
    }
}

impl FromStr for Config {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s)
    }
}

impl Config {
    pub fn mood_policy(&self) -> MoodPolicy {
        if self.require_mood {
            MoodPolicy::Required
        } else {
            MoodPolicy::Optional
        }
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(expand_path(dir)),
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_NAME))
                .ok_or_else(|| eyre!("User-specific data directory not found")),
        }
    }
}

/// Loads configuration from `path`, `$MOOD_JOURNAL_CONFIG`, or the user
/// config directory, in that order. Only the last one may be absent.
#[tracing::instrument]
pub async fn parse_config(path: Option<PathBuf>) -> Result<Config> {
    let (path, explicit) = match resolve_config_path(path, std::env::var(CONFIG_ENV).ok()) {
        Some(path) => (path, true),
        None => match dirs::config_dir() {
            Some(dir) => (dir.join(APP_NAME).join("config.toml"), false),
            None => return Ok(Config::default()),
        },
    };

    if !explicit && !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)
        .await
        .wrap_err_with(|| format!("Failed to read config file at {}", path.display()))?;
    content
        .parse::<Config>()
        .wrap_err_with(|| format!("Failed to parse config file at {}", path.display()))
}

fn resolve_config_path(flag: Option<PathBuf>, env: Option<String>) -> Option<PathBuf> {
    flag.or_else(|| env.filter(|v| !v.trim().is_empty()).map(PathBuf::from))
}

fn expand_path(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
        tracing::warn!("Home directory not found");
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!("".parse::<Config>().unwrap(), Config::default());
    }

    #[test]
    fn parses_all_keys() {
        let config: Config = r#"
data_dir = "/tmp/journal"
require_mood = false
recent_limit = 3
persist_theme = false
dark_mode = true
log_level = "debug"
"#
        .parse()
        .unwrap();

        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/journal")));
        assert_eq!(config.mood_policy(), MoodPolicy::Optional);
        assert_eq!(config.recent_limit, 3);
        assert!(!config.persist_theme);
        assert!(config.dark_mode);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn rejects_wrong_types() {
        assert!("recent_limit = \"five\"".parse::<Config>().is_err());
    }

    #[test]
    fn flag_beats_env() {
        let flag = Some(PathBuf::from("/flag.toml"));
        let env = Some("/env.toml".to_owned());
        assert_eq!(
            resolve_config_path(flag, env.clone()),
            Some(PathBuf::from("/flag.toml"))
        );
        assert_eq!(
            resolve_config_path(None, env),
            Some(PathBuf::from("/env.toml"))
        );
        assert_eq!(resolve_config_path(None, Some("  ".into())), None);
    }

    #[test]
    fn tilde_expands_to_home() {
        let config = Config {
            data_dir: Some(PathBuf::from("~/journal")),
            ..Config::default()
        };
        let dir = config.data_dir().unwrap();
        if let Some(home) = dirs::home_dir() {
            assert_eq!(dir, home.join("journal"));
        }
    }

    #[tokio::test]
    async fn explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(parse_config(Some(missing)).await.is_err());
    }

    #[tokio::test]
    async fn explicit_file_is_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "recent_limit = 9\n").unwrap();

        let config = parse_config(Some(path)).await.unwrap();
        assert_eq!(config.recent_limit, 9);
        assert!(config.require_mood);
    }
}
