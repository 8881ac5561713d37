use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::error::NotesError;
use crate::runner::{OsaScriptRunner, DEFAULT_OSASCRIPT};
use crate::script::{DuplicatePolicy, ScriptBuilder};

pub const CONFIG_ENV: &str = "NOTEBRIDGE_CONFIG";

/// Server settings, read from `~/.config/notebridge/config.toml` (Unix) or
/// `%APPDATA%/notebridge/config.toml` (Windows), then overridden by
/// `NOTEBRIDGE_*` environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotebridgeConfig {
    /// Scriptable application to drive.
    pub application: String,
    pub osascript_path: PathBuf,
    /// No timeout unless set to a non-zero value; a hung Notes.app then blocks the call.
    pub timeout_secs: Option<u64>,
    /// Pause after launching the application when it was not running.
    pub launch_delay_secs: u64,
    pub duplicate_names: DuplicatePolicy,
}

impl Default for NotebridgeConfig {
    fn default() -> Self {
        Self {
            application: "Notes".to_string(),
            osascript_path: PathBuf::from(DEFAULT_OSASCRIPT),
            timeout_secs: None,
            launch_delay_secs: 1,
            duplicate_names: DuplicatePolicy::FirstMatch,
        }
    }
}

impl NotebridgeConfig {
    pub fn default_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|p| p.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("notebridge").join("config.toml")
    }

    /// Load from `$NOTEBRIDGE_CONFIG` or the default path, then apply the environment.
    pub fn load() -> Result<Self, NotesError> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(Self::default_path);
        let mut config = Self::load_from(&path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load_from(path: &Path) -> Result<Self, NotesError> {
        match std::fs::read_to_string(path) {
            Ok(s) => {
                debug!(path = %path.display(), "loading configuration");
                let mut config: Self = toml::from_str(&s).map_err(|e| {
                    NotesError::Config(format!("{}: {}", path.display(), e))
                })?;
                // zero means no timeout, same as NOTEBRIDGE_TIMEOUT_SECS=0
                config.timeout_secs = config.timeout_secs.filter(|&secs| secs > 0);
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(NotesError::Config(format!("{}: {}", path.display(), e))),
        }
    }

    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), NotesError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(app) = lookup("NOTEBRIDGE_APPLICATION") {
            self.application = app;
        }
        if let Some(path) = lookup("NOTEBRIDGE_OSASCRIPT") {
            self.osascript_path = PathBuf::from(path);
        }
        if let Some(secs) = lookup("NOTEBRIDGE_TIMEOUT_SECS") {
            self.timeout_secs = match secs.trim() {
                "" | "none" | "0" => None,
                s => Some(parse_secs("NOTEBRIDGE_TIMEOUT_SECS", s)?),
            };
        }
        if let Some(secs) = lookup("NOTEBRIDGE_LAUNCH_DELAY_SECS") {
            self.launch_delay_secs = parse_secs("NOTEBRIDGE_LAUNCH_DELAY_SECS", &secs)?;
        }
        if let Some(policy) = lookup("NOTEBRIDGE_DUPLICATE_NAMES") {
            self.duplicate_names = policy.parse().map_err(|e: String| {
                NotesError::Config(format!("NOTEBRIDGE_DUPLICATE_NAMES: {}", e))
            })?;
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs)
    }

    pub fn script_builder(&self) -> ScriptBuilder {
        ScriptBuilder::new(
            self.application.clone(),
            self.launch_delay_secs,
            self.duplicate_names,
        )
    }

    pub fn runner(&self) -> OsaScriptRunner {
        OsaScriptRunner::new(self.osascript_path.clone(), self.timeout())
    }
}

fn parse_secs(key: &str, value: &str) -> Result<u64, NotesError> {
    value.trim().parse().map_err(|_| {
        NotesError::Config(format!("{}: expected whole seconds, got '{}'", key, value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = NotebridgeConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, NotebridgeConfig::default());
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "timeout_secs = 30\nduplicate_names = \"error\"\n").unwrap();

        let config = NotebridgeConfig::load_from(&path).unwrap();
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.duplicate_names, DuplicatePolicy::Error);
        assert_eq!(config.application, "Notes");
        assert_eq!(config.launch_delay_secs, 1);
    }

    #[test]
    fn test_zero_timeout_means_none_in_file_and_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "timeout_secs = 0\n").unwrap();
        let from_file = NotebridgeConfig::load_from(&path).unwrap();

        let mut from_env = NotebridgeConfig::default();
        from_env
            .apply_env(env(&[("NOTEBRIDGE_TIMEOUT_SECS", "0")]))
            .unwrap();

        assert_eq!(from_file.timeout_secs, None);
        assert_eq!(from_file.timeout(), None);
        assert_eq!(from_file.timeout(), from_env.timeout());

        let built = NotebridgeConfig {
            timeout_secs: Some(0),
            ..NotebridgeConfig::default()
        };
        assert_eq!(built.timeout(), None);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "timeout_secs = \"soon\"").unwrap();
        assert!(matches!(
            NotebridgeConfig::load_from(&path),
            Err(NotesError::Config(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = NotebridgeConfig::default();
        config
            .apply_env(env(&[
                ("NOTEBRIDGE_APPLICATION", "Notes Beta"),
                ("NOTEBRIDGE_OSASCRIPT", "/opt/bin/osascript"),
                ("NOTEBRIDGE_TIMEOUT_SECS", "45"),
                ("NOTEBRIDGE_LAUNCH_DELAY_SECS", "0"),
                ("NOTEBRIDGE_DUPLICATE_NAMES", "error"),
            ]))
            .unwrap();
        assert_eq!(config.application, "Notes Beta");
        assert_eq!(config.osascript_path, PathBuf::from("/opt/bin/osascript"));
        assert_eq!(config.timeout_secs, Some(45));
        assert_eq!(config.launch_delay_secs, 0);
        assert_eq!(config.duplicate_names, DuplicatePolicy::Error);

        config
            .apply_env(env(&[("NOTEBRIDGE_TIMEOUT_SECS", "none")]))
            .unwrap();
        assert_eq!(config.timeout_secs, None);
    }

    #[test]
    fn test_bad_env_values() {
        let mut config = NotebridgeConfig::default();
        assert!(config
            .apply_env(env(&[("NOTEBRIDGE_TIMEOUT_SECS", "ten")]))
            .is_err());
        assert!(config
            .apply_env(env(&[("NOTEBRIDGE_DUPLICATE_NAMES", "random")]))
            .is_err());
    }
}
