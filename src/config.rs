use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::dirs_compat::data_dir;

pub const ENV_EXPORT_DIR: &str = "IELTS_PRACTICE_EXPORT_DIR";
pub const ENV_TICK_MS: &str = "IELTS_PRACTICE_TICK_MS";
pub const ENV_LOG_DIR: &str = "IELTS_PRACTICE_LOG_DIR";

pub const DEFAULT_ARTIFACT_MIME_TYPE: &str = "audio/webm";
const APP_DIR_NAME: &str = "ielts-practice";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PracticeConfig {
    /// Wall-clock period between countdown ticks.
    pub tick_interval: Duration,
    /// Directory handed to the default exporter.
    pub export_dir: PathBuf,
    pub command_capacity: usize,
    pub snapshot_capacity: usize,
    pub artifact_mime_type: String,
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            export_dir: default_export_dir(),
            command_capacity: 32,
            snapshot_capacity: 64,
            artifact_mime_type: DEFAULT_ARTIFACT_MIME_TYPE.to_string(),
        }
    }
}

impl PracticeConfig {
    /// Builds the configuration from defaults overridden by environment variables.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var(ENV_EXPORT_DIR) {
            if !dir.trim().is_empty() {
                config.export_dir = PathBuf::from(dir);
            }
        }

        if let Ok(value) = std::env::var(ENV_TICK_MS) {
            let millis: u64 = value
                .trim()
                .parse()
                .with_context(|| format!("{ENV_TICK_MS} must be an integer, got {value:?}"))?;
            if millis == 0 {
                return Err(anyhow!("{ENV_TICK_MS} must be greater than zero"));
            }
            config.tick_interval = Duration::from_millis(millis);
        }

        Ok(config)
    }
}

fn default_export_dir() -> PathBuf {
    data_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .unwrap_or_else(|| std::env::temp_dir().join(APP_DIR_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        std::env::remove_var(ENV_EXPORT_DIR);
        std::env::remove_var(ENV_TICK_MS);
    }

    #[test]
    fn defaults_tick_once_per_second() {
        let config = PracticeConfig::default();
        assert_eq!(config.tick_interval, Duration::from_secs(1));
        assert_eq!(config.artifact_mime_type, "audio/webm");
        assert!(config.export_dir.ends_with(APP_DIR_NAME));
    }

    #[test]
    fn env_overrides_export_dir_and_tick() {
        let _lock = env_guard().lock().expect("env guard poisoned");
        reset_env();
        std::env::set_var(ENV_EXPORT_DIR, "/tmp/ielts-exports");
        std::env::set_var(ENV_TICK_MS, "250");

        let config = PracticeConfig::from_env().expect("config loads");
        assert_eq!(config.export_dir, PathBuf::from("/tmp/ielts-exports"));
        assert_eq!(config.tick_interval, Duration::from_millis(250));

        reset_env();
    }

    #[test]
    fn rejects_invalid_tick_values() {
        let _lock = env_guard().lock().expect("env guard poisoned");
        reset_env();

        std::env::set_var(ENV_TICK_MS, "soon");
        assert!(PracticeConfig::from_env().is_err());

        std::env::set_var(ENV_TICK_MS, "0");
        assert!(PracticeConfig::from_env().is_err());

        reset_env();
    }
}
