//! Layered configuration: built-in defaults, the user config file, an
//! explicit `--config` file, then `WT_*` environment variables.
//!
//! Nested tracker settings use `__` in environment variables, for example
//! `WT_TRACKER__MIN_FLUSH_MS=2000`.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use wt_core::TrackerConfig;

const APP_DIR: &str = "wt";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// SQLite file holding totals, day buckets and the widget flag.
    pub database_path: PathBuf,

    #[serde(default)]
    pub tracker: TrackerConfig,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("wt.db"),
            tracker: TrackerConfig::default(),
        }
    }
}

impl Config {
    /// Resolves every layer, with `config_path` (if any) above the user file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let user_file = dirs_config_path().map(|dir| dir.join("config.toml"));
        let config: Self = layers(user_file.as_deref(), config_path).extract()?;
        config.check()?;
        Ok(config)
    }

    /// Rejects timings the tracker loops cannot run with.
    fn check(&self) -> Result<(), String> {
        let t = &self.tracker;
        let periods = [
            ("tracker.display_tick_ms", t.display_tick_ms),
            ("tracker.flush_interval_ms", t.flush_interval_ms),
        ];
        let floors = [
            ("tracker.settle_delay_ms", t.settle_delay_ms),
            ("tracker.flush_threshold_ms", t.flush_threshold_ms),
            ("tracker.min_flush_ms", t.min_flush_ms),
        ];
        if let Some((key, value)) = periods.into_iter().find(|(_, v)| *v <= 0) {
            return Err(format!("{key} must be positive, got {value}"));
        }
        if let Some((key, value)) = floors.into_iter().find(|(_, v)| *v < 0) {
            return Err(format!("{key} cannot be negative, got {value}"));
        }
        Ok(())
    }
}

fn layers(user_file: Option<&Path>, explicit: Option<&Path>) -> Figment {
    let files = user_file.into_iter().chain(explicit);
    files
        .fold(
            Figment::from(Serialized::defaults(Config::default())),
            |figment, path| figment.merge(Toml::file(path)),
        )
        .merge(Env::prefixed("WT_").split("__"))
}

fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(APP_DIR))
}

/// Platform data directory for wt (`~/.local/share/wt` on Linux).
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join(APP_DIR))
}
