use serde::Deserialize;
use std::env;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Business knobs of the offer engine.
#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    /// How long an earned loyalty reward stays redeemable.
    #[serde(default = "default_reward_validity_days")]
    pub reward_validity_days: i64,
    #[serde(default = "default_true")]
    pub notify_on_redemption: bool,
    #[serde(default = "default_true")]
    pub notify_on_reward: bool,
}

fn default_reward_validity_days() -> i64 { 30 }
fn default_true() -> bool { true }

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reward_validity_days: default_reward_validity_days(),
            notify_on_redemption: true,
            notify_on_reward: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    #[serde(default = "default_true")]
    pub with_target: bool,
}

fn default_log_filter() -> String { "info".to_string() }

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            with_target: true,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(Path::new("config"))
    }

    /// Layered load from `dir`: `default`, then `$RUN_MODE` (optional), then
    /// `local` (optional), then `BUYLOCAL__*` environment variables.
    pub fn load_from(dir: &Path) -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let layer = |name: &str| dir.join(name).to_string_lossy().into_owned();

        let s = config::Config::builder()
            .add_source(config::File::with_name(&layer("default")))
            .add_source(config::File::with_name(&layer(&run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name(&layer("local")).required(false))
            // e.g. `BUYLOCAL__ENGINE__REWARD_VALIDITY_DAYS=60`
            .add_source(config::Environment::with_prefix("BUYLOCAL").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
