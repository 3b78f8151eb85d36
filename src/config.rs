//! Service configuration
//!
//! Read from `FLIGHTWATCH_*` environment variables with defaults:
//! - FLIGHTWATCH_HOST / FLIGHTWATCH_PORT: intake API bind address (0.0.0.0:8080)
//! - FLIGHTWATCH_STORE_DIR: JSON store directory (unset: in-memory store)
//! - FLIGHTWATCH_TELEGRAM_TOKEN: bot token (unset: log-only notifier)
//! - FLIGHTWATCH_LOOKUP_URL: flight list API base URL
//! - FLIGHTWATCH_HTTP_CONNECT_TIMEOUT_SECS / FLIGHTWATCH_HTTP_TIMEOUT_SECS: 5 / 15
//! - FLIGHTWATCH_FREEZE_HORIZON_DAYS: 9
//! - FLIGHTWATCH_DIFF_TOLERANCE_SECS: 600
//! - FLIGHTWATCH_{QUEUED,FROZEN,ACTIVE}_{INTERVAL_SECS,POOL_SIZE,SWEEP_TIMEOUT_SECS}

use serde::Serialize;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::alerts::AlertStatus;
use crate::flight::DEFAULT_TOLERANCE_SECS;
use crate::lookup::Fr24Config;

const ENV_PREFIX: &str = "FLIGHTWATCH_";

/// Rules shared by the alert processors
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AlertPolicy {
    /// Alerts further out than this many days are frozen instead of looked up
    pub freeze_horizon_days: i64,
    /// Timestamp changes within this many seconds are ignored
    pub diff_tolerance_secs: i64,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self {
            freeze_horizon_days: 9,
            diff_tolerance_secs: DEFAULT_TOLERANCE_SECS,
        }
    }
}

/// Timing and concurrency for one sweeper
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SweeperSettings {
    pub interval: Duration,
    pub pool_size: usize,
    pub sweep_timeout: Duration,
}

impl SweeperSettings {
    pub fn new(interval: Duration, pool_size: usize, sweep_timeout: Duration) -> Self {
        Self {
            interval,
            pool_size,
            sweep_timeout,
        }
    }

    fn defaults_for(status: AlertStatus) -> Self {
        let interval = match status {
            AlertStatus::Queued => Duration::from_secs(30),
            AlertStatus::Frozen => Duration::from_secs(3600),
            AlertStatus::Active => Duration::from_secs(60),
        };
        Self::new(interval, 3, Duration::from_secs(40))
    }
}

/// Full service configuration
#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub store_dir: Option<PathBuf>,
    #[serde(skip)]
    pub telegram_token: Option<String>,
    pub lookup_url: String,
    pub http_connect_timeout: Duration,
    pub http_timeout: Duration,
    pub policy: AlertPolicy,
    pub queued: SweeperSettings,
    pub frozen: SweeperSettings,
    pub active: SweeperSettings,
}

impl Default for Settings {
    fn default() -> Self {
        let lookup = Fr24Config::default();
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            store_dir: None,
            telegram_token: None,
            lookup_url: lookup.base_url,
            http_connect_timeout: lookup.connect_timeout,
            http_timeout: lookup.timeout,
            policy: AlertPolicy::default(),
            queued: SweeperSettings::defaults_for(AlertStatus::Queued),
            frozen: SweeperSettings::defaults_for(AlertStatus::Frozen),
            active: SweeperSettings::defaults_for(AlertStatus::Active),
        }
    }
}

impl Settings {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key/value source (keys without the prefix are never asked)
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            get(&format!("{}{}", ENV_PREFIX, name))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let sweeper = |status: AlertStatus, fallback: SweeperSettings| -> Result<SweeperSettings, ConfigError> {
            let prefix = status.as_str().to_uppercase();
            Ok(SweeperSettings {
                interval: secs(&var, &format!("{}_INTERVAL_SECS", prefix))?
                    .unwrap_or(fallback.interval),
                pool_size: parse(&var, &format!("{}_POOL_SIZE", prefix))?
                    .unwrap_or(fallback.pool_size),
                sweep_timeout: secs(&var, &format!("{}_SWEEP_TIMEOUT_SECS", prefix))?
                    .unwrap_or(fallback.sweep_timeout),
            })
        };

        let settings = Self {
            host: var("HOST").unwrap_or(defaults.host),
            port: parse(&var, "PORT")?.unwrap_or(defaults.port),
            store_dir: var("STORE_DIR").map(PathBuf::from),
            telegram_token: var("TELEGRAM_TOKEN"),
            lookup_url: var("LOOKUP_URL").unwrap_or(defaults.lookup_url),
            http_connect_timeout: secs(&var, "HTTP_CONNECT_TIMEOUT_SECS")?
                .unwrap_or(defaults.http_connect_timeout),
            http_timeout: secs(&var, "HTTP_TIMEOUT_SECS")?.unwrap_or(defaults.http_timeout),
            policy: AlertPolicy {
                freeze_horizon_days: parse(&var, "FREEZE_HORIZON_DAYS")?
                    .unwrap_or(defaults.policy.freeze_horizon_days),
                diff_tolerance_secs: parse(&var, "DIFF_TOLERANCE_SECS")?
                    .unwrap_or(defaults.policy.diff_tolerance_secs),
            },
            queued: sweeper(AlertStatus::Queued, defaults.queued)?,
            frozen: sweeper(AlertStatus::Frozen, defaults.frozen)?,
            active: sweeper(AlertStatus::Active, defaults.active)?,
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Settings of the sweeper owning `status`
    pub fn sweeper(&self, status: AlertStatus) -> SweeperSettings {
        match status {
            AlertStatus::Queued => self.queued,
            AlertStatus::Frozen => self.frozen,
            AlertStatus::Active => self.active,
        }
    }

    pub fn lookup_config(&self) -> Fr24Config {
        Fr24Config {
            base_url: self.lookup_url.clone(),
            connect_timeout: self.http_connect_timeout,
            timeout: self.http_timeout,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.policy.freeze_horizon_days < 0 {
            return Err(ConfigError::Invalid("freeze horizon must not be negative".into()));
        }
        if self.policy.diff_tolerance_secs < 0 {
            return Err(ConfigError::Invalid("diff tolerance must not be negative".into()));
        }
        for status in AlertStatus::ALL {
            let s = self.sweeper(status);
            if s.pool_size == 0 {
                return Err(ConfigError::Invalid(format!("{} pool size must be at least 1", status)));
            }
            if s.interval.is_zero() || s.sweep_timeout.is_zero() {
                return Err(ConfigError::Invalid(format!(
                    "{} interval and sweep timeout must be positive",
                    status
                )));
            }
        }
        Ok(())
    }
}

fn parse<T, F>(var: &F, name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        None => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|_| ConfigError::Invalid(format!(
            "{}{} has invalid value '{}'",
            ENV_PREFIX, name, raw
        ))),
    }
}

fn secs<F>(var: &F, name: &str) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(parse::<u64, F>(var, name)?.map(Duration::from_secs))
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let settings = load(&[]).unwrap();
        assert_eq!(settings.policy.freeze_horizon_days, 9);
        assert_eq!(settings.policy.diff_tolerance_secs, 600);
        assert_eq!(settings.queued.pool_size, 3);
        assert_eq!(settings.active.sweep_timeout, Duration::from_secs(40));
        assert!(settings.store_dir.is_none());
        assert!(settings.telegram_token.is_none());
    }

    #[test]
    fn test_overrides() {
        let settings = load(&[
            ("FLIGHTWATCH_PORT", "9090"),
            ("FLIGHTWATCH_FREEZE_HORIZON_DAYS", "5"),
            ("FLIGHTWATCH_ACTIVE_POOL_SIZE", "8"),
            ("FLIGHTWATCH_FROZEN_INTERVAL_SECS", "120"),
            ("FLIGHTWATCH_STORE_DIR", "/var/lib/flightwatch"),
            ("FLIGHTWATCH_TELEGRAM_TOKEN", " "),
        ])
        .unwrap();

        assert_eq!(settings.port, 9090);
        assert_eq!(settings.policy.freeze_horizon_days, 5);
        assert_eq!(settings.sweeper(AlertStatus::Active).pool_size, 8);
        assert_eq!(settings.frozen.interval, Duration::from_secs(120));
        assert_eq!(settings.queued.interval, Duration::from_secs(30));
        assert_eq!(settings.store_dir, Some(PathBuf::from("/var/lib/flightwatch")));
        assert!(settings.telegram_token.is_none());
    }

    #[test]
    fn test_invalid_values() {
        assert!(load(&[("FLIGHTWATCH_PORT", "eighty")]).is_err());
        assert!(load(&[("FLIGHTWATCH_QUEUED_POOL_SIZE", "0")]).is_err());
        assert!(load(&[("FLIGHTWATCH_ACTIVE_SWEEP_TIMEOUT_SECS", "0")]).is_err());
        assert!(load(&[("FLIGHTWATCH_FREEZE_HORIZON_DAYS", "-1")]).is_err());
    }

    #[test]
    fn test_token_not_serialized() {
        let settings = load(&[("FLIGHTWATCH_TELEGRAM_TOKEN", "123:abc")]).unwrap();
        let json = serde_json::to_value(&settings).unwrap();
        assert!(json.get("telegram_token").is_none());
        assert_eq!(json["policy"]["freeze_horizon_days"], 9);
    }
}
