use std::env;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use crate::config::validation::validate_positive;
use shipguard_domain::{DetectionThresholds, RuntimeConfig, StopTimestampPolicy};

pub const CONFIG_ENV: &str = "SHIPGUARD_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "./config.toml";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub historical_data_path: Option<String>,
    pub log_dir: Option<String>,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
    pub route_deviation_threshold: f64,
    pub unusual_stop_threshold_minutes: f64,
    pub speed_threshold: f64,
    pub value_deviation_threshold: f64,
    pub stop_timestamp_policy: StopTimestampPolicy,
    pub demonstration_checks: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        let thresholds = DetectionThresholds::default();
        Self {
            bind_addr: "127.0.0.1:3240".to_string(),
            historical_data_path: None,
            log_dir: None,
            max_body_bytes: 8 * 1024 * 1024,
            request_timeout_seconds: 15,
            route_deviation_threshold: thresholds.route_deviation_threshold,
            unusual_stop_threshold_minutes: thresholds.unusual_stop_threshold_minutes,
            speed_threshold: thresholds.speed_threshold,
            value_deviation_threshold: thresholds.value_deviation_threshold,
            stop_timestamp_policy: thresholds.stop_timestamp_policy,
            demonstration_checks: thresholds.demonstration_checks,
        }
    }
}

impl AppConfig {
    /// Loads the file named by `SHIPGUARD_CONFIG`, then applies
    /// `SHIPGUARD_*` environment overrides.
    pub async fn load() -> Result<Self> {
        let path = env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_with(Path::new(&path), |key| env::var(key).ok()).await
    }

    pub async fn load_with<F>(file_path: &Path, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = if fs::metadata(file_path).await.is_ok() {
            let content = fs::read_to_string(file_path).await?;
            toml::from_str::<AppConfig>(&content)
                .map_err(|err| anyhow!("invalid config {}: {}", file_path.display(), err))?
        } else {
            warn!("{} not found, using defaults", file_path.display());
            AppConfig::default()
        };
        config.apply_overrides(lookup);
        config.resolve_paths(file_path.parent());
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn normalize(&mut self) {
        if let Some(path) = &self.historical_data_path {
            if path.trim().is_empty() {
                self.historical_data_path = None;
            }
        }
        if let Some(dir) = &self.log_dir {
            if dir.trim().is_empty() {
                self.log_dir = None;
            }
        }
    }

    fn resolve_paths(&mut self, base_dir: Option<&Path>) {
        let Some(base) = base_dir else {
            return;
        };
        self.historical_data_path = self
            .historical_data_path
            .as_deref()
            .map(|path| resolve_path(base, path));
        self.log_dir = self.log_dir.as_deref().map(|dir| resolve_path(base, dir));
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|err| anyhow!("invalid bind_addr: {}", err))?;
        if self.max_body_bytes == 0 {
            return Err(anyhow!("max_body_bytes must be greater than 0"));
        }
        if self.request_timeout_seconds == 0 {
            return Err(anyhow!("request_timeout_seconds must be greater than 0"));
        }
        validate_positive("route_deviation_threshold", self.route_deviation_threshold)?;
        validate_positive(
            "unusual_stop_threshold_minutes",
            self.unusual_stop_threshold_minutes,
        )?;
        validate_positive("speed_threshold", self.speed_threshold)?;
        validate_positive("value_deviation_threshold", self.value_deviation_threshold)?;
        Ok(())
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: self.bind_addr.clone(),
            historical_data_path: self.historical_data_path.clone(),
            max_body_bytes: self.max_body_bytes,
            request_timeout_seconds: self.request_timeout_seconds,
        }
    }

    pub fn to_thresholds(&self) -> DetectionThresholds {
        DetectionThresholds {
            route_deviation_threshold: self.route_deviation_threshold,
            unusual_stop_threshold_minutes: self.unusual_stop_threshold_minutes,
            speed_threshold: self.speed_threshold,
            value_deviation_threshold: self.value_deviation_threshold,
            stop_timestamp_policy: self.stop_timestamp_policy,
            demonstration_checks: self.demonstration_checks,
        }
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("SHIPGUARD_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Some(value) = lookup("SHIPGUARD_HISTORICAL_DATA_PATH") {
            self.historical_data_path = Some(value);
        }
        if let Some(value) = lookup("SHIPGUARD_LOG_DIR") {
            self.log_dir = Some(value);
        }
        if let Some(value) = lookup("SHIPGUARD_MAX_BODY_BYTES") {
            self.max_body_bytes = value.parse().unwrap_or(self.max_body_bytes);
        }
        if let Some(value) = lookup("SHIPGUARD_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
        if let Some(value) = lookup("SHIPGUARD_ROUTE_DEVIATION_THRESHOLD") {
            self.route_deviation_threshold =
                value.parse().unwrap_or(self.route_deviation_threshold);
        }
        if let Some(value) = lookup("SHIPGUARD_UNUSUAL_STOP_THRESHOLD_MINUTES") {
            self.unusual_stop_threshold_minutes =
                value.parse().unwrap_or(self.unusual_stop_threshold_minutes);
        }
        if let Some(value) = lookup("SHIPGUARD_SPEED_THRESHOLD") {
            self.speed_threshold = value.parse().unwrap_or(self.speed_threshold);
        }
        if let Some(value) = lookup("SHIPGUARD_VALUE_DEVIATION_THRESHOLD") {
            self.value_deviation_threshold =
                value.parse().unwrap_or(self.value_deviation_threshold);
        }
        if let Some(value) = lookup("SHIPGUARD_STOP_TIMESTAMP_POLICY") {
            match StopTimestampPolicy::parse(&value) {
                Some(policy) => self.stop_timestamp_policy = policy,
                None => warn!("ignoring unknown stop_timestamp_policy {:?}", value),
            }
        }
        if let Some(value) = lookup("SHIPGUARD_DEMONSTRATION_CHECKS") {
            self.demonstration_checks = value.parse().unwrap_or(self.demonstration_checks);
        }
    }
}

fn resolve_path(base: &Path, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return trimmed.to_string();
    }
    let path = Path::new(trimmed);
    if path.is_absolute() {
        trimmed.to_string()
    } else {
        base.join(path).to_string_lossy().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[tokio::test]
    async fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = AppConfig::load_with(&dir.path().join("absent.toml"), no_env)
            .await
            .expect("defaults");
        assert_eq!(config.to_thresholds(), DetectionThresholds::default());
        assert!(config.historical_data_path.is_none());
    }

    #[tokio::test]
    async fn file_values_resolve_relative_paths() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
bind_addr = "0.0.0.0:9000"
historical_data_path = "data/history.csv"
log_dir = ""
speed_threshold = 100.0
stop_timestamp_policy = "skip_point"
demonstration_checks = false
"#,
        )
        .expect("write config");

        let config = AppConfig::load_with(&path, no_env).await.expect("config");
        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert_eq!(
            config.historical_data_path.as_deref().map(Path::new),
            Some(dir.path().join("data/history.csv").as_path())
        );
        assert!(config.log_dir.is_none());
        let thresholds = config.to_thresholds();
        assert_eq!(thresholds.speed_threshold, 100.0);
        assert_eq!(thresholds.stop_timestamp_policy, StopTimestampPolicy::SkipPoint);
        assert!(!thresholds.demonstration_checks);
    }

    #[tokio::test]
    async fn environment_overrides_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "speed_threshold = 100.0\n").expect("write config");
        let env: HashMap<&str, &str> = HashMap::from([
            ("SHIPGUARD_SPEED_THRESHOLD", "90"),
            ("SHIPGUARD_STOP_TIMESTAMP_POLICY", "skip"),
            ("SHIPGUARD_MAX_BODY_BYTES", "not a number"),
        ]);
        let config = AppConfig::load_with(&path, |key| env.get(key).map(|v| v.to_string()))
            .await
            .expect("config");
        assert_eq!(config.speed_threshold, 90.0);
        assert_eq!(config.stop_timestamp_policy, StopTimestampPolicy::SkipPoint);
        assert_eq!(config.max_body_bytes, 8 * 1024 * 1024);
    }

    #[tokio::test]
    async fn rejects_invalid_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "speed_threshold = -1.0\n").expect("write config");
        assert!(AppConfig::load_with(&path, no_env).await.is_err());

        std::fs::write(&path, "bind_addr = \"nowhere\"\n").expect("write config");
        assert!(AppConfig::load_with(&path, no_env).await.is_err());

        std::fs::write(&path, "max_body_bytes = 0\n").expect("write config");
        assert!(AppConfig::load_with(&path, no_env).await.is_err());
    }
}
