use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError};
use serde::Deserialize;
use std::env;
use std::time::Duration;

use seatlock_core::{RegistrySettings, MAX_LOCK_DURATION};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub registry: RegistryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RegistryConfig {
    pub total_seats: u32,
    pub lock_duration_seconds: u64,
    pub sweep_interval_seconds: u64,
}

impl RegistryConfig {
    pub fn settings(&self) -> RegistrySettings {
        RegistrySettings {
            total_seats: self.total_seats,
            lock_duration: Duration::from_secs(self.lock_duration_seconds),
        }
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds)
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Self::defaults()?
            .add_source(config::File::with_name("config/default").required(false))
            // Per-environment overrides, e.g. config/production.toml
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `SEATLOCK__REGISTRY__TOTAL_SEATS=20`
            .add_source(config::Environment::with_prefix("SEATLOCK").separator("__"));

        Self::from_builder(builder)
    }

    /// Built-in values used when no file or environment override is present.
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        config::Config::builder()
            .set_default("server.port", 3000)?
            .set_default("registry.total_seats", 10)?
            .set_default("registry.lock_duration_seconds", 60)?
            .set_default("registry.sweep_interval_seconds", 5)
    }

    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.registry.total_seats == 0 {
            return Err(ConfigError::Message("registry.total_seats must be positive".into()));
        }
        if self.registry.lock_duration_seconds == 0 {
            return Err(ConfigError::Message(
                "registry.lock_duration_seconds must be positive".into(),
            ));
        }
        if self.registry.lock_duration_seconds > MAX_LOCK_DURATION.as_secs() {
            return Err(ConfigError::Message(format!(
                "registry.lock_duration_seconds must not exceed {}",
                MAX_LOCK_DURATION.as_secs()
            )));
        }
        if self.registry.sweep_interval_seconds == 0 {
            return Err(ConfigError::Message(
                "registry.sweep_interval_seconds must be positive".into(),
            ));
        }
        Ok(())
    }
}
