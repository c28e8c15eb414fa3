use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub engine: EngineConfig,
    pub sync: SyncConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            engine: EngineConfig::from_env()?,
            sync: SyncConfig::from_env(),
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Credentials for the weekly resolution job that drives the cycle gate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncConfig {
    /// Expected `x-sync-key` value; the cycle route stays unmounted without one.
    pub key: Option<String>,
}

impl SyncConfig {
    pub fn from_env() -> Self {
        let key = env::var("RECRUIT_SYNC_KEY")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        Self { key }
    }
}

/// Limits applied by the competition engine.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Maximum points a team may place on one candidate per cycle.
    pub cycle_point_cap: f64,
    pub board_capacity: usize,
    pub weekly_points: f64,
    pub scholarships: u32,
    /// AI threshold spread must exceed this.
    pub ai_min_spread: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cycle_point_cap: 20.0,
            board_capacity: 25,
            weekly_points: 50.0,
            scholarships: 25,
            ai_min_spread: 5,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let cycle_point_cap = number_var("RECRUIT_CYCLE_POINT_CAP", defaults.cycle_point_cap)?;
        let weekly_points = number_var("RECRUIT_WEEKLY_POINTS", defaults.weekly_points)?;
        for (key, value) in [
            ("RECRUIT_CYCLE_POINT_CAP", cycle_point_cap),
            ("RECRUIT_WEEKLY_POINTS", weekly_points),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidNumber { key });
            }
        }

        Ok(Self {
            cycle_point_cap,
            board_capacity: number_var("RECRUIT_BOARD_CAPACITY", defaults.board_capacity)?,
            weekly_points,
            scholarships: number_var("RECRUIT_SCHOLARSHIPS", defaults.scholarships)?,
            ai_min_spread: number_var("RECRUIT_AI_MIN_SPREAD", defaults.ai_min_spread)?,
        })
    }
}

fn number_var<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { key }),
        _ => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key } => {
                write!(f, "{} must be a valid positive number", key)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidNumber { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "RECRUIT_CYCLE_POINT_CAP",
            "RECRUIT_BOARD_CAPACITY",
            "RECRUIT_WEEKLY_POINTS",
            "RECRUIT_SCHOLARSHIPS",
            "RECRUIT_AI_MIN_SPREAD",
            "RECRUIT_SYNC_KEY",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.engine, EngineConfig::default());
        assert_eq!(config.sync.key, None);
    }

    #[test]
    fn sync_key_reads_from_env_and_ignores_blanks() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("RECRUIT_SYNC_KEY", "   ");
        assert_eq!(SyncConfig::from_env().key, None);

        env::set_var("RECRUIT_SYNC_KEY", " weekly-job-secret ");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.sync.key.as_deref(), Some("weekly-job-secret"));
        reset_env();
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn engine_limits_read_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("RECRUIT_BOARD_CAPACITY", "10");
        env::set_var("RECRUIT_WEEKLY_POINTS", "75.5");
        let config = EngineConfig::from_env().expect("engine config loads");
        assert_eq!(config.board_capacity, 10);
        assert_eq!(config.weekly_points, 75.5);
        assert_eq!(config.cycle_point_cap, 20.0);
        reset_env();
    }

    #[test]
    fn invalid_engine_numbers_are_rejected() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("RECRUIT_SCHOLARSHIPS", "many");
        let error = EngineConfig::from_env().expect_err("non-numeric rejected");
        assert!(matches!(
            error,
            ConfigError::InvalidNumber {
                key: "RECRUIT_SCHOLARSHIPS"
            }
        ));

        reset_env();
        env::set_var("RECRUIT_CYCLE_POINT_CAP", "-4");
        let error = EngineConfig::from_env().expect_err("negative cap rejected");
        assert!(matches!(
            error,
            ConfigError::InvalidNumber {
                key: "RECRUIT_CYCLE_POINT_CAP"
            }
        ));
        reset_env();
    }
}
