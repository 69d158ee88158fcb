use std::str::FromStr;
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got {value:?}")]
    Invalid { name: &'static str, expected: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Env {
    pub ip: String,
    pub port: u16,
    pub client_origin: String,
    pub workers: usize,
    pub heartbeat_interval: Duration,
    pub client_timeout: Duration,
    pub max_frame_size: usize,
}

impl Env {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Env::default();

        let ip = lookup("IP").unwrap_or(defaults.ip);
        let port = parse_var(&lookup, "PORT", defaults.port, "u16 integer")?;
        let client_origin = lookup("CLIENT_ORIGIN").unwrap_or(defaults.client_origin);
        let workers = parse_var(&lookup, "WORKERS", defaults.workers, "usize integer")?;
        require_positive("WORKERS", workers as u64)?;
        let heartbeat_interval = parse_var(
            &lookup,
            "HEARTBEAT_INTERVAL",
            defaults.heartbeat_interval.as_secs(),
            "u64 integer",
        )?;
        require_positive("HEARTBEAT_INTERVAL", heartbeat_interval)?;
        let client_timeout =
            parse_var(&lookup, "CLIENT_TIMEOUT", defaults.client_timeout.as_secs(), "u64 integer")?;
        let max_frame_size =
            parse_var(&lookup, "MAX_FRAME_SIZE", defaults.max_frame_size, "usize integer")?;

        Ok(Env {
            ip,
            port,
            client_origin,
            workers,
            heartbeat_interval: Duration::from_secs(heartbeat_interval),
            client_timeout: Duration::from_secs(client_timeout),
            max_frame_size,
        })
    }
}

fn require_positive(name: &'static str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Invalid {
            name,
            expected: "positive integer",
            value: value.to_string(),
        });
    }
    Ok(())
}

fn parse_var<F, T>(
    lookup: &F,
    name: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) => {
            value.trim().parse::<T>().map_err(|_| ConfigError::Invalid { name, expected, value })
        }
        None => Ok(default),
    }
}

impl Default for Env {
    fn default() -> Self {
        Env {
            ip: "0.0.0.0".to_string(),
            port: 4741,
            client_origin: "http://localhost:7165".to_string(),
            workers: 2,
            heartbeat_interval: Duration::from_secs(25),
            client_timeout: Duration::from_secs(45),
            max_frame_size: 1_000_000,
        }
    }
}
