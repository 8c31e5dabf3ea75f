use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use axum::http::HeaderValue;
use crate::error::{AppError, Result};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_ALLOWED_ORIGIN: &str = "https://ws-golang-front.onrender.com";

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub allowed_origin: HeaderValue,
}

impl Config {
    pub fn load() -> Result<Self> {
        // A missing .env is fine, the process environment still applies
        if let Err(err) = dotenv::dotenv() {
            tracing::warn!("No .env file found, using system environment variables ({})", err);
        }

        let host = env::var("HOST").ok();
        let port = env::var("PORT").ok();
        let origin = env::var("CORS_ALLOWED_ORIGIN").ok();

        Self::from_parts(host.as_deref(), port.as_deref(), origin.as_deref())
    }

    /// Builds a config from raw values, falling back to defaults for unset or
    /// empty ones.
    pub fn from_parts(host: Option<&str>, port: Option<&str>, origin: Option<&str>) -> Result<Self> {
        let host = non_empty(host).unwrap_or(DEFAULT_HOST);
        let ip = IpAddr::from_str(host)
            .map_err(|e| AppError::Config(format!("Invalid host address: {}", e)))?;

        let port = match non_empty(port) {
            Some(port) => port
                .parse::<u16>()
                .map_err(|e| AppError::Config(format!("Invalid port: {}", e)))?,
            None => DEFAULT_PORT,
        };

        let origin = non_empty(origin).unwrap_or(DEFAULT_ALLOWED_ORIGIN);
        let allowed_origin = HeaderValue::from_str(origin)
            .map_err(|e| AppError::Config(format!("Invalid allowed origin: {}", e)))?;

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            allowed_origin,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_values_fall_back_to_defaults() {
        let config = Config::from_parts(None, None, None).unwrap();
        assert_eq!(config.server_addr, "0.0.0.0:5000".parse().unwrap());
        assert_eq!(config.allowed_origin, DEFAULT_ALLOWED_ORIGIN);
    }

    #[test]
    fn empty_port_is_treated_as_unset() {
        let config = Config::from_parts(Some("127.0.0.1"), Some(""), None).unwrap();
        assert_eq!(config.server_addr, "127.0.0.1:5000".parse().unwrap());
    }

    #[test]
    fn explicit_values_win() {
        let config = Config::from_parts(
            Some("127.0.0.1"),
            Some("8080"),
            Some("http://localhost:5173"),
        )
        .unwrap();
        assert_eq!(config.server_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.allowed_origin, "http://localhost:5173");
    }

    #[test]
    fn bad_port_is_a_config_error() {
        let err = Config::from_parts(None, Some("not-a-port"), None).unwrap_err();
        assert!(matches!(err, AppError::Config(msg) if msg.starts_with("Invalid port")));
    }

    #[test]
    fn bad_host_is_a_config_error() {
        let err = Config::from_parts(Some("localhost"), None, None).unwrap_err();
        assert!(matches!(err, AppError::Config(msg) if msg.starts_with("Invalid host")));
    }
}
