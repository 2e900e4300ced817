//! HTTP server settings.
//!
//! `PUBLIC_BASE_URL` is the externally reachable origin of the service. It is
//! used to build the URLs of uploaded files returned to clients, so it must be
//! set when the service runs behind a proxy or on another host/port.

use std::env;

use crate::parse_or;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub public_base_url: String,
    /// Port of the separate Prometheus metrics listener.
    pub metrics_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = parse_or(lookup("PORT"), 3000);
        let public_base_url = lookup("PUBLIC_BASE_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| format!("http://localhost:{}", port));

        Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            public_base_url,
            metrics_port: parse_or(lookup("METRICS_PORT"), 9090),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup_from;

    #[test]
    fn test_defaults_match_local_dev() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.public_base_url, "http://localhost:3000");
        assert_eq!(config.metrics_port, 9090);
    }

    #[test]
    fn test_public_base_url_follows_port_when_unset() {
        let config = ServerConfig::from_lookup(lookup_from(&[("PORT", "8080")]));
        assert_eq!(config.public_base_url, "http://localhost:8080");
    }

    #[test]
    fn test_public_base_url_trailing_slash_is_trimmed() {
        let config = ServerConfig::from_lookup(lookup_from(&[(
            "PUBLIC_BASE_URL",
            "https://users.example.com/",
        )]));
        assert_eq!(config.public_base_url, "https://users.example.com");
    }
}
