// Configuration module entry point
// Loads layered configuration and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

pub use state::AppState;
pub use types::{
    CatalogConfig, Config, HealthConfig, HttpConfig, LoggingConfig, PerformanceConfig,
    ServerConfig,
};

/// Config file used when no path is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from specified file path (without extension).
    ///
    /// The file is optional; `SHOP_*` environment variables override it
    /// (`SHOP_SERVER__PORT=9000`), and every key has a default.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("SHOP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.show_headers", false)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("performance.shutdown_timeout", 10)?
            .set_default("http.server_name", "shop-server/0.1")?
            .set_default("http.enable_cors", false)?
            .set_default("http.max_body_size", 10_485_760)? // 10MB
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("does-not-exist/shop-config").unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert_eq!(cfg.http.max_body_size, 10_485_760);
        assert!(cfg.health.enabled);
        assert_eq!(cfg.health.liveness_path, "/healthz");
        assert!(cfg.catalog.courses.is_empty());
        assert_eq!(
            cfg.get_socket_addr().unwrap(),
            "127.0.0.1:8080".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join(format!("shop-config-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(
            &path,
            r#"
[server]
port = 9090

[health]
enabled = false

[[catalog.courses]]
id = 1
title = "Rust Basics"
description = "Ownership and borrowing"
"#,
        )
        .unwrap();

        let base = dir.join("config");
        let cfg = Config::load_from(base.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert!(!cfg.health.enabled);
        assert_eq!(cfg.catalog.courses.len(), 1);
        assert_eq!(cfg.catalog.courses[0].title, "Rust Basics");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_environment_overrides_defaults() {
        // Only this test reads keep_alive_timeout, so parallel tests are unaffected
        std::env::set_var("SHOP_PERFORMANCE__KEEP_ALIVE_TIMEOUT", "5");
        let cfg = Config::load_from("does-not-exist/shop-config");
        std::env::remove_var("SHOP_PERFORMANCE__KEEP_ALIVE_TIMEOUT");

        assert_eq!(cfg.unwrap().performance.keep_alive_timeout, 5);
    }

    #[test]
    fn test_invalid_address() {
        let mut cfg = Config::load_from("does-not-exist/shop-config").unwrap();
        cfg.server.host = "not an ip".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }
}
