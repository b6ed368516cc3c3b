//! Configuration resolution for discography-regional
//!
//! Priority per setting: CLI argument → environment variable → TOML → default.
//! clap covers the first two tiers through `#[arg(env)]`.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use discography_common::config::{RootFolderResolver, TomlConfig};
use discography_common::{Error, Result};

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:5740";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Command-line arguments
#[derive(Debug, Clone, Parser)]
#[command(
    name = "discography-regional",
    version,
    about = "Synchronizes regional reference data from the external system of record"
)]
pub struct Args {
    /// Root folder holding discography.db (env: DISCOGRAPHY_ROOT_FOLDER)
    #[arg(long)]
    pub root_folder: Option<PathBuf>,

    /// Base URL of the external regional API
    #[arg(long, env = "DISCOGRAPHY_REGIONAL_API_URL")]
    pub regional_api_url: Option<String>,

    /// Address the HTTP server listens on
    #[arg(long, env = "DISCOGRAPHY_BIND_ADDRESS")]
    pub bind_address: Option<String>,

    /// Seconds between scheduled syncs (0 disables scheduling)
    #[arg(long, env = "DISCOGRAPHY_SYNC_INTERVAL_SECS")]
    pub sync_interval_secs: Option<u64>,

    /// Admin secret for protected endpoints (0 disables authentication)
    #[arg(long, env = "DISCOGRAPHY_ADMIN_SECRET")]
    pub admin_secret: Option<i64>,

    /// Log level directive (overridden by RUST_LOG)
    #[arg(long, env = "DISCOGRAPHY_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Explicit TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct RegionalConfig {
    pub root_folder: PathBuf,
    pub regional_api_url: String,
    pub bind_address: SocketAddr,
    pub sync_interval: Duration,
    /// `None` means load (or generate) the secret from the settings table
    pub admin_secret: Option<i64>,
    pub log_level: String,
}

impl RegionalConfig {
    pub fn resolve(args: &Args, toml: &TomlConfig) -> Result<Self> {
        let root_folder = RootFolderResolver::new(args.root_folder.clone(), toml).resolve();

        let regional_api_url = args
            .regional_api_url
            .clone()
            .or_else(|| toml.regional_api_url.clone())
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                Error::Config(
                    "Regional API URL not configured. Please configure using one of:\n\
                     1. Command line: --regional-api-url https://...\n\
                     2. Environment: DISCOGRAPHY_REGIONAL_API_URL=https://...\n\
                     3. TOML config: regional_api_url = \"https://...\""
                        .to_string(),
                )
            })?;

        let bind_str = args
            .bind_address
            .clone()
            .or_else(|| toml.bind_address.clone())
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());
        let bind_address = bind_str
            .parse::<SocketAddr>()
            .map_err(|e| Error::Config(format!("Invalid bind address '{}': {}", bind_str, e)))?;

        let sync_interval_secs = args.sync_interval_secs.or(toml.sync_interval_secs).unwrap_or(0);

        Ok(Self {
            root_folder,
            regional_api_url,
            bind_address,
            sync_interval: Duration::from_secs(sync_interval_secs),
            admin_secret: args.admin_secret.or(toml.admin_secret),
            log_level: args
                .log_level
                .clone()
                .or_else(|| toml.log_level.clone())
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["discography-regional"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    fn clear_env() {
        for var in [
            "DISCOGRAPHY_REGIONAL_API_URL",
            "DISCOGRAPHY_BIND_ADDRESS",
            "DISCOGRAPHY_SYNC_INTERVAL_SECS",
            "DISCOGRAPHY_ADMIN_SECRET",
            "DISCOGRAPHY_LOG_LEVEL",
        ] {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_with_only_url() {
        clear_env();
        let config = RegionalConfig::resolve(
            &args(&["--regional-api-url", "http://localhost:9000"]),
            &TomlConfig::default(),
        )
        .unwrap();

        assert_eq!(config.regional_api_url, "http://localhost:9000");
        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS.parse().unwrap());
        assert!(config.sync_interval.is_zero());
        assert_eq!(config.admin_secret, None);
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
    }

    #[test]
    #[serial]
    fn test_cli_overrides_toml() {
        clear_env();
        let toml = TomlConfig {
            regional_api_url: Some("http://toml:9000".to_string()),
            sync_interval_secs: Some(3600),
            admin_secret: Some(7),
            ..Default::default()
        };

        let config = RegionalConfig::resolve(
            &args(&["--regional-api-url", "http://cli:9000", "--sync-interval-secs", "60"]),
            &toml,
        )
        .unwrap();

        assert_eq!(config.regional_api_url, "http://cli:9000");
        assert_eq!(config.sync_interval, Duration::from_secs(60));
        assert_eq!(config.admin_secret, Some(7));
    }

    #[test]
    #[serial]
    fn test_env_fills_cli_tier() {
        clear_env();
        std::env::set_var("DISCOGRAPHY_REGIONAL_API_URL", "http://env:9000");

        let toml = TomlConfig {
            regional_api_url: Some("http://toml:9000".to_string()),
            ..Default::default()
        };
        let config = RegionalConfig::resolve(&args(&[]), &toml).unwrap();
        assert_eq!(config.regional_api_url, "http://env:9000");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_missing_url_is_config_error() {
        clear_env();
        let result = RegionalConfig::resolve(&args(&[]), &TomlConfig::default());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    #[serial]
    fn test_invalid_bind_address_rejected() {
        clear_env();
        let result = RegionalConfig::resolve(
            &args(&["--regional-api-url", "http://x", "--bind-address", "not-an-address"]),
            &TomlConfig::default(),
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
