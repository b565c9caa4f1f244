use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration, loaded from `VENUED_*` environment
/// variables with defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind: String,
    pub port: u16,
    /// Directory holding the journal file.
    pub data_dir: PathBuf,
    /// HMAC secret for bearer tokens.
    pub jwt_secret: String,
    /// Prometheus exporter port; metrics are disabled when unset.
    pub metrics_port: Option<u16>,
    /// Journal appends tolerated before the compactor rewrites the file.
    pub compact_threshold: u64,
    /// Admin account seeded at boot when both are set.
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // .env support for local development
        dotenvy::dotenv().ok();

        let config = Config {
            bind: env::var("VENUED_BIND").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("VENUED_PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .context("invalid VENUED_PORT")?,
            data_dir: env::var("VENUED_DATA_DIR")
                .unwrap_or_else(|_| "./data".to_string())
                .into(),
            jwt_secret: env::var("VENUED_JWT_SECRET").unwrap_or_else(|_| "venued".to_string()),
            metrics_port: match env::var("VENUED_METRICS_PORT") {
                Ok(s) => Some(s.parse().context("invalid VENUED_METRICS_PORT")?),
                Err(_) => None,
            },
            compact_threshold: env::var("VENUED_COMPACT_THRESHOLD")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .context("invalid VENUED_COMPACT_THRESHOLD")?,
            admin_email: env::var("VENUED_ADMIN_EMAIL").ok(),
            admin_password: env::var("VENUED_ADMIN_PASSWORD").ok(),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("VENUED_PORT must be greater than 0");
        }
        if self.jwt_secret.is_empty() {
            anyhow::bail!("VENUED_JWT_SECRET must not be empty");
        }
        if self.admin_email.is_some() != self.admin_password.is_some() {
            anyhow::bail!("VENUED_ADMIN_EMAIL and VENUED_ADMIN_PASSWORD must be set together");
        }
        Ok(())
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}
