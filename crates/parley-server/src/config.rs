use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, bail};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
    "THIS_IS_A_JWT_SECRET_KEY",
];

pub struct Config {
    pub jwt_secret: String,
    pub db_path: PathBuf,
    pub addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let jwt_secret = lookup("PARLEY_JWT_SECRET").unwrap_or_default();
        if jwt_secret.trim().is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("PARLEY_JWT_SECRET is unset or still a placeholder; set it in your environment or .env file");
        }

        let db_path = lookup("PARLEY_DB_PATH").unwrap_or_else(|| "parley.db".into());
        let host = lookup("PARLEY_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = lookup("PARLEY_PORT")
            .unwrap_or_else(|| "8000".into())
            .parse()
            .context("PARLEY_PORT is not a valid port")?;

        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", host, port))?;

        Ok(Self {
            jwt_secret,
            db_path: db_path.into(),
            addr,
        })
    }
}
