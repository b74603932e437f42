//! Configuration loading and representation.
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file. Unknown policy values fail at startup rather than falling back.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use chrono::Duration;

use taskhub_domain::{AuditPolicy, SignupPolicy};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_JWT_SECRET: &str = "dev-secret";
/// Seven days.
pub const DEFAULT_JWT_TTL_SECS: i64 = 7 * 24 * 60 * 60;
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    /// `JWT_SECRET` was unset and `DEFAULT_JWT_SECRET` is in use.
    pub uses_dev_secret: bool,
    pub jwt_ttl: Duration,
    /// PostgreSQL when set; in-memory storage otherwise.
    pub database_url: Option<String>,
    pub signup_policy: SignupPolicy,
    pub audit_policy: AuditPolicy,
    pub log_filter: String,
}

impl AppConfig {
    /// Load `.env` (if present) and then read the environment.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("BIND_ADDR must be a socket address")?;

        let secret = get("JWT_SECRET");
        let uses_dev_secret = secret.is_none();
        let jwt_secret = secret.unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string());

        let ttl_secs = match get("JWT_TTL_SECS") {
            Some(raw) => raw
                .parse::<i64>()
                .context("JWT_TTL_SECS must be an integer")?,
            None => DEFAULT_JWT_TTL_SECS,
        };
        if ttl_secs <= 0 {
            anyhow::bail!("JWT_TTL_SECS must be positive");
        }

        let signup_policy = match get("SIGNUP_POLICY") {
            Some(raw) => raw.parse::<SignupPolicy>().map_err(anyhow::Error::msg)?,
            None => SignupPolicy::default(),
        };
        let audit_policy = match get("AUDIT_POLICY") {
            Some(raw) => raw.parse::<AuditPolicy>().map_err(anyhow::Error::msg)?,
            None => AuditPolicy::default(),
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            uses_dev_secret,
            jwt_ttl: Duration::seconds(ttl_secs),
            database_url: get("DATABASE_URL"),
            signup_policy,
            audit_policy,
            log_filter: get("LOG_FILTER").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.jwt_ttl, Duration::days(7));
        assert!(config.database_url.is_none());
        assert_eq!(config.signup_policy, SignupPolicy::RequireOrganization);
        assert_eq!(config.audit_policy, AuditPolicy::Strict);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn missing_jwt_secret_is_reported() {
        let config = load(&[]).unwrap();
        assert!(config.uses_dev_secret);
        assert_eq!(config.jwt_secret, DEFAULT_JWT_SECRET);

        let config = load(&[("JWT_SECRET", "   ")]).unwrap();
        assert!(config.uses_dev_secret);

        let config = load(&[("JWT_SECRET", "s3cret")]).unwrap();
        assert!(!config.uses_dev_secret);
        assert_eq!(config.jwt_secret, "s3cret");
    }

    #[test]
    fn policies_are_parsed() {
        let config = load(&[
            ("SIGNUP_POLICY", "auto-create-organization"),
            ("AUDIT_POLICY", "best-effort"),
            ("DATABASE_URL", "postgres://localhost/taskhub"),
        ])
        .unwrap();
        assert_eq!(config.signup_policy, SignupPolicy::AutoCreateOrganization);
        assert_eq!(config.audit_policy, AuditPolicy::BestEffort);
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/taskhub")
        );
    }

    #[test]
    fn unknown_policy_fails() {
        assert!(load(&[("SIGNUP_POLICY", "anything-goes")]).is_err());
        assert!(load(&[("JWT_TTL_SECS", "0")]).is_err());
        assert!(load(&[("BIND_ADDR", "nowhere")]).is_err());
    }
}
