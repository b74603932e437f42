//! Storage selection and service wiring.

use std::sync::Arc;

use anyhow::Context;

use taskhub_auth::{Argon2Hasher, Hs256Tokens};
use taskhub_infra::{AppConfig, InMemoryStore, PostgresStore};
use taskhub_services::{Repositories, ServiceSettings, Services};

/// Wire services against PostgreSQL when `DATABASE_URL` is set, in-memory otherwise.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<Services> {
    let repos = match &config.database_url {
        Some(url) => {
            let store = PostgresStore::connect(url)
                .await
                .context("failed to connect to postgres")?;
            store.migrate().await.context("failed to migrate schema")?;
            tracing::info!("using postgres storage");
            Repositories::from_store(Arc::new(store))
        }
        None => {
            tracing::info!("DATABASE_URL not set; using in-memory storage");
            Repositories::from_store(Arc::new(InMemoryStore::new()))
        }
    };

    let settings = ServiceSettings {
        signup_policy: config.signup_policy,
        audit_policy: config.audit_policy,
        token_ttl: config.jwt_ttl,
    };

    Ok(Services::new(
        repos,
        settings,
        Arc::new(Argon2Hasher),
        Arc::new(Hs256Tokens::new(config.jwt_secret.as_bytes())),
    ))
}
