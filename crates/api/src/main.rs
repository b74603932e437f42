use anyhow::Context;

use taskhub_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    taskhub_observability::init(&config.log_filter);
    if config.uses_dev_secret {
        tracing::warn!("JWT_SECRET not set; using the development secret");
    }

    let app = taskhub_api::app::build_app(&config).await?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        signup_policy = %config.signup_policy,
        audit_policy = %config.audit_policy,
        "listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
