use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;
use ulid::Ulid;

use venued::api::{self, AppState};
use venued::auth::{AuthGate, hash_password};
use venued::compactor;
use venued::config::Config;
use venued::engine::Engine;
use venued::model::{Role, User, now_ms};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env().context("failed to load configuration")?;
    venued::observability::init(config.metrics_port);

    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("failed to create data dir {}", config.data_dir.display()))?;
    let journal_path = config.data_dir.join("venued.journal");

    let engine = Arc::new(Engine::new(journal_path).context("failed to open journal")?);
    seed_admin(&engine, &config).await?;

    tokio::spawn(compactor::run_compactor(
        engine.clone(),
        config.compact_threshold,
    ));

    let state = AppState {
        engine,
        auth: AuthGate::new(&config.jwt_secret),
    };
    let app = api::create_router(state);

    let addr = config.address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("venued listening on {addr}");
    info!("  data_dir: {}", config.data_dir.display());
    info!(
        "  metrics: {}",
        config
            .metrics_port
            .map_or("disabled".to_string(), |p| format!("http://0.0.0.0:{p}/metrics"))
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("venued stopped");
    Ok(())
}

/// Ensure the configured admin account exists. Admins cannot register
/// through the API, so boot is the only path that creates one.
async fn seed_admin(engine: &Engine, config: &Config) -> Result<()> {
    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        return Ok(());
    };
    if engine.user_by_email(email).is_some() {
        return Ok(());
    }
    let admin = User {
        id: Ulid::new(),
        first_name: "Admin".into(),
        last_name: String::new(),
        phone: String::new(),
        email: email.clone(),
        password_hash: hash_password(password).context("failed to hash admin password")?,
        role: Role::Admin,
        created_at: now_ms(),
    };
    engine
        .register_user(admin)
        .await
        .context("failed to seed admin user")?;
    info!("seeded admin account {email}");
    Ok(())
}

/// Resolve on SIGTERM or ctrl-c so in-flight requests can drain.
async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to register SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
    }
    info!("shutdown signal received");
}
