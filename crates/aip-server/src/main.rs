mod api;
mod middleware;
mod session;

use std::{net::SocketAddr, sync::Arc};

use aip_media::{MediaClient, MediaConfig};
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    session::{spawn_auth_event_logger, SessionSettings, SessionStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = aip_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = aip_db::PoolConfig::from_app_config(&config);
    let pool = aip_db::connect_pool(&config.database_url, pool_config).await?;
    aip_db::run_migrations(&pool).await?;

    let media = match config.media_url.as_deref() {
        Some(url) => {
            let media_config = MediaConfig::from_url(url)?;
            let client = MediaClient::new(
                media_config,
                &config.media_api_base,
                config.media_timeout_secs,
            )?;
            Some(Arc::new(client))
        }
        None => {
            tracing::warn!("CLOUDINARY_URL not set; media uploads disabled");
            None
        }
    };

    let sessions = SessionStore::new(pool.clone(), SessionSettings::from_app_config(&config));
    let _auth_logger = spawn_auth_event_logger(&sessions);
    tracing::info!(
        env = %config.env,
        bind_addr = %config.bind_addr,
        sign_up_enabled = sessions.sign_up_enabled(),
        "starting storefront API"
    );

    let app = build_app(
        AppState {
            pool,
            sessions,
            media,
        },
        default_rate_limit_state(),
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
