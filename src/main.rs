use std::sync::Arc;

use mimalloc::MiMalloc;
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use user_portal::{
    CredentialStore,
    config::Config,
    db::MongoUsers,
    router::{AppState, app_router},
    service::RedisProbe,
};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::from_env()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        listen_addr = %cfg.listen_addr,
        session_cookie = %cfg.session_cookie_name,
        loglevel = %cfg.loglevel,
        seed_example_user = cfg.seed_example_user
    );

    let cookie_key = cfg.cookie_key()?;

    let users = MongoUsers::connect(&cfg.mongo_uri, &cfg.mongo_database).await?;
    let init_users = users.clone();
    let seed = cfg.seed_example_user;
    tokio::spawn(async move {
        match init_users.init(seed).await {
            Ok(()) => info!("users collection ready"),
            Err(e) => warn!(error = %e, "failed to initialise users collection"),
        }
    });

    let cache = RedisProbe::open(&cfg.redis_url)?;

    let state = AppState::new(
        CredentialStore::new(Arc::new(users)),
        Arc::new(cache),
        cookie_key,
        cfg.session_cookie_name.as_str(),
        cfg.insecure_cookie,
    );
    let app = app_router(state);

    let listener = TcpListener::bind(&cfg.listen_addr).await?;
    info!("HTTP server listening on {}", cfg.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
