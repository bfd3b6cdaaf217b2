use anyhow::Context;
use tracing_subscriber::EnvFilter;

// ri-utilizziamo le funzioni e strutture definite in lib.rs
use staffetta_server::{config::Config, connect_store, realtime, routes, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env è opzionale
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env().context("load configuration")?;

    // lo store è condiviso tra HTTP e subscriber, nient'altro lo è
    let store = connect_store(config.mongo_uri.as_deref()).await;

    let subscriber = match config.realtime() {
        Some(rt) => match realtime::spawn_subscriber(&rt, store.clone()) {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::error!(error = %e, "cannot start realtime subscriber");
                None
            }
        },
        None => {
            tracing::warn!("ABLY_API_KEY is not set, realtime subscriber disabled");
            None
        }
    };

    let app = routes::router(AppState::new(store));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("bind tcp listener")?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server shutdown")?;

    if let Some(handle) = subscriber {
        handle.shutdown();
    }
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown requested"),
        Err(e) => {
            // senza segnali si gira finché il processo non viene ucciso
            tracing::error!(error = %e, "cannot listen for ctrl-c");
            std::future::pending::<()>().await
        }
    }
}
