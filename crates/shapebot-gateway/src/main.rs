use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info, warn};

use shapebot_agent::ShapesClient;
use shapebot_core::BotConfig;
use shapebot_discord::DiscordAdapter;

mod app;
mod cli;
mod http;
mod keepalive;

use cli::{Cli, Command};
use keepalive::KeepAlive;

const DEFAULT_LOG_FILTER: &str =
    "shapebot=info,shapebot_discord=info,shapebot_agent=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional; real env vars always win.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .init();

    install_panic_hook();

    let cli = Cli::parse();
    match cli.command() {
        Command::Run => run(cli.config.as_deref()).await,
        Command::Ping { url, watch } => ping(cli.config.as_deref(), url, watch).await,
    }
}

/// Route panics in any task through tracing so they reach the same sink as
/// everything else.
fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = if let Some(s) = info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };
        error!(location = %location, payload = %payload, "panic");
    }));
}

async fn run(config_path: Option<&str>) -> anyhow::Result<()> {
    let config = match BotConfig::load(config_path) {
        Ok(c) => c,
        Err(e) => {
            error!(code = e.code(), "{e}");
            return Err(e.into());
        }
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        git = env!("SHAPEBOT_GIT_SHA"),
        shape = %config.shapes.shape_username,
        "starting shapebot"
    );

    let backend = ShapesClient::from_config(&config.shapes);
    info!(model = %backend.model(), "Shapes backend configured");

    let keep_alive = if config.keep_alive_enabled() {
        let ka = KeepAlive::from_config(&config.keep_alive);
        if ka.is_none() {
            warn!("RENDER_EXTERNAL_URL not set, keep-alive disabled");
        }
        ka
    } else {
        None
    };

    let state = Arc::new(app::AppState::new(config, Box::new(backend)));
    let router = app::build_router(Arc::clone(&state));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let addr: SocketAddr = format!("{}:{}", state.config.health.bind, state.config.health.port)
        .parse()
        .context("invalid health bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind health server on {addr}"))?;
    info!("Health check server listening on {}", addr);

    let mut server_shutdown = shutdown_rx.clone();
    let server = tokio::spawn(async move {
        let graceful = async move {
            let _ = server_shutdown.wait_for(|stop| *stop).await;
        };
        if let Err(e) = axum::serve(listener, router)
            .with_graceful_shutdown(graceful)
            .await
        {
            error!(error = %e, "health server failed");
        }
    });

    let pinger = keep_alive.map(|ka| tokio::spawn(ka.run(shutdown_rx.clone())));

    let adapter = DiscordAdapter::new(&state.config.discord, Arc::clone(&state))?;
    let discord = tokio::spawn(adapter.run());
    info!("Discord bot started");

    wait_for_signal().await;
    info!("shutting down");

    let _ = shutdown_tx.send(true);
    discord.abort();
    let _ = server.await;
    if let Some(pinger) = pinger {
        let _ = pinger.await;
    }
    Ok(())
}

/// Resolve on Ctrl-C, or SIGTERM on unix hosts.
async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

async fn ping(
    config_path: Option<&str>,
    url: Option<String>,
    follow: bool,
) -> anyhow::Result<()> {
    let config = BotConfig::load_unvalidated(config_path)?;
    let base = url
        .or_else(|| config.keep_alive.public_url.clone())
        .filter(|u| !u.trim().is_empty())
        .context("No URL provided. Set RENDER_EXTERNAL_URL or pass as argument.")?;

    let pinger = KeepAlive::new(
        &base,
        std::time::Duration::from_secs(config.keep_alive.interval_secs),
        std::time::Duration::from_secs(config.keep_alive.timeout_secs),
    );

    if follow {
        let (tx, rx) = watch::channel(false);
        let task = tokio::spawn(pinger.ping_on_start(true).run(rx));
        wait_for_signal().await;
        let _ = tx.send(true);
        let _ = task.await;
        return Ok(());
    }

    info!(url = %pinger.url(), "pinging");
    let report = pinger.ping_once().await?;
    if !report.is_ok() {
        anyhow::bail!("{} answered with status {}", pinger.url(), report.status);
    }
    match report.health {
        Some(h) => info!(
            status = %h.status,
            bot = %h.bot,
            uptime_secs = h.uptime as u64,
            "ping ok"
        ),
        None => info!(status = report.status, "ping ok"),
    }
    Ok(())
}
