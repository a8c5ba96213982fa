use anyhow::{anyhow, Result};
use dynadns::{Config, SharedConfig};
use is_terminal::IsTerminal;
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_init();

    let mut first_args = std::env::args().take(2);
    let (program_name, config_file) = (
        first_args.next().unwrap_or("dynadns".to_string()),
        first_args.next(),
    );

    let config = config_init(&program_name, config_file)?;
    let shutdown = CancellationToken::new();
    let store = config.record_store(shutdown.clone()).await?;

    let dns_server = dynadns::new_dns(config.clone(), store.clone(), shutdown.clone()).await?;
    tracing::info!("DNS listening on UDP {}", dns_server.local_addr()?);
    let mut dns_handle = tokio::spawn(dns_server.block_until_done());

    let (api_addr, api_server) = dynadns::new_http(config, store, shutdown.clone())?;
    tracing::info!("API listening on {api_addr}");
    let mut api_handle = tokio::spawn(api_server);

    let (mut dns_res, mut api_res) = (None, None);
    tokio::select! {
        () = terminated() => tracing::info!("quitting from signal"),
        res = &mut dns_handle => dns_res = Some(res),
        res = &mut api_handle => api_res = Some(res),
    }
    shutdown.cancel();

    let dns_res = match dns_res {
        Some(res) => res,
        None => dns_handle.await,
    };
    let api_res = match api_res {
        Some(res) => res,
        None => api_handle.await,
    };

    let mut failed = false;
    for (listener, res) in [("DNS", dns_res), ("API", api_res)] {
        match res {
            Ok(Ok(())) => tracing::debug!("{listener} listener stopped"),
            Ok(Err(err)) => {
                tracing::error!("{listener} listener failed: {err}");
                failed = true;
            }
            Err(err) => {
                tracing::error!("{listener} listener task failed: {err}");
                failed = true;
            }
        }
    }
    if failed {
        return Err(anyhow!("listener failed"));
    }
    tracing::info!("goodbye");
    Ok(())
}

async fn terminated() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!("failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = sigterm => {},
    }
}

fn tracing_init() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "dynadns=info,tower_http=info".into());
    let ansi = std::io::stdout().is_terminal();
    let registry = tracing_subscriber::registry().with(filter);
    if std::env::var("LOG_FORMAT").map_or(false, |format| format.eq_ignore_ascii_case("json")) {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_ansi(false))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_ansi(ansi))
            .init();
    }
}

fn config_init(program_name: &str, config_file: Option<String>) -> Result<SharedConfig> {
    match config_file {
        None => Err(anyhow!("usage: {program_name} /path/to/config.json")),
        Some(config_file) => {
            let config = Config::try_from_file(&config_file)?;
            tracing::debug!("loaded config from {config_file}");
            Ok(Arc::new(config))
        }
    }
}
