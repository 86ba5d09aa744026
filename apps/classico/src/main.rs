mod config;
mod errors;
mod layout;
mod render;
mod service;

use anyhow::{anyhow, Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::errors::ClassicoError;
use crate::layout::TracingObserver;
use crate::render::{write_catalog, ReportWriter};
use crate::service::{CancelToken, LayoutService};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (flags, env, optional config file)
    let config = Config::load()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.log_level))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Classico tile layout generator v{}", env!("CARGO_PKG_VERSION"));

    let service = LayoutService::new(config.pallet, config.pavement)?;

    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "Failed to create output directory '{}'",
            config.output_dir.display()
        )
    })?;
    write_catalog(service.catalog(), &config.output_dir.join("matrix.html"))?;

    let seed = config.seed.unwrap_or_else(|| rand::rng().random());
    info!("Random seed: {seed}");

    // Signals only flip the token; the run loop notices between layers.
    let cancel = CancelToken::new();
    let listener = tokio::spawn(listen_for_shutdown(cancel.clone()));

    // CPU-bound search — spawn_blocking keeps the signal listener responsive.
    let layout_path = config.output_dir.join("layout.html");
    let report = tokio::task::spawn_blocking(move || {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut writer = ReportWriter::create(&layout_path, "Layout")?;
        let report = service.run(&cancel, &mut rng, &TracingObserver, &mut writer)?;
        writer.finish()?;
        Ok::<_, ClassicoError>(report)
    })
    .await
    .map_err(|e| ClassicoError::Internal(anyhow!("layout task failed: {e}")))??;

    listener.abort();

    if report.cancelled {
        warn!(
            "Stopped after {} layer(s); layout.html holds the completed layers",
            report.layers_completed
        );
    }
    info!(
        "Done: {} layer(s), remainder large {} medium {} small {}",
        report.layers_completed,
        report.final_remainder.large,
        report.final_remainder.medium,
        report.final_remainder.small
    );
    Ok(())
}

/// Waits for SIGINT/SIGTERM/SIGQUIT (Ctrl-C elsewhere) and requests cancellation.
async fn listen_for_shutdown(cancel: CancelToken) {
    match wait_for_signal().await {
        Ok(name) => {
            warn!("Signal received: {name}; stopping after the current layer");
            cancel.cancel();
        }
        Err(e) => warn!("Signal listener unavailable: {e}"),
    }
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut quit = signal(SignalKind::quit())?;
    let name = tokio::select! {
        _ = interrupt.recv() => "SIGINT",
        _ = terminate.recv() => "SIGTERM",
        _ = quit.recv() => "SIGQUIT",
    };
    Ok(name)
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("Ctrl-C")
}
