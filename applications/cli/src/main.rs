/// Airtime - play audio files, directories or a time-window schedule
use airtime_audio_desktop::DesktopBackend;
use airtime_cli::{app, Cli, PlayerConfig};
use anyhow::Context;
use clap::Parser;
use std::future::Future;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "airtime=info,airtime_playback=info,airtime_audio_desktop=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Listen before any audio work
    let shutdown = shutdown_signal().context("Failed to install Ctrl-C handler")?;

    let cli = Cli::parse();

    // Load configuration
    let mut config = PlayerConfig::load(cli.config.as_deref())?;
    config.apply_cli(&cli);
    config.validate()?;

    let plan = app::plan(&cli)?;
    tracing::debug!("Play log: {}", config.log_file.display());

    let fallback = config.fallback();
    app::run(plan, || DesktopBackend::new(fallback), &config, shutdown).await?;

    Ok(())
}

/// Listen for Ctrl-C from now on
///
/// Signals delivered before the returned future is first polled are kept,
/// so an interrupt during startup or a blocking file open is not lost.
fn shutdown_signal() -> std::io::Result<impl Future<Output = ()>> {
    #[cfg(unix)]
    let mut interrupt =
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())?;
    #[cfg(windows)]
    let mut interrupt = tokio::signal::windows::ctrl_c()?;

    Ok(async move {
        if interrupt.recv().await.is_none() {
            tracing::error!("Ctrl-C listener closed");
            std::future::pending::<()>().await;
        }
    })
}
