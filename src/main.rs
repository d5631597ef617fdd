use clap::Parser;
use dhcpwatch::{Args, CaptureConfig, PacketSocket, Sniffer};
use std::error::Error as StdError;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn StdError>> {
    // Records own stdout; diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = CaptureConfig::from(args);

    tracing::info!(interface = %config.interface, "starting_dhcp_sniffer");

    let mut source = PacketSocket::open(&config).map_err(|e| {
        tracing::error!(error = %e, interface = %config.interface, "capture_init_failed");
        e
    })?;

    let mut sniffer = Sniffer::new(std::io::stdout());
    let stats = sniffer.run(&mut source, shutdown_signal()).await;

    tracing::info!(
        interface = source.interface(),
        frames = stats.frames,
        records = stats.records,
        not_dhcp = stats.not_dhcp,
        malformed = stats.malformed,
        read_errors = stats.read_errors,
        write_errors = stats.write_errors,
        "capture_stopped"
    );

    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let ctrl_c = tokio::signal::ctrl_c();
    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = ctrl_c => {}
                _ = term.recv() => {}
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install SIGTERM handler, waiting for Ctrl-C only");
            let _ = ctrl_c.await;
        }
    }
}
