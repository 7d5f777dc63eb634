use anyhow::Result;
use tokio::sync::broadcast;
use tracing::info;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

/// Setup signal handlers for the server
///
/// Returns a broadcast sender for shutdown signals and a join handle for the
/// signal task. SIGTERM and SIGINT both trigger a graceful shutdown.
#[cfg(unix)]
pub fn setup_signal_handlers() -> Result<(
    broadcast::Sender<()>,
    tokio::task::JoinHandle<()>,
)> {
    let (shutdown_tx, _) = broadcast::channel(16);
    let tx_clone = shutdown_tx.clone();

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    let handle = tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => {
                info!("SIGTERM received, initiating graceful shutdown");
            }
            _ = sigint.recv() => {
                info!("SIGINT received, initiating graceful shutdown");
            }
        }
        let _ = tx_clone.send(());
    });

    Ok((shutdown_tx, handle))
}

/// Non-unix platforms only get Ctrl-C
#[cfg(not(unix))]
pub fn setup_signal_handlers() -> Result<(
    broadcast::Sender<()>,
    tokio::task::JoinHandle<()>,
)> {
    let (shutdown_tx, _) = broadcast::channel(16);
    let tx_clone = shutdown_tx.clone();

    let handle = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, initiating graceful shutdown");
        }
        let _ = tx_clone.send(());
    });

    Ok((shutdown_tx, handle))
}
