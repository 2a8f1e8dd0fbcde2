//! Demo interruption handling.

use tokio_util::sync::CancellationToken;

/// Returns a token that is cancelled on Ctrl-C (and SIGTERM on unix).
///
/// The demo script polls this between steps; an interrupted run skips its
/// remaining steps and still writes a report from whatever state the
/// dispatcher reached.
pub fn interrupt_token() -> CancellationToken {
    let token = CancellationToken::new();
    let handle = token.clone();

    tokio::spawn(async move {
        if wait_for_signal().await.is_ok() {
            tracing::info!("Interrupt received, cutting the demo short");
            handle.cancel();
        }
    });

    token
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = sigterm.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
