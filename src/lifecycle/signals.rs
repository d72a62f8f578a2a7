//! OS signal handling.
//!
//! The CLI keeps the stack up until SIGINT or SIGTERM arrives, then runs the
//! shutdown handle returned by the orchestrator.

/// Wait for SIGINT (Ctrl-C) or, on unix, SIGTERM.
pub async fn wait_for_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                res?;
                tracing::info!("SIGINT received");
            }
            _ = terminate.recv() => {
                tracing::info!("SIGTERM received");
            }
        }
        Ok(())
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        tracing::info!("Ctrl-C received");
        Ok(())
    }
}
