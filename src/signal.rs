use {super::*, tokio::signal::ctrl_c};

/// Cancels the returned token on the first SIGINT or SIGTERM. Later signals
/// are only logged.
pub(crate) fn setup_signal_handler() -> CancellationToken {
    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();

    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};

            let mut sigterm = match signal(SignalKind::terminate()) {
                Ok(sigterm) => Some(sigterm),
                Err(err) => {
                    warn!("Failed to install SIGTERM handler: {err}");
                    None
                }
            };

            loop {
                let name = tokio::select! {
                    result = ctrl_c() => match result {
                        Ok(()) => "SIGINT",
                        Err(err) => {
                            warn!("Failed to listen for SIGINT: {err}");
                            return;
                        }
                    },
                    Some(()) = async {
                        match sigterm.as_mut() {
                            Some(sigterm) => sigterm.recv().await,
                            None => std::future::pending().await,
                        }
                    } => "SIGTERM",
                };

                if cancel_clone.is_cancelled() {
                    info!("Received {name}, already shutting down");
                } else {
                    info!("Received {name}, shutting down");
                    cancel_clone.cancel();
                }
            }
        }

        #[cfg(not(unix))]
        {
            loop {
                if let Err(err) = ctrl_c().await {
                    warn!("Failed to listen for Ctrl-C: {err}");
                    return;
                }

                info!("Received Ctrl-C, shutting down");
                cancel_clone.cancel();
            }
        }
    });

    cancel
}
