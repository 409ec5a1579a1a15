use log::{error, info};
use std::sync::Arc;
use tokio::sync::watch;

/// Trigger side of the graceful-shutdown pair. Held by the signal listener
/// and by anything else that may ask the daemon to stop (e.g. the
/// self-update check).
#[derive(Clone)]
pub struct ShutdownController {
    tx: Arc<watch::Sender<bool>>,
}

/// Read side, passed into every loop. Checked at iteration boundaries; an
/// in-flight blocking read or upload is never interrupted.
#[derive(Clone)]
pub struct ShutdownToken {
    rx: watch::Receiver<bool>,
}

pub fn channel() -> (ShutdownController, ShutdownToken) {
    let (tx, rx) = watch::channel(false);
    (ShutdownController { tx: Arc::new(tx) }, ShutdownToken { rx })
}

impl ShutdownController {
    pub fn trigger(&self) {
        // Receivers may already be gone if the daemon finished on its own.
        let _ = self.tx.send(true);
    }
}

impl ShutdownToken {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once shutdown has been triggered.
    pub async fn cancelled(&mut self) {
        while !*self.rx.borrow() {
            if self.rx.changed().await.is_err() {
                // Controller dropped without triggering; treat as shutdown.
                return;
            }
        }
    }
}

/// Listen for SIGINT / SIGTERM and flip the token.
pub fn spawn_signal_listener(controller: ShutdownController) {
    tokio::spawn(async move {
        wait_for_stop_signal().await;
        info!("🛑 Signal received, stopping the program gracefully...");
        controller.trigger();
    });
}

#[cfg(unix)]
async fn wait_for_stop_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                result = tokio::signal::ctrl_c() => {
                    if let Err(e) = result {
                        error!("Failed to listen for interrupt signal: {}", e);
                    }
                }
                _ = term.recv() => {}
            }
        }
        Err(e) => {
            error!("Failed to install SIGTERM handler ({}), listening for interrupt only.", e);
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for interrupt signal: {}", e);
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_stop_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for interrupt signal: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn token_starts_unset_and_observes_trigger() {
        let (controller, token) = channel();
        assert!(!token.is_cancelled());
        controller.trigger();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn cancelled_future_resolves_on_trigger() {
        let (controller, mut token) = channel();
        let waiter = tokio::spawn(async move {
            token.cancelled().await;
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        controller.trigger();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("cancelled() should resolve after trigger")
            .unwrap();
    }

    #[tokio::test]
    async fn dropping_controller_counts_as_shutdown() {
        let (controller, mut token) = channel();
        drop(controller);
        tokio::time::timeout(Duration::from_secs(1), token.cancelled())
            .await
            .expect("cancelled() should resolve once the controller is gone");
    }

    #[tokio::test]
    async fn clones_observe_the_same_trigger() {
        let (controller, token) = channel();
        let second = token.clone();
        controller.trigger();
        assert!(token.is_cancelled());
        assert!(second.is_cancelled());
    }
}
