use crate::services::reconcile::Reconciler;
use tokio::sync::watch;
use tokio::time::{Duration, interval};

pub struct BackgroundWorker {
    reconciler: Reconciler,
    period: Duration,
    shutdown: watch::Receiver<bool>,
}

impl BackgroundWorker {
    pub fn new(reconciler: Reconciler, period: Duration, shutdown: watch::Receiver<bool>) -> Self {
        Self {
            reconciler,
            period,
            shutdown,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(
            "🚀 Reconciliation worker started (every {:?})",
            self.period
        );

        let mut ticker = interval(self.period);
        loop {
            tokio::select! {
                _ = self.shutdown.changed() => {
                    tracing::info!("🛑 Reconciliation worker shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    tracing::info!("🧹 Running reconciliation sweep...");
                    if let Err(e) = self.reconciler.sweep().await {
                        tracing::error!("Reconciliation sweep failed: {}", e);
                    }
                }
            }
        }
    }
}
