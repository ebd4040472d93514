//! Graceful shutdown
//!
//! Background tasks watch a shared flag; the database is checkpointed and
//! closed once they have stopped.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

use super::constants::SHUTDOWN_TIMEOUT_SECS;
use crate::data::DuckdbService;

#[derive(Clone)]
pub struct ShutdownService {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
    handles: Arc<Mutex<Vec<JoinHandle<()>>>>,
    database: Arc<DuckdbService>,
}

impl ShutdownService {
    pub fn new(database: Arc<DuckdbService>) -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
            handles: Arc::new(Mutex::new(Vec::new())),
            database,
        }
    }

    /// Track a background task so shutdown can wait for it
    pub async fn register(&self, handle: JoinHandle<()>) {
        self.handles.lock().await.push(handle);
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.rx.clone()
    }

    pub fn trigger(&self) {
        let _ = self.tx.send(true);
    }

    #[cfg(test)]
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Stop background tasks, then flush and close the database
    ///
    /// Tasks get `SHUTDOWN_TIMEOUT_SECS` to finish before the database is
    /// closed underneath them.
    pub async fn shutdown(&self) {
        self.trigger();

        let tasks = std::mem::take(&mut *self.handles.lock().await);
        let pending = tasks.len();
        let limit = Duration::from_secs(SHUTDOWN_TIMEOUT_SECS);
        if tokio::time::timeout(limit, futures::future::join_all(tasks))
            .await
            .is_err()
        {
            tracing::warn!(
                pending,
                timeout_secs = SHUTDOWN_TIMEOUT_SECS,
                "Background tasks did not stop in time"
            );
        } else {
            tracing::debug!(pending, "Background tasks stopped");
        }

        if let Err(e) = self.database.checkpoint().await {
            tracing::warn!(error = %e, "Final checkpoint failed");
        }
        match Arc::clone(&self.database).close().await {
            Ok(()) => tracing::debug!("Database closed"),
            Err(e) => tracing::warn!(error = %e, "Database close failed"),
        }
    }

    /// Future that resolves once shutdown is triggered, for axum's graceful shutdown
    pub fn wait(&self) -> impl std::future::Future<Output = ()> + Send + 'static {
        let mut rx = self.rx.clone();
        async move {
            let _ = rx.wait_for(|&stopping| stopping).await;
        }
    }

    /// Trigger shutdown on Ctrl+C or SIGTERM
    pub fn install_signal_handlers(&self) {
        let service = self.clone();
        tokio::spawn(async move {
            let signal = wait_for_signal().await;
            tracing::debug!(signal, "Signal received, shutting down");
            service.trigger();
        });
    }
}

async fn wait_for_signal() -> &'static str {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => "SIGINT",
        _ = terminate => "SIGTERM",
    }
}
