//! Tracking of per-message tasks so shutdown can wait for them.

use std::future::Future;
use tokio::task::JoinSet;
use tracing::{error, info};

/// Message handling tasks that are still running.
#[derive(Default)]
pub struct InFlight {
    tasks: JoinSet<()>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tasks.spawn(task);
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Wait for the next task to finish. Pending forever when none are running.
    pub async fn reap(&mut self) {
        match self.tasks.join_next().await {
            Some(result) => {
                if let Err(e) = result {
                    error!("Message task failed: {}", e);
                }
            }
            None => std::future::pending().await,
        }
    }

    /// Run every remaining task to completion. Returns how many there were.
    pub async fn drain(&mut self) -> usize {
        let pending = self.tasks.len();
        if pending > 0 {
            info!("Waiting for {} in-flight messages", pending);
        }

        while let Some(result) = self.tasks.join_next().await {
            if let Err(e) = result {
                error!("Message task failed: {}", e);
            }
        }

        pending
    }
}
