//! Periodic expiry of temporary overrides.

use focus_types::AppId;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::navigation::NavigationContext;
use crate::store::PolicyStore;

/// Re-restricts apps whose temporary override has lapsed.
pub struct ExpirySweeper {
    store: Arc<PolicyStore>,
    clock: Arc<dyn Clock>,
    navigation: Arc<dyn NavigationContext>,
    period: Duration,
}

impl ExpirySweeper {
    /// Creates a sweeper using the store's configured period.
    pub fn new(
        store: Arc<PolicyStore>,
        clock: Arc<dyn Clock>,
        navigation: Arc<dyn NavigationContext>,
    ) -> Self {
        let period = store.config().sweep_interval();
        Self {
            store,
            clock,
            navigation,
            period,
        }
    }

    /// Overrides the sweep period.
    #[must_use]
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period.max(Duration::from_millis(1));
        self
    }

    /// Sweep period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Runs one sweep: expires every due override and sends the user home if
    /// they are looking at an app that just became restricted.
    pub async fn sweep(&self) -> Vec<AppId> {
        let now = self.clock.now_ms();
        let expired = self.store.expire_due_overrides(now).await;
        for id in &expired {
            if self.navigation.is_showing_detail(id) {
                info!("Override for {} expired while its details were open, returning home", id);
                self.navigation.redirect_home();
            }
        }
        expired
    }

    /// Spawns the recurring sweep on the current tokio runtime.
    ///
    /// The first sweep runs immediately, which also catches overrides that
    /// lapsed while the process was not running.
    pub fn spawn(self) -> SweeperHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let period = self.period;
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        let expired = self.sweep().await;
                        if !expired.is_empty() {
                            debug!("Sweep expired {:?}", expired);
                        }
                    }
                }
            }
            debug!("Expiry sweeper stopped");
        });
        info!("Expiry sweeper started, period {:?}", period);
        SweeperHandle {
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }
}

/// Handle to a running sweeper. Dropping it cancels the task.
pub struct SweeperHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl SweeperHandle {
    /// Returns true while the sweep task is alive.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stops the sweeper and waits for the task to exit. A sweep already in
    /// progress finishes first.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
