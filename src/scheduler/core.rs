use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use cron::Schedule;
use tokio::sync::watch;
use tokio::time::{sleep, Duration};
use tracing::{error, info, warn};

use crate::controller::Reconciler;
use crate::error::{Error, Result};
use crate::gateway::Gateway;

/// Parse a cron expression; five-field expressions get a leading seconds field
pub fn parse_schedule(expr: &str) -> Result<Schedule> {
    let expr = expr.trim();
    let normalized = if expr.split_whitespace().count() == 5 {
        format!("0 {expr}")
    } else {
        expr.to_string()
    };

    Schedule::from_str(&normalized)
        .map_err(|e| Error::ConfigError(format!("Invalid cron expression '{expr}': {e}")))
}

/// Runs reconciliation passes on a cron schedule, one at a time
pub struct ReconcileScheduler<G> {
    reconciler: Arc<Reconciler<G>>,
    schedule: Schedule,
}

impl<G: Gateway + 'static> ReconcileScheduler<G> {
    pub fn new(reconciler: Arc<Reconciler<G>>, schedule: Schedule) -> Self {
        Self {
            reconciler,
            schedule,
        }
    }

    /// Loop until `shutdown` flips to true
    ///
    /// Failed passes are logged and the next tick proceeds as usual; the
    /// previously published snapshot stays in place.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!("Starting reconcile scheduler");

        loop {
            let Some(next) = self.schedule.upcoming(Utc).next() else {
                warn!("Cron schedule has no upcoming run, stopping scheduler");
                return;
            };
            let wait = (next - Utc::now()).to_std().unwrap_or(Duration::ZERO);

            tokio::select! {
                _ = sleep(wait) => {
                    if let Err(e) = self.reconciler.reconcile().await {
                        error!(error = %e, "Error in reconciliation pass");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Reconcile scheduler shutting down");
                        return;
                    }
                }
            }
        }
    }
}
