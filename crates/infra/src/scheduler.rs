//! Periodic scheduler host for promotion runs.
//!
//! A single background thread wakes once per tick, asks the lifecycle manager
//! for configs due today, and triggers each one. One config's failure is
//! logged and does not block the rest of the tick.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use tracing::{error, info};

use campusledger_promotion::{LifecycleManager, PromotionRunConfig, PromotionSummary};

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// How often to check for due configs (daily in production).
    pub tick_interval: Duration,
    /// Name for logging and the thread.
    pub name: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(24 * 60 * 60),
            name: "promotion-scheduler".to_string(),
        }
    }
}

impl SchedulerConfig {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }
}

/// Scheduler runtime statistics.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct SchedulerStats {
    pub ticks: u64,
    pub runs_triggered: u64,
    pub runs_failed: u64,
}

/// What one tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub due: usize,
    pub triggered: usize,
    pub failed: usize,
}

/// Handle to control a running scheduler.
#[derive(Debug)]
pub struct SchedulerHandle {
    shutdown: mpsc::Sender<()>,
    join: Option<thread::JoinHandle<()>>,
    stats: Arc<Mutex<SchedulerStats>>,
}

impl SchedulerHandle {
    /// Request graceful shutdown and wait for the thread to stop.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }

    pub fn stats(&self) -> SchedulerStats {
        self.stats.lock().unwrap().clone()
    }
}

/// The recurring time-based trigger for promotion runs.
pub struct PromotionScheduler {
    manager: Arc<LifecycleManager>,
}

impl PromotionScheduler {
    pub fn new(manager: Arc<LifecycleManager>) -> Self {
        Self { manager }
    }

    /// Process every config due on `date`. Synchronous; the background loop
    /// calls this once per tick, tests call it directly.
    pub fn run_tick(&self, date: NaiveDate) -> TickOutcome {
        let due = match self.manager.due_on(date) {
            Ok(due) => due,
            Err(e) => {
                error!(error = %e, "could not list due promotion configs");
                return TickOutcome::default();
            }
        };

        let mut outcome = TickOutcome {
            due: due.len(),
            ..TickOutcome::default()
        };

        for config in due {
            match self.trigger_one(&config) {
                Ok(summary) => {
                    outcome.triggered += 1;
                    info!(
                        tenant_id = %config.tenant_id,
                        config_id = %config.id,
                        promoted = summary.promoted_count,
                        completed = summary.completed_count,
                        errors = summary.error_count,
                        "scheduled promotion run finished"
                    );
                }
                Err(e) => {
                    outcome.failed += 1;
                    error!(
                        tenant_id = %config.tenant_id,
                        config_id = %config.id,
                        error = %format!("{e:#}"),
                        "scheduled promotion run failed"
                    );
                }
            }
        }

        outcome
    }

    fn trigger_one(&self, config: &PromotionRunConfig) -> anyhow::Result<PromotionSummary> {
        self.manager
            .trigger(config.tenant_id, config.id)
            .with_context(|| {
                format!(
                    "triggering promotion run {} for cycle {}",
                    config.id, config.target_cycle
                )
            })
    }

    /// Spawn the scheduler in a background thread.
    pub fn spawn(self, config: SchedulerConfig) -> SchedulerHandle {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let stats = Arc::new(Mutex::new(SchedulerStats::default()));
        let stats_clone = stats.clone();

        let name = config.name.clone();
        let join = thread::Builder::new()
            .name(name)
            .spawn(move || {
                scheduler_loop(self, config, shutdown_rx, stats_clone);
            })
            .expect("failed to spawn promotion scheduler thread");

        SchedulerHandle {
            shutdown: shutdown_tx,
            join: Some(join),
            stats,
        }
    }
}

fn scheduler_loop(
    scheduler: PromotionScheduler,
    config: SchedulerConfig,
    shutdown_rx: mpsc::Receiver<()>,
    stats: Arc<Mutex<SchedulerStats>>,
) {
    info!(scheduler = %config.name, "promotion scheduler started");

    loop {
        match shutdown_rx.recv_timeout(config.tick_interval) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                let today = Utc::now().date_naive();
                let outcome = scheduler.run_tick(today);

                let mut s = stats.lock().unwrap();
                s.ticks += 1;
                s.runs_triggered += outcome.triggered as u64;
                s.runs_failed += outcome.failed as u64;
            }
        }
    }

    info!(scheduler = %config.name, "promotion scheduler stopped");
}
