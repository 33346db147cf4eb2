//! Refresh pipeline and orchestration
//!
//! One pipeline run moves through the stages in fixed order:
//!
//! Idle → Extracting → Joining → Projecting → Cleaning → LoggingFreshness → Idle
//!
//! Any stage can fail the run; a failed run leaves the freshness log
//! untouched, so the next conditional request sees the old stamp and tries
//! again. The stages are intentionally sequential: each reads the artifacts
//! the previous one persisted.
//!
//! At most one run is in flight at a time. Refresh requests arriving mid-run
//! queue on the run lock; conditional requests re-check staleness after
//! acquiring it, so a burst of stale requests collapses into one execution.

pub mod clean;
pub mod extract;
pub mod freshness;
pub mod join;
pub mod project;

use std::sync::Arc;
use std::time::Duration;

use agrec_common::Result;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::artifacts::ArtifactStore;
use crate::store::SourceStore;
use freshness::FreshnessLog;

/// Stage a pipeline run is in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Extracting,
    Joining,
    Projecting,
    Cleaning,
    LoggingFreshness,
    Failed,
}

/// Orchestrates full refresh runs over the shared artifacts
pub struct RefreshPipeline {
    store: Arc<dyn SourceStore>,
    artifacts: ArtifactStore,
    log: FreshnessLog,
    run_lock: Mutex<()>,
}

impl RefreshPipeline {
    pub fn new(store: Arc<dyn SourceStore>, artifacts: ArtifactStore) -> Self {
        let log = FreshnessLog::new(artifacts.refresh_log_path());
        Self {
            store,
            artifacts,
            log,
            run_lock: Mutex::new(()),
        }
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    pub fn freshness(&self) -> &FreshnessLog {
        &self.log
    }

    /// Run the full pipeline unconditionally. A request arriving while
    /// another run is in flight queues behind it.
    pub async fn run(&self) -> Result<()> {
        let _guard = self.run_lock.lock().await;
        self.run_locked().await
    }

    /// Staleness-gated run. Returns true if a refresh actually ran.
    ///
    /// Staleness is re-checked after the run lock is acquired: a caller that
    /// queued behind an in-flight refresh finds the log fresh and collapses
    /// into that run instead of starting its own.
    pub async fn run_if_stale(&self, threshold: Duration) -> Result<bool> {
        if !self.log.is_stale(threshold) {
            return Ok(false);
        }
        let _guard = self.run_lock.lock().await;
        if !self.log.is_stale(threshold) {
            return Ok(false);
        }
        self.run_locked().await?;
        Ok(true)
    }

    async fn run_locked(&self) -> Result<()> {
        let started = std::time::Instant::now();
        match self.run_stages().await {
            Ok(()) => {
                info!(
                    "Refresh pipeline completed in {} ms",
                    started.elapsed().as_millis()
                );
                Ok(())
            }
            Err(e) => {
                // Freshness log deliberately not updated: the old stamp keeps
                // the next conditional request eligible to retry
                self.transition(RunState::Failed);
                error!("Refresh pipeline failed: {e}");
                Err(e)
            }
        }
    }

    async fn run_stages(&self) -> Result<()> {
        self.transition(RunState::Extracting);
        extract::extract(self.store.as_ref(), &self.artifacts).await?;

        self.transition(RunState::Joining);
        join::aggregate(&self.artifacts)?;

        self.transition(RunState::Projecting);
        project::process(&self.artifacts)?;

        self.transition(RunState::Cleaning);
        clean::pre_process(&self.artifacts)?;

        self.transition(RunState::LoggingFreshness);
        self.log.record_refresh()?;

        self.transition(RunState::Idle);
        Ok(())
    }

    fn transition(&self, state: RunState) {
        info!("Pipeline state: {state:?}");
    }
}
