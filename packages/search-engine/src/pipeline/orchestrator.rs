//! Concurrent fan-out over source adapters.
//!
//! One task per adapter on a fixed-size pool. Each fetch has its own timeout
//! and the whole run has a batch deadline; whatever is still pending at the
//! deadline is aborted and discarded. A failing or slow adapter never takes
//! its siblings down with it.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use crate::sources::{PolitenessPolicy, SourceAdapter};
use crate::types::query::SourceId;
use crate::types::record::FetchedRecord;

/// Adapters fetching at the same time.
pub const WORKER_POOL_SIZE: usize = 4;

/// How one adapter fared in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    Succeeded { count: usize },
    Failed { reason: String },
    TimedOut,
    /// Still pending when the batch deadline passed.
    Abandoned,
}

impl SourceOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SourceOutcome::Succeeded { .. })
    }
}

/// Records and per-source outcomes of one run.
///
/// Records are grouped by adapter in selection order, each adapter's records
/// in the order it returned them.
#[derive(Debug, Clone, Default)]
pub struct OrchestratorRun {
    pub records: Vec<FetchedRecord>,
    pub outcomes: Vec<(SourceId, SourceOutcome)>,
}

impl OrchestratorRun {
    /// True when adapters ran and none of them succeeded.
    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && !self.outcomes.iter().any(|(_, o)| o.is_success())
    }

    /// Human-readable summary of the failures, for the response envelope.
    pub fn failure_summary(&self) -> String {
        self.outcomes
            .iter()
            .filter(|(_, o)| !o.is_success())
            .map(|(id, outcome)| match outcome {
                SourceOutcome::Failed { reason } => format!("{}: {}", id, reason),
                SourceOutcome::TimedOut => format!("{}: timed out", id),
                SourceOutcome::Abandoned => format!("{}: abandoned at batch deadline", id),
                SourceOutcome::Succeeded { .. } => String::new(),
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Runs adapters concurrently with politeness between same-site requests.
pub struct Orchestrator {
    politeness: Arc<dyn PolitenessPolicy>,
    pool_size: usize,
}

impl Orchestrator {
    pub fn new(politeness: Arc<dyn PolitenessPolicy>) -> Self {
        Self {
            politeness,
            pool_size: WORKER_POOL_SIZE,
        }
    }

    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size.max(1);
        self
    }

    /// Fetch from every adapter.
    #[instrument(skip_all, fields(sources = adapters.len(), keywords = %keywords))]
    pub async fn run_all(
        &self,
        keywords: &str,
        location: &str,
        adapters: &[Arc<dyn SourceAdapter>],
        per_source_timeout: Duration,
        batch_timeout: Duration,
    ) -> OrchestratorRun {
        let deadline = tokio::time::Instant::now() + batch_timeout;
        let semaphore = Arc::new(Semaphore::new(self.pool_size));
        let keywords: Arc<str> = Arc::from(keywords);
        let location: Arc<str> = Arc::from(location);

        let mut outcomes: Vec<(SourceId, SourceOutcome)> =
            adapters.iter().map(|a| (a.id(), SourceOutcome::Abandoned)).collect();
        let mut collected: Vec<Vec<FetchedRecord>> = vec![Vec::new(); adapters.len()];

        let mut set = JoinSet::new();
        for (index, adapter) in adapters.iter().cloned().enumerate() {
            let semaphore = semaphore.clone();
            let politeness = self.politeness.clone();
            let keywords = keywords.clone();
            let location = location.clone();

            set.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        return (index, SourceOutcome::Failed { reason: e.to_string() }, Vec::new());
                    }
                };

                let id = adapter.id();
                let fetch = async {
                    politeness.wait_turn(adapter.site()).await;
                    debug!(source = %id, "Fetching");
                    adapter.fetch(&keywords, &location).await
                };

                // The time budget covers the politeness wait as well
                match tokio::time::timeout(per_source_timeout, fetch).await {
                    Ok(Ok(records)) => {
                        let records: Vec<FetchedRecord> = records.into_iter().map(FetchedRecord::new).collect();
                        (index, SourceOutcome::Succeeded { count: records.len() }, records)
                    }
                    Ok(Err(e)) => {
                        warn!(source = %id, error = %e, "Source fetch failed");
                        (index, SourceOutcome::Failed { reason: e.to_string() }, Vec::new())
                    }
                    Err(_) => {
                        warn!(source = %id, timeout_secs = per_source_timeout.as_secs_f64(), "Source fetch timed out");
                        (index, SourceOutcome::TimedOut, Vec::new())
                    }
                }
            });
        }

        loop {
            match tokio::time::timeout_at(deadline, set.join_next()).await {
                Ok(Some(Ok((index, outcome, records)))) => {
                    outcomes[index].1 = outcome;
                    collected[index] = records;
                }
                Ok(Some(Err(e))) => {
                    warn!(error = %e, "Source task did not complete");
                }
                Ok(None) => break,
                Err(_) => {
                    warn!(pending = set.len(), "Batch deadline reached, abandoning pending sources");
                    set.abort_all();
                    break;
                }
            }
        }

        let records: Vec<FetchedRecord> = collected.into_iter().flatten().collect();
        let succeeded = outcomes.iter().filter(|(_, o)| o.is_success()).count();
        info!(
            records = records.len(),
            succeeded,
            failed = outcomes.len() - succeeded,
            "Orchestrator run complete"
        );

        OrchestratorRun { records, outcomes }
    }
}
