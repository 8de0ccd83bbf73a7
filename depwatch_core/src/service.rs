use std::sync::Arc;
use std::time::Duration;

use depwatch_api::{ChangeEvent, EventReport};
use depwatch_manifests::default_registry;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::analyzer::EventAnalyzer;
use crate::config::AnalyzerConfig;
use crate::differ::CommitDiffer;
use crate::repository::GitCloneSource;
use crate::{Error, Result};

/// High-level façade for running event analyses concurrently.
///
/// At most `max_concurrent` analyses run at once; each one runs on the
/// blocking pool and is cancelled when it exceeds its deadline.
#[derive(Clone)]
pub struct AnalysisService {
    analyzer: Arc<EventAnalyzer>,
    permits: Arc<Semaphore>,
    max_concurrent: usize,
    timeout: Duration,
}

impl AnalysisService {
    /// Create a service around an existing analyzer.
    #[must_use]
    pub fn new(analyzer: EventAnalyzer, max_concurrent: usize, timeout: Duration) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            analyzer: Arc::new(analyzer),
            permits: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
            timeout,
        }
    }

    /// Build the production service: the default manifest registry and
    /// libgit2 clones, limited as configured.
    #[must_use]
    pub fn from_config(config: &AnalyzerConfig) -> Self {
        let source = match &config.workspace_root {
            Some(root) => GitCloneSource::with_workspace_root(root),
            None => GitCloneSource::new(),
        };
        let differ = CommitDiffer::new(Arc::new(default_registry()))
            .with_max_manifest_bytes(config.max_manifest_bytes);
        let analyzer = EventAnalyzer::new(Arc::new(source), differ);
        Self::new(
            analyzer,
            config.max_concurrent_analyses,
            config.analysis_timeout(),
        )
    }

    /// Access the underlying analyzer.
    #[must_use]
    pub fn analyzer(&self) -> Arc<EventAnalyzer> {
        Arc::clone(&self.analyzer)
    }

    /// Number of analyses that could start right now.
    #[must_use]
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// Analyze one event, waiting for a free slot first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TimedOut`] when the deadline passes (the analysis is
    /// cancelled and its workspace released in the background) and
    /// [`Error::Worker`] when the worker panicked or the service was shut
    /// down.
    pub async fn analyze(&self, event: ChangeEvent) -> Result<EventReport> {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|err| Error::Worker {
                message: err.to_string(),
            })?;

        let cancel = CancellationToken::new();
        // Cancels the worker on every early return, including a dropped future.
        let guard = cancel.clone().drop_guard();
        let analyzer = Arc::clone(&self.analyzer);
        let kind = event.kind();
        let repo_url = event.repo_url().to_owned();

        debug!(kind, repo_url = %repo_url, "starting analysis");
        let handle = tokio::task::spawn_blocking(move || {
            let report = analyzer.analyze(&event, &cancel);
            drop(permit);
            report
        });

        match tokio::time::timeout(self.timeout, handle).await {
            Ok(Ok(report)) => Ok(report),
            Ok(Err(join)) => Err(Error::Worker {
                message: join.to_string(),
            }),
            Err(_) => {
                warn!(kind, repo_url = %repo_url, timeout = ?self.timeout, "analysis timed out");
                drop(guard);
                Err(Error::TimedOut {
                    timeout: self.timeout,
                })
            }
        }
    }

    /// Stop admitting new analyses. Pending and future calls fail with
    /// [`Error::Worker`]; running analyses finish normally.
    pub fn close(&self) {
        self.permits.close();
    }
}

impl std::fmt::Debug for AnalysisService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisService")
            .field("max_concurrent", &self.max_concurrent)
            .field("available", &self.permits.available_permits())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
