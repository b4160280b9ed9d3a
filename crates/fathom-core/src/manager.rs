//! End-to-end research pipeline
//!
//! plan → concurrent search → write → deliver, with stage-by-stage status
//! updates over an mpsc channel.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::planner::Planner;
use crate::search::{Lookup, perform_searches};
use crate::types::{ReportData, StatusUpdate};
use crate::writer::Writer;

/// Delivers a finished report to its destination (e.g. a Feishu card)
#[async_trait]
pub trait CardSender: Send + Sync {
    async fn send_report(&self, report: &ReportData) -> Result<()>;
}

/// Drives the full research pipeline
pub struct ResearchManager {
    planner: Arc<dyn Planner>,
    lookup: Arc<dyn Lookup>,
    writer: Arc<dyn Writer>,
    sender: Option<Arc<dyn CardSender>>,
}

impl ResearchManager {
    pub fn new(
        planner: Arc<dyn Planner>,
        lookup: Arc<dyn Lookup>,
        writer: Arc<dyn Writer>,
        sender: Option<Arc<dyn CardSender>>,
    ) -> Self {
        Self {
            planner,
            lookup,
            writer,
            sender,
        }
    }

    /// Run the pipeline for one topic. Status updates flow through
    /// `status_tx` as stages start and finish; the final report is returned.
    ///
    /// Per-item search failures are absorbed by the search stage. Any other
    /// stage failure (planning, writing, delivery) aborts the run.
    pub async fn run(
        &self,
        topic: &str,
        status_tx: mpsc::Sender<StatusUpdate>,
    ) -> Result<ReportData> {
        info!("Starting research for topic: {}", topic);

        Self::emit(&status_tx, StatusUpdate::Planning).await;
        let plan = self
            .planner
            .plan(topic)
            .await
            .context("Search planning failed")?;
        Self::emit(
            &status_tx,
            StatusUpdate::PlanReady {
                searches: plan.searches.len(),
            },
        )
        .await;

        Self::emit(&status_tx, StatusUpdate::Searching).await;
        let summaries = perform_searches(self.lookup.clone(), &plan, &status_tx).await;
        Self::emit(
            &status_tx,
            StatusUpdate::SearchesComplete {
                results: summaries.len(),
            },
        )
        .await;

        Self::emit(&status_tx, StatusUpdate::Writing).await;
        let report = self
            .writer
            .write(topic, &summaries)
            .await
            .context("Report writing failed")?;
        Self::emit(&status_tx, StatusUpdate::ReportComplete).await;

        if let Some(sender) = &self.sender {
            Self::emit(&status_tx, StatusUpdate::Delivering).await;
            sender
                .send_report(&report)
                .await
                .context("Report delivery failed")?;
            Self::emit(&status_tx, StatusUpdate::Delivered).await;
        }

        Ok(report)
    }

    /// Status updates are observability only; a gone receiver never
    /// affects the pipeline.
    async fn emit(status_tx: &mpsc::Sender<StatusUpdate>, update: StatusUpdate) {
        if status_tx.send(update).await.is_err() {
            debug!("Status receiver gone, update dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::LookupError;
    use crate::types::{SearchItem, SearchPlan};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct FixedPlanner {
        queries: Vec<&'static str>,
    }

    #[async_trait]
    impl Planner for FixedPlanner {
        async fn plan(&self, _topic: &str) -> Result<SearchPlan> {
            Ok(SearchPlan {
                searches: self
                    .queries
                    .iter()
                    .map(|q| SearchItem {
                        query: q.to_string(),
                        reason: "test".to_string(),
                    })
                    .collect(),
            })
        }
    }

    struct EchoLookup {
        fail_on: Option<&'static str>,
    }

    #[async_trait]
    impl Lookup for EchoLookup {
        async fn lookup(&self, item: &SearchItem) -> Result<String, LookupError> {
            if self.fail_on == Some(item.query.as_str()) {
                return Err(LookupError::from(anyhow::anyhow!("no answer")));
            }
            Ok(format!("summary of {}", item.query))
        }
    }

    struct CountingWriter {
        summaries_seen: AtomicUsize,
    }

    #[async_trait]
    impl Writer for CountingWriter {
        async fn write(&self, topic: &str, summaries: &[String]) -> Result<ReportData> {
            self.summaries_seen.store(summaries.len(), Ordering::SeqCst);
            Ok(ReportData {
                short_summary: format!("about {}", topic),
                markdown_report: "# Report".to_string(),
                follow_up_questions: vec![],
            })
        }
    }

    struct RecordingSender {
        sent: AtomicBool,
        fail: bool,
    }

    #[async_trait]
    impl CardSender for RecordingSender {
        async fn send_report(&self, _report: &ReportData) -> Result<()> {
            if self.fail {
                return Err(anyhow::anyhow!("card rejected"));
            }
            self.sent.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    fn manager(
        queries: Vec<&'static str>,
        fail_on: Option<&'static str>,
        sender: Option<Arc<dyn CardSender>>,
    ) -> (ResearchManager, Arc<CountingWriter>) {
        let writer = Arc::new(CountingWriter {
            summaries_seen: AtomicUsize::new(0),
        });
        let manager = ResearchManager::new(
            Arc::new(FixedPlanner { queries }),
            Arc::new(EchoLookup { fail_on }),
            writer.clone(),
            sender,
        );
        (manager, writer)
    }

    #[tokio::test]
    async fn test_full_pipeline_without_delivery() {
        let (manager, writer) = manager(vec!["A", "B"], None, None);
        let (tx, mut rx) = mpsc::channel(64);

        let report = manager.run("rust", tx).await.unwrap();

        assert_eq!(report.short_summary, "about rust");
        assert_eq!(writer.summaries_seen.load(Ordering::SeqCst), 2);

        let mut updates = Vec::new();
        while let Ok(u) = rx.try_recv() {
            updates.push(u);
        }
        assert_eq!(updates.first(), Some(&StatusUpdate::Planning));
        assert!(updates.contains(&StatusUpdate::PlanReady { searches: 2 }));
        assert!(updates.contains(&StatusUpdate::SearchesComplete { results: 2 }));
        assert_eq!(updates.last(), Some(&StatusUpdate::ReportComplete));
        assert!(!updates.contains(&StatusUpdate::Delivering));
    }

    #[tokio::test]
    async fn test_failed_search_shrinks_summaries_but_pipeline_succeeds() {
        let (manager, writer) = manager(vec!["A", "B", "C"], Some("B"), None);
        let (tx, _rx) = mpsc::channel(64);

        manager.run("rust", tx).await.unwrap();

        assert_eq!(writer.summaries_seen.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_delivery_runs_when_sender_configured() {
        let sender = Arc::new(RecordingSender {
            sent: AtomicBool::new(false),
            fail: false,
        });
        let (manager, _) = manager(vec!["A"], None, Some(sender.clone()));
        let (tx, mut rx) = mpsc::channel(64);

        manager.run("rust", tx).await.unwrap();

        assert!(sender.sent.load(Ordering::SeqCst));
        let mut updates = Vec::new();
        while let Ok(u) = rx.try_recv() {
            updates.push(u);
        }
        assert_eq!(updates.last(), Some(&StatusUpdate::Delivered));
    }

    #[tokio::test]
    async fn test_delivery_failure_aborts_run() {
        let sender = Arc::new(RecordingSender {
            sent: AtomicBool::new(false),
            fail: true,
        });
        let (manager, _) = manager(vec!["A"], None, Some(sender));
        let (tx, _rx) = mpsc::channel(64);

        let result = manager.run("rust", tx).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_empty_plan_still_writes() {
        let (manager, writer) = manager(vec![], None, None);
        let (tx, _rx) = mpsc::channel(64);

        let report = manager.run("rust", tx).await.unwrap();

        assert_eq!(writer.summaries_seen.load(Ordering::SeqCst), 0);
        assert_eq!(report.markdown_report, "# Report");
    }
}
