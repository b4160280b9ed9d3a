//! Concurrent search fan-out
//!
//! Dispatches every planned search at once, collects summaries in completion
//! order, and drops failed items without failing the batch. Each resolved
//! item emits exactly one [`StatusUpdate::SearchProgress`], success or not.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::agent::Agent;
use crate::types::{SearchItem, SearchPlan, StatusUpdate};

/// Error from the external lookup capability. Deliberately opaque: the
/// aggregator treats every failure the same way.
#[derive(Debug, Error)]
#[error("lookup failed: {0}")]
pub struct LookupError(#[from] anyhow::Error);

/// The external lookup capability: perform one search and summarize it
#[async_trait]
pub trait Lookup: Send + Sync {
    async fn lookup(&self, item: &SearchItem) -> Result<String, LookupError>;
}

/// Instructions for the search agent, carried over from the tutorial pipeline
pub const SEARCH_INSTRUCTIONS: &str = "You are a research assistant. Given a search term, you search the web for that term and \
produce a concise summary of the results. The summary must 2-3 paragraphs and less than 300 \
words. Capture the main points. Write succintly, no need to have complete sentences or good \
grammar. This will be consumed by someone synthesizing a report, so its vital you capture the \
essence and ignore any fluff. Do not include any additional commentary other than the summary itself.";

/// LLM-backed lookup: one agent run per search item
pub struct AgentLookup {
    agent: Agent,
}

impl AgentLookup {
    pub fn new(agent: Agent) -> Self {
        Self { agent }
    }
}

#[async_trait]
impl Lookup for AgentLookup {
    async fn lookup(&self, item: &SearchItem) -> Result<String, LookupError> {
        let input = format!(
            "Search term: {}\nReason for searching: {}",
            item.query, item.reason
        );
        self.agent.run(&input).await.map_err(LookupError::from)
    }
}

/// Run every search in `plan` concurrently and return the summaries that
/// succeeded, in completion order.
///
/// Guarantees:
/// - one progress notification per item, regardless of outcome
/// - a failed item never affects its siblings and never fails the batch
/// - the returned vec has between 0 and N entries
pub async fn perform_searches(
    lookup: Arc<dyn Lookup>,
    plan: &SearchPlan,
    status_tx: &mpsc::Sender<StatusUpdate>,
) -> Vec<String> {
    let total = plan.searches.len();
    if total == 0 {
        return Vec::new();
    }

    let mut join_set = JoinSet::new();
    for item in plan.searches.iter().cloned() {
        let lookup = lookup.clone();
        join_set.spawn(async move {
            let result = lookup.lookup(&item).await;
            (item, result)
        });
    }

    let mut results = Vec::new();
    let mut completed = 0usize;

    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((_, Ok(summary))) => results.push(summary),
            Ok((item, Err(e))) => {
                // Best-effort policy: the item is lost for this run
                warn!("Dropping failed search '{}': {}", item.query, e);
            }
            Err(e) => {
                warn!("Search task panicked: {}", e);
            }
        }

        completed += 1;
        let update = StatusUpdate::SearchProgress { completed, total };
        if status_tx.send(update).await.is_err() {
            debug!("Status receiver gone, continuing without progress updates");
        }
    }

    info!(
        "Finished searching: {}/{} items produced summaries",
        results.len(),
        total
    );
    results
}
