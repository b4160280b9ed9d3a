//! Report writing capability

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use crate::agent::Agent;
use crate::types::ReportData;

/// Turns a topic plus search summaries into a final report
#[async_trait]
pub trait Writer: Send + Sync {
    async fn write(&self, topic: &str, summaries: &[String]) -> Result<ReportData>;
}

/// Instructions for the writer agent
pub const WRITER_INSTRUCTIONS: &str = "You are a senior researcher tasked with writing a cohesive report for a research query. \
You will be provided with the original query, and some initial research done by a research assistant.\n\
You should first come up with an outline for the report that describes the structure and \
flow of the report. Then, generate the report and return that as your final output.\n\
The final output should be in markdown format, and it should be lengthy and detailed. Aim \
for 5-10 pages of content, at least 1000 words.";

/// LLM-backed writer using structured output
pub struct AgentWriter {
    agent: Agent,
}

impl AgentWriter {
    pub fn new(agent: Agent) -> Self {
        Self { agent }
    }
}

#[async_trait]
impl Writer for AgentWriter {
    async fn write(&self, topic: &str, summaries: &[String]) -> Result<ReportData> {
        debug!("Thinking about report ({} summaries)", summaries.len());
        let input = format!(
            "Original query: {}\nSummarized search results: {:?}",
            topic, summaries
        );
        self.agent
            .run_structured(&input, &ReportData::response_schema())
            .await
    }
}
