//! Search planning capability

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::agent::Agent;
use crate::types::SearchPlan;

/// Default number of searches the planner asks for
pub const HOW_MANY_SEARCHES: usize = 5;

/// Produces a batch of search items from a free-form topic
#[async_trait]
pub trait Planner: Send + Sync {
    async fn plan(&self, topic: &str) -> Result<SearchPlan>;
}

/// Planner instructions, parameterized on the search count
pub fn planner_instructions(how_many: usize) -> String {
    format!(
        "You are a helpful research assistant. Given a query, come up with a set of web searches \
to perform to best answer the query. Output {} terms to query for.",
        how_many
    )
}

/// LLM-backed planner using structured output
pub struct AgentPlanner {
    agent: Agent,
}

impl AgentPlanner {
    pub fn new(agent: Agent) -> Self {
        Self { agent }
    }
}

#[async_trait]
impl Planner for AgentPlanner {
    async fn plan(&self, topic: &str) -> Result<SearchPlan> {
        let input = format!("Query: {}", topic);
        let plan: SearchPlan = self
            .agent
            .run_structured(&input, &SearchPlan::response_schema())
            .await?;
        info!("Will perform {} searches", plan.searches.len());
        Ok(plan)
    }
}
