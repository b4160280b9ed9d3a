//! fathom-core - the research pipeline
//!
//! This crate provides:
//! - An OpenAI-compatible provider layer with structured output support
//! - Agents for planning searches, summarizing them, and writing reports
//! - A concurrent search fan-out that aggregates results in completion order
//! - The ResearchManager that drives plan → search → write → deliver

pub mod agent;
pub mod manager;
pub mod planner;
pub mod providers;
pub mod search;
pub mod types;
pub mod writer;

pub use agent::Agent;
pub use manager::{CardSender, ResearchManager};
pub use planner::{AgentPlanner, HOW_MANY_SEARCHES, Planner, planner_instructions};
pub use providers::{LlmProvider, OpenAiProvider};
pub use search::{AgentLookup, Lookup, LookupError, SEARCH_INSTRUCTIONS, perform_searches};
pub use types::{ReportData, SearchItem, SearchPlan, StatusUpdate};
pub use writer::{AgentWriter, WRITER_INSTRUCTIONS, Writer};
