//! Shared types for the research pipeline

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::providers::ResponseSchema;

/// One independent unit of search work produced by the planner
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchItem {
    /// The search term to use for the web search
    pub query: String,
    /// Why this search matters for the topic
    pub reason: String,
}

/// The full batch of searches planned for a topic
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SearchPlan {
    pub searches: Vec<SearchItem>,
}

impl SearchPlan {
    /// Structured-output schema the planner agent must conform to
    pub fn response_schema() -> ResponseSchema {
        ResponseSchema::new(
            "search_plan",
            json!({
                "type": "object",
                "properties": {
                    "searches": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "query": {
                                    "type": "string",
                                    "description": "The search term to use for the web search."
                                },
                                "reason": {
                                    "type": "string",
                                    "description": "Your reasoning for why this search is important to the query."
                                }
                            },
                            "required": ["query", "reason"],
                            "additionalProperties": false
                        }
                    }
                },
                "required": ["searches"],
                "additionalProperties": false
            }),
        )
    }
}

/// Final research report produced by the writer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportData {
    /// A short 2-3 sentence summary of the findings
    pub short_summary: String,
    /// The full report in markdown
    pub markdown_report: String,
    /// Suggested topics to research further
    pub follow_up_questions: Vec<String>,
}

impl ReportData {
    /// Structured-output schema the writer agent must conform to
    pub fn response_schema() -> ResponseSchema {
        ResponseSchema::new(
            "report_data",
            json!({
                "type": "object",
                "properties": {
                    "short_summary": {
                        "type": "string",
                        "description": "A short 2-3 sentence summary of the findings."
                    },
                    "markdown_report": {
                        "type": "string",
                        "description": "The final report in markdown format."
                    },
                    "follow_up_questions": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Suggested topics to research further."
                    }
                },
                "required": ["short_summary", "markdown_report", "follow_up_questions"],
                "additionalProperties": false
            }),
        )
    }
}

/// Stage-by-stage progress emitted by the research pipeline.
/// Consumers (CLI, logs) only display these; nothing branches on them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    Planning,
    PlanReady { searches: usize },
    Searching,
    SearchProgress { completed: usize, total: usize },
    SearchesComplete { results: usize },
    Writing,
    ReportComplete,
    Delivering,
    Delivered,
}

impl std::fmt::Display for StatusUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Planning => write!(f, "Planning searches..."),
            Self::PlanReady { searches } => {
                write!(f, "Search plan ready ({} queries)", searches)
            }
            Self::Searching => write!(f, "Searching..."),
            Self::SearchProgress { completed, total } => {
                write!(f, "Searching... {}/{} completed", completed, total)
            }
            Self::SearchesComplete { results } => {
                write!(f, "Finished searching ({} summaries)", results)
            }
            Self::Writing => write!(f, "Writing report..."),
            Self::ReportComplete => write!(f, "Report complete"),
            Self::Delivering => write!(f, "Sending Feishu card..."),
            Self::Delivered => write!(f, "Feishu card sent"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_item_roundtrip() {
        let item = SearchItem {
            query: "rust async runtimes".to_string(),
            reason: "core topic".to_string(),
        };
        let json = serde_json::to_string(&item).unwrap();
        let back: SearchItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn test_search_plan_parses_model_output() {
        // Shape the planner agent actually returns under the schema
        let raw = r#"{"searches":[{"query":"a","reason":"r1"},{"query":"b","reason":"r2"}]}"#;
        let plan: SearchPlan = serde_json::from_str(raw).unwrap();
        assert_eq!(plan.searches.len(), 2);
        assert_eq!(plan.searches[0].query, "a");
    }

    #[test]
    fn test_search_plan_schema_requires_both_fields() {
        let schema = SearchPlan::response_schema();
        assert_eq!(schema.name, "search_plan");
        let required = &schema.schema["properties"]["searches"]["items"]["required"];
        assert_eq!(required[0], "query");
        assert_eq!(required[1], "reason");
    }

    #[test]
    fn test_report_data_schema() {
        let schema = ReportData::response_schema();
        assert_eq!(schema.name, "report_data");
        assert_eq!(schema.schema["required"][1], "markdown_report");
    }

    #[test]
    fn test_status_update_display() {
        let status = StatusUpdate::SearchProgress {
            completed: 2,
            total: 5,
        };
        assert_eq!(status.to_string(), "Searching... 2/5 completed");
        assert_eq!(
            StatusUpdate::PlanReady { searches: 5 }.to_string(),
            "Search plan ready (5 queries)"
        );
    }
}
