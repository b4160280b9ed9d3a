//! Research report card builder (Feishu card 2.0 schema)

use chrono::Utc;
use fathom_core::ReportData;
use serde_json::{Value, json};

/// Shown when the writer produced no follow-up questions
const NO_FOLLOW_UPS: &str = "暂无";

/// Normalize model-produced text for card markdown: trim and unify newlines
fn normalize(text: &str) -> String {
    text.trim().replace("\r\n", "\n").replace('\r', "\n")
}

/// Build the interactive card for a finished research report.
///
/// Layout: blue header with the title, then markdown sections for the
/// summary, the full report and the follow-up questions, separated by
/// rules, with a docs button and a generation timestamp at the bottom.
pub fn build_research_card(title: &str, report: &ReportData) -> Value {
    let summary = normalize(&report.short_summary);
    let content = normalize(&report.markdown_report);

    let questions = if report.follow_up_questions.is_empty() {
        NO_FOLLOW_UPS.to_string()
    } else {
        report
            .follow_up_questions
            .iter()
            .map(|q| format!("- {}", q.trim()))
            .collect::<Vec<_>>()
            .join("\n")
    };

    json!({
        "schema": "2.0",
        "config": {
            "width_mode": "fill"
        },
        "header": {
            "template": "blue",
            "title": {
                "content": format!("📊 {}", title),
                "tag": "plain_text"
            }
        },
        "body": {
            "direction": "vertical",
            "padding": "12px 12px 12px 12px",
            "elements": [
                {
                    "tag": "markdown",
                    "content": format!("**📝 摘要**\n{}", summary)
                },
                { "tag": "hr" },
                {
                    "tag": "markdown",
                    "content": format!("**📄 详细内容**\n{}", content)
                },
                { "tag": "hr" },
                {
                    "tag": "markdown",
                    "content": format!("**🤔 后续研究方向**\n{}", questions)
                },
                {
                    "tag": "button",
                    "text": {
                        "content": "📚 查看文档",
                        "tag": "plain_text"
                    },
                    "type": "primary",
                    "behaviors": [
                        { "type": "open_url", "default_url": "https://www.feishu.cn/hc/zh-CN" }
                    ]
                },
                {
                    "tag": "note",
                    "elements": [
                        {
                            "tag": "plain_text",
                            "content": format!("Generated at {}", Utc::now().format("%Y-%m-%d %H:%M UTC"))
                        }
                    ]
                }
            ]
        }
    })
}
