//! CardSender implementation backed by the Feishu client

use anyhow::Result;
use async_trait::async_trait;
use fathom_core::{CardSender, ReportData};
use tracing::info;

use crate::card::build_research_card;
use crate::client::FeishuClient;

/// Sends finished reports as Feishu interactive cards.
/// A fresh tenant token is fetched per delivery; tokens expire and a
/// research run can outlive one.
#[derive(Debug)]
pub struct FeishuCardSender {
    client: FeishuClient,
    /// Card title; the report topic is not part of ReportData so the
    /// caller provides it up front.
    title: String,
}

impl FeishuCardSender {
    pub fn new(client: FeishuClient, title: impl Into<String>) -> Self {
        Self {
            client,
            title: title.into(),
        }
    }
}

#[async_trait]
impl CardSender for FeishuCardSender {
    async fn send_report(&self, report: &ReportData) -> Result<()> {
        let token = self.client.tenant_access_token().await?;
        let card = build_research_card(&self.title, report);
        self.client.send_card(&token, &card).await?;
        info!("Research card delivered: {}", self.title);
        Ok(())
    }
}
