//! Feishu Open API client
//!
//! Tenant-token auth plus text and interactive-card messages to a single
//! recipient, addressed by open_id.

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

const FEISHU_BASE_URL: &str = "https://open.feishu.cn";

/// Feishu client bound to one app and one recipient
pub struct FeishuClient {
    client: reqwest::Client,
    base_url: String,
    app_id: String,
    app_secret: String,
    open_id: String,
}

impl std::fmt::Debug for FeishuClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeishuClient")
            .field("app_id", &self.app_id)
            .field("open_id", &self.open_id)
            .finish()
    }
}

/// Standard Feishu response envelope: code 0 means success
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    tenant_access_token: Option<String>,
}

impl Envelope {
    fn into_result(self) -> Result<Self> {
        if self.code != 0 {
            return Err(anyhow!("Feishu API error {}: {}", self.code, self.msg));
        }
        Ok(self)
    }
}

impl FeishuClient {
    pub fn new(app_id: String, app_secret: String, open_id: String) -> Result<Self> {
        if app_id.is_empty() || app_secret.is_empty() || open_id.is_empty() {
            return Err(anyhow!(
                "Feishu app_id, app_secret and open_id must all be configured"
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client for Feishu")?;

        Ok(Self {
            client,
            base_url: FEISHU_BASE_URL.to_string(),
            app_id,
            app_secret,
            open_id,
        })
    }

    /// Exchange app credentials for a tenant_access_token.
    /// Every message API call needs this token.
    pub async fn tenant_access_token(&self) -> Result<String> {
        let url = format!(
            "{}/open-apis/auth/v3/tenant_access_token/internal",
            self.base_url
        );
        let body = serde_json::json!({
            "app_id": self.app_id,
            "app_secret": self.app_secret,
        });

        debug!("Requesting Feishu tenant_access_token");
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("Failed to reach Feishu auth endpoint")?;

        let envelope: Envelope = response
            .json()
            .await
            .context("Failed to parse Feishu auth response")?;
        let envelope = envelope.into_result()?;

        envelope
            .tenant_access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| anyhow!("Feishu auth response had no tenant_access_token"))
    }

    /// Send a message of the given msg_type. `content` is the already-built
    /// inner content object, serialized to a string per the Feishu contract.
    async fn send_message(&self, token: &str, msg_type: &str, content: &Value) -> Result<()> {
        let url = format!("{}/open-apis/im/v1/messages", self.base_url);
        let payload = serde_json::json!({
            "receive_id": self.open_id,
            "msg_type": msg_type,
            "content": serde_json::to_string(content)?,
        });

        let response = self
            .client
            .post(&url)
            .query(&[("receive_id_type", "open_id")])
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await
            .context("Failed to reach Feishu message endpoint")?;

        let envelope: Envelope = response
            .json()
            .await
            .context("Failed to parse Feishu message response")?;
        envelope.into_result()?;

        info!("Feishu {} message sent", msg_type);
        Ok(())
    }

    /// Send a plain text message
    pub async fn send_text(&self, token: &str, text: &str) -> Result<()> {
        self.send_message(token, "text", &serde_json::json!({ "text": text }))
            .await
    }

    /// Send an interactive card (card 2.0 JSON)
    pub async fn send_card(&self, token: &str, card: &Value) -> Result<()> {
        self.send_message(token, "interactive", card).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_missing_credentials() {
        assert!(FeishuClient::new(String::new(), "s".into(), "o".into()).is_err());
        assert!(FeishuClient::new("a".into(), String::new(), "o".into()).is_err());
        assert!(FeishuClient::new("a".into(), "s".into(), String::new()).is_err());
        assert!(FeishuClient::new("a".into(), "s".into(), "o".into()).is_ok());
    }

    #[test]
    fn test_envelope_success() {
        let envelope: Envelope = serde_json::from_str(
            r#"{"code": 0, "msg": "ok", "tenant_access_token": "t-xyz", "expire": 7200}"#,
        )
        .unwrap();
        let envelope = envelope.into_result().unwrap();
        assert_eq!(envelope.tenant_access_token.as_deref(), Some("t-xyz"));
    }

    #[test]
    fn test_envelope_error_code() {
        let envelope: Envelope =
            serde_json::from_str(r#"{"code": 99991663, "msg": "app not found"}"#).unwrap();
        let err = envelope.into_result().unwrap_err();
        assert!(err.to_string().contains("app not found"));
    }

    #[test]
    fn test_envelope_missing_fields_default() {
        // Message-send responses carry no token field
        let envelope: Envelope = serde_json::from_str(r#"{"code": 0, "msg": "success"}"#).unwrap();
        assert!(envelope.into_result().unwrap().tenant_access_token.is_none());
    }

    #[test]
    fn test_debug_hides_app_secret() {
        let client =
            FeishuClient::new("cli_app".into(), "very-secret".into(), "ou_123".into()).unwrap();
        let debug = format!("{:?}", client);
        assert!(!debug.contains("very-secret"));
        assert!(debug.contains("cli_app"));
    }
}
