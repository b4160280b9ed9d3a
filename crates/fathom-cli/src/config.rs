use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// Env vars that may be referenced from the config file as `${VAR}`
const ALLOWED_ENV_VARS: &[&str] = &["OPENAI_API_KEY", "APP_ID", "APP_SECRET", "OPEN_ID"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FathomConfig {
    pub provider: ProviderConfig,
    #[serde(default)]
    pub feishu: FeishuConfig,
    #[serde(default)]
    pub research: ResearchConfig,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &mask_secret(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

fn default_base_url() -> String {
    // The tutorial pipeline relays through this proxy; any
    // OpenAI-compatible endpoint works
    "https://api.openai-proxy.org/v1".to_string()
}
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_max_tokens() -> u32 {
    4096
}

#[derive(Clone, Serialize, Deserialize, Default)]
pub struct FeishuConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub app_id: String,
    #[serde(default)]
    pub app_secret: String,
    #[serde(default)]
    pub open_id: String,
}

impl std::fmt::Debug for FeishuConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeishuConfig")
            .field("enabled", &self.enabled)
            .field("app_id", &self.app_id)
            .field("app_secret", &mask_secret(&self.app_secret))
            .field("open_id", &self.open_id)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    #[serde(default = "default_how_many_searches")]
    pub how_many_searches: usize,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            how_many_searches: default_how_many_searches(),
        }
    }
}

fn default_how_many_searches() -> usize {
    fathom_core::HOW_MANY_SEARCHES
}

pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".fathom")
}

impl FathomConfig {
    pub fn load(custom_path: &Option<PathBuf>) -> Result<Self> {
        let path = custom_path
            .clone()
            .unwrap_or_else(|| config_dir().join("config.toml"));

        // Refuse configs other users can read; they carry secrets
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Ok(metadata) = std::fs::metadata(&path) {
                let mode = metadata.permissions().mode();
                if mode & 0o077 != 0 {
                    return Err(anyhow::anyhow!(
                        "Config file {:?} has overly permissive permissions ({:o}). \
                         It may contain secrets. Fix with: chmod 600 {:?}",
                        path,
                        mode & 0o777,
                        path
                    ));
                }
            }
        }

        let content = std::fs::read_to_string(&path).with_context(|| {
            format!(
                "Failed to read config at {}. Run `fathom init` first.",
                path.display()
            )
        })?;

        let expanded = expand_env_vars(&content);

        let config: Self = toml::from_str(&expanded)
            .with_context(|| format!("Failed to parse config at {}", path.display()))?;

        if config.provider.api_key.starts_with("sk-") {
            warn!(
                "API key is hardcoded in config file. For security, use environment variables: api_key = \"${{OPENAI_API_KEY}}\""
            );
        }

        if config.feishu.enabled
            && !config.feishu.app_secret.is_empty()
            && !config.feishu.app_secret.contains("${")
        {
            warn!(
                "Feishu app secret is hardcoded in config file. For security, use environment variables: app_secret = \"${{APP_SECRET}}\""
            );
        }

        Ok(config)
    }
}

fn expand_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    let mut pos = 0;
    while pos < result.len() {
        if let Some(start) = result[pos..].find("${") {
            let abs_start = pos + start;
            if let Some(end) = result[abs_start..].find('}') {
                let var_name = result[abs_start + 2..abs_start + end].to_string();

                let value = if ALLOWED_ENV_VARS.contains(&var_name.as_str()) {
                    std::env::var(&var_name).unwrap_or_default()
                } else {
                    warn!(
                        "Skipping expansion of unrecognized env var '{}' in config (not in allowlist)",
                        var_name
                    );
                    // Leave the ${VAR} unexpanded so it's obvious
                    pos = abs_start + end + 1;
                    continue;
                };

                let value_len = value.len();
                result = format!(
                    "{}{}{}",
                    &result[..abs_start],
                    value,
                    &result[abs_start + end + 1..]
                );
                pos = abs_start + value_len;
            } else {
                break;
            }
        } else {
            break;
        }
    }
    result
}

fn mask_secret(s: &str) -> String {
    if s.is_empty() {
        return "(empty)".to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() > 7 {
        let prefix: String = chars[..3].iter().collect();
        let suffix: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", prefix, suffix)
    } else {
        "***".to_string()
    }
}
