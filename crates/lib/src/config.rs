//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.relay/config.json`) and environment.
//! Secrets are usually supplied through the environment; the file carries the rest.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Gateway server settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Channel settings (WhatsApp Cloud API).
    #[serde(default)]
    pub channels: ChannelsConfig,

    /// Agent settings (Gemini model and key).
    #[serde(default)]
    pub agents: AgentsConfig,
}

/// Gateway bind and port settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Port for the webhook HTTP server (default 5000).
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bind address (default "0.0.0.0"; the platform must be able to reach the webhook).
    #[serde(default = "default_gateway_bind")]
    pub bind: String,
}

fn default_gateway_port() -> u16 {
    5000
}

fn default_gateway_bind() -> String {
    "0.0.0.0".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            bind: default_gateway_bind(),
        }
    }
}

/// Per-channel config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelsConfig {
    #[serde(default)]
    pub whatsapp: WhatsAppChannelConfig,
}

/// WhatsApp Cloud API channel config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhatsAppChannelConfig {
    /// Token echoed back by the platform during webhook verification. Overridden by META_VERIFY_TOKEN.
    pub verify_token: Option<String>,
    /// Bearer token for the Graph API. Overridden by META_ACCESS_TOKEN.
    pub access_token: Option<String>,
    /// Business phone number id that sends replies. Overridden by META_PHONE_NUMBER_ID.
    pub phone_number_id: Option<String>,
    /// Graph API root (default https://graph.facebook.com).
    #[serde(default = "default_graph_api_base")]
    pub graph_api_base: String,
    /// Graph API version segment (default v19.0).
    #[serde(default = "default_graph_api_version")]
    pub api_version: String,
}

fn default_graph_api_base() -> String {
    "https://graph.facebook.com".to_string()
}

fn default_graph_api_version() -> String {
    "v19.0".to_string()
}

impl Default for WhatsAppChannelConfig {
    fn default() -> Self {
        Self {
            verify_token: None,
            access_token: None,
            phone_number_id: None,
            graph_api_base: default_graph_api_base(),
            api_version: default_graph_api_version(),
        }
    }
}

/// Agent settings: which Gemini model answers and how to reach it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentsConfig {
    /// Gemini API key. Overridden by GEMINI_API_KEY.
    pub gemini_api_key: Option<String>,
    /// Model id (default "gemini-1.5-flash").
    pub model: Option<String>,
    /// Override for the Generative Language API root.
    pub gemini_api_base: Option<String>,
}

/// Non-empty trimmed env value wins; otherwise the non-empty trimmed configured value.
fn pick_secret(env_value: Option<String>, configured: Option<&String>) -> Option<String> {
    env_value
        .and_then(|s| {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        })
        .or_else(|| {
            configured
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

/// Resolve the Gemini API key: env GEMINI_API_KEY overrides config.
pub fn resolve_gemini_api_key(config: &Config) -> Option<String> {
    pick_secret(
        std::env::var("GEMINI_API_KEY").ok(),
        config.agents.gemini_api_key.as_ref(),
    )
}

/// Resolve the webhook verify token: env META_VERIFY_TOKEN overrides config.
pub fn resolve_verify_token(config: &Config) -> Option<String> {
    pick_secret(
        std::env::var("META_VERIFY_TOKEN").ok(),
        config.channels.whatsapp.verify_token.as_ref(),
    )
}

/// Resolve the Graph API access token: env META_ACCESS_TOKEN overrides config.
pub fn resolve_access_token(config: &Config) -> Option<String> {
    pick_secret(
        std::env::var("META_ACCESS_TOKEN").ok(),
        config.channels.whatsapp.access_token.as_ref(),
    )
}

/// Resolve the sending phone number id: env META_PHONE_NUMBER_ID overrides config.
pub fn resolve_phone_number_id(config: &Config) -> Option<String> {
    pick_secret(
        std::env::var("META_PHONE_NUMBER_ID").ok(),
        config.channels.whatsapp.phone_number_id.as_ref(),
    )
}

/// Fold environment overrides into the config so the rest of the process reads one immutable value.
pub fn apply_env_overrides(mut config: Config) -> Config {
    config.agents.gemini_api_key = resolve_gemini_api_key(&config);
    config.channels.whatsapp.verify_token = resolve_verify_token(&config);
    config.channels.whatsapp.access_token = resolve_access_token(&config);
    config.channels.whatsapp.phone_number_id = resolve_phone_number_id(&config);
    config
}

/// Names of required settings that are still unset after overrides.
pub fn missing_secrets(config: &Config) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if config.agents.gemini_api_key.is_none() {
        missing.push("GEMINI_API_KEY");
    }
    if config.channels.whatsapp.verify_token.is_none() {
        missing.push("META_VERIFY_TOKEN");
    }
    if config.channels.whatsapp.access_token.is_none() {
        missing.push("META_ACCESS_TOKEN");
    }
    if config.channels.whatsapp.phone_number_id.is_none() {
        missing.push("META_PHONE_NUMBER_ID");
    }
    missing
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("RELAY_CONFIG_PATH").map(PathBuf::from).unwrap_or_else(|_| {
        dirs::home_dir()
            .map(|h| h.join(".relay").join("config.json"))
            .unwrap_or_else(|| PathBuf::from("config.json"))
    })
}

/// Load config from the given path, or the default path (or RELAY_CONFIG_PATH). Missing file => default config.
/// Environment overrides are applied before returning. Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((apply_env_overrides(config), path))
}
