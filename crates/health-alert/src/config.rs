use serde::{Deserialize, Serialize};

use crate::sinks::SlackOptions;

/// Prefix put in front of every Slack message.
pub const SLACK_PREFIX: &str = "Health Alert";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub slack: SlackOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub addr: String,
}

impl Config {
    pub fn load() -> crate::Result<Self> {
        // Load environment variables from .env file if it exists
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Config {
            server: ServerConfig {
                addr: lookup("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            },
            slack: SlackOptions {
                webhook_url: lookup("Slack_Webhook_URL").unwrap_or_default(),
                prefix: Some(SLACK_PREFIX.to_string()),
                warning_suffix: Some(lookup("Custom_Slack_Warning_Alert").unwrap_or_default()),
                // Set by the App Service host.
                sender_identity: lookup("WEBSITE_SITE_NAME").filter(|s| !s.is_empty()),
            },
        };

        if config.slack.webhook_url.is_empty() {
            tracing::warn!(
                "Slack_Webhook_URL is not set. Notifications will fail and only be logged."
            );
        } else if let Err(e) = url::Url::parse(&config.slack.webhook_url) {
            return Err(crate::Error::Config(format!(
                "Slack_Webhook_URL is not a valid URL: {}",
                e
            )));
        }

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                addr: "0.0.0.0:8080".to_string(),
            },
            slack: SlackOptions {
                webhook_url: String::new(),
                prefix: Some(SLACK_PREFIX.to_string()),
                warning_suffix: Some(String::new()),
                sender_identity: None,
            },
        }
    }
}
