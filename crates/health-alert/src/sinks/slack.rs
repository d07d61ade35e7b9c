use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use super::{Notifier, NotifyError, Transport};

/// Fixed, process-wide settings for the Slack sink.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlackOptions {
    /// Slack incoming webhook URL.
    pub webhook_url: String,
    /// Rendered as `[prefix] ` in front of every message.
    pub prefix: Option<String>,
    /// Appended after a single space; usually a mention such as `<!channel>`.
    pub warning_suffix: Option<String>,
    /// Site that sent the message, rendered as `(notified by ...)`.
    pub sender_identity: Option<String>,
}

pub struct SlackNotifier {
    options: SlackOptions,
    transport: Arc<dyn Transport>,
}

impl SlackNotifier {
    pub fn new(options: SlackOptions, transport: Arc<dyn Transport>) -> Self {
        Self { options, transport }
    }

    /// Decorate `message` with the configured prefix, suffix and sender.
    ///
    /// The suffix separator is always written, even for an empty suffix.
    pub fn compose(&self, message: &str) -> String {
        let mut text = match self.options.prefix.as_deref() {
            Some(prefix) if !prefix.is_empty() => format!("[{}] {}", prefix, message),
            _ => message.to_string(),
        };

        text.push(' ');
        text.push_str(self.options.warning_suffix.as_deref().unwrap_or_default());

        if let Some(sender) = self.options.sender_identity.as_deref().filter(|s| !s.is_empty()) {
            text.push_str(&format!(" (notified by {})", sender));
        }
        text
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn notify(&self, message: &str) -> Result<(), NotifyError> {
        let text = self.compose(message);
        info!("Notify to slack with message: {:?}", text);

        self.transport
            .post_json(&self.options.webhook_url, &json!({ "text": text }))
            .await
            .map_err(|source| {
                error!("Cannot send notify to slack: {}", source);
                NotifyError {
                    sink: "slack",
                    source,
                }
            })
    }
}
