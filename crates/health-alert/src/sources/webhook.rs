use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::app_service_health::{ConditionEntry, Essentials};
use super::schema::AlertSchemaValidator;
use crate::{metrics, sinks::Notifier, Error, Result};

pub const SUCCESS_RESPONSE: &str = "Notifying Slack...";
pub const INVALID_BODY_PREFIX: &str = "Invalid request body | Details: ";

const CONFIGURATION_ITEMS_PATH: &str = "data.essentials.configurationItems";
const ALL_OF_PATH: &str = "data.alertContext.condition.allOf";

const HEALTH_DOWN: &str = "❌ Down";
const HEALTH_UP: &str = "✅ Up";

/// Result of handling one alert, already mapped to what the caller sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    Success(String),
    BadRequest(String),
}

impl PipelineOutcome {
    pub fn body(&self) -> &str {
        match self {
            PipelineOutcome::Success(body) | PipelineOutcome::BadRequest(body) => body,
        }
    }
}

/// Validates App Service Health alerts and relays a summary to a notifier.
pub struct HealthAlertHandler {
    validator: AlertSchemaValidator,
    notifier: Arc<dyn Notifier>,
}

impl HealthAlertHandler {
    pub fn new(notifier: Arc<dyn Notifier>) -> Result<Self> {
        Ok(Self {
            validator: AlertSchemaValidator::new()?,
            notifier,
        })
    }

    /// Run one alert through validation, formatting and notification.
    ///
    /// `Err` is reserved for internal failures; bad payloads come back as
    /// [`PipelineOutcome::BadRequest`].
    pub async fn process(&self, raw: &Value) -> Result<PipelineOutcome> {
        let invocation_id = Uuid::new_v4();
        metrics::ALERTS_RECEIVED_TOTAL.inc();

        let result = self
            .handle(raw)
            .instrument(info_span!("health_alert", %invocation_id))
            .await;

        let outcome_label = match &result {
            Ok(PipelineOutcome::Success(_)) => "success",
            Ok(PipelineOutcome::BadRequest(_)) => "bad_request",
            Err(_) => "internal_error",
        };
        metrics::ALERT_OUTCOMES_TOTAL
            .with_label_values(&[outcome_label])
            .inc();

        result
    }

    async fn handle(&self, raw: &Value) -> Result<PipelineOutcome> {
        let payload = match self.validator.validate(raw) {
            Ok(payload) => payload,
            Err(e) => {
                error!("Health Alert schema is not correct: {}", e);
                return Ok(self.bad_request(&e.to_string()).await);
            }
        };

        let essentials = &payload.data.essentials;
        let Some(resource_name) =
            expect_single(&essentials.configuration_items, CONFIGURATION_ITEMS_PATH)
        else {
            return Ok(self
                .bad_request(&empty_array_message(CONFIGURATION_ITEMS_PATH))
                .await);
        };
        let health = readable_health_status(essentials);
        let fired_at = format_fired_date_time(&essentials.fired_date_time)?;

        let Some(entry) =
            expect_single(&payload.data.alert_context.condition.all_of, ALL_OF_PATH)
        else {
            return Ok(self.bad_request(&empty_array_message(ALL_OF_PATH)).await);
        };

        let message = format_message(resource_name, health, &fired_at, entry);
        info!("{}", message);
        self.notify_best_effort(&message).await;

        Ok(PipelineOutcome::Success(SUCCESS_RESPONSE.to_string()))
    }

    async fn bad_request(&self, details: &str) -> PipelineOutcome {
        let message = format!("{}{}", INVALID_BODY_PREFIX, details);
        self.notify_best_effort(&message).await;
        PipelineOutcome::BadRequest(message)
    }

    async fn notify_best_effort(&self, message: &str) {
        if let Err(e) = self.notifier.notify(message).await {
            metrics::NOTIFY_FAILURES_TOTAL.inc();
            if e.source.is_timeout() {
                error!("Notification timed out, response is unaffected: {}", e);
            } else {
                error!("Notification failed, response is unaffected: {}", e);
            }
        }
    }
}

/// First element of a list Azure documents as single-valued. Logs a warning
/// when more than one is present and returns `None` when it is empty.
fn expect_single<'a, T>(items: &'a [T], path: &str) -> Option<&'a T> {
    if items.len() > 1 {
        warn!(
            "Unexpected data schema: '{}' should hold exactly one element but has {}, using the first",
            path,
            items.len()
        );
    }
    items.first()
}

fn empty_array_message(path: &str) -> String {
    format!("Data schema: '{}'. Length of array is 0", path)
}

pub fn readable_health_status(essentials: &Essentials) -> &'static str {
    if essentials.is_fired() {
        HEALTH_DOWN
    } else {
        HEALTH_UP
    }
}

/// `2024-01-02T03:04:05.000Z` -> `2024-01-02 03:04:05.000`, always in UTC
/// with millisecond precision.
pub fn format_fired_date_time(raw: &str) -> Result<String> {
    let fired = parse_utc(raw).ok_or_else(|| Error::DateParse(raw.to_string()))?;
    Ok(fired.format("%Y-%m-%d %H:%M:%S%.3f").to_string())
}

/// Shapes accepted with an explicit offset (`+02:00` or `+0200`).
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M%z"];
/// Shapes accepted without an offset. Azure timestamps are UTC.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

fn parse_utc(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(dt.with_timezone(&Utc));
    }

    // A trailing `Z` is the same as no offset.
    let naive = raw
        .strip_suffix('Z')
        .or_else(|| raw.strip_suffix('z'))
        .unwrap_or(raw);
    if let Some(dt) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(naive, fmt).ok())
    {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub fn format_message(
    resource_name: &str,
    health: &str,
    fired_at: &str,
    entry: &ConditionEntry,
) -> String {
    let instance_list: String = entry
        .instance_names()
        .into_iter()
        .map(|name| format!(" - {}\n", name))
        .collect();
    format!(
        "\n[{}] [{}] At {} (UTC)\nInstance List:\n{}",
        resource_name, health, fired_at, instance_list
    )
}
