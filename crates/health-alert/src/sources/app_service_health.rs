//! Azure Monitor "App Service Health" alert payload (common alert schema).
//!
//! These structs double as the declarative schema for inbound alerts: the
//! validator in [`super::schema`] derives its JSON Schema from them.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The monitor condition that marks an alert as firing. Every other value
/// (`Resolved`, or anything Azure adds later) is treated as recovered.
pub const MONITOR_CONDITION_FIRED: &str = "Fired";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlertPayload {
    pub schema_id: String,
    pub data: AlertData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlertData {
    pub essentials: Essentials,
    pub alert_context: AlertContext,
}

/// Fixed metadata block shared by every Azure Monitor alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Essentials {
    pub alert_id: String,
    pub alert_rule: String,
    pub severity: String,
    pub signal_type: String,
    pub monitor_condition: String,
    pub monitoring_service: String,
    #[serde(rename = "alertTargetIDs")]
    pub alert_target_ids: Vec<String>,
    /// Names of the affected resources. Azure sends exactly one for
    /// App Service alerts.
    pub configuration_items: Vec<String>,
    pub origin_alert_id: String,
    pub fired_date_time: String,
    pub description: String,
    pub essentials_version: String,
    pub alert_context_version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlertContext {
    /// Free-form custom properties of the alert rule; passed through untouched.
    #[serde(default)]
    pub properties: Value,
    pub condition_type: String,
    pub condition: Condition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub window_size: String,
    pub all_of: Vec<ConditionEntry>,
    pub window_start_time: String,
    pub window_end_time: String,
}

/// One metric-threshold rule evaluated by Azure Monitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConditionEntry {
    pub metric_name: String,
    pub metric_namespace: String,
    pub operator: String,
    pub threshold: String,
    pub time_aggregation: String,
    pub dimensions: Vec<Dimension>,
    pub metric_value: f64,
    #[serde(default)]
    pub web_test_name: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

impl Essentials {
    pub fn is_fired(&self) -> bool {
        self.monitor_condition == MONITOR_CONDITION_FIRED
    }
}

impl ConditionEntry {
    /// Values of every dimension, in payload order. These identify the
    /// affected App Service instances.
    pub fn instance_names(&self) -> Vec<&str> {
        self.dimensions.iter().map(|d| d.value.as_str()).collect()
    }
}
