use async_trait::async_trait;
use axum::http::StatusCode;
use health_alert::{
    server::Server,
    sinks::{Notifier, NotifyError, SlackNotifier, SlackOptions, Transport, TransportError},
    sources::HealthAlertHandler,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// Captures every JSON body the Slack sink would have posted.
#[derive(Default)]
struct RecordingTransport {
    fail: bool,
    posted: Mutex<Vec<(String, Value)>>,
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn post_json(&self, url: &str, body: &Value) -> Result<(), TransportError> {
        self.posted
            .lock()
            .unwrap()
            .push((url.to_string(), body.clone()));
        if self.fail {
            return Err(TransportError::Status {
                status: reqwest::StatusCode::BAD_GATEWAY,
                body: "upstream down".to_string(),
            });
        }
        Ok(())
    }
}

impl RecordingTransport {
    fn texts(&self) -> Vec<String> {
        self.posted
            .lock()
            .unwrap()
            .iter()
            .map(|(_, body)| body["text"].as_str().unwrap_or_default().to_string())
            .collect()
    }
}

/// Captures the undecorated messages handed to the notifier.
#[derive(Default)]
struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, message: &str) -> Result<(), NotifyError> {
        self.messages.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

fn sample_alert() -> Value {
    json!({
        "schemaId": "azureMonitorCommonAlertSchema",
        "data": {
            "essentials": {
                "alertId": "/subscriptions/0000/providers/Microsoft.AlertsManagement/alerts/1111",
                "alertRule": "web-app-1-health",
                "severity": "Sev1",
                "signalType": "Metric",
                "monitorCondition": "Fired",
                "monitoringService": "Platform",
                "alertTargetIDs": [
                    "/subscriptions/0000/resourcegroups/rg/providers/microsoft.web/sites/web-app-1"
                ],
                "configurationItems": ["web-app-1"],
                "originAlertId": "0000_rg_microsoft.insights_metricAlerts_web-app-1-health",
                "firedDateTime": "2024-03-05T12:30:00.000Z",
                "description": "Health check status dropped",
                "essentialsVersion": "1.0",
                "alertContextVersion": "1.0"
            },
            "alertContext": {
                "properties": { "team": "web" },
                "conditionType": "SingleResourceMultipleMetricCriteria",
                "condition": {
                    "windowSize": "PT5M",
                    "allOf": [
                        {
                            "metricName": "HealthCheckStatus",
                            "metricNamespace": "Microsoft.Web/sites",
                            "operator": "LessThan",
                            "threshold": "100",
                            "timeAggregation": "Average",
                            "dimensions": [
                                { "name": "instance", "value": "i-1" }
                            ],
                            "metricValue": 33.3,
                            "webTestName": null
                        }
                    ],
                    "windowStartTime": "2024-03-05T12:25:00.000Z",
                    "windowEndTime": "2024-03-05T12:30:00.000Z"
                }
            }
        }
    })
}

fn test_server(notifier: Arc<dyn Notifier>) -> axum_test::TestServer {
    let handler = Arc::new(HealthAlertHandler::new(notifier).expect("handler builds"));
    let server = Server::new(handler);
    axum_test::TestServer::new(server.build_router()).unwrap()
}

fn slack_server(transport: Arc<RecordingTransport>) -> axum_test::TestServer {
    let options = SlackOptions {
        webhook_url: "https://hooks.slack.com/services/T000/B000/XXXX".to_string(),
        prefix: Some("Health Alert".to_string()),
        warning_suffix: Some(String::new()),
        sender_identity: Some("relay-app".to_string()),
    };
    test_server(Arc::new(SlackNotifier::new(options, transport)))
}

#[tokio::test]
async fn test_health_endpoint() {
    let client = test_server(Arc::new(RecordingNotifier::default()));

    let response = client.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_fired_alert_is_relayed_to_slack() {
    let transport = Arc::new(RecordingTransport::default());
    let client = slack_server(transport.clone());

    let response = client.post("/api/health-alert").json(&sample_alert()).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "Notifying Slack...");

    let posted = transport.posted.lock().unwrap().clone();
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].0, "https://hooks.slack.com/services/T000/B000/XXXX");
    assert_eq!(
        posted[0].1["text"],
        "[Health Alert] \n[web-app-1] [❌ Down] At 2024-03-05 12:30:00.000 (UTC)\nInstance List:\n - i-1\n  (notified by relay-app)"
    );
}

#[tokio::test]
async fn test_get_is_accepted_like_post() {
    let notifier = Arc::new(RecordingNotifier::default());
    let client = test_server(notifier.clone());

    let mut alert = sample_alert();
    alert["data"]["essentials"]["monitorCondition"] = json!("Resolved");
    let response = client.get("/api/health-alert").json(&alert).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let messages = notifier.messages.lock().unwrap();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("[web-app-1] [✅ Up] At 2024-03-05 12:30:00.000 (UTC)"));
}

#[tokio::test]
async fn test_empty_all_of_is_rejected_and_notified() {
    let notifier = Arc::new(RecordingNotifier::default());
    let client = test_server(notifier.clone());

    let mut alert = sample_alert();
    alert["data"]["alertContext"]["condition"]["allOf"] = json!([]);
    let response = client.post("/api/health-alert").json(&alert).await;

    let expected = "Invalid request body | Details: \
        Data schema: 'data.alertContext.condition.allOf'. Length of array is 0";
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), expected);
    assert_eq!(*notifier.messages.lock().unwrap(), vec![expected.to_string()]);
}

#[tokio::test]
async fn test_empty_configuration_items_is_rejected() {
    let notifier = Arc::new(RecordingNotifier::default());
    let client = test_server(notifier.clone());

    let mut alert = sample_alert();
    alert["data"]["essentials"]["configurationItems"] = json!([]);
    let response = client.post("/api/health-alert").json(&alert).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.text(),
        "Invalid request body | Details: Data schema: 'data.essentials.configurationItems'. Length of array is 0"
    );
}

#[tokio::test]
async fn test_schema_violations_are_all_reported() {
    let notifier = Arc::new(RecordingNotifier::default());
    let client = test_server(notifier.clone());

    let mut alert = sample_alert();
    alert["data"]["essentials"]
        .as_object_mut()
        .unwrap()
        .remove("alertRule");
    alert["data"]["essentials"]["alertTargetIDs"] = json!("not-a-list");
    alert["data"]["alertContext"]["condition"]["allOf"][0]["dimensions"][0]["name"] = json!(1);

    let response = client.post("/api/health-alert").json(&alert).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let body = response.text();
    assert!(body.starts_with("Invalid request body | Details: "));
    for path in [
        "data.essentials.alertRule",
        "data.essentials.alertTargetIDs",
        "data.alertContext.condition.allOf.0.dimensions.0.name",
    ] {
        assert!(body.contains(path), "missing {} in {}", path, body);
    }
    assert_eq!(*notifier.messages.lock().unwrap(), vec![body]);
}

#[tokio::test]
async fn test_non_json_body_is_rejected() {
    let client = test_server(Arc::new(RecordingNotifier::default()));

    let response = client.post("/api/health-alert").text("hello").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.text().starts_with("Invalid request body | Details: body: "));
}

#[tokio::test]
async fn test_delivery_failure_keeps_response() {
    let transport = Arc::new(RecordingTransport {
        fail: true,
        ..Default::default()
    });
    let client = slack_server(transport.clone());

    let response = client.post("/api/health-alert").json(&sample_alert()).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "Notifying Slack...");

    let mut alert = sample_alert();
    alert["data"]["essentials"]["configurationItems"] = json!([]);
    let response = client.post("/api/health-alert").json(&alert).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    assert_eq!(transport.texts().len(), 2);
}

#[tokio::test]
async fn test_invalid_fired_date_is_internal_error() {
    let notifier = Arc::new(RecordingNotifier::default());
    let client = test_server(notifier.clone());

    let mut alert = sample_alert();
    alert["data"]["essentials"]["firedDateTime"] = json!("yesterday");
    let response = client.post("/api/health-alert").json(&alert).await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.text(),
        "Internal error: Invalid firedDateTime: yesterday"
    );
    assert!(notifier.messages.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let client = test_server(Arc::new(RecordingNotifier::default()));
    client.post("/api/health-alert").json(&sample_alert()).await;

    let response = client.get("/metrics").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains("health_alert_received_total"));
}
