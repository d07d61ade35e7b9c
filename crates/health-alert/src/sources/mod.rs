pub mod app_service_health;
pub mod schema;
pub mod webhook;

pub use app_service_health::AlertPayload;
pub use schema::{AlertSchemaValidator, ValidationError, Violation};
pub use webhook::{HealthAlertHandler, PipelineOutcome};
