mod routes;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::sources::HealthAlertHandler;

pub struct Server {
    handler: Arc<HealthAlertHandler>,
}

impl Server {
    pub fn new(handler: Arc<HealthAlertHandler>) -> Self {
        Self { handler }
    }

    pub fn build_router(self) -> Router {
        let state = Arc::new(self);

        Router::new()
            .route("/health", get(routes::health))
            .route(
                "/api/health-alert",
                get(routes::health_alert).post(routes::health_alert),
            )
            .route("/metrics", get(routes::metrics))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    pub async fn start(self, addr: &str) -> crate::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, self.build_router()).await?;
        Ok(())
    }
}
