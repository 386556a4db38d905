use crate::models::slack::EventEnvelope;
use crate::server::events::EventRouter;
use crate::server::middleware::{ rate_limit, verify_slack_signature, RequestLimiter, VerifiedRequest };
use crate::slack::SignatureVerifier;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    middleware,
    response::{ IntoResponse, Response },
    routing::post,
    Extension, Json, Router,
};
use governor::Quota;
use log::{ debug, error, info, warn };
use serde_json::json;
use std::num::NonZeroU32;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;

pub const MAX_BODY_SIZE: usize = 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub events_path: String,
    pub process_before_response: bool,
    pub max_requests_per_second: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            events_path: "/slack/events".to_string(),
            process_before_response: false,
            max_requests_per_second: 50,
        }
    }
}

#[derive(Clone)]
struct AppState {
    events: Arc<EventRouter>,
    process_before_response: bool,
}

pub fn build_router(
    events: Arc<EventRouter>,
    verifier: SignatureVerifier,
    config: &ApiConfig
) -> Router {
    let state = AppState {
        events,
        process_before_response: config.process_before_response,
    };

    let app = Router::new()
        .route(&config.events_path, post(slack_events_handler))
        .route_layer(middleware::from_fn_with_state(Arc::new(verifier), verify_slack_signature))
        .with_state(state);

    let app = match NonZeroU32::new(config.max_requests_per_second) {
        Some(rate) => {
            let limiter = Arc::new(RequestLimiter::direct(Quota::per_second(rate)));
            app.layer(middleware::from_fn_with_state(limiter, rate_limit))
        }
        None => {
            warn!("Webhook rate limiting disabled.");
            app
        }
    };

    app.layer(ServiceBuilder::new().layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE)))
}

async fn slack_events_handler(
    State(state): State<AppState>,
    Extension(verified): Extension<VerifiedRequest>,
    body: Bytes
) -> Response {
    let envelope: EventEnvelope = match serde_json::from_slice(&body) {
        Ok(e) => e,
        Err(e) => {
            warn!("Malformed Slack payload (ts {}): {}", verified.timestamp, e);
            return (StatusCode::BAD_REQUEST, "malformed payload").into_response();
        }
    };

    match envelope {
        EventEnvelope::UrlVerification { challenge } => {
            info!("Answering Slack URL verification challenge");
            Json(json!({ "challenge": challenge })).into_response()
        }
        EventEnvelope::EventCallback { event, event_id } => {
            let event_id = event_id.unwrap_or_else(|| "-".to_string());
            debug!("Received {} event {}", event.event_type, event_id);

            let events = state.events.clone();
            let task = async move {
                if let Err(e) = events.route(event).await {
                    error!("Failed to handle event {}: {}", event_id, e);
                }
            };
            if state.process_before_response {
                task.await;
            } else {
                tokio::spawn(task);
            }
            StatusCode::OK.into_response()
        }
        EventEnvelope::Unsupported => {
            debug!("Ignoring unsupported Slack envelope");
            StatusCode::OK.into_response()
        }
    }
}
