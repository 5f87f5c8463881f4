//! HTTP ingress for GitHub webhook deliveries

use crate::dispatcher::{DispatchOutcome, EventDispatcher};
use crate::events::parse_event;
use crate::signature::verify_signature;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use log::{debug, warn};
use std::sync::Arc;

pub const EVENT_HEADER: &str = "X-GitHub-Event";
pub const SIGNATURE_HEADER: &str = "X-Hub-Signature-256";
pub const DELIVERY_HEADER: &str = "X-GitHub-Delivery";

#[derive(Clone)]
pub struct ServerState {
    dispatcher: Arc<EventDispatcher>,
    /// Empty disables signature verification
    webhook_secret: Arc<str>,
}

impl ServerState {
    pub fn new(dispatcher: Arc<EventDispatcher>, webhook_secret: &str) -> Self {
        if webhook_secret.is_empty() {
            warn!("No webhook secret configured, deliveries are not verified");
        }
        Self {
            dispatcher,
            webhook_secret: Arc::from(webhook_secret),
        }
    }
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/webhook", post(webhook))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

async fn webhook(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    let delivery = header(&headers, DELIVERY_HEADER).unwrap_or("unknown");

    if !state.webhook_secret.is_empty() {
        if let Err(e) = verify_signature(
            &state.webhook_secret,
            &body,
            header(&headers, SIGNATURE_HEADER),
        ) {
            warn!("Rejecting delivery {}: {}", delivery, e);
            return (StatusCode::BAD_REQUEST, e.to_string());
        }
    }

    let Some(event_type) = header(&headers, EVENT_HEADER) else {
        warn!("Rejecting delivery {}: missing {}", delivery, EVENT_HEADER);
        return (
            StatusCode::BAD_REQUEST,
            format!("missing {} header", EVENT_HEADER),
        );
    };

    let event = match parse_event(event_type, &body) {
        Ok(event) => event,
        Err(e) => {
            warn!("Could not parse {} delivery {}: {}", event_type, delivery, e);
            return (StatusCode::BAD_REQUEST, e.to_string());
        }
    };
    debug!("Delivery {} parsed as {:?}", delivery, event);

    match state.dispatcher.dispatch(event).await {
        DispatchOutcome::Accepted => (StatusCode::OK, "ok".to_string()),
        DispatchOutcome::Failed(reason) => (StatusCode::INTERNAL_SERVER_ERROR, reason),
    }
}
