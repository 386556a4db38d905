use axum::{
    body::Body,
    extract::{ Request, State },
    http::{ HeaderMap, StatusCode },
    middleware::Next,
    response::{ IntoResponse, Response },
};
use governor::{ RateLimiter, state::{ InMemoryState, NotKeyed }, clock::DefaultClock };
use log::warn;
use std::sync::Arc;

use crate::slack::signature::{ SignatureVerifier, Verification, SIGNATURE_HEADER, TIMESTAMP_HEADER };

pub type RequestLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Attached to requests that passed signature verification.
#[derive(Debug, Clone)]
pub struct VerifiedRequest {
    pub timestamp: i64,
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

pub async fn verify_slack_signature(
    State(verifier): State<Arc<SignatureVerifier>>,
    request: Request,
    next: Next
) -> Response {
    let (mut parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(b) => b,
        Err(e) => {
            warn!("Failed to read webhook body: {}", e);
            return (StatusCode::PAYLOAD_TOO_LARGE, "body rejected").into_response();
        }
    };

    let timestamp = header_str(&parts.headers, TIMESTAMP_HEADER);
    let signature = header_str(&parts.headers, SIGNATURE_HEADER);

    match verifier.verify(&bytes, timestamp, signature) {
        Verification::Valid => {
            let timestamp = timestamp.and_then(|t| t.trim().parse().ok()).unwrap_or_default();
            parts.extensions.insert(VerifiedRequest { timestamp });
            next.run(Request::from_parts(parts, Body::from(bytes))).await
        }
        rejected => {
            warn!("Rejected webhook request on {}: {:?}", parts.uri.path(), rejected);
            (StatusCode::FORBIDDEN, "invalid request signature").into_response()
        }
    }
}

pub async fn rate_limit(
    State(limiter): State<Arc<RequestLimiter>>,
    request: Request,
    next: Next
) -> Response {
    if limiter.check().is_err() {
        warn!("Global webhook rate limit exceeded. Dropping request.");
        return StatusCode::TOO_MANY_REQUESTS.into_response();
    }
    next.run(request).await
}
