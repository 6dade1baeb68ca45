//! Endpoint handlers.
//!
//! `/webhook` answers 405/400 for transport problems and 200 `OK` for
//! everything else. Problems with the submission itself (provider failure,
//! missing image, disk errors) are only reported through the event sink and
//! never change the response.

use std::sync::Arc;

use axum::{
    extract::{FromRequest, Multipart, Request, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::{RelayError, RequestError, SubmissionError};
use crate::relay::RelayClient;
use crate::sink::{EventSink, TracingSink};
use crate::submission::{process_submission, report_error, FormFields, Submission};
use crate::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sink: Arc<dyn EventSink>,
    pub relay: RelayClient,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self::with_sink(config, Arc::new(TracingSink))
    }

    pub fn with_sink(config: Config, sink: Arc<dyn EventSink>) -> Self {
        let relay = RelayClient::new(config.relay.clone());
        Self {
            config: Arc::new(config),
            sink,
            relay,
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Request checks
// =============================================================================

fn require_post(method: &Method) -> Result<(), RequestError> {
    if *method == Method::POST {
        Ok(())
    } else {
        Err(RequestError::MethodNotAllowed)
    }
}

fn require_multipart(headers: &HeaderMap) -> Result<(), RequestError> {
    let is_multipart = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.contains("multipart/form-data"))
        .unwrap_or(false);

    if is_multipart {
        Ok(())
    } else {
        Err(RequestError::BadRequest)
    }
}

// =============================================================================
// Image Webhook
// =============================================================================

/// Provider callback endpoint.
///
/// This endpoint:
/// 1. Rejects anything but POST with 405
/// 2. Rejects bodies that are not `multipart/form-data` with 400
/// 3. Saves the result image when the submission is valid
/// 4. Returns 200 OK
pub async fn image_webhook(State(state): State<AppState>, request: Request) -> Response {
    if let Err(rejection) = require_post(request.method())
        .and_then(|()| require_multipart(request.headers()))
    {
        warn!(
            method = %request.method(),
            status_code = rejection.status_code().as_u16(),
            "webhook_rejected"
        );
        return rejection.into_response();
    }

    let outcome = match Multipart::from_request(request, &state).await {
        Ok(multipart) => match FormFields::from_multipart(multipart).await {
            Ok(fields) => {
                let submission = Submission::from_fields(fields);
                info!(
                    status = ?submission.status,
                    id_gen = ?submission.id_gen,
                    has_image = submission.res_image.is_some(),
                    "webhook_received"
                );
                process_submission(submission, &state.config.storage, state.sink.as_ref()).await
            }
            Err(err) => Err(err),
        },
        Err(rejection) => Err(SubmissionError::Malformed(rejection.body_text())),
    };

    match outcome {
        Ok(path) => info!(path = %path.display(), "webhook_image_saved"),
        Err(err) => report_error(state.sink.as_ref(), &err),
    }

    (StatusCode::OK, "OK").into_response()
}

// =============================================================================
// Face-swap Relay
// =============================================================================

/// Relay endpoint.
///
/// Forwards the provider's body verbatim on success. Local failures answer
/// 500; a provider failure answers with the provider's status code.
pub async fn swap_face(State(state): State<AppState>, method: Method) -> Response {
    if let Err(rejection) = require_post(&method) {
        warn!(method = %method, "swap_face_rejected");
        return rejection.into_response();
    }

    match state.relay.swap_face().await {
        Ok(response) => {
            info!(body_length = response.body.len(), "swap_face_succeeded");
            response.into_response()
        }
        Err(err) => {
            match &err {
                RelayError::RemoteNonSuccess { status, body } => error!(
                    status_code = status.as_u16(),
                    response_body = %body,
                    "swap_face_remote_error"
                ),
                other => error!(error = %other, "swap_face_failed"),
            }
            err.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_post() {
        assert!(require_post(&Method::POST).is_ok());
        assert!(matches!(
            require_post(&Method::GET),
            Err(RequestError::MethodNotAllowed)
        ));
        assert!(matches!(
            require_post(&Method::PUT),
            Err(RequestError::MethodNotAllowed)
        ));
    }

    #[test]
    fn test_require_multipart() {
        let mut headers = HeaderMap::new();
        assert!(require_multipart(&headers).is_err());

        headers.insert(header::CONTENT_TYPE, "application/json".parse().unwrap());
        assert!(require_multipart(&headers).is_err());

        headers.insert(
            header::CONTENT_TYPE,
            "multipart/form-data; boundary=abc".parse().unwrap(),
        );
        assert!(require_multipart(&headers).is_ok());
    }
}
