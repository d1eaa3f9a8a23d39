//! `POST /events`: the Slack Events API endpoint.
//!
//! Order of operations: signature check (in the [`SlackSigned`] extractor),
//! timeout-redelivery short circuit, payload decoding, then dispatch and
//! publish on a separate task.

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use kanau::processor::Processor;
use notico_core::processors::PublishError;
use notico_sdk::objects::{DecodeError, EventsApiPayload, SlackEvent};
use notico_sdk::signature::SignatureError;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::api::extractors::{RetryInfo, SlackSigned};
use crate::state::AppState;

/// Errors from the events endpoint.
///
/// Every variant maps to the same opaque 500 response; details only go to
/// the log.
#[derive(Debug, Error)]
pub enum EventsApiError {
    #[error("missing or unreadable {0} header")]
    MissingHeader(&'static str),

    #[error("failed to read request body: {0}")]
    BodyRead(String),

    #[error("signing secret is not configured")]
    SigningSecretMissing,

    #[error("failed to verify request: {0}")]
    Auth(#[from] SignatureError),

    #[error("failed to parse event: {0}")]
    Decode(#[from] DecodeError),

    #[error("failed to publish notification: {0}")]
    Publish(#[from] PublishError),
}

impl IntoResponse for EventsApiError {
    fn into_response(self) -> Response {
        error!(error = %self, "Events request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
    }
}

/// Handle one Events API delivery.
pub async fn receive_event(
    State(state): State<AppState>,
    retry: RetryInfo,
    SlackSigned(body): SlackSigned,
) -> Result<Response, EventsApiError> {
    if retry.is_timeout_redelivery() {
        warn!(
            retry_num = retry.num.as_deref().unwrap_or_default(),
            "Skipping redelivery after http_timeout"
        );
        return Ok((StatusCode::OK, "OK\n").into_response());
    }

    let payload = EventsApiPayload::decode(&body).inspect_err(|e| {
        error!(
            error = %e,
            payload = %String::from_utf8_lossy(&body),
            "Failed to decode event payload"
        );
    })?;

    match payload {
        EventsApiPayload::UrlVerification { challenge } => {
            debug!("Answering url_verification challenge");
            Ok(([(header::CONTENT_TYPE, "text")], challenge).into_response())
        }
        EventsApiPayload::EventCallback(callback) => {
            debug!(
                event_id = callback.event_id.as_deref().unwrap_or_default(),
                team_id = callback.team_id.as_deref().unwrap_or_default(),
                kind = callback.event.kind(),
                "Received event callback"
            );
            deliver(&state, callback.event).await?;
            Ok(StatusCode::OK.into_response())
        }
        EventsApiPayload::Other { kind } => {
            debug!(kind = %kind, "Ignoring payload type");
            Ok(StatusCode::OK.into_response())
        }
    }
}

/// Dispatch an event and publish the result under the configured deadline.
///
/// The work runs on its own task, so a client that hangs up does not cancel
/// a post that is already in flight.
async fn deliver(state: &AppState, event: SlackEvent) -> Result<(), PublishError> {
    let dispatcher = state.dispatcher().await;
    let sink = state.sink().await;
    let publish_timeout = state.config.server.read().await.publish_timeout;

    let task = tokio::spawn(async move {
        let Some(notification) = dispatcher.process(event).await.unwrap_or_default() else {
            return Ok(());
        };
        sink.publish(&notification).await
    });

    match tokio::time::timeout(publish_timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(PublishError::Aborted(join_error.to_string())),
        Err(_) => Err(PublishError::Timeout(publish_timeout)),
    }
}
