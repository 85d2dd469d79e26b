use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use chatops_core::command::strip_mention;
use chatops_core::{BodyFormat, InboundCommand, RelayError};
use serde::Deserialize;

use crate::error::AppError;
use crate::routes::verify_request;
use crate::state::AppState;

/// Slack sets this on redeliveries of an event it thinks timed out.
pub const RETRY_HEADER: &str = "x-slack-retry-num";

/// Outer Events API envelope. Only the two types the relay acts on are
/// modelled; anything else is acknowledged and ignored.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum EventEnvelope {
    UrlVerification {
        challenge: String,
    },
    EventCallback {
        event: CallbackEvent,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct CallbackEvent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    user: String,
    #[serde(default)]
    channel: String,
}

/// POST /slack/events: Events API receiver.
///
/// `url_verification` echoes the challenge as plain text. An `app_mention`
/// is routed and the reply posted back to its channel before the handler
/// returns. Every other event gets an empty 200.
pub async fn slack_events(
    State(app): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    verify_request(&app.verifier, &headers, &body, BodyFormat::Json)?;

    let envelope: EventEnvelope = serde_json::from_slice(&body)
        .map_err(|e| RelayError::malformed(format!("invalid event payload: {e}")))?;

    match envelope {
        EventEnvelope::UrlVerification { challenge } => {
            tracing::info!("answering Slack url_verification challenge");
            Ok((
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                challenge,
            )
                .into_response())
        }
        EventEnvelope::EventCallback { event } if event.kind == "app_mention" => {
            if let Some(retry) = headers.get(RETRY_HEADER) {
                // The first delivery already dispatched (or is dispatching).
                tracing::info!(retry = ?retry, channel = %event.channel, "ignoring redelivered app_mention");
                return Ok(StatusCode::OK.into_response());
            }
            handle_app_mention(&app, event).await;
            Ok(StatusCode::OK.into_response())
        }
        EventEnvelope::EventCallback { event } => {
            tracing::debug!(kind = %event.kind, "ignoring event callback");
            Ok(StatusCode::OK.into_response())
        }
        EventEnvelope::Other => Ok(StatusCode::OK.into_response()),
    }
}

async fn handle_app_mention(app: &AppState, event: CallbackEvent) {
    let inbound = InboundCommand::mention(strip_mention(&event.text), event.user, event.channel);
    let reply = app.router.handle_mention(&inbound).await;
    let text = reply.render();

    if let Err(e) = app
        .slack
        .post_message(&inbound.source_channel_id, &text)
        .await
    {
        tracing::error!(
            channel = %inbound.source_channel_id,
            error = %e,
            "failed to post reply to Slack"
        );
    }
}
