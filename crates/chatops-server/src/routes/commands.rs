use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use bytes::Bytes;
use chatops_core::form::parse_form;
use chatops_core::{BodyFormat, InboundCommand};

use crate::error::AppError;
use crate::routes::verify_request;
use crate::state::AppState;

/// POST /slack/commands: slash-command receiver.
///
/// The body is a URL-encoded form. The reply goes back synchronously as
/// `{"text": ...}`, which Slack shows only to the invoking user.
pub async fn slack_commands(
    State(app): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, AppError> {
    verify_request(&app.verifier, &headers, &body, BodyFormat::Form)?;

    let form = parse_form(&body)?;
    let inbound = InboundCommand::slash(
        form.value("text"),
        form.value("user_id"),
        form.value("channel_id"),
    );
    let reply = app
        .router
        .handle_slash(form.value("command"), &inbound)
        .await;

    Ok(Json(serde_json::json!({ "text": reply.render() })))
}
