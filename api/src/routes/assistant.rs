//! Free-form support chat. Unlike the command endpoints this one has no
//! structured grammar; the completion text is returned verbatim.

use axum::extract::State;
use axum::{Json, Router, routing::post};
use serde::{Deserialize, Serialize};

use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::prompts::ASSISTANT_PROMPT;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/v1/assistant/chat", post(chat))
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct AssistantRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AssistantResponse {
    pub reply: String,
}

#[utoipa::path(
    post,
    path = "/v1/assistant/chat",
    request_body = AssistantRequest,
    responses(
        (status = 200, description = "Assistant reply", body = AssistantResponse),
        (status = 400, description = "Empty message", body = daybook_core::error::ApiError),
        (status = 401, description = "Missing or invalid API key", body = daybook_core::error::ApiError)
    ),
    security(("bearer_auth" = [])),
    tag = "assistant"
)]
pub async fn chat(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(request): Json<AssistantRequest>,
) -> Result<Json<AssistantResponse>, AppError> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(AppError::Validation {
            message: "Message is required".to_string(),
            field: Some("message".to_string()),
        });
    }

    let reply = state
        .oracle
        .chat(ASSISTANT_PROMPT, message)
        .await
        .map_err(|err| AppError::Internal(err.to_string()))?;

    Ok(Json(AssistantResponse { reply }))
}
