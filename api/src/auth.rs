use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user extracted from the `Authorization: Bearer dbk_sk_…`
/// header. Every handler receives the user id from here and threads it
/// explicitly into the command handlers; there is no ambient current user.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub key_id: Uuid,
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized {
                message: "Missing Authorization header".to_string(),
                docs_hint: Some(
                    "Include 'Authorization: Bearer <key>' header with a dbk_sk_... API key."
                        .to_string(),
                ),
            })?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized {
                message: "Authorization header must use Bearer scheme".to_string(),
                docs_hint: Some("Format: 'Authorization: Bearer <key>'".to_string()),
            })?;

        if !token.starts_with("dbk_sk_") {
            return Err(AppError::Unauthorized {
                message: "Invalid token format".to_string(),
                docs_hint: Some("API keys start with 'dbk_sk_'.".to_string()),
            });
        }

        authenticate_api_key(token, &state.db).await
    }
}

async fn authenticate_api_key(token: &str, pool: &sqlx::PgPool) -> Result<AuthenticatedUser, AppError> {
    let token_hash = daybook_core::auth::hash_token(token);

    let row = sqlx::query_as::<_, ApiKeyRow>(
        "SELECT ak.id, ak.user_id \
         FROM api_keys ak \
         JOIN users u ON u.id = ak.user_id \
         WHERE ak.key_hash = $1 \
           AND ak.is_revoked = FALSE \
           AND u.is_active = TRUE",
    )
    .bind(&token_hash)
    .fetch_optional(pool)
    .await
    .map_err(AppError::Database)?
    .ok_or_else(|| AppError::Unauthorized {
        message: "Invalid API key".to_string(),
        docs_hint: Some("Check that the API key is correct and has not been revoked.".to_string()),
    })?;

    // Fire-and-forget last_used_at update
    let pool_clone = pool.clone();
    let key_id = row.id;
    tokio::spawn(async move {
        let _ = sqlx::query("UPDATE api_keys SET last_used_at = NOW() WHERE id = $1")
            .bind(key_id)
            .execute(&pool_clone)
            .await;
    });

    Ok(AuthenticatedUser {
        user_id: row.user_id,
        key_id: row.id,
    })
}

#[derive(sqlx::FromRow)]
struct ApiKeyRow {
    id: Uuid,
    user_id: Uuid,
}
