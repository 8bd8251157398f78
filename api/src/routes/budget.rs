//! Budget chat and export endpoints.

use axum::extract::State;
use axum::{Json, Router, routing::get, routing::post};
use chrono::Utc;
use serde::Serialize;
use serde_json::{Value, json};

use daybook_core::intent::BudgetIntent;
use daybook_core::money::Money;
use daybook_core::store::BudgetStore;
use daybook_core::budget::BudgetCommands;

use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::prompts::BUDGET_PROMPT;
use crate::routes::tasks::ChatRequest;
use crate::state::AppState;
use crate::store_pg::PgStore;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/budget/chat", post(chat))
        .route("/v1/budget/export", get(export))
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct BudgetChatResponse {
    pub success: bool,
    pub message: String,
    pub action: String,
    pub data: Value,
}

#[utoipa::path(
    post,
    path = "/v1/budget/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Command interpreted and executed", body = BudgetChatResponse),
        (status = 401, description = "Missing or invalid API key", body = daybook_core::error::ApiError)
    ),
    security(("bearer_auth" = [])),
    tag = "budget"
)]
pub async fn chat(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<ChatRequest>,
) -> Result<Json<BudgetChatResponse>, AppError> {
    let message = request.message.trim();
    if message.is_empty() {
        return Ok(Json(BudgetChatResponse {
            success: false,
            message: "Please enter a command".to_string(),
            action: "unknown".to_string(),
            data: Value::Null,
        }));
    }

    let raw = state.oracle.interpret(BUDGET_PROMPT, message).await;
    let intent = BudgetIntent::from_value(raw);
    let action = intent.action();

    let store = PgStore::new(state.db.clone());
    let outcome = BudgetCommands::new(&store, user.user_id)
        .execute(intent, Utc::now().date_naive())
        .await?;

    Ok(Json(BudgetChatResponse {
        success: outcome.success,
        message: outcome.message,
        action: action.to_string(),
        data: outcome.payload,
    }))
}

const EXPORT_LIMIT: i64 = 10;

#[derive(Serialize, utoipa::ToSchema)]
pub struct BudgetExportResponse {
    pub incomes: Vec<Value>,
    pub expenses: Vec<Value>,
    pub total_income: f64,
    pub total_expense: f64,
    pub balance: f64,
}

/// Recent transactions plus all-time totals, for client-side display.
#[utoipa::path(
    get,
    path = "/v1/budget/export",
    responses(
        (status = 200, description = "Recent transactions and totals", body = BudgetExportResponse),
        (status = 401, description = "Missing or invalid API key", body = daybook_core::error::ApiError)
    ),
    security(("bearer_auth" = [])),
    tag = "budget"
)]
pub async fn export(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<BudgetExportResponse>, AppError> {
    let store = PgStore::new(state.db.clone());

    let recent_incomes = store.recent_incomes(user.user_id, EXPORT_LIMIT).await?;
    let recent_expenses = store.recent_expenses(user.user_id, EXPORT_LIMIT).await?;

    let all_incomes = store.incomes_between(user.user_id, None, None).await?;
    let all_expenses = store.expenses_between(user.user_id, None, None).await?;
    let total_income: Money = all_incomes.iter().map(|i| i.amount).sum();
    let total_expense: Money = all_expenses.iter().map(|e| e.amount).sum();

    let incomes = recent_incomes
        .iter()
        .map(|income| {
            json!({
                "id": income.id,
                "amount": income.amount.to_f64(),
                "source": income.source,
                "date": income.date,
                "note": income.note,
            })
        })
        .collect();

    let expenses = recent_expenses
        .iter()
        .map(|expense| {
            json!({
                "id": expense.id,
                "amount": expense.amount.to_f64(),
                "description": expense.description,
                "category": expense.category_name(),
                "date": expense.date,
            })
        })
        .collect();

    Ok(Json(BudgetExportResponse {
        incomes,
        expenses,
        total_income: total_income.to_f64(),
        total_expense: total_expense.to_f64(),
        balance: (total_income - total_expense).to_f64(),
    }))
}
