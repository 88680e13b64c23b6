//! Expenses API endpoints

use api_types::expense::{
    ExpenseListResponse, ExpenseNew, ExpenseView, ParticipantView, SplitMethod as ApiMethod,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{ExpenseNewCmd, RawParticipant, StoredExpense};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn map_method(method: engine::SplitMethod) -> ApiMethod {
    match method {
        engine::SplitMethod::Equal => ApiMethod::Equal,
        engine::SplitMethod::Exact => ApiMethod::Exact,
        engine::SplitMethod::Percentage => ApiMethod::Percentage,
    }
}

pub(crate) fn expense_view(stored: StoredExpense) -> ExpenseView {
    let StoredExpense { id, expense } = stored;
    ExpenseView {
        id,
        description: expense.description,
        total_amount: expense.total.to_decimal(),
        split_method: map_method(expense.split_method),
        participants: expense
            .participants
            .into_iter()
            .map(|p| ParticipantView {
                user_id: p.user.id,
                name: p.user.name,
                email: p.user.email,
                share: p.share.to_decimal(),
            })
            .collect(),
        created_at: expense.created_at,
    }
}

fn expense_list(expenses: Vec<StoredExpense>) -> ExpenseListResponse {
    ExpenseListResponse {
        expenses: expenses.into_iter().map(expense_view).collect(),
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    let cmd = ExpenseNewCmd::new(
        payload.description,
        payload.total_amount,
        payload.split_method,
    )
    .participants(
        payload
            .participants
            .into_iter()
            .map(|p| RawParticipant::new(p.user, p.share))
            .collect(),
    );

    let stored = state.engine.create_expense(cmd).await?;

    Ok((StatusCode::CREATED, Json(expense_view(stored))))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
) -> Result<Json<ExpenseView>, ServerError> {
    let stored = state.engine.expense(expense_id).await?;
    Ok(Json(expense_view(stored)))
}

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<ExpenseListResponse>, ServerError> {
    let expenses = state.engine.list_expenses().await?;
    Ok(Json(expense_list(expenses)))
}

pub async fn list_for_user(
    State(state): State<ServerState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ExpenseListResponse>, ServerError> {
    let expenses = state.engine.expenses_for_user(user_id).await?;
    Ok(Json(expense_list(expenses)))
}
