//! Balance sheet endpoint

use api_types::balance::{BalanceSheet, UserBalanceView};
use axum::{Json, extract::State};

use crate::{ServerError, server::ServerState};

pub async fn get(State(state): State<ServerState>) -> Result<Json<BalanceSheet>, ServerError> {
    let balances = state
        .engine
        .balances()
        .await?
        .into_iter()
        .map(|balance| UserBalanceView {
            user_id: balance.user.id,
            name: balance.user.name,
            email: balance.user.email,
            owed: balance.owed.to_decimal(),
            expenses: balance.expenses,
        })
        .collect();

    Ok(Json(BalanceSheet { balances }))
}
