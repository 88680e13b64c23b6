use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerState, router, run_with_listener};

mod balances;
mod expenses;
mod server;
mod users;

pub mod types {
    pub mod user {
        pub use api_types::user::{UserListResponse, UserNew, UserView};
    }

    pub mod expense {
        pub use api_types::expense::{
            ExpenseListResponse, ExpenseNew, ExpenseView, ParticipantNew, ParticipantView,
            SplitMethod,
        };
    }

    pub mod balance {
        pub use api_types::balance::{BalanceSheet, UserBalanceView};
    }
}

pub enum ServerError {
    Engine(EngineError),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::ParticipantNotFound(_)
        | EngineError::InvalidSplitMethod(_)
        | EngineError::ShareMismatch { .. }
        | EngineError::PercentageMismatch { .. }
        | EngineError::InvalidAmount(_)
        | EngineError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let ServerError::Engine(err) = self;
        let status = status_for_engine_error(&err);
        let error = message_for_engine_error(err);

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
