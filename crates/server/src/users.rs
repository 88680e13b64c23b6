//! Users API endpoints

use api_types::user::{UserListResponse, UserNew, UserView};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{User, UserNewCmd};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn user_view(user: User) -> UserView {
    UserView {
        id: user.id,
        name: user.name,
        email: user.email,
        mobile: user.mobile,
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<UserNew>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let mut cmd = UserNewCmd::new(payload.name, payload.email);
    if let Some(mobile) = payload.mobile {
        cmd = cmd.mobile(mobile);
    }
    let user = state.engine.create_user(cmd).await?;

    Ok((StatusCode::CREATED, Json(user_view(user))))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserView>, ServerError> {
    let user = state.engine.user(user_id).await?;
    Ok(Json(user_view(user)))
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<UserListResponse>, ServerError> {
    let users = state
        .engine
        .list_users()
        .await?
        .into_iter()
        .map(user_view)
        .collect();
    Ok(Json(UserListResponse { users }))
}
