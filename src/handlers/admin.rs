use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use super::{AppState, auth::create_account};
use crate::{
    error::Result,
    extract::Json,
    models::user::{DeleteUserRequest, Role, SearchParams, SignupRequest, StatsResponse, SuccessResponse},
};

/// Dashboard counts. Quizzes are not tracked yet and always report zero.
pub async fn stats(State(state): State<AppState>) -> Result<impl IntoResponse> {
    // Count students and teachers
    let students = state.store.count_by_role(Role::Student).await?;
    let teachers = state.store.count_by_role(Role::Teacher).await?;

    Ok((
        StatusCode::OK,
        Json(StatsResponse {
            students,
            teachers,
            quizzes: 0,
        }),
    ))
}

/// List users, optionally filtered by `?search=`
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse> {
    let users = state.store.list_users(params.search.as_deref()).await?;
    Ok((StatusCode::OK, Json(users)))
}

/// Create a user from the admin panel
pub async fn add_user(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<impl IntoResponse> {
    create_account(&state, request).await?;
    Ok((StatusCode::OK, Json(SuccessResponse::ok())))
}

/// Delete a user from the admin panel
pub async fn delete_user(
    State(state): State<AppState>,
    Json(request): Json<DeleteUserRequest>,
) -> Result<impl IntoResponse> {
    // Non-numeric ids count as missing
    let id = request.id.and_then(|id| id.as_i64());
    state.store.delete_user(id).await?;
    Ok((StatusCode::OK, Json(SuccessResponse::ok())))
}
