use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};

use super::{AppState, required};
use crate::{
    error::{AppError, Result},
    extract::Json,
    models::user::{LoggedInUser, LoginRequest, LoginResponse, Role, SignupRequest, SuccessResponse},
};

/// Validate a signup body and create the account
pub(crate) async fn create_account(state: &AppState, request: SignupRequest) -> Result<()> {
    let email = required(request.email, "email")?;
    let password = required(request.password, "password")?;
    let role: Role = required(request.role, "role")?.parse()?;

    // Hashing and the duplicate check happen in the store
    state.store.register(&email, &password, role).await
}

/// Handler for public signup
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<impl IntoResponse> {
    create_account(&state, request).await?;
    Ok((StatusCode::OK, Json(SuccessResponse::ok())))
}

/// Handler for email/password login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let email = required(request.email, "email")?;
    let password = required(request.password, "password")?;

    // Unknown users and wrong passwords get the same answer
    let Some(role) = state.store.authenticate(&email, &password).await? else {
        tracing::info!("Failed login for {}", email);
        return Err(AppError::InvalidCredentials);
    };

    tracing::info!("{} logged in as {}", email, role);

    // Return the response
    let response = LoginResponse {
        success: true,
        user: LoggedInUser {
            username: email,
            role,
        },
    };

    Ok((StatusCode::OK, Json(response)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::db::test_support::TestDb;
    use crate::handlers::test_support::{post_json, send, state_for};

    #[tokio::test]
    async fn signup_then_login() {
        let db = TestDb::new().await;
        let state = state_for(&db);

        let (status, body) = send(
            &state,
            post_json(
                "/api/signup",
                json!({"email": "a@x.com", "password": "pw1", "role": "student"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true}));

        let (status, body) = send(
            &state,
            post_json("/api/login", json!({"email": "a@x.com", "password": "pw1"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"success": true, "user": {"username": "a@x.com", "role": "student"}})
        );

        db.teardown().await;
    }

    #[tokio::test]
    async fn signup_reports_duplicates_and_missing_fields() {
        let db = TestDb::new().await;
        let state = state_for(&db);
        let body = json!({"email": "a@x.com", "password": "pw1", "role": "teacher"});

        let (status, _) = send(&state, post_json("/api/signup", body.clone())).await;
        assert_eq!(status, StatusCode::OK);

        let (status, response) = send(&state, post_json("/api/signup", body)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(response["success"], false);
        assert!(response["message"].is_string());

        let (status, _) = send(
            &state,
            post_json("/api/signup", json!({"email": "b@x.com", "password": "pw"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &state,
            post_json("/api/signup", json!({"email": "", "password": "pw", "role": "admin"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, response) = send(
            &state,
            post_json(
                "/api/signup",
                json!({"email": "c@x.com", "password": "pw", "role": "alumno"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["message"], "Invalid role: alumno");

        db.teardown().await;
    }

    #[tokio::test]
    async fn wrongly_typed_bodies_are_bad_requests() {
        let db = TestDb::new().await;
        let state = state_for(&db);

        let (status, body) = send(
            &state,
            post_json(
                "/api/signup",
                json!({"email": 5, "password": "pw", "role": "student"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["message"].as_str().unwrap().starts_with("Invalid request body"));

        let (status, body) = send(
            &state,
            post_json("/api/login", json!({"email": "a@x.com", "password": ["x"]})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        db.teardown().await;
    }

    #[tokio::test]
    async fn login_failures_are_uniform() {
        let db = TestDb::new().await;
        let state = state_for(&db);

        send(
            &state,
            post_json(
                "/api/signup",
                json!({"email": "a@x.com", "password": "pw1", "role": "student"}),
            ),
        )
        .await;

        let (wrong_status, wrong_body) = send(
            &state,
            post_json("/api/login", json!({"email": "a@x.com", "password": "pw2"})),
        )
        .await;
        let (unknown_status, unknown_body) = send(
            &state,
            post_json("/api/login", json!({"email": "z@x.com", "password": "pw1"})),
        )
        .await;

        assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_status, unknown_status);
        assert_eq!(wrong_body, unknown_body);

        let (status, _) = send(&state, post_json("/api/login", json!({"email": "a@x.com"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        db.teardown().await;
    }
}
