//! Registration, login, and the current-principal endpoint.

use crate::controller::ApiResponse;
use crate::extractors::authenticated_user::AuthenticatedUser;
use crate::params::auth::{LoginParams, RegisterParams};
use crate::response::auth::TokenResponse;
use crate::{AppState, Error};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use log::*;

/// POST /auth/register
///
/// Creates a new organization together with its first admin user in one
/// transaction.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterParams,
    responses(
        (status = 201, description = "Organization and admin user created", body = domain::users::Model),
        (status = 409, description = "Email or organization name already registered"),
        (status = 422, description = "Malformed request body"),
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    Json(params): Json<RegisterParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST /auth/register for organization {}", params.organization_name);

    let (_organization, user) = domain::user::register(
        app_state.db_conn_ref(),
        params.organization_name,
        params.full_name,
        params.email,
        params.password,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StatusCode::CREATED.into(), user)),
    ))
}

/// POST /auth/login
///
/// Exchanges email/password credentials for a bearer access token. Wrong
/// password and unknown email are the same 401.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginParams,
    responses(
        (status = 200, description = "Logged in, token returned", body = TokenResponse),
        (status = 401, description = "Unauthorized"),
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(params): Json<LoginParams>,
) -> Result<impl IntoResponse, Error> {
    let user =
        domain::user::authenticate(app_state.db_conn_ref(), &params.email, &params.password)
            .await
            .map_err(|err| {
                warn!("Login failed for a credential pair");
                err
            })?;

    let token = domain::jwt::issue_token(user.id, &app_state.config)?;

    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        TokenResponse::bearer(token),
    )))
}

/// GET /auth/me
///
/// The authenticated principal behind the presented token.
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "The authenticated user", body = domain::users::Model),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn me(AuthenticatedUser(user): AuthenticatedUser) -> Result<impl IntoResponse, Error> {
    Ok(Json(ApiResponse::new(StatusCode::OK.into(), user)))
}
