//! Managing additional users inside the caller's organization.

use crate::controller::ApiResponse;
use crate::extractors::authenticated_user::AuthenticatedUser;
use crate::params::user::CreateUserParams;
use crate::{AppState, Error};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use log::*;

/// POST /users
///
/// Creates a user with an explicit role inside the caller's organization.
/// The new user always lands in the caller's tenant; there is no way to
/// create a user elsewhere.
#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateUserParams,
    responses(
        (status = 201, description = "User created", body = domain::users::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not a manager or admin"),
        (status = 409, description = "Email already registered"),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Json(params): Json<CreateUserParams>,
) -> Result<impl IntoResponse, Error> {
    domain::user::require_manager_or_admin(&user)?;

    let created = domain::user::create_in_organization(
        app_state.db_conn_ref(),
        &user,
        params.email,
        params.full_name,
        params.password,
        params.role,
    )
    .await?;
    info!(
        "User {} created in organization {} by {}",
        created.id, created.organization_id, user.id
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StatusCode::CREATED.into(), created)),
    ))
}
