//! Standalone organization creation, for provisioning tenants beyond the
//! self-service register flow.

use crate::controller::ApiResponse;
use crate::extractors::authenticated_user::AuthenticatedUser;
use crate::params::organization::CreateOrganizationParams;
use crate::{AppState, Error};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use log::*;

/// POST /organizations
#[utoipa::path(
    post,
    path = "/organizations",
    request_body = CreateOrganizationParams,
    responses(
        (status = 201, description = "Organization created", body = domain::organizations::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not a manager or admin"),
        (status = 409, description = "Organization name already exists"),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Json(params): Json<CreateOrganizationParams>,
) -> Result<impl IntoResponse, Error> {
    domain::user::require_manager_or_admin(&user)?;

    let organization =
        domain::organization::create(app_state.db_conn_ref(), params.name).await?;
    info!("Organization {} created by user {}", organization.id, user.id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StatusCode::CREATED.into(), organization)),
    ))
}
