//! Organization settings templates: CRM field mapping and the analysis
//! template. Both directions are gated to manager/admin principals.

use crate::controller::ApiResponse;
use crate::extractors::authenticated_user::AuthenticatedUser;
use crate::params::settings::TemplatesParams;
use crate::{AppState, Error};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use log::*;

/// GET /settings/templates
#[utoipa::path(
    get,
    path = "/settings/templates",
    responses(
        (status = 200, description = "The organization's template settings"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not a manager or admin"),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn read(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    domain::user::require_manager_or_admin(&user)?;

    let templates =
        domain::organization::templates(app_state.db_conn_ref(), user.organization_id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), templates)))
}

/// PUT /settings/templates
///
/// Replaces the two template documents, leaving any other organization
/// settings untouched.
#[utoipa::path(
    put,
    path = "/settings/templates",
    request_body = TemplatesParams,
    responses(
        (status = 200, description = "Updated template settings"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not a manager or admin"),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Json(params): Json<TemplatesParams>,
) -> Result<impl IntoResponse, Error> {
    domain::user::require_manager_or_admin(&user)?;

    debug!(
        "Updating settings templates for organization {}",
        user.organization_id
    );
    let templates = domain::organization::update_templates(
        app_state.db_conn_ref(),
        user.organization_id,
        params.into(),
    )
    .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), templates)))
}
