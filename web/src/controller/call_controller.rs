//! Upload and read endpoints for calls and their analyses.
//!
//! Upload validates the file before creating any state, stores it, creates
//! the call row, and runs the processing pipeline inline so the response
//! carries the final (`analyzed` or `failed`) state.

use crate::controller::ApiResponse;
use crate::extractors::authenticated_user::AuthenticatedUser;
use crate::response::call::CallWithAnalysis;
use crate::{AppState, Error};

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::error::Error as DomainError;
use domain::Id;
use log::*;
use std::path::Path as FilePath;

/// POST /calls/upload
///
/// Multipart upload of one media file under the `file` field. The pipeline
/// (transcribe, analyze) runs before the response; a processing failure
/// leaves the call queryable in `failed` state and surfaces a generic 500.
#[utoipa::path(
    post,
    path = "/calls/upload",
    responses(
        (status = 200, description = "Call processed", body = CallWithAnalysis),
        (status = 401, description = "Unauthorized"),
        (status = 413, description = "File exceeds the configured size limit"),
        (status = 415, description = "Unsupported media type"),
        (status = 500, description = "Processing failed; the call is persisted as failed"),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, Error> {
    let db = app_state.db_conn_ref();

    let mut upload: Option<(String, Option<String>, axum::body::Bytes)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| Error::from(DomainError::invalid("Malformed multipart body")))?
    {
        if field.name() == Some("file") {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let content_type = field.content_type().map(str::to_string);
            // A body over the route's size limit fails right here, before any
            // call row exists.
            let bytes = field
                .bytes()
                .await
                .map_err(|_| Error::from(DomainError::payload_too_large()))?;
            upload = Some((file_name, content_type, bytes));
        }
    }

    let (file_name, content_type, bytes) = upload
        .ok_or_else(|| Error::from(DomainError::invalid("Missing multipart field 'file'")))?;

    domain::call::validate_upload(&app_state.config, content_type.as_deref(), bytes.len())?;

    let storage_path = store_file(&app_state, &file_name, &bytes).await?;

    let call = domain::call::create(db, &user, file_name, storage_path).await?;
    info!("Call {} uploaded by user {}", call.id, user.id);

    let (call, analysis) = app_state.call_pipeline.process(db, call.id).await?;

    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        CallWithAnalysis::new(call, Some(analysis)),
    )))
}

/// GET /calls
///
/// All calls belonging to the caller's organization, newest first.
#[utoipa::path(
    get,
    path = "/calls",
    responses(
        (status = 200, description = "Calls for the caller's organization", body = Vec<domain::calls::Model>),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn index(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    let calls =
        domain::call::find_by_organization(app_state.db_conn_ref(), user.organization_id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), calls)))
}

/// GET /calls/:id
///
/// A single call, scoped to the caller's organization. A call in another
/// organization is a 404, never a 403.
#[utoipa::path(
    get,
    path = "/calls/{id}",
    params(
        ("id" = Id, Path, description = "Call id"),
    ),
    responses(
        (status = 200, description = "The call", body = domain::calls::Model),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No such call in the caller's organization"),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn read(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    let call = domain::call::find_for_organization(
        app_state.db_conn_ref(),
        id,
        user.organization_id,
    )
    .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), call)))
}

/// GET /calls/:id/analysis
///
/// The stored analysis for a call. 404 while the call is unprocessed or
/// failed, and for calls outside the caller's organization.
#[utoipa::path(
    get,
    path = "/calls/{id}/analysis",
    params(
        ("id" = Id, Path, description = "Call id"),
    ),
    responses(
        (status = 200, description = "The analysis", body = domain::call_analyses::Model),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Call or analysis not found"),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn read_analysis(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    let analysis = domain::call::find_analysis_for_organization(
        app_state.db_conn_ref(),
        id,
        user.organization_id,
    )
    .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), analysis)))
}

/// Writes the upload to the storage directory under a collision-free name
/// derived from the original one.
async fn store_file(
    app_state: &AppState,
    file_name: &str,
    bytes: &[u8],
) -> Result<String, Error> {
    let storage_dir = FilePath::new(&app_state.config.storage_path);
    tokio::fs::create_dir_all(storage_dir).await.map_err(|err| {
        error!("Could not create storage directory: {err}");
        Error::from(DomainError::internal("Storage directory unavailable"))
    })?;

    // Keep only the terminal path component of whatever the client sent.
    let safe_name = FilePath::new(file_name)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("upload");
    let stored_name = format!("{}-{}", Id::new_v4(), safe_name);
    let destination = storage_dir.join(stored_name);

    tokio::fs::write(&destination, bytes).await.map_err(|err| {
        error!("Could not persist upload: {err}");
        Error::from(DomainError::internal("Storage write failed"))
    })?;

    Ok(destination.to_string_lossy().into_owned())
}
