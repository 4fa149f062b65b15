//! Call records: upload validation, creation, and tenant-scoped reads.

use crate::error::Error;
use entity::{call_analyses, calls, users, Id};
use entity_api::{call as CallApi, call_analysis as CallAnalysisApi};
use log::*;
use sea_orm::DatabaseConnection;
use service::config::Config;

/// Media types the upload endpoint accepts. Plain text is allowed so that
/// pre-transcribed calls can be ingested directly.
pub const ALLOWED_MEDIA_TYPES: &[&str] = &[
    "audio/mpeg",
    "audio/wav",
    "audio/mp4",
    "video/mp4",
    "text/plain",
];

/// Rejects an upload before any state is created: unsupported media is 415,
/// an oversized payload is 413.
pub fn validate_upload(
    config: &Config,
    content_type: Option<&str>,
    size_bytes: usize,
) -> Result<(), Error> {
    match content_type {
        Some(content_type) if ALLOWED_MEDIA_TYPES.contains(&content_type) => {}
        other => {
            info!("Upload rejected: unsupported media type {other:?}");
            return Err(Error::unsupported_media_type());
        }
    }

    if size_bytes > config.max_upload_bytes {
        info!(
            "Upload rejected: {size_bytes} bytes exceeds the {} byte limit",
            config.max_upload_bytes
        );
        return Err(Error::payload_too_large());
    }

    Ok(())
}

/// Creates the call row in `uploaded` state, owned by the uploader's
/// organization.
pub async fn create(
    db: &DatabaseConnection,
    uploader: &users::Model,
    file_name: String,
    storage_path: String,
) -> Result<calls::Model, Error> {
    let now = chrono::Utc::now();
    let call = CallApi::create(
        db,
        calls::Model {
            id: Id::new_v4(),
            organization_id: uploader.organization_id,
            user_id: uploader.id,
            file_name,
            storage_path,
            transcript: None,
            status: entity::call_status::CallStatus::Uploaded,
            talk_ratio_rep: None,
            talk_ratio_prospect: None,
            error_message: None,
            created_at: now.into(),
            updated_at: now.into(),
        },
    )
    .await?;

    debug!("Call {} created for organization {}", call.id, call.organization_id);
    Ok(call)
}

/// All calls visible to the user's organization, newest first.
pub async fn find_by_organization(
    db: &DatabaseConnection,
    organization_id: Id,
) -> Result<Vec<calls::Model>, Error> {
    Ok(CallApi::find_by_organization(db, organization_id).await?)
}

/// A single call, scoped to the organization. Another tenant's call is
/// `NotFound`, indistinguishable from a missing one.
pub async fn find_for_organization(
    db: &DatabaseConnection,
    id: Id,
    organization_id: Id,
) -> Result<calls::Model, Error> {
    Ok(CallApi::find_by_id_for_organization(db, id, organization_id).await?)
}

/// The analysis for a call, scoped to the organization. Absent analysis
/// (still processing, or failed) is `NotFound`.
pub async fn find_analysis_for_organization(
    db: &DatabaseConnection,
    call_id: Id,
    organization_id: Id,
) -> Result<call_analyses::Model, Error> {
    // Scope through the call row first so a cross-tenant id 404s without
    // revealing whether an analysis exists.
    let call = CallApi::find_by_id_for_organization(db, call_id, organization_id).await?;

    CallAnalysisApi::find_by_call_id(db, call.id)
        .await?
        .ok_or_else(Error::not_found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, ValidationErrorKind};

    #[test]
    fn uploads_with_supported_media_types_pass_validation() {
        let config = Config::default();
        for media_type in ALLOWED_MEDIA_TYPES {
            assert!(validate_upload(&config, Some(media_type), 1024).is_ok());
        }
    }

    #[test]
    fn unsupported_or_missing_media_types_are_rejected() {
        let config = Config::default();

        let err = validate_upload(&config, Some("application/zip"), 1024).unwrap_err();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Validation(ValidationErrorKind::UnsupportedMediaType)
        );

        let err = validate_upload(&config, None, 1024).unwrap_err();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Validation(ValidationErrorKind::UnsupportedMediaType)
        );
    }

    #[test]
    fn oversized_uploads_are_rejected_before_any_state_exists() {
        let mut config = Config::default();
        config.max_upload_bytes = 10;

        let err = validate_upload(&config, Some("text/plain"), 11).unwrap_err();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Validation(ValidationErrorKind::PayloadTooLarge)
        );

        // Exactly at the limit is fine
        assert!(validate_upload(&config, Some("text/plain"), 10).is_ok());
    }
}
