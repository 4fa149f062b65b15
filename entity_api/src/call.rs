//! CRUD operations for the calls table.
//!
//! Every status write goes through `CallStatus::can_transition_to`, so an
//! illegal move (any regression, or leaving a terminal state) is refused here
//! rather than silently persisted.

use super::error::{EntityApiErrorKind, Error};
use chrono::Utc;
use entity::call_status::CallStatus;
use entity::calls::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    ConnectionTrait, QueryOrder,
};

/// Creates a new call record in `uploaded` state.
pub async fn create(db: &impl ConnectionTrait, call_model: Model) -> Result<Model, Error> {
    debug!("New Call to be inserted: {:?}", call_model.file_name);

    let now = Utc::now();
    let active_model: ActiveModel = ActiveModel {
        id: Set(Id::new_v4()),
        organization_id: Set(call_model.organization_id),
        user_id: Set(call_model.user_id),
        file_name: Set(call_model.file_name),
        storage_path: Set(call_model.storage_path),
        transcript: Set(None),
        status: Set(CallStatus::Uploaded),
        talk_ratio_rep: Set(None),
        talk_ratio_prospect: Set(None),
        error_message: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    Ok(active_model.insert(db).await?)
}

pub async fn find_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(|| Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordNotFound,
    })
}

/// Finds a call visible to the given organization. A call belonging to
/// another tenant is indistinguishable from a missing one.
pub async fn find_by_id_for_organization(
    db: &impl ConnectionTrait,
    id: Id,
    organization_id: Id,
) -> Result<Model, Error> {
    Entity::find_by_id(id)
        .filter(Column::OrganizationId.eq(organization_id))
        .one(db)
        .await?
        .ok_or_else(|| Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotFound,
        })
}

/// All calls for an organization, newest first.
pub async fn find_by_organization(
    db: &impl ConnectionTrait,
    organization_id: Id,
) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::OrganizationId.eq(organization_id))
        .order_by_desc(Column::CreatedAt)
        .all(db)
        .await?)
}

/// Stores transcription output and advances the call to `transcribed` in a
/// single committed update.
pub async fn record_transcription(
    db: &impl ConnectionTrait,
    id: Id,
    transcript: String,
    talk_ratio_rep: f64,
    talk_ratio_prospect: f64,
) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;

    if !existing.status.can_transition_to(CallStatus::Transcribed) {
        warn!(
            "Refusing transcription write for call {id}: illegal transition {} -> transcribed",
            existing.status
        );
        return Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::ValidationError,
        });
    }

    let active_model = ActiveModel {
        id: Unchanged(existing.id),
        organization_id: Unchanged(existing.organization_id),
        user_id: Unchanged(existing.user_id),
        file_name: Unchanged(existing.file_name),
        storage_path: Unchanged(existing.storage_path),
        transcript: Set(Some(transcript)),
        status: Set(CallStatus::Transcribed),
        talk_ratio_rep: Set(Some(talk_ratio_rep)),
        talk_ratio_prospect: Set(Some(talk_ratio_prospect)),
        error_message: Unchanged(existing.error_message),
        created_at: Unchanged(existing.created_at),
        updated_at: Set(Utc::now().into()),
    };

    Ok(active_model.update(db).await?)
}

/// Advances the call to a new status without touching other fields.
pub async fn advance_status(
    db: &impl ConnectionTrait,
    id: Id,
    status: CallStatus,
) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;

    if !existing.status.can_transition_to(status) {
        warn!(
            "Refusing status write for call {id}: illegal transition {} -> {status}",
            existing.status
        );
        return Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::ValidationError,
        });
    }

    update_status_fields(db, existing, status, None).await
}

/// Marks a call as terminally failed, attaching an error marker. The row
/// stays queryable; only the status and marker change.
pub async fn mark_failed(
    db: &impl ConnectionTrait,
    id: Id,
    error_message: String,
) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;

    if !existing.status.can_transition_to(CallStatus::Failed) {
        warn!(
            "Refusing failure write for call {id}: illegal transition {} -> failed",
            existing.status
        );
        return Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::ValidationError,
        });
    }

    update_status_fields(db, existing, CallStatus::Failed, Some(error_message)).await
}

async fn update_status_fields(
    db: &impl ConnectionTrait,
    existing: Model,
    status: CallStatus,
    error_message: Option<String>,
) -> Result<Model, Error> {
    let active_model = ActiveModel {
        id: Unchanged(existing.id),
        organization_id: Unchanged(existing.organization_id),
        user_id: Unchanged(existing.user_id),
        file_name: Unchanged(existing.file_name),
        storage_path: Unchanged(existing.storage_path),
        transcript: Unchanged(existing.transcript),
        status: Set(status),
        talk_ratio_rep: Unchanged(existing.talk_ratio_rep),
        talk_ratio_prospect: Unchanged(existing.talk_ratio_prospect),
        error_message: match error_message {
            Some(message) => Set(Some(message)),
            None => Unchanged(existing.error_message),
        },
        created_at: Unchanged(existing.created_at),
        updated_at: Set(Utc::now().into()),
    };

    Ok(active_model.update(db).await?)
}
