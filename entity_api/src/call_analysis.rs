//! CRUD operations for the call_analyses table.

use super::error::{EntityApiErrorKind, Error};
use crate::call;
use chrono::Utc;
use entity::call_analyses::{ActiveModel, Column, Entity, Model};
use entity::call_status::CallStatus;
use entity::{calls, Id};
use log::*;
use sea_orm::{entity::prelude::*, ActiveValue::Set, ConnectionTrait, TransactionTrait};

/// Scores extracted from the analysis payload for dedicated columns.
#[derive(Debug, Clone, Copy)]
pub struct Scores {
    pub sentiment_score: i32,
    pub buying_intent_score: i32,
    pub closing_probability: i32,
    pub engagement_score: i32,
}

/// Persists an analysis result and advances the call to `analyzed` in one
/// transaction. A crash between the two writes can never leave an analysis
/// row next to an unanalyzed call, or the reverse.
pub async fn record(
    db: &(impl ConnectionTrait + TransactionTrait),
    call_id: Id,
    summary: String,
    scores: Scores,
    payload: serde_json::Value,
) -> Result<(Model, calls::Model), Error> {
    let existing = call::find_by_id(db, call_id).await?;
    if !existing.status.can_transition_to(CallStatus::Analyzed) {
        warn!(
            "Refusing analysis write for call {call_id}: illegal transition {} -> analyzed",
            existing.status
        );
        return Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::ValidationError,
        });
    }

    let txn = db.begin().await?;

    let now = Utc::now();
    let active_model: ActiveModel = ActiveModel {
        id: Set(Id::new_v4()),
        call_id: Set(call_id),
        summary: Set(summary),
        sentiment_score: Set(scores.sentiment_score),
        buying_intent_score: Set(scores.buying_intent_score),
        closing_probability: Set(scores.closing_probability),
        engagement_score: Set(scores.engagement_score),
        payload: Set(payload),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };
    let analysis = active_model.insert(&txn).await?;

    let analyzed_call = call::advance_status(&txn, call_id, CallStatus::Analyzed).await?;

    txn.commit().await?;

    Ok((analysis, analyzed_call))
}

pub async fn find_by_call_id(
    db: &impl ConnectionTrait,
    call_id: Id,
) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::CallId.eq(call_id))
        .one(db)
        .await?)
}
