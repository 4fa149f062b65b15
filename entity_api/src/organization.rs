use super::error::{EntityApiErrorKind, Error};
use chrono::Utc;
use entity::organizations::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    ConnectionTrait,
};

pub async fn create(db: &impl ConnectionTrait, organization_model: Model) -> Result<Model, Error> {
    debug!(
        "New Organization Model to be inserted: {:?}",
        organization_model.name
    );

    let now = Utc::now();
    let organization_active_model: ActiveModel = ActiveModel {
        id: Set(Id::new_v4()),
        name: Set(organization_model.name),
        subscription_tier: Set(organization_model.subscription_tier),
        settings: Set(organization_model.settings),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    Ok(organization_active_model.insert(db).await?)
}

pub async fn find_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(|| Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordNotFound,
    })
}

pub async fn find_by_name(db: &impl ConnectionTrait, name: &str) -> Result<Option<Model>, Error> {
    Ok(Entity::find().filter(Column::Name.eq(name)).one(db).await?)
}

/// Replaces the organization's settings document.
pub async fn update_settings(
    db: &impl ConnectionTrait,
    id: Id,
    settings: serde_json::Value,
) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;

    let active_model = ActiveModel {
        id: Unchanged(existing.id),
        name: Unchanged(existing.name),
        subscription_tier: Unchanged(existing.subscription_tier),
        settings: Set(settings),
        created_at: Unchanged(existing.created_at),
        updated_at: Set(Utc::now().into()),
    };

    Ok(active_model.update(db).await?)
}
