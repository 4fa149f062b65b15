use super::error::{EntityApiErrorKind, Error};
use chrono::Utc;

use entity::roles::Role;
use entity::users::{ActiveModel, Column, Entity, Model};
use entity::{organizations, Id};
use log::*;
use password_auth;
use sea_orm::{entity::prelude::*, ConnectionTrait, Set, TransactionTrait};

pub async fn create(db: &impl ConnectionTrait, user_model: Model) -> Result<Model, Error> {
    debug!("New User Model to be inserted: {:?}", user_model.email);

    let now = Utc::now();
    let user_active_model: ActiveModel = ActiveModel {
        id: Set(Id::new_v4()),
        organization_id: Set(user_model.organization_id),
        email: Set(user_model.email),
        full_name: Set(user_model.full_name),
        password: Set(generate_hash(user_model.password)),
        role: Set(user_model.role),
        is_active: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    Ok(user_active_model.insert(db).await?)
}

/// Creates a new organization together with its first admin user inside a
/// single transaction, so registration never leaves a user-less organization
/// or an organization-less user behind.
pub async fn create_with_organization(
    db: &impl TransactionTrait,
    organization_name: String,
    mut user_model: Model,
) -> Result<(organizations::Model, Model), Error> {
    let txn = db.begin().await?;

    let now = Utc::now();
    let organization_active_model = organizations::ActiveModel {
        id: Set(Id::new_v4()),
        name: Set(organization_name),
        subscription_tier: Set("professional".to_string()),
        settings: Set(serde_json::json!({})),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };
    let organization = organization_active_model.insert(&txn).await?;

    user_model.organization_id = organization.id;
    user_model.role = Role::Admin;
    let user = create(&txn, user_model).await?;

    txn.commit().await?;

    Ok((organization, user))
}

pub async fn find_by_email(db: &impl ConnectionTrait, email: &str) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::Email.eq(email))
        .one(db)
        .await?)
}

pub async fn find_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(|| Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordNotFound,
    })
}

pub async fn verify_password(password_to_verify: &str, password_hash: &str) -> Result<(), Error> {
    match password_auth::verify_password(password_to_verify, password_hash) {
        Ok(_) => Ok(()),
        Err(_) => Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordUnauthenticated,
        }),
    }
}

pub fn generate_hash(password: String) -> String {
    password_auth::generate_hash(password)
}
