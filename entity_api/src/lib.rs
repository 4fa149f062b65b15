use log::*;
use sea_orm::{ConnectionTrait, DatabaseConnection, Schema};

pub use entity::{call_analyses, call_status, calls, organizations, roles, users, Id};

pub mod call;
pub mod call_analysis;
pub mod error;
pub mod organization;
pub mod user;

/// Creates any missing tables from the entity definitions. A stand-in for a
/// full migration history: every statement is `CREATE TABLE IF NOT EXISTS`,
/// so running it against an already-initialized database is a no-op.
pub async fn init_schema(db: &DatabaseConnection) -> Result<(), error::Error> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut statements = [
        schema.create_table_from_entity(organizations::Entity),
        schema.create_table_from_entity(users::Entity),
        schema.create_table_from_entity(calls::Entity),
        schema.create_table_from_entity(call_analyses::Entity),
    ];

    for statement in statements.iter_mut() {
        statement.if_not_exists();
        db.execute(backend.build(&*statement)).await?;
    }

    info!("Database schema initialized");
    Ok(())
}

/// Seeds a development database with a demo organization and one user per
/// role. Intended for the `seed_db` binary only.
pub async fn seed_database(db: &DatabaseConnection) {
    let now = chrono::Utc::now();

    let (organization, _admin) = user::create_with_organization(
        db,
        "Peak Performance Sales".to_owned(),
        users::Model {
            id: Id::new_v4(),
            organization_id: Id::new_v4(),
            email: "admin@peakperformance.test".to_owned(),
            full_name: "Avery Admin".to_owned(),
            password: "password".to_owned(),
            role: roles::Role::Admin,
            is_active: true,
            created_at: now.into(),
            updated_at: now.into(),
        },
    )
    .await
    .unwrap();

    user::create(
        db,
        users::Model {
            id: Id::new_v4(),
            organization_id: organization.id,
            email: "manager@peakperformance.test".to_owned(),
            full_name: "Morgan Manager".to_owned(),
            password: "password".to_owned(),
            role: roles::Role::Manager,
            is_active: true,
            created_at: now.into(),
            updated_at: now.into(),
        },
    )
    .await
    .unwrap();

    user::create(
        db,
        users::Model {
            id: Id::new_v4(),
            organization_id: organization.id,
            email: "rep@peakperformance.test".to_owned(),
            full_name: "Riley Rep".to_owned(),
            password: "password".to_owned(),
            role: roles::Role::Rep,
            is_active: true,
            created_at: now.into(),
            updated_at: now.into(),
        },
    )
    .await
    .unwrap();

    info!("Seeded organization {}", organization.name);
}
