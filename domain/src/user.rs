//! User registration, authentication, and role checks.

use crate::error::Error;
use entity::roles::Role;
use entity::{organizations, users, Id};
use entity_api::error::EntityApiErrorKind;
use entity_api::user as UserApi;
use log::*;
use sea_orm::DatabaseConnection;

pub use entity_api::user::{find_by_email, find_by_id};

/// Creates a new organization and its first admin user atomically.
/// Fails with `Conflict` when the email or the organization name is taken.
pub async fn register(
    db: &DatabaseConnection,
    organization_name: String,
    full_name: String,
    email: String,
    password: String,
) -> Result<(organizations::Model, users::Model), Error> {
    if UserApi::find_by_email(db, &email).await?.is_some() {
        info!("Registration rejected: email already in use");
        return Err(Error::conflict());
    }
    if entity_api::organization::find_by_name(db, &organization_name)
        .await?
        .is_some()
    {
        info!("Registration rejected: organization name already in use");
        return Err(Error::conflict());
    }

    let user_model = users::Model {
        id: Id::new_v4(),
        organization_id: Id::new_v4(), // replaced inside the transaction
        email,
        full_name,
        password,
        role: Role::Admin,
        is_active: true,
        created_at: chrono::Utc::now().into(),
        updated_at: chrono::Utc::now().into(),
    };

    let (organization, user) =
        UserApi::create_with_organization(db, organization_name, user_model).await?;

    info!(
        "Registered organization {} with admin user {}",
        organization.id, user.id
    );
    Ok((organization, user))
}

/// Resolves an email/password pair to an active user.
///
/// A missing account, a wrong password, and a deactivated account are all the
/// same `Unauthenticated` outcome; nothing distinguishes "email exists" from
/// "email does not".
pub async fn authenticate(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
) -> Result<users::Model, Error> {
    let user = match UserApi::find_by_email(db, email).await? {
        Some(user) => user,
        None => {
            info!("Authentication failed: unknown email");
            return Err(Error::unauthenticated());
        }
    };

    UserApi::verify_password(password, &user.password).await?;

    if !user.is_active {
        info!("Authentication failed: user {} is inactive", user.id);
        return Err(Error::unauthenticated());
    }

    Ok(user)
}

/// Resolves a validated token subject to an active user. An absent or
/// inactive subject is `Unauthenticated`, never `NotFound`: a stale token
/// must not reveal whether its subject still exists.
pub async fn find_active_by_id(db: &DatabaseConnection, id: Id) -> Result<users::Model, Error> {
    let user = match UserApi::find_by_id(db, id).await {
        Ok(user) => user,
        Err(err) if err.error_kind == EntityApiErrorKind::RecordNotFound => {
            info!("Token subject {id} no longer exists");
            return Err(Error::unauthenticated());
        }
        Err(err) => return Err(err.into()),
    };

    if !user.is_active {
        info!("Token subject {id} is inactive");
        return Err(Error::unauthenticated());
    }

    Ok(user)
}

/// Role gate for organization settings mutation and reads.
pub fn require_manager_or_admin(user: &users::Model) -> Result<(), Error> {
    // Exhaustive over the closed role set so adding a role forces a decision here.
    let allowed = match user.role {
        Role::Admin | Role::Manager => true,
        Role::Rep => false,
    };

    if allowed {
        Ok(())
    } else {
        warn!(
            "User {} with role {} denied a manager/admin action",
            user.id, user.role
        );
        Err(Error::forbidden())
    }
}

/// Creates an additional user inside the acting user's organization. The
/// caller is responsible for the role gate; this enforces tenancy and email
/// uniqueness.
pub async fn create_in_organization(
    db: &DatabaseConnection,
    acting_user: &users::Model,
    email: String,
    full_name: String,
    password: String,
    role: Role,
) -> Result<users::Model, Error> {
    if UserApi::find_by_email(db, &email).await?.is_some() {
        info!("User creation rejected: email already in use");
        return Err(Error::conflict());
    }

    let now = chrono::Utc::now();
    let user = UserApi::create(
        db,
        users::Model {
            id: Id::new_v4(),
            organization_id: acting_user.organization_id,
            email,
            full_name,
            password,
            role,
            is_active: true,
            created_at: now.into(),
            updated_at: now.into(),
        },
    )
    .await?;

    info!(
        "User {} created in organization {}",
        user.id, user.organization_id
    );
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AccessErrorKind, DomainErrorKind};

    fn test_user(role: Role, is_active: bool) -> users::Model {
        let now = chrono::Utc::now();
        users::Model {
            id: Id::new_v4(),
            organization_id: Id::new_v4(),
            email: "user@test.com".to_owned(),
            full_name: "Test User".to_owned(),
            password: "hash".to_owned(),
            role,
            is_active,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn managers_and_admins_pass_the_settings_gate() {
        assert!(require_manager_or_admin(&test_user(Role::Admin, true)).is_ok());
        assert!(require_manager_or_admin(&test_user(Role::Manager, true)).is_ok());
    }

    #[test]
    fn reps_are_forbidden_not_unauthenticated() {
        let err = require_manager_or_admin(&test_user(Role::Rep, true)).unwrap_err();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Access(AccessErrorKind::Forbidden)
        );
    }

    #[cfg(feature = "mock")]
    mod with_mock_database {
        use super::*;
        use entity_api::user::generate_hash;
        use sea_orm::{DatabaseBackend, MockDatabase};

        #[tokio::test]
        async fn authenticate_rejects_unknown_emails_with_unauthenticated() {
            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<users::Model>::new()])
                .into_connection();

            let err = authenticate(&db, "ghost@test.com", "password2")
                .await
                .unwrap_err();
            assert_eq!(
                err.error_kind,
                DomainErrorKind::Access(AccessErrorKind::Unauthenticated)
            );
        }

        #[tokio::test]
        async fn authenticate_rejects_wrong_passwords_with_unauthenticated() {
            let mut user = test_user(Role::Rep, true);
            user.password = generate_hash("password2".to_string());

            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .into_connection();

            let err = authenticate(&db, "user@test.com", "wrong").await.unwrap_err();
            assert_eq!(
                err.error_kind,
                DomainErrorKind::Access(AccessErrorKind::Unauthenticated)
            );
        }

        #[tokio::test]
        async fn authenticate_rejects_inactive_users() {
            let mut user = test_user(Role::Rep, false);
            user.password = generate_hash("password2".to_string());

            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .into_connection();

            let err = authenticate(&db, "user@test.com", "password2")
                .await
                .unwrap_err();
            assert_eq!(
                err.error_kind,
                DomainErrorKind::Access(AccessErrorKind::Unauthenticated)
            );
        }

        #[tokio::test]
        async fn authenticate_returns_the_user_on_matching_credentials() {
            let mut user = test_user(Role::Rep, true);
            user.password = generate_hash("password2".to_string());
            let expected_id = user.id;

            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .into_connection();

            let authenticated = authenticate(&db, "user@test.com", "password2").await.unwrap();
            assert_eq!(authenticated.id, expected_id);
        }

        #[tokio::test]
        async fn find_active_by_id_hides_missing_subjects_behind_unauthenticated() {
            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<users::Model>::new()])
                .into_connection();

            let err = find_active_by_id(&db, Id::new_v4()).await.unwrap_err();
            assert_eq!(
                err.error_kind,
                DomainErrorKind::Access(AccessErrorKind::Unauthenticated)
            );
        }

        #[tokio::test]
        async fn register_rejects_duplicate_emails_with_conflict() {
            let existing = test_user(Role::Admin, true);

            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection();

            let err = register(
                &db,
                "Acme Inc".to_owned(),
                "Admin User".to_owned(),
                "user@test.com".to_owned(),
                "Password123!".to_owned(),
            )
            .await
            .unwrap_err();

            assert_eq!(
                err.error_kind,
                DomainErrorKind::Internal(crate::error::InternalErrorKind::Entity(
                    crate::error::EntityErrorKind::Conflict
                ))
            );
        }
    }
}
