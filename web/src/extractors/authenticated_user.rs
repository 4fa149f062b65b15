use crate::{AppState, Error};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use domain::error::Error as DomainError;
use domain::users;
use log::*;

pub(crate) struct AuthenticatedUser(pub users::Model);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = Error;

    // Resolves the `Authorization: Bearer <token>` header to an active user:
    // validate the token signature and expiry, then look the subject up and
    // reject absent or deactivated accounts. Every failure mode is the same
    // 401 from the outside.
    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                debug!("Request missing Authorization header");
                Error::from(DomainError::unauthenticated())
            })?;

        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            debug!("Authorization header is not a bearer credential");
            Error::from(DomainError::unauthenticated())
        })?;

        let subject = domain::jwt::validate_token(token, &state.config)?;
        let user = domain::user::find_active_by_id(state.db_conn_ref(), subject).await?;

        Ok(AuthenticatedUser(user))
    }
}
