//! Bearer access tokens for authenticated API access.
//!
//! Tokens are HS256 JSON Web Tokens signed with the server-held secret from
//! `Config`, embedding the subject user id and an expiration instant. A
//! tampered signature and an expired token are logged distinctly but both
//! surface to callers as the single `Unauthenticated` outcome, so the two
//! cases are indistinguishable from outside.

use crate::error::Error;
use chrono::Utc;
use claims::AccessClaims;
use entity::Id;
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use log::*;
use service::config::Config;

pub(crate) mod claims;

/// Issues a signed access token for the given user, valid for
/// `config.access_token_expiry_secs` from now.
pub fn issue_token(user_id: Id, config: &Config) -> Result<String, Error> {
    let now = Utc::now().timestamp() as u64;
    let claims = AccessClaims {
        sub: user_id.to_string(),
        iat: now,
        exp: now + config.access_token_expiry_secs,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.token_secret().as_bytes()),
    )?;

    Ok(token)
}

/// Verifies signature and expiration and returns the subject user id.
///
/// All failure modes collapse to `Unauthenticated`; the log line is the only
/// place where expiry and forgery are told apart.
pub fn validate_token(token: &str, config: &Config) -> Result<Id, Error> {
    let decoded = decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(config.token_secret().as_bytes()),
        &Validation::default(),
    )
    .map_err(|err| {
        match err.kind() {
            ErrorKind::ExpiredSignature => {
                info!("Rejected expired access token");
            }
            _ => {
                warn!("Rejected malformed or forged access token: {err:?}");
            }
        }
        Error::unauthenticated()
    })?;

    Id::parse_str(&decoded.claims.sub).map_err(|_| {
        warn!("Access token carried a non-uuid subject");
        Error::unauthenticated()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AccessErrorKind, DomainErrorKind};

    #[test]
    fn issued_tokens_validate_back_to_the_subject() {
        let config = Config::default();
        let user_id = Id::new_v4();

        let token = issue_token(user_id, &config).unwrap();
        let subject = validate_token(&token, &config).unwrap();

        assert_eq!(subject, user_id);
    }

    #[test]
    fn tampered_tokens_are_unauthenticated() {
        let config = Config::default();
        let token = issue_token(Id::new_v4(), &config).unwrap();

        // Flip part of the signature
        let mut tampered = token[..token.len() - 4].to_string();
        tampered.push_str("AAAA");

        let err = validate_token(&tampered, &config).unwrap_err();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Access(AccessErrorKind::Unauthenticated)
        );
    }

    #[test]
    fn tokens_signed_with_another_secret_are_unauthenticated() {
        let config = Config::default();
        let mut other_config = Config::default();
        other_config.set_token_secret("a-different-secret".to_string());

        let token = issue_token(Id::new_v4(), &other_config).unwrap();
        assert!(validate_token(&token, &config).is_err());
    }

    #[test]
    fn garbage_tokens_are_unauthenticated() {
        let config = Config::default();
        assert!(validate_token("not-a-token", &config).is_err());
    }
}
