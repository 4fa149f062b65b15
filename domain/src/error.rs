//! Error types for the `domain` layer.
use entity_api::error::{EntityApiErrorKind, Error as EntityApiError};
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in lower layers. The `source` field is used to hold the original error that caused
/// the domain error. The intent is to translate errors between layers while maintaining
/// layer boundaries: `domain` depends on `entity_api`, `web` depends on `domain`,
/// but `web` should not depend directly on `entity_api`. The various `error_kind`s
/// are ultimately used by `web` to pick HTTP status codes.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    Access(AccessErrorKind),
    Validation(ValidationErrorKind),
    External(ExternalErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Entity(EntityErrorKind),
    Config,
    Other(String),
}

/// Enum representing the kinds of entity errors that can bubble up from the "Entity" layer
/// (`entity_api` and `entity`). These are translated to the `domain` layer and reduced to a
/// subset of error kinds that are relevant here.
#[derive(Debug, PartialEq)]
pub enum EntityErrorKind {
    NotFound,
    Invalid,
    Conflict,
    Other(String),
}

/// Authentication and authorization failures. `Unauthenticated` covers
/// missing, malformed, forged and expired credentials alike; `Forbidden` is a
/// valid principal lacking the required role.
#[derive(Debug, PartialEq)]
pub enum AccessErrorKind {
    Unauthenticated,
    Forbidden,
}

/// Request-shape failures detected before any processing happens.
#[derive(Debug, PartialEq)]
pub enum ValidationErrorKind {
    PayloadTooLarge,
    UnsupportedMediaType,
    Invalid(String),
}

/// Enum representing the various kinds of external errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    Transcription,
    Analysis,
    Network,
    Other(String),
}

impl Error {
    pub fn not_found() -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(
                EntityErrorKind::NotFound,
            )),
        }
    }

    pub fn conflict() -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(
                EntityErrorKind::Conflict,
            )),
        }
    }

    pub fn unauthenticated() -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Access(AccessErrorKind::Unauthenticated),
        }
    }

    pub fn forbidden() -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Access(AccessErrorKind::Forbidden),
        }
    }

    pub fn payload_too_large() -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Validation(ValidationErrorKind::PayloadTooLarge),
        }
    }

    pub fn unsupported_media_type() -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Validation(ValidationErrorKind::UnsupportedMediaType),
        }
    }

    pub fn invalid(detail: &str) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Validation(ValidationErrorKind::Invalid(
                detail.to_string(),
            )),
        }
    }

    pub fn transcription() -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::External(ExternalErrorKind::Transcription),
        }
    }

    pub fn analysis() -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::External(ExternalErrorKind::Analysis),
        }
    }

    pub fn internal(detail: &str) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(detail.to_string())),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// This is where we translate errors from the `entity_api` layer to the `domain` layer.
impl From<EntityApiError> for Error {
    fn from(err: EntityApiError) -> Self {
        let error_kind = match err.error_kind {
            EntityApiErrorKind::RecordNotFound => {
                DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::NotFound))
            }
            EntityApiErrorKind::RecordAlreadyExists => {
                DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::Conflict))
            }
            EntityApiErrorKind::RecordUnauthenticated => {
                DomainErrorKind::Access(AccessErrorKind::Unauthenticated)
            }
            EntityApiErrorKind::InvalidQueryTerm | EntityApiErrorKind::ValidationError => {
                DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::Invalid))
            }
            _ => DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::Other(
                "EntityApiErrorKind".to_string(),
            ))),
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for Error {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                "JWT encoding related error".to_string(),
            )),
        }
    }
}
