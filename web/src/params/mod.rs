//! This module holds typed parameters for various endpoint inputs.
//!
//! Each request body is represented by a struct that is deserialized and
//! validated (by type) before the application logic sees it.

pub(crate) mod auth;
pub(crate) mod organization;
pub(crate) mod settings;
pub(crate) mod user;
