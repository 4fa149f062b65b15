//! Business logic for the call analysis platform.
//!
//! This crate re-exports the entity models it exposes upward so that `web`
//! depends only on `domain`, never directly on `entity`/`entity_api`. Each
//! module owns one concern: credentials (`jwt`), principals (`user`),
//! tenants (`organization`), call records (`call`), the deterministic
//! insight engine (`analysis`), and the processing pipeline
//! (`call_pipeline`) with its external transcription gateway (`gateway`).

pub use entity_api::{call_analyses, call_status, calls, organizations, roles, users, Id};

pub mod analysis;
pub mod call;
pub mod call_pipeline;
pub mod error;
pub mod gateway;
pub mod jwt;
pub mod organization;
pub mod user;
