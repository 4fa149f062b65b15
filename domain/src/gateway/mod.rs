//! External-collaborator abstractions.
//!
//! Everything that reaches outside the process lives behind a trait here, so
//! providers can be swapped without touching the pipeline.

pub mod transcription;
