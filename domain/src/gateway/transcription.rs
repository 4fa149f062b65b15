//! Speech-to-text transcription providers.
//!
//! The pipeline only ever sees the `Transcriber` trait: a stored media file
//! in, a transcript plus talk-ratio metrics out. `LocalTranscriber` is the
//! deterministic in-process provider used for development and tests; a real
//! deployment would add an HTTP-backed provider behind the same trait.

use crate::error::Error;
use async_trait::async_trait;
use log::*;
use std::path::Path;

/// Result of transcribing one media file. The two ratios are each in
/// `[0, 1]` and together sum to at most 1; any remainder is silence or
/// crosstalk the provider could not attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptOutput {
    pub transcript: String,
    pub talk_ratio_rep: f64,
    pub talk_ratio_prospect: f64,
}

/// Abstraction over speech-to-text services.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribes the media file previously stored at `storage_path`.
    /// Unreadable or unsupported media fails with a transcription error,
    /// which the pipeline treats as terminal for the call.
    async fn transcribe(
        &self,
        file_name: &str,
        storage_path: &str,
    ) -> Result<TranscriptOutput, Error>;
}

/// Deterministic local provider.
///
/// Plain-text uploads are their own transcript; audio/video media gets a
/// fixed canned transcript mentioning the file name. Both cases return fixed
/// talk ratios so downstream analysis is reproducible.
#[derive(Debug, Default)]
pub struct LocalTranscriber;

impl LocalTranscriber {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transcriber for LocalTranscriber {
    async fn transcribe(
        &self,
        file_name: &str,
        storage_path: &str,
    ) -> Result<TranscriptOutput, Error> {
        let bytes = tokio::fs::read(storage_path).await.map_err(|err| {
            warn!("Failed to read stored media at {storage_path}: {err}");
            Error {
                source: Some(Box::new(err)),
                error_kind: crate::error::DomainErrorKind::External(
                    crate::error::ExternalErrorKind::Transcription,
                ),
            }
        })?;

        let transcript = match String::from_utf8(bytes) {
            Ok(text) if Path::new(file_name)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("txt")) =>
            {
                text
            }
            _ => format!(
                "Rep: Thanks for joining, let's discuss priorities for {file_name}. \
                 Prospect: Budget and timeline are my biggest concerns."
            ),
        };

        Ok(TranscriptOutput {
            transcript,
            talk_ratio_rep: 0.42,
            talk_ratio_prospect: 0.58,
        })
    }
}

/// Provider that always fails; drives the pipeline's failure path in tests.
#[cfg(any(test, feature = "mock"))]
#[derive(Debug, Default)]
pub struct FailingTranscriber;

#[cfg(any(test, feature = "mock"))]
#[async_trait]
impl Transcriber for FailingTranscriber {
    async fn transcribe(&self, _: &str, _: &str) -> Result<TranscriptOutput, Error> {
        Err(Error::transcription())
    }
}
