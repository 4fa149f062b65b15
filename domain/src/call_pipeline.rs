//! Orchestration of a call through transcribe -> analyze.
//!
//! Each step commits its own state transition, so a crash between steps
//! leaves the call in the last committed state. A failing step marks the
//! call `failed` with an error marker before the error is surfaced; the row
//! stays queryable either way.

use crate::analysis;
use crate::error::Error;
use crate::gateway::transcription::Transcriber;
use dashmap::DashMap;
use entity::{call_analyses, calls, Id};
use entity_api::{call, call_analysis};
use log::*;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;

const TRANSCRIPTION_ERROR_MARKER: &str = "Transcription failed";
const ANALYSIS_ERROR_MARKER: &str = "Analysis failed";

pub struct CallPipeline {
    transcriber: Arc<dyn Transcriber>,
    transcription_timeout: Duration,
    // Call ids with a pipeline run currently in flight. Guards both the
    // inline and the spawned path against double-running the same call.
    in_flight: DashMap<Id, ()>,
}

impl CallPipeline {
    pub fn new(transcriber: Arc<dyn Transcriber>, transcription_timeout_secs: u64) -> Self {
        Self {
            transcriber,
            transcription_timeout: Duration::from_secs(transcription_timeout_secs),
            in_flight: DashMap::new(),
        }
    }

    /// Runs the pipeline for a call inline and returns the final call state
    /// together with its analysis. A second concurrent invocation for the
    /// same call id is refused.
    pub async fn process(
        &self,
        db: &DatabaseConnection,
        call_id: Id,
    ) -> Result<(calls::Model, call_analyses::Model), Error> {
        let _guard = self.claim(call_id)?;

        let call = call::find_by_id(db, call_id).await?;
        info!("Processing call {call_id} ({})", call.file_name);

        let call = self.transcribe_step(db, call).await?;
        self.analyze_step(db, call).await
    }

    /// Submits a call for background processing: at most one run per call id
    /// is ever in flight, and a duplicate submission is a logged no-op.
    pub fn submit(self: &Arc<Self>, db: Arc<DatabaseConnection>, call_id: Id) {
        if self.in_flight.contains_key(&call_id) {
            info!("Call {call_id} already has a pipeline run in flight, ignoring submission");
            return;
        }

        let pipeline = Arc::clone(self);
        tokio::spawn(async move {
            match pipeline.process(&db, call_id).await {
                Ok((call, _)) => {
                    info!("Background pipeline finished for call {call_id}: {}", call.status)
                }
                Err(err) => error!("Background pipeline failed for call {call_id}: {err:?}"),
            }
        });
    }

    async fn transcribe_step(
        &self,
        db: &DatabaseConnection,
        call: calls::Model,
    ) -> Result<calls::Model, Error> {
        let transcription = tokio::time::timeout(
            self.transcription_timeout,
            self.transcriber.transcribe(&call.file_name, &call.storage_path),
        )
        .await
        .unwrap_or_else(|_| {
            warn!("Transcription timed out for call {}", call.id);
            Err(Error::transcription())
        });

        match transcription {
            Ok(output) => {
                let updated = call::record_transcription(
                    db,
                    call.id,
                    output.transcript,
                    output.talk_ratio_rep,
                    output.talk_ratio_prospect,
                )
                .await?;
                debug!("Call {} transcribed", call.id);
                Ok(updated)
            }
            Err(err) => {
                warn!("Transcription failed for call {}: {err:?}", call.id);
                self.fail_call(db, call.id, TRANSCRIPTION_ERROR_MARKER).await;
                Err(err)
            }
        }
    }

    async fn analyze_step(
        &self,
        db: &DatabaseConnection,
        call: calls::Model,
    ) -> Result<(calls::Model, call_analyses::Model), Error> {
        let transcript = call.transcript.clone().unwrap_or_default();
        let insights = analysis::analyze(&transcript);

        let persisted = self.persist_analysis(db, call.id, &insights).await;
        match persisted {
            Ok((analysis_row, analyzed_call)) => {
                info!("Call {} analyzed", analyzed_call.id);
                Ok((analyzed_call, analysis_row))
            }
            Err(err) => {
                warn!("Analysis persistence failed for call {}: {err:?}", call.id);
                self.fail_call(db, call.id, ANALYSIS_ERROR_MARKER).await;
                Err(Error {
                    source: Some(Box::new(err)),
                    error_kind: crate::error::DomainErrorKind::External(
                        crate::error::ExternalErrorKind::Analysis,
                    ),
                })
            }
        }
    }

    async fn persist_analysis(
        &self,
        db: &DatabaseConnection,
        call_id: Id,
        insights: &analysis::CallInsights,
    ) -> Result<(call_analyses::Model, calls::Model), Error> {
        let payload = serde_json::to_value(insights)
            .map_err(|_| Error::internal("Analysis payload serialization failed"))?;

        let scores = call_analysis::Scores {
            sentiment_score: insights.scores.sentiment_score,
            buying_intent_score: insights.scores.buying_intent_score,
            closing_probability: insights.scores.closing_probability,
            engagement_score: insights.scores.engagement_score,
        };

        Ok(call_analysis::record(
            db,
            call_id,
            insights.executive_summary.overview.clone(),
            scores,
            payload,
        )
        .await?)
    }

    /// Best effort: the original error is what callers see, even if writing
    /// the failure marker itself fails.
    async fn fail_call(&self, db: &DatabaseConnection, call_id: Id, marker: &str) {
        if let Err(err) = call::mark_failed(db, call_id, marker.to_string()).await {
            error!("Could not mark call {call_id} as failed: {err:?}");
        }
    }

    fn claim(&self, call_id: Id) -> Result<InFlightGuard<'_>, Error> {
        if self.in_flight.insert(call_id, ()).is_some() {
            warn!("Refusing concurrent pipeline run for call {call_id}");
            return Err(Error::conflict());
        }
        Ok(InFlightGuard {
            in_flight: &self.in_flight,
            call_id,
        })
    }
}

/// Releases the in-flight slot when a pipeline run ends, however it ends.
struct InFlightGuard<'a> {
    in_flight: &'a DashMap<Id, ()>,
    call_id: Id,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.remove(&self.call_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::transcription::LocalTranscriber;

    fn test_pipeline() -> CallPipeline {
        CallPipeline::new(Arc::new(LocalTranscriber::new()), 120)
    }

    #[test]
    fn a_call_id_can_only_be_claimed_once() {
        let pipeline = test_pipeline();
        let call_id = Id::new_v4();

        let guard = pipeline.claim(call_id).unwrap();
        assert!(pipeline.claim(call_id).is_err());

        drop(guard);
        assert!(pipeline.claim(call_id).is_ok());
    }

    #[test]
    fn distinct_call_ids_do_not_contend() {
        let pipeline = test_pipeline();

        let _first = pipeline.claim(Id::new_v4()).unwrap();
        let _second = pipeline.claim(Id::new_v4()).unwrap();
    }

    #[cfg(feature = "mock")]
    mod with_mock_database {
        use super::*;
        use crate::gateway::transcription::FailingTranscriber;
        use entity::call_status::CallStatus;
        use sea_orm::{DatabaseBackend, MockDatabase};

        fn test_call(id: Id, status: CallStatus) -> calls::Model {
            let now = chrono::Utc::now();
            calls::Model {
                id,
                organization_id: Id::new_v4(),
                user_id: Id::new_v4(),
                file_name: "discovery.txt".to_owned(),
                storage_path: "/nonexistent/discovery.txt".to_owned(),
                transcript: None,
                status,
                talk_ratio_rep: None,
                talk_ratio_prospect: None,
                error_message: None,
                created_at: now.into(),
                updated_at: now.into(),
            }
        }

        #[tokio::test]
        async fn submit_is_a_no_op_while_a_run_is_in_flight() {
            let pipeline = Arc::new(test_pipeline());
            let db = Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            );
            let call_id = Id::new_v4();

            let _guard = pipeline.claim(call_id).unwrap();
            // Nothing is spawned and no query runs against the mock, which
            // holds no results and would panic if touched.
            pipeline.submit(db, call_id);
        }

        #[tokio::test]
        async fn a_failing_transcriber_marks_the_call_failed_and_errors() {
            let call_id = Id::new_v4();
            let uploaded = test_call(call_id, CallStatus::Uploaded);
            let mut failed = uploaded.clone();
            failed.status = CallStatus::Failed;
            failed.error_message = Some(TRANSCRIPTION_ERROR_MARKER.to_owned());

            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[uploaded.clone()]]) // process: find_by_id
                .append_query_results([[uploaded]]) // mark_failed: find_by_id
                .append_query_results([[failed]]) // mark_failed: update
                .into_connection();

            let pipeline = CallPipeline::new(Arc::new(FailingTranscriber), 120);
            let result = pipeline.process(&db, call_id).await;

            assert_eq!(
                result.unwrap_err().error_kind,
                crate::error::DomainErrorKind::External(
                    crate::error::ExternalErrorKind::Transcription
                )
            );
        }
    }
}
