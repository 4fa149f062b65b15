use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Status of a call through its processing lifecycle.
///
/// A call only ever moves forward: `uploaded` -> `transcribed` -> `analyzed`,
/// or from any non-terminal state to the terminal `failed`.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, EnumIter, Deserialize, Default, Serialize, DeriveActiveEnum, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum CallStatus {
    /// File received and stored, no processing yet
    #[sea_orm(string_value = "uploaded")]
    #[default]
    Uploaded,
    /// Transcript and talk ratios available
    #[sea_orm(string_value = "transcribed")]
    Transcribed,
    /// Full analysis persisted
    #[sea_orm(string_value = "analyzed")]
    Analyzed,
    /// Terminal failure, error marker set
    #[sea_orm(string_value = "failed")]
    Failed,
}

impl CallStatus {
    /// The single source of truth for legal status moves. Everything that
    /// mutates a call's status must consult this before writing.
    pub fn can_transition_to(&self, next: CallStatus) -> bool {
        matches!(
            (self, next),
            (CallStatus::Uploaded, CallStatus::Transcribed)
                | (CallStatus::Transcribed, CallStatus::Analyzed)
                | (CallStatus::Uploaded, CallStatus::Failed)
                | (CallStatus::Transcribed, CallStatus::Failed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CallStatus::Analyzed | CallStatus::Failed)
    }
}

impl std::fmt::Display for CallStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallStatus::Uploaded => write!(fmt, "uploaded"),
            CallStatus::Transcribed => write!(fmt, "transcribed"),
            CallStatus::Analyzed => write!(fmt, "analyzed"),
            CallStatus::Failed => write!(fmt, "failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_states_advance_forward_only() {
        assert!(CallStatus::Uploaded.can_transition_to(CallStatus::Transcribed));
        assert!(CallStatus::Transcribed.can_transition_to(CallStatus::Analyzed));

        assert!(!CallStatus::Transcribed.can_transition_to(CallStatus::Uploaded));
        assert!(!CallStatus::Analyzed.can_transition_to(CallStatus::Transcribed));
        assert!(!CallStatus::Analyzed.can_transition_to(CallStatus::Uploaded));
        assert!(!CallStatus::Uploaded.can_transition_to(CallStatus::Analyzed));
    }

    #[test]
    fn failed_is_reachable_from_any_non_terminal_state() {
        assert!(CallStatus::Uploaded.can_transition_to(CallStatus::Failed));
        assert!(CallStatus::Transcribed.can_transition_to(CallStatus::Failed));
        assert!(!CallStatus::Analyzed.can_transition_to(CallStatus::Failed));
    }

    #[test]
    fn terminal_states_never_transition() {
        for next in [
            CallStatus::Uploaded,
            CallStatus::Transcribed,
            CallStatus::Analyzed,
            CallStatus::Failed,
        ] {
            assert!(!CallStatus::Failed.can_transition_to(next));
        }
        assert!(CallStatus::Failed.is_terminal());
        assert!(CallStatus::Analyzed.is_terminal());
        assert!(!CallStatus::Uploaded.is_terminal());
        assert!(!CallStatus::Transcribed.is_terminal());
    }
}
