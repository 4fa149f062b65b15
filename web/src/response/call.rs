use domain::call_analyses::Model as CallAnalysisModel;
use domain::calls::Model as CallModel;
use serde::Serialize;
use utoipa::ToSchema;

/// A call together with its analysis payload, returned by the upload
/// endpoint once the pipeline has run.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CallWithAnalysis {
    #[serde(flatten)]
    pub call: CallModel,

    /// The structured insight payload; absent until the call is analyzed
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub analysis: Option<serde_json::Value>,
}

impl CallWithAnalysis {
    pub fn new(call: CallModel, analysis: Option<CallAnalysisModel>) -> Self {
        Self {
            call,
            analysis: analysis.map(|analysis| analysis.payload),
        }
    }
}
