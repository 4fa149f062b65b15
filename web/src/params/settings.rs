use domain::organization::Templates;
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;

/// Body of `PUT /settings/templates`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TemplatesParams {
    /// Mapping of analysis fields to CRM field identifiers
    #[schema(value_type = Object)]
    #[serde(default = "empty_object")]
    pub crm_field_mapping: Value,

    /// Organization-level overrides for the analysis template
    #[schema(value_type = Object)]
    #[serde(default = "empty_object")]
    pub call_analysis_template: Value,
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

impl From<TemplatesParams> for Templates {
    fn from(params: TemplatesParams) -> Self {
        Templates {
            crm_field_mapping: params.crm_field_mapping,
            call_analysis_template: params.call_analysis_template,
        }
    }
}
