//! Organization-level operations: creation and the settings document that
//! holds the CRM field mapping and analysis template for a tenant.

use crate::error::Error;
use entity::organizations;
use entity_api::organization as OrganizationApi;
use log::*;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub use entity_api::organization::find_by_id;

const CRM_FIELD_MAPPING_KEY: &str = "crm_field_mapping";
const ANALYSIS_TEMPLATE_KEY: &str = "call_analysis_template";

/// The slice of organization settings exposed through the templates endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Templates {
    pub crm_field_mapping: Value,
    pub call_analysis_template: Value,
}

/// Creates a standalone organization. Fails with `Conflict` when the name is
/// already taken.
pub async fn create(
    db: &DatabaseConnection,
    name: String,
) -> Result<organizations::Model, Error> {
    if OrganizationApi::find_by_name(db, &name).await?.is_some() {
        info!("Organization creation rejected: name already in use");
        return Err(Error::conflict());
    }

    let now = chrono::Utc::now();
    let organization = OrganizationApi::create(
        db,
        organizations::Model {
            id: entity::Id::new_v4(),
            name,
            subscription_tier: "professional".to_string(),
            settings: json!({}),
            created_at: now.into(),
            updated_at: now.into(),
        },
    )
    .await?;

    Ok(organization)
}

pub async fn templates(
    db: &DatabaseConnection,
    organization_id: entity::Id,
) -> Result<Templates, Error> {
    let organization = OrganizationApi::find_by_id(db, organization_id).await?;
    Ok(extract_templates(&organization.settings))
}

/// Writes the templates back into the settings document, preserving any
/// other settings keys the organization carries.
pub async fn update_templates(
    db: &DatabaseConnection,
    organization_id: entity::Id,
    templates: Templates,
) -> Result<Templates, Error> {
    let organization = OrganizationApi::find_by_id(db, organization_id).await?;

    let mut settings = match organization.settings {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    settings.insert(
        CRM_FIELD_MAPPING_KEY.to_string(),
        templates.crm_field_mapping,
    );
    settings.insert(
        ANALYSIS_TEMPLATE_KEY.to_string(),
        templates.call_analysis_template,
    );

    let updated =
        OrganizationApi::update_settings(db, organization_id, Value::Object(settings)).await?;

    debug!("Updated templates for organization {organization_id}");
    Ok(extract_templates(&updated.settings))
}

fn extract_templates(settings: &Value) -> Templates {
    Templates {
        crm_field_mapping: settings
            .get(CRM_FIELD_MAPPING_KEY)
            .cloned()
            .unwrap_or_else(|| json!({})),
        call_analysis_template: settings
            .get(ANALYSIS_TEMPLATE_KEY)
            .cloned()
            .unwrap_or_else(|| json!({})),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_templates_defaults_missing_keys_to_empty_objects() {
        let templates = extract_templates(&json!({}));
        assert_eq!(templates.crm_field_mapping, json!({}));
        assert_eq!(templates.call_analysis_template, json!({}));
    }

    #[test]
    fn extract_templates_reads_existing_keys() {
        let settings = json!({
            "crm_field_mapping": {"deal": "opportunity_id"},
            "call_analysis_template": {"sections": ["bant"]},
            "unrelated": true,
        });
        let templates = extract_templates(&settings);
        assert_eq!(templates.crm_field_mapping["deal"], "opportunity_id");
        assert_eq!(templates.call_analysis_template["sections"][0], "bant");
    }

    #[cfg(feature = "mock")]
    mod with_mock_database {
        use super::*;
        use entity::Id;
        use sea_orm::{DatabaseBackend, MockDatabase};

        fn test_organization(id: Id, settings: Value) -> organizations::Model {
            let now = chrono::Utc::now();
            organizations::Model {
                id,
                name: "Acme Inc".to_owned(),
                subscription_tier: "professional".to_owned(),
                settings,
                created_at: now.into(),
                updated_at: now.into(),
            }
        }

        #[tokio::test]
        async fn update_templates_preserves_unrelated_settings_keys() {
            let id = Id::new_v4();
            let existing = test_organization(id, json!({"retention_days": 90}));
            let updated = test_organization(
                id,
                json!({
                    "retention_days": 90,
                    "crm_field_mapping": {"deal": "opportunity_id"},
                    "call_analysis_template": {},
                }),
            );

            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing.clone()]]) // templates read
                .append_query_results([[existing]]) // update_settings re-read
                .append_query_results([[updated.clone()]]) // update
                .into_connection();

            let templates = update_templates(
                &db,
                id,
                Templates {
                    crm_field_mapping: json!({"deal": "opportunity_id"}),
                    call_analysis_template: json!({}),
                },
            )
            .await
            .unwrap();

            assert_eq!(templates.crm_field_mapping["deal"], "opportunity_id");
        }
    }
}
