use serde::Deserialize;
use utoipa::ToSchema;

/// Body of `POST /organizations`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateOrganizationParams {
    pub name: String,
}
