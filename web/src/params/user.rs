use domain::roles::Role;
use serde::Deserialize;
use utoipa::ToSchema;

/// Body of `POST /users`: an additional user inside the caller's organization.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateUserParams {
    pub email: String,
    pub full_name: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
}
