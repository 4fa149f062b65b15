use serde::Deserialize;
use utoipa::ToSchema;

/// Body of `POST /auth/register`: a new organization plus its admin user.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterParams {
    pub organization_name: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginParams {
    pub email: String,
    pub password: String,
}
