use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub(super) struct HealthResponse {
    pub(super) status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) error: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub(super) struct RegisterRequest {
    #[schema(example = "gestor@acme.com")]
    pub(super) email: String,
    pub(super) password: String,
    #[schema(example = "Gestor Acme")]
    pub(super) name: String,
    #[schema(example = "client")]
    pub(super) role: Option<String>,
    #[schema(example = "Acme")]
    pub(super) company_name: Option<String>,
    #[schema(example = "starter")]
    pub(super) plan: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub(super) struct LoginRequest {
    #[schema(example = "admin@ai.growth")]
    pub(super) email: String,
    pub(super) password: String,
}
