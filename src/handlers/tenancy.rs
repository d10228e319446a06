// src/handlers/tenancy.rs

use axum::{Json, extract::{Path, State}, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{PermManageTeam, RequirePermission},
        tenancy::TenantContext,
    },
    models::auth::{CommissionConfig, UserProfile},
    models::tenancy::{Business, Industry},
};

// ---
// Payload: CreateBusiness (o fluxo de abertura de conta)
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBusinessPayload {
    #[validate(length(min = 1, message = "O nome da loja é obrigatório."))]
    #[schema(example = "Mercearia Central")]
    pub name: String,

    pub industry: Industry,

    #[validate(length(min = 1, message = "O nome do responsável é obrigatório."))]
    #[schema(example = "Dona Maria")]
    pub owner_name: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub owner_email: Option<String>,
}

// A resposta carrega a loja E o perfil do dono recém-criado, pois o
// cliente precisa dos dois ids para as próximas chamadas.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedBusiness {
    pub business: Business,
    pub owner: UserProfile,
}

#[utoipa::path(
    post,
    path = "/api/businesses",
    tag = "Tenancy",
    request_body = CreateBusinessPayload,
    responses((status = 201, body = CreatedBusiness))
)]
pub async fn create_business(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateBusinessPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let (business, owner) = app_state.tenancy_service.create_business(
        payload.name,
        payload.industry,
        payload.owner_name,
        payload.owner_email,
    )?;

    tracing::info!("🏪 Loja '{}' criada ({})", business.name, business.envelope.id);
    Ok((StatusCode::CREATED, Json(CreatedBusiness { business, owner })))
}

#[utoipa::path(
    get,
    path = "/api/businesses/mine",
    tag = "Tenancy",
    responses((status = 200, body = Vec<Business>))
)]
pub async fn list_my_businesses(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let businesses = app_state.tenancy_service.businesses_for(&user.0);
    Ok((StatusCode::OK, Json(businesses)))
}

#[utoipa::path(
    get,
    path = "/api/team",
    tag = "Team",
    responses((status = 200, body = Vec<UserProfile>))
)]
pub async fn list_team(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    _guard: RequirePermission<PermManageTeam>,
) -> Result<impl IntoResponse, AppError> {
    let team = app_state.tenancy_service.list_team(tenant.0);
    Ok((StatusCode::OK, Json(team)))
}

#[utoipa::path(
    put,
    path = "/api/team/members/{id}/commission",
    tag = "Team",
    params(("id" = Uuid, Path, description = "Id do membro da equipe")),
    request_body = CommissionConfig,
    responses((status = 200, body = UserProfile))
)]
pub async fn update_member_commission(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    _guard: RequirePermission<PermManageTeam>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CommissionConfig>,
) -> Result<impl IntoResponse, AppError> {
    let updated = app_state
        .tenancy_service
        .update_member_commission(tenant.0, id, payload)?;
    Ok((StatusCode::OK, Json(updated)))
}
