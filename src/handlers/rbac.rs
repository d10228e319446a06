// src/handlers/rbac.rs

use axum::{Json, extract::{Path, State}, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::{AppError, validation_error},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{PermManageTeam, RequirePermission},
        tenancy::TenantContext,
    },
    models::auth::{Role, UserProfile},
    models::rbac::{PermissionInfo, TeamInvite},
    services::rbac_service,
};

// GET /api/permissions — o catálogo completo, com risco e
// configurabilidade, para a UI montar a tela de convite.
#[utoipa::path(
    get,
    path = "/api/permissions",
    tag = "RBAC",
    responses((status = 200, body = Vec<PermissionInfo>))
)]
pub async fn list_permissions() -> impl IntoResponse {
    (StatusCode::OK, Json(rbac_service::permission_catalog()))
}

// GET /api/permissions/available/{role}
#[utoipa::path(
    get,
    path = "/api/permissions/available/{role}",
    tag = "RBAC",
    params(("role" = String, Path, description = "Papel (ex: seller, manager)")),
    responses((status = 200, body = Vec<crate::models::rbac::Permission>))
)]
pub async fn available_for_role(
    Path(role): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let role = Role::parse(&role)
        .ok_or_else(|| validation_error("role", "Papel desconhecido."))?;
    Ok((StatusCode::OK, Json(rbac_service::available_permissions(role))))
}

// ---
// Payload: CreateInvite
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvitePayload {
    pub role: Role,

    // Slugs dentro do conjunto configurável; o serviço valida antes de
    // gravar.
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[utoipa::path(
    post,
    path = "/api/team/invites",
    tag = "Team",
    request_body = CreateInvitePayload,
    responses((status = 201, body = TeamInvite))
)]
pub async fn create_invite(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermManageTeam>,
    Json(payload): Json<CreateInvitePayload>,
) -> Result<impl IntoResponse, AppError> {
    let invite = app_state.rbac_service.create_invite(
        tenant.0,
        &user.0,
        payload.role,
        payload.permissions,
    )?;
    Ok((StatusCode::CREATED, Json(invite)))
}

#[utoipa::path(
    get,
    path = "/api/team/invites",
    tag = "Team",
    responses((status = 200, body = Vec<TeamInvite>))
)]
pub async fn list_invites(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    _guard: RequirePermission<PermManageTeam>,
) -> Result<impl IntoResponse, AppError> {
    let invites = app_state.rbac_service.list_invites(tenant.0);
    Ok((StatusCode::OK, Json(invites)))
}

// ---
// Payload: AcceptInvite (rota pública; o convidado ainda não tem perfil)
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AcceptInvitePayload {
    #[validate(length(min = 1, message = "O código do convite é obrigatório."))]
    #[schema(example = "7C4A8D09")]
    pub code: String,

    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/team/invites/accept",
    tag = "Team",
    request_body = AcceptInvitePayload,
    responses(
        (status = 201, body = UserProfile),
        (status = 400, description = "Convite inválido ou já utilizado")
    )
)]
pub async fn accept_invite(
    State(app_state): State<AppState>,
    Json(payload): Json<AcceptInvitePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let profile = app_state
        .rbac_service
        .accept_invite(&payload.code, payload.name, payload.email)?;
    Ok((StatusCode::CREATED, Json(profile)))
}
