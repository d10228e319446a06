// src/handlers/settings.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        rbac::{PermManageSettings, RequirePermission},
        tenancy::TenantContext,
    },
    models::settings::UpdateSettingsPayload,
};

// GET /api/settings
#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "Settings",
    responses((status = 200, body = crate::models::settings::BusinessSettings))
)]
pub async fn get_settings(
    State(app_state): State<AppState>,
    tenant: TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let settings = app_state.settings_service.get_settings(tenant.0);
    Ok((StatusCode::OK, Json(settings)))
}

// PUT /api/settings
// O corpo é parcial: grupos ausentes não são tocados (deep-merge).
#[utoipa::path(
    put,
    path = "/api/settings",
    tag = "Settings",
    request_body = UpdateSettingsPayload,
    responses((status = 200, body = crate::models::settings::BusinessSettings))
)]
pub async fn update_settings(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    _guard: RequirePermission<PermManageSettings>,
    Json(payload): Json<UpdateSettingsPayload>,
) -> Result<impl IntoResponse, AppError> {
    let updated = app_state
        .settings_service
        .update_settings(tenant.0, payload)?;
    Ok((StatusCode::OK, Json(updated)))
}
