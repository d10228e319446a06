// src/handlers/dashboard.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        rbac::{PermViewReports, RequirePermission},
        tenancy::TenantContext,
    },
    models::dashboard::{SalesSummary, StockValuation},
    models::inventory::Product,
};

#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    tag = "Dashboard",
    responses((status = 200, body = SalesSummary))
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    _guard: RequirePermission<PermViewReports>,
) -> Result<impl IntoResponse, AppError> {
    let summary = app_state.dashboard_service.sales_summary(tenant.0);
    Ok((StatusCode::OK, Json(summary)))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/valuation",
    tag = "Dashboard",
    responses((status = 200, body = StockValuation))
)]
pub async fn get_valuation(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    _guard: RequirePermission<PermViewReports>,
) -> Result<impl IntoResponse, AppError> {
    let valuation = app_state.dashboard_service.stock_valuation(tenant.0);
    Ok((StatusCode::OK, Json(valuation)))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/low-stock",
    tag = "Dashboard",
    responses((status = 200, body = Vec<Product>))
)]
pub async fn get_low_stock(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    _guard: RequirePermission<PermViewReports>,
) -> Result<impl IntoResponse, AppError> {
    let products = app_state.dashboard_service.low_stock(tenant.0);
    Ok((StatusCode::OK, Json(products)))
}
