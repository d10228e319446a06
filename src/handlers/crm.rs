// src/handlers/crm.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        rbac::{PermManageCustomers, RequirePermission},
        tenancy::TenantContext,
    },
    models::crm::Customer,
};

// ---
// Payload: CreateCustomer
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "Seu João")]
    pub name: String,

    pub phone: Option<String>,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    pub address: Option<String>,

    pub notes: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/crm/customers",
    tag = "CRM",
    request_body = CreateCustomerPayload,
    responses((status = 201, body = Customer))
)]
pub async fn create_customer(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    _guard: RequirePermission<PermManageCustomers>,
    Json(payload): Json<CreateCustomerPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let customer = app_state.crm_service.create_customer(
        tenant.0,
        payload.name,
        payload.phone,
        payload.email,
        payload.address,
        payload.notes,
    )?;
    Ok((StatusCode::CREATED, Json(customer)))
}

#[utoipa::path(
    get,
    path = "/api/crm/customers",
    tag = "CRM",
    responses((status = 200, body = Vec<Customer>))
)]
pub async fn list_customers(
    State(app_state): State<AppState>,
    tenant: TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let customers = app_state.crm_service.list_customers(tenant.0);
    Ok((StatusCode::OK, Json(customers)))
}
