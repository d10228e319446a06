// src/handlers/sales.rs

use axum::{Json, extract::{Path, State}, http::StatusCode, response::IntoResponse};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{PermCollectDues, PermCreateSales, PermManageExpenses, RequirePermission},
        tenancy::TenantContext,
    },
    models::sales::{CollectionEntry, Expense, ExpenseKind, PaymentMethod, Sale},
    services::sales_service::SaleLineInput,
};

fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.message = Some("O valor deve ser maior que zero.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Vendas
// ---

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleLinePayload {
    pub product_id: Uuid,

    #[validate(custom(function = validate_positive))]
    pub quantity: Decimal,

    // Sem preço informado, vale o preço de venda atual do produto.
    #[validate(custom(function = validate_not_negative))]
    #[serde(default)]
    pub unit_price: Option<Decimal>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSalePayload {
    pub customer_id: Option<Uuid>,

    // Sem vendedor explícito, a venda fica no nome de quem está operando.
    pub seller_id: Option<Uuid>,

    #[validate(custom(function = validate_not_negative))]
    #[serde(default)]
    pub amount_collected: Decimal,

    #[validate(nested, length(min = 1, message = "A venda precisa de pelo menos um item."))]
    pub items: Vec<SaleLinePayload>,
}

#[utoipa::path(
    post,
    path = "/api/sales",
    tag = "Sales",
    request_body = CreateSalePayload,
    responses(
        (status = 201, body = Sale),
        (status = 409, description = "Estoque insuficiente em alguma linha")
    )
)]
pub async fn create_sale(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermCreateSales>,
    Json(payload): Json<CreateSalePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let seller_id = payload.seller_id.unwrap_or(user.0.envelope.id);
    let items: Vec<SaleLineInput> = payload
        .items
        .into_iter()
        .map(|line| SaleLineInput {
            product_id: line.product_id,
            quantity: line.quantity,
            unit_price: line.unit_price,
        })
        .collect();

    let sale = app_state.sales_service.create_sale(
        tenant.0,
        seller_id,
        payload.customer_id,
        items,
        payload.amount_collected,
    )?;

    tracing::info!("🧾 Venda {} registrada: total {}", sale.envelope.id, sale.total_amount);
    Ok((StatusCode::CREATED, Json(sale)))
}

#[utoipa::path(
    get,
    path = "/api/sales",
    tag = "Sales",
    responses((status = 200, body = Vec<Sale>))
)]
pub async fn get_all_sales(
    State(app_state): State<AppState>,
    tenant: TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let sales = app_state.sales_service.list_sales(tenant.0);
    Ok((StatusCode::OK, Json(sales)))
}

#[utoipa::path(
    get,
    path = "/api/sales/{id}",
    tag = "Sales",
    params(("id" = Uuid, Path, description = "Id da venda")),
    responses((status = 200, body = Sale))
)]
pub async fn get_sale(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let sale = app_state.sales_service.get_sale(tenant.0, id)?;
    Ok((StatusCode::OK, Json(sale)))
}

// ---
// Recebimentos de fiado
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordCollectionPayload {
    #[validate(custom(function = validate_positive))]
    pub amount: Decimal,

    pub method: PaymentMethod,

    #[schema(value_type = String, format = Date, example = "2024-04-01")]
    pub collected_at: NaiveDate,
}

#[utoipa::path(
    post,
    path = "/api/sales/{id}/collections",
    tag = "Sales",
    params(("id" = Uuid, Path, description = "Id da venda")),
    request_body = RecordCollectionPayload,
    responses(
        (status = 201, body = CollectionEntry),
        (status = 409, description = "O valor excede o saldo devedor da venda")
    )
)]
pub async fn record_collection(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermCollectDues>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecordCollectionPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let entry = app_state.sales_service.record_collection(
        tenant.0,
        user.0.envelope.id,
        id,
        payload.amount,
        payload.method,
        payload.collected_at,
    )?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[utoipa::path(
    get,
    path = "/api/sales/{id}/collections",
    tag = "Sales",
    params(("id" = Uuid, Path, description = "Id da venda")),
    responses((status = 200, body = Vec<CollectionEntry>))
)]
pub async fn get_sale_collections(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let entries = app_state.sales_service.list_collections(tenant.0, Some(id));
    Ok((StatusCode::OK, Json(entries)))
}

// ---
// Despesas
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpensePayload {
    #[validate(length(min = 1, message = "A categoria da despesa é obrigatória."))]
    #[schema(example = "Aluguel")]
    pub category: String,

    #[validate(custom(function = validate_positive))]
    pub amount: Decimal,

    pub kind: ExpenseKind,

    #[schema(value_type = String, format = Date, example = "2024-04-01")]
    pub expense_date: NaiveDate,

    pub supplier: Option<String>,

    pub notes: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/expenses",
    tag = "Sales",
    request_body = CreateExpensePayload,
    responses((status = 201, body = Expense))
)]
pub async fn create_expense(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    _guard: RequirePermission<PermManageExpenses>,
    Json(payload): Json<CreateExpensePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let expense = app_state.sales_service.create_expense(
        tenant.0,
        payload.category,
        payload.amount,
        payload.kind,
        payload.expense_date,
        payload.supplier,
        payload.notes,
    )?;
    Ok((StatusCode::CREATED, Json(expense)))
}

#[utoipa::path(
    get,
    path = "/api/expenses",
    tag = "Sales",
    responses((status = 200, body = Vec<Expense>))
)]
pub async fn get_all_expenses(
    State(app_state): State<AppState>,
    tenant: TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let expenses = app_state.sales_service.list_expenses(tenant.0);
    Ok((StatusCode::OK, Json(expenses)))
}
