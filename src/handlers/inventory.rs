// src/handlers/inventory.rs

use axum::{Json, extract::{Path, State}, http::StatusCode, response::IntoResponse};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// Importa os nossos extratores e erros
use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{
            PermManageCategories, PermManageDamages, PermManageProducts, PermManageStock,
            RequirePermission,
        },
        tenancy::TenantContext,
    },
    models::inventory::{Category, DamageRecord, Product, StockEntry, StockEntryLine},
    services::inventory_service::ProductUpdate,
};

// ---
// Validação Customizada
// ---
fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
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
// Categorias
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "Bebidas")]
    pub name: String,

    pub description: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/inventory/categories",
    tag = "Inventory",
    request_body = CreateCategoryPayload,
    responses((status = 201, body = Category))
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    _guard: RequirePermission<PermManageCategories>,
    Json(payload): Json<CreateCategoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let category =
        app_state
            .inventory_service
            .create_category(tenant.0, payload.name, payload.description)?;
    Ok((StatusCode::CREATED, Json(category)))
}

#[utoipa::path(
    get,
    path = "/api/inventory/categories",
    tag = "Inventory",
    responses((status = 200, body = Vec<Category>))
)]
pub async fn get_all_categories(
    State(app_state): State<AppState>,
    tenant: TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let categories = app_state.inventory_service.list_categories(tenant.0);
    Ok((StatusCode::OK, Json(categories)))
}

#[utoipa::path(
    delete,
    path = "/api/inventory/categories/{id}",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "Id da categoria")),
    responses(
        (status = 204, description = "Categoria removida"),
        (status = 409, description = "A categoria ainda possui produtos")
    )
)]
pub async fn delete_category(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    _guard: RequirePermission<PermManageCategories>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.inventory_service.delete_category(tenant.0, id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Produtos
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    pub category_id: Uuid,

    #[validate(length(min = 1, message = "O SKU é obrigatório."))]
    #[schema(example = "COLA-350")]
    pub sku: String,

    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(length(min = 1, message = "A unidade é obrigatória."))]
    #[schema(example = "un")]
    pub unit: String,

    #[validate(custom(function = validate_not_negative))]
    pub cost_price: Decimal,

    #[validate(custom(function = validate_not_negative))]
    pub selling_price: Decimal,

    // Se o JSON não tiver esse campo, assume 0
    #[validate(custom(function = validate_not_negative))]
    #[serde(default)]
    pub initial_stock: Decimal,

    #[validate(custom(function = validate_not_negative))]
    #[serde(default)]
    pub low_stock_threshold: Decimal,
}

#[utoipa::path(
    post,
    path = "/api/inventory/products",
    tag = "Inventory",
    request_body = CreateProductPayload,
    responses(
        (status = 201, body = Product),
        (status = 409, description = "SKU já cadastrado nesta loja")
    )
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    _guard: RequirePermission<PermManageProducts>,
    Json(payload): Json<CreateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let product = app_state.inventory_service.create_product(
        tenant.0,
        payload.category_id,
        payload.sku,
        payload.name,
        payload.unit,
        payload.cost_price,
        payload.selling_price,
        payload.initial_stock,
        payload.low_stock_threshold,
    )?;
    Ok((StatusCode::CREATED, Json(product)))
}

#[utoipa::path(
    get,
    path = "/api/inventory/products",
    tag = "Inventory",
    responses((status = 200, body = Vec<Product>))
)]
pub async fn get_all_products(
    State(app_state): State<AppState>,
    tenant: TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let products = app_state.inventory_service.list_products(tenant.0);
    Ok((StatusCode::OK, Json(products)))
}

// Estoque fica de fora do payload de edição: ele só muda pelos hooks de
// entrada/venda/avaria.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductPayload {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub unit: Option<String>,
    pub category_id: Option<Uuid>,

    #[validate(custom(function = validate_not_negative))]
    #[serde(default)]
    pub cost_price: Option<Decimal>,

    #[validate(custom(function = validate_not_negative))]
    #[serde(default)]
    pub selling_price: Option<Decimal>,

    #[validate(custom(function = validate_not_negative))]
    #[serde(default)]
    pub low_stock_threshold: Option<Decimal>,
}

#[utoipa::path(
    put,
    path = "/api/inventory/products/{id}",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "Id do produto")),
    request_body = UpdateProductPayload,
    responses((status = 200, body = Product))
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    _guard: RequirePermission<PermManageProducts>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let product = app_state.inventory_service.update_product(
        tenant.0,
        id,
        ProductUpdate {
            name: payload.name,
            sku: payload.sku,
            unit: payload.unit,
            category_id: payload.category_id,
            cost_price: payload.cost_price,
            selling_price: payload.selling_price,
            low_stock_threshold: payload.low_stock_threshold,
        },
    )?;
    Ok((StatusCode::OK, Json(product)))
}

#[utoipa::path(
    delete,
    path = "/api/inventory/products/{id}",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "Id do produto")),
    responses((status = 204, description = "Produto removido"))
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    _guard: RequirePermission<PermManageProducts>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.inventory_service.delete_product(tenant.0, id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Entradas de estoque
// ---

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockEntryLinePayload {
    pub product_id: Uuid,

    #[validate(custom(function = validate_positive))]
    pub quantity: Decimal,

    #[validate(custom(function = validate_not_negative))]
    pub unit_cost: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStockEntryPayload {
    #[schema(value_type = String, format = Date, example = "2024-03-10")]
    pub entry_date: NaiveDate,

    pub notes: Option<String>,

    #[validate(nested, length(min = 1, message = "A entrada precisa de pelo menos uma linha."))]
    pub items: Vec<StockEntryLinePayload>,
}

fn entry_lines(items: Vec<StockEntryLinePayload>) -> Vec<StockEntryLine> {
    items
        .into_iter()
        .map(|line| StockEntryLine {
            product_id: line.product_id,
            quantity: line.quantity,
            unit_cost: line.unit_cost,
        })
        .collect()
}

#[utoipa::path(
    post,
    path = "/api/inventory/stock-entries",
    tag = "Inventory",
    request_body = CreateStockEntryPayload,
    responses(
        (status = 201, body = StockEntry),
        (status = 409, description = "Estoque insuficiente para reverter uma edição")
    )
)]
pub async fn create_stock_entry(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermManageStock>,
    Json(payload): Json<CreateStockEntryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let entry = app_state.inventory_service.create_stock_entry(
        tenant.0,
        user.0.envelope.id,
        payload.entry_date,
        payload.notes,
        entry_lines(payload.items),
    )?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[utoipa::path(
    get,
    path = "/api/inventory/stock-entries",
    tag = "Inventory",
    responses((status = 200, body = Vec<StockEntry>))
)]
pub async fn get_all_stock_entries(
    State(app_state): State<AppState>,
    tenant: TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let entries = app_state.inventory_service.list_stock_entries(tenant.0);
    Ok((StatusCode::OK, Json(entries)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStockEntryPayload {
    #[schema(value_type = String, format = Date, example = "2024-03-10")]
    pub entry_date: Option<NaiveDate>,

    pub notes: Option<String>,

    #[validate(nested, length(min = 1, message = "A entrada precisa de pelo menos uma linha."))]
    pub items: Vec<StockEntryLinePayload>,
}

#[utoipa::path(
    put,
    path = "/api/inventory/stock-entries/{id}",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "Id da entrada")),
    request_body = UpdateStockEntryPayload,
    responses((status = 200, body = StockEntry))
)]
pub async fn update_stock_entry(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    _guard: RequirePermission<PermManageStock>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStockEntryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let entry = app_state.inventory_service.update_stock_entry(
        tenant.0,
        id,
        payload.entry_date,
        payload.notes,
        entry_lines(payload.items),
    )?;
    Ok((StatusCode::OK, Json(entry)))
}

// ---
// Avarias
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDamagePayload {
    pub product_id: Uuid,

    #[validate(custom(function = validate_positive))]
    pub quantity: Decimal,

    pub reason: Option<String>,

    #[schema(value_type = String, format = Date, example = "2024-03-11")]
    pub damage_date: NaiveDate,
}

#[utoipa::path(
    post,
    path = "/api/inventory/damages",
    tag = "Inventory",
    request_body = CreateDamagePayload,
    responses(
        (status = 201, body = DamageRecord),
        (status = 409, description = "Estoque insuficiente")
    )
)]
pub async fn create_damage(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    user: AuthenticatedUser,
    _guard: RequirePermission<PermManageDamages>,
    Json(payload): Json<CreateDamagePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let damage = app_state.inventory_service.create_damage(
        tenant.0,
        user.0.envelope.id,
        payload.product_id,
        payload.quantity,
        payload.reason,
        payload.damage_date,
    )?;
    Ok((StatusCode::CREATED, Json(damage)))
}

#[utoipa::path(
    get,
    path = "/api/inventory/damages",
    tag = "Inventory",
    responses((status = 200, body = Vec<DamageRecord>))
)]
pub async fn get_all_damages(
    State(app_state): State<AppState>,
    tenant: TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let damages = app_state.inventory_service.list_damages(tenant.0);
    Ok((StatusCode::OK, Json(damages)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDamagePayload {
    pub product_id: Option<Uuid>,

    #[validate(custom(function = validate_positive))]
    pub quantity: Decimal,

    pub reason: Option<String>,

    #[schema(value_type = String, format = Date, example = "2024-03-11")]
    pub damage_date: Option<NaiveDate>,
}

#[utoipa::path(
    put,
    path = "/api/inventory/damages/{id}",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "Id da avaria")),
    request_body = UpdateDamagePayload,
    responses((status = 200, body = DamageRecord))
)]
pub async fn update_damage(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    _guard: RequirePermission<PermManageDamages>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDamagePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let damage = app_state.inventory_service.update_damage(
        tenant.0,
        id,
        payload.product_id,
        payload.quantity,
        payload.reason,
        payload.damage_date,
    )?;
    Ok((StatusCode::OK, Json(damage)))
}
