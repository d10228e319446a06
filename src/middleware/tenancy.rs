// src/middleware/tenancy.rs

use axum::http::{HeaderMap, request::Parts};
use axum::extract::FromRequestParts;
use uuid::Uuid;

use crate::common::error::AppError;

// O nome do nosso cabeçalho HTTP customizado
const BUSINESS_ID_HEADER: &str = "x-business-id";

// O nosso extrator de contexto de loja.
// Ele armazena o UUID da loja que o utilizador quer aceder. O
// `tenant_guard` valida o vínculo do usuário ANTES de inserir o contexto
// na requisição; o extrator só o recupera.
#[derive(Debug, Clone, Copy)]
pub struct TenantContext(pub Uuid);

impl TenantContext {
    /// Lê e valida o cabeçalho X-Business-Id.
    pub(crate) fn from_headers(headers: &HeaderMap) -> Result<Self, AppError> {
        let value = headers
            .get(BUSINESS_ID_HEADER)
            .ok_or(AppError::TenantHeaderInvalid)?;

        // Tenta converter o valor do cabeçalho para uma string
        let value_str = value.to_str().map_err(|_| AppError::TenantHeaderInvalid)?;

        // Tenta converter a string para um UUID
        let tenant_id =
            Uuid::parse_str(value_str).map_err(|_| AppError::TenantHeaderInvalid)?;

        Ok(TenantContext(tenant_id))
    }
}

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TenantContext>()
            .copied()
            .ok_or(AppError::TenantHeaderInvalid)
    }
}
