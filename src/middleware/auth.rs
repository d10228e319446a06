// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, request::Parts},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    db::datastore::{Datastore, Scope},
    middleware::tenancy::TenantContext,
    models::auth::{Role, UserProfile},
};

// A autenticação em si (senha, sessão) é colaborador externo; o gateway
// já chega aqui com a identidade resolvida neste cabeçalho.
const USER_ID_HEADER: &str = "x-user-id";

fn user_from_headers(store: &Datastore, headers: &HeaderMap) -> Result<UserProfile, AppError> {
    let raw = headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or(AppError::Unauthenticated)?;

    let user_id = Uuid::parse_str(raw).map_err(|_| AppError::Unauthenticated)?;

    // O perfil precisa existir no store; id desconhecido é o mesmo que não
    // estar autenticado.
    store
        .get::<UserProfile>(Scope::Global, user_id)
        .map_err(|_| AppError::Unauthenticated)
}

// O middleware de autenticação: resolve o perfil e o insere nos
// "extensions" da requisição.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = user_from_headers(&app_state.store, request.headers())?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

// O middleware das rotas de loja: autentica E valida o vínculo do usuário
// com a loja do cabeçalho. A verificação de permissão fina fica com o
// `RequirePermission` de cada rota.
pub async fn tenant_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = user_from_headers(&app_state.store, request.headers())?;
    let tenant = TenantContext::from_headers(request.headers())?;

    let is_member =
        user.envelope.business_id == Some(tenant.0) || user.role == Role::GlobalAdmin;
    if !is_member {
        return Err(AppError::TenantAccessDenied);
    }

    request.extensions_mut().insert(user);
    request.extensions_mut().insert(tenant);
    Ok(next.run(request).await)
}

// Extrator para obter o usuário autenticado diretamente nos handlers
pub struct AuthenticatedUser(pub UserProfile);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<UserProfile>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or(AppError::Unauthenticated)
    }
}
