// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    models::auth::UserProfile,
    models::rbac::Permission,
    services::rbac_service,
};

/// 1. O Trait que define o que é uma Permissão exigida pela rota
pub trait PermissionDef: Send + Sync + 'static {
    fn permission() -> Permission;
}

/// 2. O Extractor (Guardião)
// A permissão é avaliada AQUI, antes do corpo do handler rodar — ou seja,
// antes de qualquer mutação chegar ao store.
pub struct RequirePermission<T>(pub PhantomData<T>);

// 3. Implementação do FromRequestParts
impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // A. Extrai o usuário que o guard da rota inseriu
        let user = parts
            .extensions
            .get::<UserProfile>()
            .ok_or(AppError::Unauthenticated)?;

        // B. Avalia papel + overrides contra a permissão exigida
        rbac_service::ensure_allowed(user, T::permission())?;

        Ok(RequirePermission(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

pub struct PermCreateSales;
impl PermissionDef for PermCreateSales {
    fn permission() -> Permission { Permission::CanCreateSales }
}

pub struct PermCollectDues;
impl PermissionDef for PermCollectDues {
    fn permission() -> Permission { Permission::CanCollectDues }
}

pub struct PermManageProducts;
impl PermissionDef for PermManageProducts {
    fn permission() -> Permission { Permission::CanManageProducts }
}

pub struct PermManageCategories;
impl PermissionDef for PermManageCategories {
    fn permission() -> Permission { Permission::CanManageCategories }
}

pub struct PermManageStock;
impl PermissionDef for PermManageStock {
    fn permission() -> Permission { Permission::CanManageStock }
}

pub struct PermManageDamages;
impl PermissionDef for PermManageDamages {
    fn permission() -> Permission { Permission::CanManageDamages }
}

pub struct PermManageCustomers;
impl PermissionDef for PermManageCustomers {
    fn permission() -> Permission { Permission::CanManageCustomers }
}

pub struct PermManageExpenses;
impl PermissionDef for PermManageExpenses {
    fn permission() -> Permission { Permission::CanManageExpenses }
}

pub struct PermViewReports;
impl PermissionDef for PermViewReports {
    fn permission() -> Permission { Permission::CanViewReports }
}

pub struct PermManageSettings;
impl PermissionDef for PermManageSettings {
    fn permission() -> Permission { Permission::CanManageSettings }
}

pub struct PermManageTeam;
impl PermissionDef for PermManageTeam {
    fn permission() -> Permission { Permission::CanManageTeam }
}
