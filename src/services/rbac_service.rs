// src/services/rbac_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::{AppError, validation_error},
    db::datastore::{Datastore, Envelope, Scope},
    db::query::Query,
    models::auth::{CommissionConfig, Role, UserProfile},
    models::rbac::{
        CONFIGURABLE_PERMISSIONS, FORBIDDEN_PERMISSIONS, Permission, PermissionInfo, TeamInvite,
    },
};

// ---
// O avaliador de permissões
// ---
// Funções puras: decidem só com papel + permissão + conjunto de overrides
// já canonizado (a migração do formato legado acontece na carga do
// snapshot, nunca aqui). A classificação de risco fica de fora da decisão.

/// Regras, em ordem de prioridade:
/// 1. dono e admin global passam por tudo (bypass explícito e auditável);
/// 2. permissões proibidas são teto rígido — nem override concede;
/// 3. o conjunto de overrides do usuário concede;
/// 4. senão, vale a tabela padrão do papel.
pub fn has_permission(role: Role, permission: Permission, overrides: &[String]) -> bool {
    if matches!(role, Role::Owner | Role::GlobalAdmin) {
        return true;
    }
    if FORBIDDEN_PERMISSIONS.contains(&permission) {
        return false;
    }
    if overrides.iter().any(|slug| slug == permission.slug()) {
        return true;
    }
    role.default_permissions().contains(&permission)
}

pub fn available_permissions(role: Role) -> Vec<Permission> {
    role.default_permissions().to_vec()
}

/// O portão usado pelos guards de rota: permissão negada vira erro antes
/// de qualquer mutação no store.
pub fn ensure_allowed(user: &UserProfile, permission: Permission) -> Result<(), AppError> {
    if has_permission(user.role, permission, &user.permission_overrides) {
        Ok(())
    } else {
        Err(AppError::PermissionDenied(permission.slug()))
    }
}

/// O catálogo completo que a UI usa para montar a tela de convite.
pub fn permission_catalog() -> Vec<PermissionInfo> {
    Permission::ALL
        .iter()
        .map(|p| PermissionInfo {
            slug: p.slug(),
            description: p.description(),
            risk: p.risk(),
            configurable: CONFIGURABLE_PERMISSIONS.contains(p),
        })
        .collect()
}

// ---
// Convites de equipe
// ---

#[derive(Clone)]
pub struct RbacService {
    store: Arc<Datastore>,
}

impl RbacService {
    pub fn new(store: Arc<Datastore>) -> Self {
        Self { store }
    }

    pub fn list_invites(&self, tenant: Uuid) -> Vec<TeamInvite> {
        self.store.select(
            Scope::Tenant(tenant),
            &Query::new().order_by("createdAt", false),
        )
    }

    /// Valida o subconjunto concedido ANTES de gravar qualquer coisa:
    /// slugs desconhecidos, permissões fora do conjunto configurável e
    /// gerente sem nenhuma permissão são rejeitados aqui, na criação.
    pub fn create_invite(
        &self,
        tenant: Uuid,
        created_by: &UserProfile,
        role: Role,
        permission_slugs: Vec<String>,
    ) -> Result<TeamInvite, AppError> {
        if matches!(role, Role::Owner | Role::GlobalAdmin) {
            return Err(validation_error(
                "role",
                "Este papel não pode ser atribuído por convite.",
            ));
        }

        for slug in &permission_slugs {
            let Some(permission) = Permission::from_slug(slug) else {
                return Err(validation_error("permissions", "Permissão desconhecida."));
            };
            if !CONFIGURABLE_PERMISSIONS.contains(&permission) {
                return Err(validation_error(
                    "permissions",
                    "Esta permissão não pode ser concedida por convite.",
                ));
            }
        }

        if role == Role::Manager && permission_slugs.is_empty() {
            return Err(validation_error(
                "permissions",
                "Selecione ao menos uma permissão para o gerente.",
            ));
        }

        let code = invite_code();
        let created_by = created_by.envelope.id;
        self.store.transaction(|tx| {
            tx.insert(
                Scope::Tenant(tenant),
                TeamInvite {
                    envelope: Envelope::new(),
                    code: code.clone(),
                    role,
                    permissions: permission_slugs.clone(),
                    created_by,
                    consumed: false,
                },
            )
        })
    }

    /// Consome o convite e cria o perfil do novo membro na loja do
    /// convite, já com o conjunto de overrides concedido.
    pub fn accept_invite(
        &self,
        code: &str,
        name: String,
        email: Option<String>,
    ) -> Result<UserProfile, AppError> {
        self.store.transaction(|tx| {
            let invite: TeamInvite = tx
                .select_single(
                    Scope::Global,
                    &Query::new().filter("code", code).filter("consumed", false),
                )
                .map_err(|_| AppError::InvalidInvite)?;
            let tenant = invite.envelope.business_id.ok_or(AppError::InvalidInvite)?;

            let profile = tx.insert(
                Scope::Tenant(tenant),
                UserProfile {
                    envelope: Envelope::new(),
                    name,
                    email,
                    role: invite.role,
                    permission_overrides: invite.permissions.clone(),
                    commission: CommissionConfig::default(),
                },
            )?;

            tx.update::<TeamInvite>(Scope::Tenant(tenant), invite.envelope.id, |i| {
                i.consumed = true
            })?;
            Ok(profile)
        })
    }
}

// Código curto e legível para digitação manual; o envio por e-mail é
// colaborador externo.
fn invite_code() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::rbac::RiskLevel;
    use crate::services::tenancy_service::TenancyService;
    use crate::services::testutil::loja_nova;

    #[test]
    fn dono_e_admin_global_passam_por_qualquer_permissao() {
        for permission in Permission::ALL {
            assert!(has_permission(Role::Owner, permission, &[]));
            assert!(has_permission(Role::GlobalAdmin, permission, &[]));
        }
    }

    #[test]
    fn teto_de_permissoes_proibidas_vale_mesmo_com_override() {
        let overrides = vec!["can_manage_businesses".to_string()];
        assert!(!has_permission(
            Role::Seller,
            Permission::CanManageBusinesses,
            &overrides
        ));
        assert!(!has_permission(
            Role::Manager,
            Permission::CanEditSiteContent,
            &["can_edit_site_content".to_string()]
        ));
    }

    #[test]
    fn override_concede_alem_do_padrao_do_papel() {
        // Vendedor não gerencia produtos por padrão...
        assert!(!has_permission(Role::Seller, Permission::CanManageProducts, &[]));
        // ...mas o override por usuário concede.
        assert!(has_permission(
            Role::Seller,
            Permission::CanManageProducts,
            &["can_manage_products".to_string()]
        ));
        // E o padrão do papel continua valendo sem override.
        assert!(has_permission(Role::Seller, Permission::CanCreateSales, &[]));
        assert!(!has_permission(Role::Staff, Permission::CanCreateSales, &[]));
    }

    #[test]
    fn risco_e_metadado_e_nao_muda_a_decisao() {
        // Mesmo papel, permissões de riscos diferentes: a decisão segue a
        // tabela, não o risco.
        assert_eq!(Permission::CanManageExpenses.risk(), RiskLevel::High);
        assert!(has_permission(Role::Manager, Permission::CanManageExpenses, &[]));
        assert_eq!(Permission::CanViewDashboard.risk(), RiskLevel::Low);
        assert!(has_permission(Role::Staff, Permission::CanViewDashboard, &[]));
    }

    #[test]
    fn convite_de_gerente_sem_permissoes_e_rejeitado_antes_de_gravar() {
        let cenario = loja_nova();
        let rbac = RbacService::new(cenario.store.clone());
        let dono: UserProfile = cenario
            .store
            .get(Scope::Tenant(cenario.loja), cenario.dono)
            .unwrap();

        let result = rbac.create_invite(cenario.loja, &dono, Role::Manager, vec![]);
        assert!(matches!(result, Err(AppError::ValidationError(_))));
        assert!(rbac.list_invites(cenario.loja).is_empty());
    }

    #[test]
    fn convite_nao_concede_permissao_fora_do_conjunto_configuravel() {
        let cenario = loja_nova();
        let rbac = RbacService::new(cenario.store.clone());
        let dono: UserProfile = cenario
            .store
            .get(Scope::Tenant(cenario.loja), cenario.dono)
            .unwrap();

        let result = rbac.create_invite(
            cenario.loja,
            &dono,
            Role::Seller,
            vec!["can_manage_businesses".to_string()],
        );
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[test]
    fn aceitar_convite_cria_o_membro_com_os_overrides_concedidos() {
        let cenario = loja_nova();
        let rbac = RbacService::new(cenario.store.clone());
        let tenancy = TenancyService::new(cenario.store.clone());
        let dono: UserProfile = cenario
            .store
            .get(Scope::Tenant(cenario.loja), cenario.dono)
            .unwrap();

        let invite = rbac
            .create_invite(
                cenario.loja,
                &dono,
                Role::Seller,
                vec!["can_view_reports".to_string()],
            )
            .unwrap();

        let membro = rbac
            .accept_invite(&invite.code, "Zé Vendedor".to_string(), None)
            .unwrap();
        assert_eq!(membro.role, Role::Seller);
        assert_eq!(membro.envelope.business_id, Some(cenario.loja));
        assert!(has_permission(
            membro.role,
            Permission::CanViewReports,
            &membro.permission_overrides
        ));

        // O membro aparece na equipe e o convite não pode ser reusado.
        assert_eq!(tenancy.list_team(cenario.loja).len(), 2);
        let reuso = rbac.accept_invite(&invite.code, "Intruso".to_string(), None);
        assert!(matches!(reuso, Err(AppError::InvalidInvite)));
    }
}
