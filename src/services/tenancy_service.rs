// src/services/tenancy_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::datastore::{Datastore, Envelope, Scope},
    db::query::Query,
    models::auth::{CommissionConfig, Role, UserProfile},
    models::tenancy::{Business, Industry},
};

#[derive(Clone)]
pub struct TenancyService {
    store: Arc<Datastore>,
}

impl TenancyService {
    pub fn new(store: Arc<Datastore>) -> Self {
        Self { store }
    }

    /// O fluxo de abertura de conta: cria a loja e o perfil do dono numa
    /// única transação. A loja nunca é removida fisicamente depois.
    pub fn create_business(
        &self,
        name: String,
        industry: Industry,
        owner_name: String,
        owner_email: Option<String>,
    ) -> Result<(Business, UserProfile), AppError> {
        self.store.transaction(|tx| {
            let owner = UserProfile {
                envelope: Envelope::new(),
                name: owner_name,
                email: owner_email,
                role: Role::Owner,
                permission_overrides: Vec::new(),
                commission: CommissionConfig::default(),
            };

            let business = Business {
                envelope: Envelope::new(),
                name,
                owner_id: owner.envelope.id,
                industry,
                visible_menus: industry.default_menus(),
            };

            let business = tx.insert(Scope::Global, business)?;
            let owner = tx.insert(Scope::Tenant(business.envelope.id), owner)?;
            Ok((business, owner))
        })
    }

    pub fn get_business(&self, tenant: Uuid) -> Result<Business, AppError> {
        self.store.get(Scope::Global, tenant)
    }

    /// As lojas visíveis para um usuário: as que ele possui e a que o seu
    /// perfil pertence.
    pub fn businesses_for(&self, user: &UserProfile) -> Vec<Business> {
        let mut businesses: Vec<Business> = self.store.select(
            Scope::Global,
            &Query::new().filter("ownerId", user.envelope.id),
        );
        if let Some(member_of) = user.envelope.business_id {
            if businesses.iter().all(|b| b.envelope.id != member_of) {
                if let Ok(business) = self.store.get::<Business>(Scope::Global, member_of) {
                    businesses.push(business);
                }
            }
        }
        businesses
    }

    pub fn list_team(&self, tenant: Uuid) -> Vec<UserProfile> {
        self.store.select(
            Scope::Tenant(tenant),
            &Query::new().order_by("createdAt", true),
        )
    }

    /// Atualiza a configuração de comissão de um membro. Vendas já
    /// registradas não são tocadas: a comissão delas ficou congelada na
    /// criação.
    pub fn update_member_commission(
        &self,
        tenant: Uuid,
        user_id: Uuid,
        commission: CommissionConfig,
    ) -> Result<UserProfile, AppError> {
        self.store.transaction(|tx| {
            tx.update::<UserProfile>(Scope::Tenant(tenant), user_id, |user| {
                user.commission = commission;
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testutil::loja_nova;

    #[test]
    fn abrir_loja_cria_dono_vinculado() {
        let cenario = loja_nova();
        let tenancy = TenancyService::new(cenario.store.clone());

        let business = tenancy.get_business(cenario.loja).unwrap();
        let dono: UserProfile = cenario
            .store
            .get(Scope::Tenant(cenario.loja), cenario.dono)
            .unwrap();

        assert_eq!(business.owner_id, dono.envelope.id);
        assert_eq!(dono.role, Role::Owner);
        assert_eq!(dono.envelope.business_id, Some(cenario.loja));
        assert!(business.visible_menus.contains(&"pos".to_string()));

        // O dono enxerga a própria loja na listagem.
        let visiveis = tenancy.businesses_for(&dono);
        assert_eq!(visiveis.len(), 1);
        assert_eq!(visiveis[0].envelope.id, cenario.loja);
    }
}
