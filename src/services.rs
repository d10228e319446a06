pub mod crm_service;
pub use crm_service::CrmService;
pub mod dashboard_service;
pub use dashboard_service::DashboardService;
pub mod inventory_service;
pub use inventory_service::InventoryService;
pub mod rbac_service;
pub use rbac_service::RbacService;
pub mod sales_service;
pub use sales_service::SalesService;
pub mod settings_service;
pub use settings_service::SettingsService;
pub mod tenancy_service;
pub use tenancy_service::TenancyService;

// Cenário base compartilhado pelos testes de serviço: um store em memória
// com uma loja recém-criada e o perfil do dono.
#[cfg(test)]
pub(crate) mod testutil {
    use std::sync::Arc;

    use uuid::Uuid;

    use crate::db::datastore::Datastore;
    use crate::models::tenancy::Industry;
    use crate::services::tenancy_service::TenancyService;

    pub struct Cenario {
        pub store: Arc<Datastore>,
        pub loja: Uuid,
        pub dono: Uuid,
    }

    pub fn loja_nova() -> Cenario {
        let store = Arc::new(Datastore::in_memory());
        let tenancy = TenancyService::new(store.clone());
        let (business, owner) = tenancy
            .create_business(
                "Mercearia Central".to_string(),
                Industry::Retail,
                "Dona Maria".to_string(),
                None,
            )
            .expect("cenário base deveria criar a loja");
        Cenario {
            store,
            loja: business.envelope.id,
            dono: owner.envelope.id,
        }
    }
}
