// src/config.rs

use std::env;
use std::sync::Arc;

use crate::db::datastore::Datastore;
use crate::db::snapshot::FileBackend;
use crate::services::{
    CrmService, DashboardService, InventoryService, RbacService, SalesService, SettingsService,
    TenancyService,
};

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Datastore>,
    pub tenancy_service: TenancyService,
    pub inventory_service: InventoryService,
    pub sales_service: SalesService,
    pub crm_service: CrmService,
    pub settings_service: SettingsService,
    pub rbac_service: RbacService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        // Com STORE_PATH definido, o snapshot vive num arquivo JSON; sem
        // ele, tudo fica em memória (útil em desenvolvimento e testes).
        let store = match env::var("STORE_PATH") {
            Ok(path) => {
                let store = Datastore::open(Box::new(FileBackend::new(&path)))?;
                tracing::info!("💾 Snapshot persistido em {}", path);
                store
            }
            Err(_) => {
                tracing::warn!("STORE_PATH não definido; usando armazenamento em memória");
                Datastore::in_memory()
            }
        };
        let store = Arc::new(store);

        // --- Monta o gráfico de dependências ---
        Ok(Self {
            tenancy_service: TenancyService::new(store.clone()),
            inventory_service: InventoryService::new(store.clone()),
            sales_service: SalesService::new(store.clone()),
            crm_service: CrmService::new(store.clone()),
            settings_service: SettingsService::new(store.clone()),
            rbac_service: RbacService::new(store.clone()),
            dashboard_service: DashboardService::new(store.clone()),
            store,
        })
    }
}
