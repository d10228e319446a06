// src/services/crm_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::datastore::{Datastore, Envelope, Scope},
    db::query::Query,
    models::crm::Customer,
};

// Gestão de Clientes
#[derive(Clone)]
pub struct CrmService {
    store: Arc<Datastore>,
}

impl CrmService {
    pub fn new(store: Arc<Datastore>) -> Self {
        Self { store }
    }

    pub fn list_customers(&self, tenant: Uuid) -> Vec<Customer> {
        self.store
            .select(Scope::Tenant(tenant), &Query::new().order_by("name", true))
    }

    pub fn create_customer(
        &self,
        tenant: Uuid,
        name: String,
        phone: Option<String>,
        email: Option<String>,
        address: Option<String>,
        notes: Option<String>,
    ) -> Result<Customer, AppError> {
        self.store.transaction(|tx| {
            tx.insert(
                Scope::Tenant(tenant),
                Customer {
                    envelope: Envelope::new(),
                    name,
                    phone,
                    email,
                    address,
                    notes,
                },
            )
        })
    }
}
