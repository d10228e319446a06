// src/services/settings_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::datastore::{Datastore, Scope},
    db::query::Query,
    models::settings::{BusinessSettings, UpdateSettingsPayload},
};

#[derive(Clone)]
pub struct SettingsService {
    store: Arc<Datastore>,
}

impl SettingsService {
    pub fn new(store: Arc<Datastore>) -> Self {
        Self { store }
    }

    /// Loja sem configurações salvas recebe o esqueleto vazio (sem gravar
    /// nada).
    pub fn get_settings(&self, tenant: Uuid) -> BusinessSettings {
        self.store
            .select::<BusinessSettings>(Scope::Tenant(tenant), &Query::new())
            .into_iter()
            .next()
            .unwrap_or_else(BusinessSettings::empty)
    }

    /// Deep-merge campo a campo: painéis diferentes da UI atualizam grupos
    /// diferentes sem sobrescrever o que não enviaram.
    pub fn update_settings(
        &self,
        tenant: Uuid,
        payload: UpdateSettingsPayload,
    ) -> Result<BusinessSettings, AppError> {
        self.store.transaction(|tx| {
            let scope = Scope::Tenant(tenant);
            let existing: Vec<BusinessSettings> = tx.select(scope, &Query::new());
            match existing.into_iter().next() {
                Some(current) => {
                    tx.update::<BusinessSettings>(scope, current.envelope.id, |settings| {
                        settings.merge(payload)
                    })
                }
                None => {
                    let mut fresh = BusinessSettings::empty();
                    fresh.merge(payload);
                    tx.insert(scope, fresh)
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::settings::{GeneralInfo, TaxConfig};
    use crate::services::testutil::loja_nova;
    use rust_decimal::Decimal;

    #[test]
    fn paineis_diferentes_nao_se_sobrescrevem() {
        let cenario = loja_nova();
        let settings = SettingsService::new(cenario.store.clone());

        // O painel de dados gerais salva nome e moeda.
        settings
            .update_settings(
                cenario.loja,
                UpdateSettingsPayload {
                    general: Some(GeneralInfo {
                        shop_name: Some("Mercearia Central".to_string()),
                        currency: Some("BRL".to_string()),
                        ..GeneralInfo::default()
                    }),
                    ..UpdateSettingsPayload::default()
                },
            )
            .unwrap();

        // Depois o painel de imposto salva só a taxa.
        settings
            .update_settings(
                cenario.loja,
                UpdateSettingsPayload {
                    tax: Some(TaxConfig {
                        tax_enabled: Some(true),
                        tax_rate: Some(Decimal::from(10)),
                        ..TaxConfig::default()
                    }),
                    ..UpdateSettingsPayload::default()
                },
            )
            .unwrap();

        // E um novo toque nos dados gerais mexe só no telefone.
        let atual = settings
            .update_settings(
                cenario.loja,
                UpdateSettingsPayload {
                    general: Some(GeneralInfo {
                        phone: Some("(11) 99999-8888".to_string()),
                        ..GeneralInfo::default()
                    }),
                    ..UpdateSettingsPayload::default()
                },
            )
            .unwrap();

        assert_eq!(atual.general.shop_name.as_deref(), Some("Mercearia Central"));
        assert_eq!(atual.general.currency.as_deref(), Some("BRL"));
        assert_eq!(atual.general.phone.as_deref(), Some("(11) 99999-8888"));
        assert_eq!(atual.tax.tax_enabled, Some(true));
        assert_eq!(atual.tax.tax_rate, Some(Decimal::from(10)));
    }
}
