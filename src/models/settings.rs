// src/models/settings.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::datastore::{Envelope, Record};

// ---
// Configurações da Loja
// ---
// Três grupos aninhados (dados gerais, imposto, fatura), cada um editado
// por um painel diferente da UI. A atualização é um deep-merge campo a
// campo: um painel nunca sobrescreve o que o outro salvou.

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneralInfo {
    #[schema(example = "Mercearia Central")]
    pub shop_name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[schema(example = "BRL")]
    pub currency: Option<String>,
    pub logo_url: Option<String>,
}

impl GeneralInfo {
    fn merge(&mut self, patch: GeneralInfo) {
        if patch.shop_name.is_some() {
            self.shop_name = patch.shop_name;
        }
        if patch.address.is_some() {
            self.address = patch.address;
        }
        if patch.phone.is_some() {
            self.phone = patch.phone;
        }
        if patch.email.is_some() {
            self.email = patch.email;
        }
        if patch.currency.is_some() {
            self.currency = patch.currency;
        }
        if patch.logo_url.is_some() {
            self.logo_url = patch.logo_url;
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct TaxConfig {
    pub tax_enabled: Option<bool>,
    #[schema(example = "10.0")]
    pub tax_rate: Option<Decimal>,
    #[schema(example = "ICMS")]
    pub tax_label: Option<String>,
    pub tax_included: Option<bool>,
}

impl TaxConfig {
    fn merge(&mut self, patch: TaxConfig) {
        if patch.tax_enabled.is_some() {
            self.tax_enabled = patch.tax_enabled;
        }
        if patch.tax_rate.is_some() {
            self.tax_rate = patch.tax_rate;
        }
        if patch.tax_label.is_some() {
            self.tax_label = patch.tax_label;
        }
        if patch.tax_included.is_some() {
            self.tax_included = patch.tax_included;
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct InvoiceConfig {
    #[schema(example = "NF-")]
    pub prefix: Option<String>,
    pub footer_note: Option<String>,
    pub show_logo: Option<bool>,
    pub show_due: Option<bool>,
}

impl InvoiceConfig {
    fn merge(&mut self, patch: InvoiceConfig) {
        if patch.prefix.is_some() {
            self.prefix = patch.prefix;
        }
        if patch.footer_note.is_some() {
            self.footer_note = patch.footer_note;
        }
        if patch.show_logo.is_some() {
            self.show_logo = patch.show_logo;
        }
        if patch.show_due.is_some() {
            self.show_due = patch.show_due;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BusinessSettings {
    #[serde(flatten)]
    pub envelope: Envelope,

    #[serde(default)]
    pub general: GeneralInfo,

    #[serde(default)]
    pub tax: TaxConfig,

    #[serde(default)]
    pub invoice: InvoiceConfig,
}

impl BusinessSettings {
    pub fn empty() -> Self {
        Self {
            envelope: Envelope::new(),
            general: GeneralInfo::default(),
            tax: TaxConfig::default(),
            invoice: InvoiceConfig::default(),
        }
    }

    /// Deep-merge: só os grupos presentes no payload são tocados, e dentro
    /// de cada grupo só os campos enviados.
    pub fn merge(&mut self, patch: UpdateSettingsPayload) {
        if let Some(general) = patch.general {
            self.general.merge(general);
        }
        if let Some(tax) = patch.tax {
            self.tax.merge(tax);
        }
        if let Some(invoice) = patch.invoice {
            self.invoice.merge(invoice);
        }
    }
}

impl Record for BusinessSettings {
    const COLLECTION: &'static str = "settings";

    fn envelope(&self) -> &Envelope {
        &self.envelope
    }
    fn envelope_mut(&mut self) -> &mut Envelope {
        &mut self.envelope
    }
}

// O payload de atualização parcial vindo dos painéis da UI.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateSettingsPayload {
    pub general: Option<GeneralInfo>,
    pub tax: Option<TaxConfig>,
    pub invoice: Option<InvoiceConfig>,
}
