// src/models/sales.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::datastore::{Envelope, Record};
use crate::models::auth::CommissionKind;

// ---
// 1. Venda e seus itens
// ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub product_id: Uuid,

    // Nome desnormalizado para o recibo continuar legível mesmo que o
    // produto seja renomeado depois.
    pub product_name: String,

    pub quantity: Decimal,

    pub unit_price: Decimal,

    pub subtotal: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    #[serde(flatten)]
    pub envelope: Envelope,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<Uuid>,

    pub seller_id: Uuid,

    pub items: Vec<SaleItem>,

    pub total_amount: Decimal,

    pub amount_collected: Decimal,

    // Sempre total - recebido; nunca negativo.
    pub due: Decimal,

    // A configuração de comissão vigente no momento da venda, congelada
    // aqui para sempre: mudar a taxa do vendedor depois não recalcula nada.
    pub commission_kind: CommissionKind,
    pub commission_percentage: Decimal,
    pub commission_active: bool,
    pub commission_amount: Decimal,
}

impl Record for Sale {
    const COLLECTION: &'static str = "sales";

    fn envelope(&self) -> &Envelope {
        &self.envelope
    }
    fn envelope_mut(&mut self) -> &mut Envelope {
        &mut self.envelope
    }
}

// ---
// 2. Recebimentos de fiado
// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    MobileBanking,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CollectionEntry {
    #[serde(flatten)]
    pub envelope: Envelope,

    pub sale_id: Uuid,

    pub amount: Decimal,

    pub method: PaymentMethod,

    pub collected_at: NaiveDate,

    pub collected_by: Uuid,
}

impl Record for CollectionEntry {
    const COLLECTION: &'static str = "collections";

    fn envelope(&self) -> &Envelope {
        &self.envelope
    }
    fn envelope_mut(&mut self) -> &mut Envelope {
        &mut self.envelope
    }
}

// ---
// 3. Despesas
// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseKind {
    Business,
    Personal,
    Owner,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    #[serde(flatten)]
    pub envelope: Envelope,

    #[schema(example = "Aluguel")]
    pub category: String,

    pub amount: Decimal,

    pub expense_date: NaiveDate,

    pub kind: ExpenseKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Record for Expense {
    const COLLECTION: &'static str = "expenses";

    fn envelope(&self) -> &Envelope {
        &self.envelope
    }
    fn envelope_mut(&mut self) -> &mut Envelope {
        &mut self.envelope
    }
}
