// src/models/inventory.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::datastore::{Envelope, Record};

// ---
// 1. Categorias
// ---
// `product_count` é desnormalizado de propósito: os hooks de produto
// mantêm o contador, e a exclusão é barrada enquanto ele for > 0.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(flatten)]
    pub envelope: Envelope,

    #[schema(example = "Bebidas")]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub product_count: u32,
}

impl Record for Category {
    const COLLECTION: &'static str = "categories";

    fn envelope(&self) -> &Envelope {
        &self.envelope
    }
    fn envelope_mut(&mut self) -> &mut Envelope {
        &mut self.envelope
    }
}

// ---
// 2. Produtos
// ---
// `stock` é somente leitura para quem está de fora: só os hooks de
// entrada/venda/avaria mexem nele, e ele nunca fica negativo.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(flatten)]
    pub envelope: Envelope,

    pub category_id: Uuid,

    #[schema(example = "COLA-350")]
    pub sku: String,

    #[schema(example = "Refrigerante Cola 350ml")]
    pub name: String,

    #[schema(example = "un")]
    pub unit: String,

    pub cost_price: Decimal,

    pub selling_price: Decimal,

    pub stock: Decimal,

    pub low_stock_threshold: Decimal,
}

impl Record for Product {
    const COLLECTION: &'static str = "products";

    fn envelope(&self) -> &Envelope {
        &self.envelope
    }
    fn envelope_mut(&mut self) -> &mut Envelope {
        &mut self.envelope
    }
}

// ---
// 3. Entradas de estoque (o livro de compras)
// ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockEntryLine {
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockEntry {
    #[serde(flatten)]
    pub envelope: Envelope,

    pub items: Vec<StockEntryLine>,

    // Σ (quantidade × custo unitário), calculado no serviço.
    pub total_cost: Decimal,

    pub entry_date: NaiveDate,

    pub recorded_by: Uuid,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Record for StockEntry {
    const COLLECTION: &'static str = "stock_entries";

    fn envelope(&self) -> &Envelope {
        &self.envelope
    }
    fn envelope_mut(&mut self) -> &mut Envelope {
        &mut self.envelope
    }
}

// ---
// 4. Avarias / perdas
// ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DamageRecord {
    #[serde(flatten)]
    pub envelope: Envelope,

    pub product_id: Uuid,

    pub quantity: Decimal,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    pub damage_date: NaiveDate,

    pub recorded_by: Uuid,
}

impl Record for DamageRecord {
    const COLLECTION: &'static str = "damages";

    fn envelope(&self) -> &Envelope {
        &self.envelope
    }
    fn envelope_mut(&mut self) -> &mut Envelope {
        &mut self.envelope
    }
}
