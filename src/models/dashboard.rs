// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

// Agregações derivadas, somente leitura, calculadas em cima de produtos,
// vendas e despesas. Nada aqui é persistido.

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockValuation {
    // Σ estoque × preço de custo
    pub total_cost_value: Decimal,

    // Σ estoque × preço de venda
    pub total_sale_value: Decimal,

    pub potential_profit: Decimal,

    #[schema(example = "35.5")]
    pub margin_percent: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub total_sales: u64,
    pub total_amount: Decimal,
    pub total_collected: Decimal,
    pub total_due: Decimal,
    pub total_commission: Decimal,
    pub total_expenses: Decimal,
}
