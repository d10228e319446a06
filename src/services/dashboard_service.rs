// src/services/dashboard_service.rs

use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    db::datastore::{Datastore, Scope},
    db::query::Query,
    models::dashboard::{SalesSummary, StockValuation},
    models::inventory::Product,
    models::sales::{Expense, Sale},
};

// Agregações derivadas e somente leitura: nada aqui grava no store.
#[derive(Clone)]
pub struct DashboardService {
    store: Arc<Datastore>,
}

impl DashboardService {
    pub fn new(store: Arc<Datastore>) -> Self {
        Self { store }
    }

    /// Valor do estoque a custo e a preço de venda, com a margem
    /// potencial.
    pub fn stock_valuation(&self, tenant: Uuid) -> StockValuation {
        let products: Vec<Product> = self.store.select(Scope::Tenant(tenant), &Query::new());

        let mut total_cost_value = Decimal::ZERO;
        let mut total_sale_value = Decimal::ZERO;
        for product in &products {
            total_cost_value += product.stock * product.cost_price;
            total_sale_value += product.stock * product.selling_price;
        }

        let potential_profit = total_sale_value - total_cost_value;
        let margin_percent = if total_sale_value > Decimal::ZERO {
            potential_profit / total_sale_value * Decimal::from(100)
        } else {
            Decimal::ZERO
        };

        StockValuation {
            total_cost_value,
            total_sale_value,
            potential_profit,
            margin_percent,
        }
    }

    pub fn sales_summary(&self, tenant: Uuid) -> SalesSummary {
        let sales: Vec<Sale> = self.store.select(Scope::Tenant(tenant), &Query::new());
        let expenses: Vec<Expense> = self.store.select(Scope::Tenant(tenant), &Query::new());

        let mut summary = SalesSummary {
            total_sales: sales.len() as u64,
            total_amount: Decimal::ZERO,
            total_collected: Decimal::ZERO,
            total_due: Decimal::ZERO,
            total_commission: Decimal::ZERO,
            total_expenses: Decimal::ZERO,
        };
        for sale in &sales {
            summary.total_amount += sale.total_amount;
            summary.total_collected += sale.amount_collected;
            summary.total_due += sale.due;
            summary.total_commission += sale.commission_amount;
        }
        for expense in &expenses {
            summary.total_expenses += expense.amount;
        }
        summary
    }

    /// Produtos no limite (ou abaixo) do alerta de estoque baixo. O
    /// filtro `<=` fica no serviço: a camada de consulta só conhece
    /// igualdade.
    pub fn low_stock(&self, tenant: Uuid) -> Vec<Product> {
        self.store
            .select::<Product>(Scope::Tenant(tenant), &Query::new().order_by("name", true))
            .into_iter()
            .filter(|p| p.stock <= p.low_stock_threshold)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sales::ExpenseKind;
    use crate::services::inventory_service::InventoryService;
    use crate::services::sales_service::{SaleLineInput, SalesService};
    use crate::services::testutil::loja_nova;
    use chrono::NaiveDate;

    #[test]
    fn valuation_e_resumo_consolidam_os_numeros_da_loja() {
        let cenario = loja_nova();
        let inv = InventoryService::new(cenario.store.clone());
        let sales = SalesService::new(cenario.store.clone());
        let dashboard = DashboardService::new(cenario.store.clone());

        let categoria = inv
            .create_category(cenario.loja, "Geral".to_string(), None)
            .unwrap();
        // 10 unidades: custo 4, venda 6.
        let produto = inv
            .create_product(
                cenario.loja,
                categoria.envelope.id,
                "VAL-1".to_string(),
                "Produto Valioso".to_string(),
                "un".to_string(),
                Decimal::from(4),
                Decimal::from(6),
                Decimal::from(10),
                Decimal::from(2),
            )
            .unwrap();

        let valuation = dashboard.stock_valuation(cenario.loja);
        assert_eq!(valuation.total_cost_value, Decimal::from(40));
        assert_eq!(valuation.total_sale_value, Decimal::from(60));
        assert_eq!(valuation.potential_profit, Decimal::from(20));

        // Vende 2 unidades (12), recebe 10 e lança uma despesa de 5.
        sales
            .create_sale(
                cenario.loja,
                cenario.dono,
                None,
                vec![SaleLineInput {
                    product_id: produto.envelope.id,
                    quantity: Decimal::from(2),
                    unit_price: None,
                }],
                Decimal::from(10),
            )
            .unwrap();
        sales
            .create_expense(
                cenario.loja,
                "Frete".to_string(),
                Decimal::from(5),
                ExpenseKind::Business,
                NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
                None,
                None,
            )
            .unwrap();

        let summary = dashboard.sales_summary(cenario.loja);
        assert_eq!(summary.total_sales, 1);
        assert_eq!(summary.total_amount, Decimal::from(12));
        assert_eq!(summary.total_collected, Decimal::from(10));
        assert_eq!(summary.total_due, Decimal::from(2));
        assert_eq!(summary.total_expenses, Decimal::from(5));
    }

    #[test]
    fn alerta_de_estoque_baixo_usa_o_limite_do_produto() {
        let cenario = loja_nova();
        let inv = InventoryService::new(cenario.store.clone());
        let dashboard = DashboardService::new(cenario.store.clone());

        let categoria = inv
            .create_category(cenario.loja, "Geral".to_string(), None)
            .unwrap();
        inv.create_product(
            cenario.loja,
            categoria.envelope.id,
            "BAIXO-1".to_string(),
            "Quase Acabando".to_string(),
            "un".to_string(),
            Decimal::ONE,
            Decimal::from(2),
            Decimal::from(2),
            Decimal::from(3),
        )
        .unwrap();
        inv.create_product(
            cenario.loja,
            categoria.envelope.id,
            "CHEIO-1".to_string(),
            "Sobrando".to_string(),
            "un".to_string(),
            Decimal::ONE,
            Decimal::from(2),
            Decimal::from(50),
            Decimal::from(3),
        )
        .unwrap();

        let alerta = dashboard.low_stock(cenario.loja);
        assert_eq!(alerta.len(), 1);
        assert_eq!(alerta[0].sku, "BAIXO-1");
    }
}
