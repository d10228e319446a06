// src/services/sales_service.rs

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::{AppError, validation_error},
    db::datastore::{Datastore, Envelope, Scope},
    db::query::Query,
    models::auth::UserProfile,
    models::crm::Customer,
    models::inventory::Product,
    models::sales::{CollectionEntry, Expense, ExpenseKind, PaymentMethod, Sale, SaleItem},
};

#[derive(Clone)]
pub struct SalesService {
    store: Arc<Datastore>,
}

/// Uma linha de venda como chega do PDV. Sem preço informado, vale o
/// preço de venda atual do produto.
#[derive(Debug, Clone)]
pub struct SaleLineInput {
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Option<Decimal>,
}

impl SalesService {
    pub fn new(store: Arc<Datastore>) -> Self {
        Self { store }
    }

    // ---
    // Vendas
    // ---

    pub fn list_sales(&self, tenant: Uuid) -> Vec<Sale> {
        self.store.select(
            Scope::Tenant(tenant),
            &Query::new().order_by("createdAt", false),
        )
    }

    pub fn get_sale(&self, tenant: Uuid, id: Uuid) -> Result<Sale, AppError> {
        self.store.get(Scope::Tenant(tenant), id)
    }

    /// Cria a venda com todos os seus efeitos: baixa de estoque linha a
    /// linha (qualquer linha sem saldo derruba a venda INTEIRA, sem baixa
    /// parcial) e comissão congelada com a configuração vigente do
    /// vendedor.
    pub fn create_sale(
        &self,
        tenant: Uuid,
        seller_id: Uuid,
        customer_id: Option<Uuid>,
        items: Vec<SaleLineInput>,
        amount_collected: Decimal,
    ) -> Result<Sale, AppError> {
        self.store.transaction(|tx| {
            let scope = Scope::Tenant(tenant);

            if items.is_empty() {
                return Err(validation_error(
                    "items",
                    "A venda precisa de pelo menos um item.",
                ));
            }
            if amount_collected < Decimal::ZERO {
                return Err(validation_error(
                    "amountCollected",
                    "O valor recebido não pode ser negativo.",
                ));
            }

            let seller: UserProfile = tx.get(scope, seller_id)?;
            if let Some(customer_id) = customer_id {
                let _: Customer = tx.get(scope, customer_id)?;
            }

            let mut sale_items = Vec::with_capacity(items.len());
            let mut total_amount = Decimal::ZERO;

            for line in &items {
                if line.quantity <= Decimal::ZERO {
                    return Err(validation_error(
                        "quantity",
                        "A quantidade deve ser maior que zero.",
                    ));
                }

                let product: Product = tx.get(scope, line.product_id)?;
                if product.stock < line.quantity {
                    return Err(AppError::InsufficientStock {
                        product: product.name,
                        available: product.stock,
                    });
                }

                let quantity = line.quantity;
                tx.update::<Product>(scope, line.product_id, |p| p.stock -= quantity)?;

                let unit_price = line.unit_price.unwrap_or(product.selling_price);
                let subtotal = unit_price * quantity;
                total_amount += subtotal;
                sale_items.push(SaleItem {
                    product_id: line.product_id,
                    product_name: product.name,
                    quantity,
                    unit_price,
                    subtotal,
                });
            }

            if amount_collected > total_amount {
                return Err(validation_error(
                    "amountCollected",
                    "O valor recebido não pode exceder o total da venda.",
                ));
            }

            // Congelado aqui: mudanças futuras na configuração do vendedor
            // não recalculam vendas passadas.
            let commission_amount = seller.commission.amount_for(total_amount);

            tx.insert(
                scope,
                Sale {
                    envelope: Envelope::new(),
                    customer_id,
                    seller_id,
                    items: sale_items,
                    total_amount,
                    amount_collected,
                    due: total_amount - amount_collected,
                    commission_kind: seller.commission.kind,
                    commission_percentage: seller.commission.percentage(),
                    commission_active: seller.commission.is_active,
                    commission_amount,
                },
            )
        })
    }

    // ---
    // Recebimentos de fiado
    // ---

    pub fn list_collections(&self, tenant: Uuid, sale_id: Option<Uuid>) -> Vec<CollectionEntry> {
        let mut query = Query::new().order_by("createdAt", false);
        if let Some(sale_id) = sale_id {
            query = query.filter("saleId", sale_id);
        }
        self.store.select(Scope::Tenant(tenant), &query)
    }

    /// O acumulado de recebimentos de uma venda jamais ultrapassa o total
    /// dela.
    pub fn record_collection(
        &self,
        tenant: Uuid,
        collected_by: Uuid,
        sale_id: Uuid,
        amount: Decimal,
        method: PaymentMethod,
        collected_at: NaiveDate,
    ) -> Result<CollectionEntry, AppError> {
        self.store.transaction(|tx| {
            let scope = Scope::Tenant(tenant);

            if amount <= Decimal::ZERO {
                return Err(validation_error(
                    "amount",
                    "O valor recebido deve ser maior que zero.",
                ));
            }

            let sale: Sale = tx.get(scope, sale_id)?;
            if sale.amount_collected + amount > sale.total_amount {
                return Err(AppError::CollectionExceedsDue {
                    due: sale.total_amount - sale.amount_collected,
                });
            }

            tx.update::<Sale>(scope, sale_id, |s| {
                s.amount_collected += amount;
                s.due = s.total_amount - s.amount_collected;
            })?;

            tx.insert(
                scope,
                CollectionEntry {
                    envelope: Envelope::new(),
                    sale_id,
                    amount,
                    method,
                    collected_at,
                    collected_by,
                },
            )
        })
    }

    // ---
    // Despesas
    // ---

    pub fn list_expenses(&self, tenant: Uuid) -> Vec<Expense> {
        self.store.select(
            Scope::Tenant(tenant),
            &Query::new().order_by("expenseDate", false),
        )
    }

    pub fn create_expense(
        &self,
        tenant: Uuid,
        category: String,
        amount: Decimal,
        kind: ExpenseKind,
        expense_date: NaiveDate,
        supplier: Option<String>,
        notes: Option<String>,
    ) -> Result<Expense, AppError> {
        self.store.transaction(|tx| {
            if amount <= Decimal::ZERO {
                return Err(validation_error(
                    "amount",
                    "O valor da despesa deve ser maior que zero.",
                ));
            }
            tx.insert(
                Scope::Tenant(tenant),
                Expense {
                    envelope: Envelope::new(),
                    category,
                    amount,
                    expense_date,
                    kind,
                    supplier,
                    notes,
                },
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::{CommissionConfig, CommissionKind};
    use crate::services::inventory_service::InventoryService;
    use crate::services::tenancy_service::TenancyService;
    use crate::services::testutil::{Cenario, loja_nova};

    fn data(ano: i32, mes: u32, dia: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(ano, mes, dia).unwrap()
    }

    fn produto_com_estoque(cenario: &Cenario, sku: &str, estoque: i64, preco: i64) -> Product {
        let inv = InventoryService::new(cenario.store.clone());
        let categoria = inv
            .create_category(cenario.loja, format!("Categoria {sku}"), None)
            .unwrap();
        inv.create_product(
            cenario.loja,
            categoria.envelope.id,
            sku.to_string(),
            format!("Produto {sku}"),
            "un".to_string(),
            Decimal::from(preco / 2),
            Decimal::from(preco),
            Decimal::from(estoque),
            Decimal::ZERO,
        )
        .unwrap()
    }

    fn linha(produto: &Product, quantidade: i64) -> SaleLineInput {
        SaleLineInput {
            product_id: produto.envelope.id,
            quantity: Decimal::from(quantidade),
            unit_price: None,
        }
    }

    #[test]
    fn venda_sem_estoque_falha_sem_baixa_parcial() {
        let cenario = loja_nova();
        let sales = SalesService::new(cenario.store.clone());
        let com_saldo = produto_com_estoque(&cenario, "OK-1", 10, 10);
        let sem_saldo = produto_com_estoque(&cenario, "FALTA-1", 5, 10);

        // A primeira linha teria saldo; a segunda pede 6 de um estoque de 5.
        let result = sales.create_sale(
            cenario.loja,
            cenario.dono,
            None,
            vec![linha(&com_saldo, 2), linha(&sem_saldo, 6)],
            Decimal::ZERO,
        );
        assert!(matches!(result, Err(AppError::InsufficientStock { .. })));

        // Nenhuma linha foi baixada — nem a que tinha saldo.
        let a: Product = cenario
            .store
            .get(Scope::Tenant(cenario.loja), com_saldo.envelope.id)
            .unwrap();
        let b: Product = cenario
            .store
            .get(Scope::Tenant(cenario.loja), sem_saldo.envelope.id)
            .unwrap();
        assert_eq!(a.stock, Decimal::from(10));
        assert_eq!(b.stock, Decimal::from(5));
    }

    #[test]
    fn comissao_percentual_e_congelada_na_venda() {
        let cenario = loja_nova();
        let tenancy = TenancyService::new(cenario.store.clone());
        let sales = SalesService::new(cenario.store.clone());
        let produto = produto_com_estoque(&cenario, "COM-1", 100, 100);

        // Vendedor a 5% de comissão ativa.
        tenancy
            .update_member_commission(
                cenario.loja,
                cenario.dono,
                CommissionConfig {
                    kind: CommissionKind::Percentage,
                    rate: Decimal::from(5),
                    is_active: true,
                    effective_from: None,
                },
            )
            .unwrap();

        // Venda de 1000 -> comissão de 50.
        let venda = sales
            .create_sale(
                cenario.loja,
                cenario.dono,
                None,
                vec![linha(&produto, 10)],
                Decimal::ZERO,
            )
            .unwrap();
        assert_eq!(venda.total_amount, Decimal::from(1000));
        assert_eq!(venda.commission_amount, Decimal::from(50));
        assert_eq!(venda.commission_percentage, Decimal::from(5));

        // A taxa sobe para 10%... e a venda antiga continua em 50.
        tenancy
            .update_member_commission(
                cenario.loja,
                cenario.dono,
                CommissionConfig {
                    kind: CommissionKind::Percentage,
                    rate: Decimal::from(10),
                    is_active: true,
                    effective_from: None,
                },
            )
            .unwrap();

        let relida = sales.get_sale(cenario.loja, venda.envelope.id).unwrap();
        assert_eq!(relida.commission_amount, Decimal::from(50));
        assert_eq!(relida.commission_percentage, Decimal::from(5));
    }

    #[test]
    fn comissao_fixa_ignora_o_total_e_inativa_rende_zero() {
        let cenario = loja_nova();
        let tenancy = TenancyService::new(cenario.store.clone());
        let sales = SalesService::new(cenario.store.clone());
        let produto = produto_com_estoque(&cenario, "FIX-1", 100, 50);

        tenancy
            .update_member_commission(
                cenario.loja,
                cenario.dono,
                CommissionConfig {
                    kind: CommissionKind::Fixed,
                    rate: Decimal::from(7),
                    is_active: true,
                    effective_from: None,
                },
            )
            .unwrap();
        let fixa = sales
            .create_sale(
                cenario.loja,
                cenario.dono,
                None,
                vec![linha(&produto, 4)],
                Decimal::ZERO,
            )
            .unwrap();
        assert_eq!(fixa.commission_amount, Decimal::from(7));
        assert_eq!(fixa.commission_percentage, Decimal::ZERO);

        // Configuração inativa: comissão zero, mas registrada para
        // auditoria.
        tenancy
            .update_member_commission(
                cenario.loja,
                cenario.dono,
                CommissionConfig {
                    kind: CommissionKind::Fixed,
                    rate: Decimal::from(7),
                    is_active: false,
                    effective_from: None,
                },
            )
            .unwrap();
        let inativa = sales
            .create_sale(
                cenario.loja,
                cenario.dono,
                None,
                vec![linha(&produto, 4)],
                Decimal::ZERO,
            )
            .unwrap();
        assert_eq!(inativa.commission_amount, Decimal::ZERO);
        assert!(!inativa.commission_active);
        assert_eq!(inativa.commission_kind, CommissionKind::Fixed);
    }

    #[test]
    fn recebimentos_nunca_excedem_o_total_da_venda() {
        let cenario = loja_nova();
        let sales = SalesService::new(cenario.store.clone());
        let produto = produto_com_estoque(&cenario, "FIA-1", 10, 100);

        // Venda de 300 com 100 recebidos na hora.
        let venda = sales
            .create_sale(
                cenario.loja,
                cenario.dono,
                None,
                vec![linha(&produto, 3)],
                Decimal::from(100),
            )
            .unwrap();
        assert_eq!(venda.due, Decimal::from(200));

        sales
            .record_collection(
                cenario.loja,
                cenario.dono,
                venda.envelope.id,
                Decimal::from(150),
                PaymentMethod::Cash,
                data(2024, 4, 1),
            )
            .unwrap();

        // Restam 50; tentar receber 100 estoura o teto.
        let excesso = sales.record_collection(
            cenario.loja,
            cenario.dono,
            venda.envelope.id,
            Decimal::from(100),
            PaymentMethod::Cash,
            data(2024, 4, 2),
        );
        assert!(matches!(
            excesso,
            Err(AppError::CollectionExceedsDue { .. })
        ));

        let relida = sales.get_sale(cenario.loja, venda.envelope.id).unwrap();
        assert_eq!(relida.amount_collected, Decimal::from(250));
        assert_eq!(relida.due, Decimal::from(50));
    }

    #[test]
    fn recebido_na_criacao_nao_pode_exceder_o_total() {
        let cenario = loja_nova();
        let sales = SalesService::new(cenario.store.clone());
        let produto = produto_com_estoque(&cenario, "PAG-1", 10, 10);

        let result = sales.create_sale(
            cenario.loja,
            cenario.dono,
            None,
            vec![linha(&produto, 1)],
            Decimal::from(999),
        );
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }
}
