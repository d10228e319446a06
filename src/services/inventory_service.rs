// src/services/inventory_service.rs

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::{AppError, validation_error},
    db::datastore::{Datastore, Envelope, Scope, Transaction},
    db::query::Query,
    models::inventory::{Category, DamageRecord, Product, StockEntry, StockEntryLine},
};

#[derive(Clone)]
pub struct InventoryService {
    store: Arc<Datastore>,
}

/// Campos opcionais de edição de produto. Estoque fica de fora de
/// propósito: só os hooks de entrada/venda/avaria mexem nele.
#[derive(Debug, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub unit: Option<String>,
    pub category_id: Option<Uuid>,
    pub cost_price: Option<Decimal>,
    pub selling_price: Option<Decimal>,
    pub low_stock_threshold: Option<Decimal>,
}

impl InventoryService {
    pub fn new(store: Arc<Datastore>) -> Self {
        Self { store }
    }

    // ---
    // Categorias
    // ---

    pub fn list_categories(&self, tenant: Uuid) -> Vec<Category> {
        self.store
            .select(Scope::Tenant(tenant), &Query::new().order_by("name", true))
    }

    pub fn create_category(
        &self,
        tenant: Uuid,
        name: String,
        description: Option<String>,
    ) -> Result<Category, AppError> {
        self.store.transaction(|tx| {
            tx.insert(
                Scope::Tenant(tenant),
                Category {
                    envelope: Envelope::new(),
                    name,
                    description,
                    product_count: 0,
                },
            )
        })
    }

    /// Exclusão barrada enquanto houver produto apontando para a
    /// categoria.
    pub fn delete_category(&self, tenant: Uuid, id: Uuid) -> Result<(), AppError> {
        self.store.transaction(|tx| {
            let scope = Scope::Tenant(tenant);
            let category: Category = tx.get(scope, id)?;
            if category.product_count > 0 {
                return Err(AppError::CategoryNotEmpty(
                    category.name,
                    category.product_count,
                ));
            }
            tx.delete::<Category>(scope, id)
        })
    }

    // ---
    // Produtos
    // ---

    pub fn list_products(&self, tenant: Uuid) -> Vec<Product> {
        self.store
            .select(Scope::Tenant(tenant), &Query::new().order_by("name", true))
    }

    pub fn create_product(
        &self,
        tenant: Uuid,
        category_id: Uuid,
        sku: String,
        name: String,
        unit: String,
        cost_price: Decimal,
        selling_price: Decimal,
        initial_stock: Decimal,
        low_stock_threshold: Decimal,
    ) -> Result<Product, AppError> {
        self.store.transaction(|tx| {
            let scope = Scope::Tenant(tenant);

            // SKU único por loja
            let duplicated: Vec<Product> = tx.select(scope, &Query::new().filter("sku", &sku));
            if !duplicated.is_empty() {
                return Err(AppError::SkuAlreadyExists(sku));
            }

            let _category: Category = tx.get(scope, category_id)?;

            if cost_price < Decimal::ZERO || selling_price < Decimal::ZERO {
                return Err(validation_error("price", "O preço não pode ser negativo."));
            }
            if initial_stock < Decimal::ZERO {
                return Err(validation_error(
                    "initialStock",
                    "O estoque inicial não pode ser negativo.",
                ));
            }

            let product = tx.insert(
                scope,
                Product {
                    envelope: Envelope::new(),
                    category_id,
                    sku,
                    name,
                    unit,
                    cost_price,
                    selling_price,
                    stock: initial_stock,
                    low_stock_threshold,
                },
            )?;

            tx.update::<Category>(scope, category_id, |c| c.product_count += 1)?;
            Ok(product)
        })
    }

    pub fn update_product(
        &self,
        tenant: Uuid,
        id: Uuid,
        input: ProductUpdate,
    ) -> Result<Product, AppError> {
        self.store.transaction(|tx| {
            let scope = Scope::Tenant(tenant);
            let before: Product = tx.get(scope, id)?;

            if let Some(new_sku) = &input.sku {
                if *new_sku != before.sku {
                    let clash: Vec<Product> =
                        tx.select(scope, &Query::new().filter("sku", new_sku));
                    if clash.iter().any(|p| p.envelope.id != id) {
                        return Err(AppError::SkuAlreadyExists(new_sku.clone()));
                    }
                }
            }

            // A nova categoria precisa existir antes de movermos o contador.
            if let Some(new_category) = input.category_id {
                if new_category != before.category_id {
                    let _: Category = tx.get(scope, new_category)?;
                }
            }

            let updated = tx.update::<Product>(scope, id, |p| {
                if let Some(name) = input.name {
                    p.name = name;
                }
                if let Some(sku) = input.sku {
                    p.sku = sku;
                }
                if let Some(unit) = input.unit {
                    p.unit = unit;
                }
                if let Some(category_id) = input.category_id {
                    p.category_id = category_id;
                }
                if let Some(cost_price) = input.cost_price {
                    p.cost_price = cost_price;
                }
                if let Some(selling_price) = input.selling_price {
                    p.selling_price = selling_price;
                }
                if let Some(threshold) = input.low_stock_threshold {
                    p.low_stock_threshold = threshold;
                }
            })?;

            if updated.category_id != before.category_id {
                tx.update::<Category>(scope, before.category_id, |c| {
                    c.product_count = c.product_count.saturating_sub(1)
                })?;
                tx.update::<Category>(scope, updated.category_id, |c| c.product_count += 1)?;
            }

            Ok(updated)
        })
    }

    pub fn delete_product(&self, tenant: Uuid, id: Uuid) -> Result<(), AppError> {
        self.store.transaction(|tx| {
            let scope = Scope::Tenant(tenant);
            let product: Product = tx.get(scope, id)?;
            tx.delete::<Product>(scope, id)?;
            tx.update::<Category>(scope, product.category_id, |c| {
                c.product_count = c.product_count.saturating_sub(1)
            })?;
            Ok(())
        })
    }

    // ---
    // Entradas de estoque
    // ---

    pub fn list_stock_entries(&self, tenant: Uuid) -> Vec<StockEntry> {
        self.store.select(
            Scope::Tenant(tenant),
            &Query::new().order_by("createdAt", false),
        )
    }

    pub fn create_stock_entry(
        &self,
        tenant: Uuid,
        recorded_by: Uuid,
        entry_date: NaiveDate,
        notes: Option<String>,
        items: Vec<StockEntryLine>,
    ) -> Result<StockEntry, AppError> {
        self.store.transaction(|tx| {
            let scope = Scope::Tenant(tenant);
            let total_cost = apply_entry_lines(tx, scope, &items)?;
            tx.insert(
                scope,
                StockEntry {
                    envelope: Envelope::new(),
                    items,
                    total_cost,
                    entry_date,
                    recorded_by,
                    notes,
                },
            )
        })
    }

    /// A edição pode trocar o produto referenciado, então primeiro o
    /// efeito original é revertido por inteiro e só depois as novas linhas
    /// são aplicadas.
    pub fn update_stock_entry(
        &self,
        tenant: Uuid,
        id: Uuid,
        entry_date: Option<NaiveDate>,
        notes: Option<String>,
        items: Vec<StockEntryLine>,
    ) -> Result<StockEntry, AppError> {
        self.store.transaction(|tx| {
            let scope = Scope::Tenant(tenant);
            let original: StockEntry = tx.get(scope, id)?;

            for line in &original.items {
                adjust_stock(tx, scope, line.product_id, -line.quantity)?;
            }

            let total_cost = apply_entry_lines(tx, scope, &items)?;

            tx.update::<StockEntry>(scope, id, |entry| {
                entry.items = items;
                entry.total_cost = total_cost;
                if let Some(date) = entry_date {
                    entry.entry_date = date;
                }
                if notes.is_some() {
                    entry.notes = notes;
                }
            })
        })
    }

    // ---
    // Avarias
    // ---

    pub fn list_damages(&self, tenant: Uuid) -> Vec<DamageRecord> {
        self.store.select(
            Scope::Tenant(tenant),
            &Query::new().order_by("createdAt", false),
        )
    }

    pub fn create_damage(
        &self,
        tenant: Uuid,
        recorded_by: Uuid,
        product_id: Uuid,
        quantity: Decimal,
        reason: Option<String>,
        damage_date: NaiveDate,
    ) -> Result<DamageRecord, AppError> {
        self.store.transaction(|tx| {
            let scope = Scope::Tenant(tenant);
            if quantity <= Decimal::ZERO {
                return Err(validation_error(
                    "quantity",
                    "A quantidade deve ser maior que zero.",
                ));
            }
            adjust_stock(tx, scope, product_id, -quantity)?;
            tx.insert(
                scope,
                DamageRecord {
                    envelope: Envelope::new(),
                    product_id,
                    quantity,
                    reason,
                    damage_date,
                    recorded_by,
                },
            )
        })
    }

    /// Mesma semântica da edição de entrada: devolve a quantidade antiga
    /// ao produto antigo antes de baixar a nova do produto novo.
    pub fn update_damage(
        &self,
        tenant: Uuid,
        id: Uuid,
        product_id: Option<Uuid>,
        quantity: Decimal,
        reason: Option<String>,
        damage_date: Option<NaiveDate>,
    ) -> Result<DamageRecord, AppError> {
        self.store.transaction(|tx| {
            let scope = Scope::Tenant(tenant);
            if quantity <= Decimal::ZERO {
                return Err(validation_error(
                    "quantity",
                    "A quantidade deve ser maior que zero.",
                ));
            }

            let original: DamageRecord = tx.get(scope, id)?;
            adjust_stock(tx, scope, original.product_id, original.quantity)?;

            let target = product_id.unwrap_or(original.product_id);
            adjust_stock(tx, scope, target, -quantity)?;

            tx.update::<DamageRecord>(scope, id, |damage| {
                damage.product_id = target;
                damage.quantity = quantity;
                if reason.is_some() {
                    damage.reason = reason;
                }
                if let Some(date) = damage_date {
                    damage.damage_date = date;
                }
            })
        })
    }
}

/// Valida e aplica as linhas de uma entrada, devolvendo o custo total.
fn apply_entry_lines(
    tx: &mut Transaction<'_>,
    scope: Scope,
    items: &[StockEntryLine],
) -> Result<Decimal, AppError> {
    if items.is_empty() {
        return Err(validation_error(
            "items",
            "A entrada precisa de pelo menos uma linha.",
        ));
    }
    let mut total_cost = Decimal::ZERO;
    for line in items {
        if line.quantity <= Decimal::ZERO {
            return Err(validation_error(
                "quantity",
                "A quantidade deve ser maior que zero.",
            ));
        }
        if line.unit_cost < Decimal::ZERO {
            return Err(validation_error(
                "unitCost",
                "O custo unitário não pode ser negativo.",
            ));
        }
        adjust_stock(tx, scope, line.product_id, line.quantity)?;
        total_cost += line.quantity * line.unit_cost;
    }
    Ok(total_cost)
}

/// O único caminho que altera `Product::stock`. Um delta que deixaria o
/// saldo negativo rejeita a operação inteira — nunca baixamos "até onde
/// dá".
pub(crate) fn adjust_stock(
    tx: &mut Transaction<'_>,
    scope: Scope,
    product_id: Uuid,
    delta: Decimal,
) -> Result<Product, AppError> {
    let product: Product = tx.get(scope, product_id)?;
    let new_stock = product.stock + delta;
    if new_stock < Decimal::ZERO {
        return Err(AppError::InsufficientStock {
            product: product.name,
            available: product.stock,
        });
    }
    tx.update::<Product>(scope, product_id, |p| p.stock = new_stock)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testutil::loja_nova;

    fn service(store: Arc<Datastore>) -> InventoryService {
        InventoryService::new(store)
    }

    fn data(ano: i32, mes: u32, dia: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(ano, mes, dia).unwrap()
    }

    fn produto_simples(
        inv: &InventoryService,
        loja: Uuid,
        categoria: Uuid,
        sku: &str,
        estoque: i64,
    ) -> Product {
        inv.create_product(
            loja,
            categoria,
            sku.to_string(),
            format!("Produto {sku}"),
            "un".to_string(),
            Decimal::from(4),
            Decimal::from(6),
            Decimal::from(estoque),
            Decimal::from(2),
        )
        .unwrap()
    }

    #[test]
    fn ciclo_de_vida_da_categoria_respeita_o_contador() {
        let cenario = loja_nova();
        let inv = service(cenario.store.clone());

        let bebidas = inv
            .create_category(cenario.loja, "Bebidas".to_string(), None)
            .unwrap();
        assert_eq!(bebidas.product_count, 0);

        let cola = produto_simples(&inv, cenario.loja, bebidas.envelope.id, "COLA-350", 0);

        // Com um produto vinculado, a exclusão é barrada.
        let bloqueada = inv.delete_category(cenario.loja, bebidas.envelope.id);
        assert!(matches!(bloqueada, Err(AppError::CategoryNotEmpty(_, 1))));

        inv.delete_product(cenario.loja, cola.envelope.id).unwrap();
        let recarregada: Category = cenario
            .store
            .get(Scope::Tenant(cenario.loja), bebidas.envelope.id)
            .unwrap();
        assert_eq!(recarregada.product_count, 0);

        inv.delete_category(cenario.loja, bebidas.envelope.id)
            .unwrap();
    }

    #[test]
    fn mover_produto_de_categoria_move_o_contador() {
        let cenario = loja_nova();
        let inv = service(cenario.store.clone());

        let origem = inv
            .create_category(cenario.loja, "Origem".to_string(), None)
            .unwrap();
        let destino = inv
            .create_category(cenario.loja, "Destino".to_string(), None)
            .unwrap();
        let produto = produto_simples(&inv, cenario.loja, origem.envelope.id, "MOV-1", 0);

        inv.update_product(
            cenario.loja,
            produto.envelope.id,
            ProductUpdate {
                category_id: Some(destino.envelope.id),
                ..ProductUpdate::default()
            },
        )
        .unwrap();

        let origem: Category = cenario
            .store
            .get(Scope::Tenant(cenario.loja), origem.envelope.id)
            .unwrap();
        let destino: Category = cenario
            .store
            .get(Scope::Tenant(cenario.loja), destino.envelope.id)
            .unwrap();
        assert_eq!(origem.product_count, 0);
        assert_eq!(destino.product_count, 1);
    }

    #[test]
    fn sku_duplicado_e_rejeitado() {
        let cenario = loja_nova();
        let inv = service(cenario.store.clone());
        let categoria = inv
            .create_category(cenario.loja, "Geral".to_string(), None)
            .unwrap();

        produto_simples(&inv, cenario.loja, categoria.envelope.id, "DUP-1", 0);
        let repetido = inv.create_product(
            cenario.loja,
            categoria.envelope.id,
            "DUP-1".to_string(),
            "Outro".to_string(),
            "un".to_string(),
            Decimal::ZERO,
            Decimal::ZERO,
            Decimal::ZERO,
            Decimal::ZERO,
        );
        assert!(matches!(repetido, Err(AppError::SkuAlreadyExists(_))));
    }

    #[test]
    fn entrada_incrementa_estoque_e_soma_o_custo_total() {
        let cenario = loja_nova();
        let inv = service(cenario.store.clone());
        let categoria = inv
            .create_category(cenario.loja, "Geral".to_string(), None)
            .unwrap();
        let produto = produto_simples(&inv, cenario.loja, categoria.envelope.id, "ENT-1", 5);

        let entrada = inv
            .create_stock_entry(
                cenario.loja,
                cenario.dono,
                data(2024, 3, 10),
                None,
                vec![StockEntryLine {
                    product_id: produto.envelope.id,
                    quantity: Decimal::from(10),
                    unit_cost: Decimal::from(3),
                }],
            )
            .unwrap();
        assert_eq!(entrada.total_cost, Decimal::from(30));

        let recarregado: Product = cenario
            .store
            .get(Scope::Tenant(cenario.loja), produto.envelope.id)
            .unwrap();
        assert_eq!(recarregado.stock, Decimal::from(15));
    }

    #[test]
    fn editar_entrada_reverte_antes_de_reaplicar() {
        let cenario = loja_nova();
        let inv = service(cenario.store.clone());
        let categoria = inv
            .create_category(cenario.loja, "Geral".to_string(), None)
            .unwrap();
        let produto_a = produto_simples(&inv, cenario.loja, categoria.envelope.id, "A-1", 20);
        let produto_b = produto_simples(&inv, cenario.loja, categoria.envelope.id, "B-1", 20);

        // Entrada original: +10 no produto A.
        let entrada = inv
            .create_stock_entry(
                cenario.loja,
                cenario.dono,
                data(2024, 3, 10),
                None,
                vec![StockEntryLine {
                    product_id: produto_a.envelope.id,
                    quantity: Decimal::from(10),
                    unit_cost: Decimal::from(2),
                }],
            )
            .unwrap();

        // Edição: agora a entrada é +5 no produto B.
        inv.update_stock_entry(
            cenario.loja,
            entrada.envelope.id,
            None,
            None,
            vec![StockEntryLine {
                product_id: produto_b.envelope.id,
                quantity: Decimal::from(5),
                unit_cost: Decimal::from(2),
            }],
        )
        .unwrap();

        // Relativo ao pré-edição: A caiu exatamente 10, B subiu exatamente 5.
        let a: Product = cenario
            .store
            .get(Scope::Tenant(cenario.loja), produto_a.envelope.id)
            .unwrap();
        let b: Product = cenario
            .store
            .get(Scope::Tenant(cenario.loja), produto_b.envelope.id)
            .unwrap();
        assert_eq!(a.stock, Decimal::from(20));
        assert_eq!(b.stock, Decimal::from(25));
    }

    #[test]
    fn avaria_baixa_o_estoque_e_edicao_devolve_ao_produto_antigo() {
        let cenario = loja_nova();
        let inv = service(cenario.store.clone());
        let categoria = inv
            .create_category(cenario.loja, "Geral".to_string(), None)
            .unwrap();
        let produto_a = produto_simples(&inv, cenario.loja, categoria.envelope.id, "AV-A", 10);
        let produto_b = produto_simples(&inv, cenario.loja, categoria.envelope.id, "AV-B", 10);

        let avaria = inv
            .create_damage(
                cenario.loja,
                cenario.dono,
                produto_a.envelope.id,
                Decimal::from(4),
                Some("Queda na descarga".to_string()),
                data(2024, 3, 11),
            )
            .unwrap();

        let a: Product = cenario
            .store
            .get(Scope::Tenant(cenario.loja), produto_a.envelope.id)
            .unwrap();
        assert_eq!(a.stock, Decimal::from(6));

        inv.update_damage(
            cenario.loja,
            avaria.envelope.id,
            Some(produto_b.envelope.id),
            Decimal::from(2),
            None,
            None,
        )
        .unwrap();

        let a: Product = cenario
            .store
            .get(Scope::Tenant(cenario.loja), produto_a.envelope.id)
            .unwrap();
        let b: Product = cenario
            .store
            .get(Scope::Tenant(cenario.loja), produto_b.envelope.id)
            .unwrap();
        assert_eq!(a.stock, Decimal::from(10));
        assert_eq!(b.stock, Decimal::from(8));
    }

    #[test]
    fn avaria_maior_que_o_estoque_rejeita_sem_baixar_nada() {
        let cenario = loja_nova();
        let inv = service(cenario.store.clone());
        let categoria = inv
            .create_category(cenario.loja, "Geral".to_string(), None)
            .unwrap();
        let produto = produto_simples(&inv, cenario.loja, categoria.envelope.id, "AV-X", 3);

        let result = inv.create_damage(
            cenario.loja,
            cenario.dono,
            produto.envelope.id,
            Decimal::from(5),
            None,
            data(2024, 3, 12),
        );
        assert!(matches!(result, Err(AppError::InsufficientStock { .. })));

        let recarregado: Product = cenario
            .store
            .get(Scope::Tenant(cenario.loja), produto.envelope.id)
            .unwrap();
        assert_eq!(recarregado.stock, Decimal::from(3));
    }
}
