// src/db/snapshot.rs

use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::error::AppError;
use crate::db::datastore::Record;
use crate::models::{
    auth::UserProfile,
    crm::Customer,
    inventory::{Category, DamageRecord, Product, StockEntry},
    rbac::TeamInvite,
    sales::{CollectionEntry, Expense, Sale},
    settings::BusinessSettings,
    tenancy::Business,
};

// ---
// O layout do snapshot persistido
// ---
// Um único objeto JSON: nome da coleção -> array de linhas. `default` em
// cada campo deixa snapshots antigos (sem alguma coleção) carregarem sem
// drama.

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreState {
    #[serde(default)]
    pub businesses: Vec<Business>,
    #[serde(default)]
    pub users: Vec<UserProfile>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub sales: Vec<Sale>,
    #[serde(default)]
    pub stock_entries: Vec<StockEntry>,
    #[serde(default)]
    pub damages: Vec<DamageRecord>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub collections: Vec<CollectionEntry>,
    #[serde(default)]
    pub customers: Vec<Customer>,
    #[serde(default)]
    pub settings: Vec<BusinessSettings>,
    #[serde(default)]
    pub invites: Vec<TeamInvite>,
}

/// Liga cada tipo de linha à sua coleção dentro do estado.
pub trait Table<T: Record> {
    fn rows(&self) -> &[T];
    fn rows_mut(&mut self) -> &mut Vec<T>;
}

macro_rules! impl_table {
    ($row:ty, $field:ident) => {
        impl Table<$row> for StoreState {
            fn rows(&self) -> &[$row] {
                &self.$field
            }
            fn rows_mut(&mut self) -> &mut Vec<$row> {
                &mut self.$field
            }
        }
    };
}

impl_table!(Business, businesses);
impl_table!(UserProfile, users);
impl_table!(Category, categories);
impl_table!(Product, products);
impl_table!(Sale, sales);
impl_table!(StockEntry, stock_entries);
impl_table!(DamageRecord, damages);
impl_table!(Expense, expenses);
impl_table!(CollectionEntry, collections);
impl_table!(Customer, customers);
impl_table!(BusinessSettings, settings);
impl_table!(TeamInvite, invites);

pub fn to_snapshot(state: &StoreState) -> Result<Value, AppError> {
    Ok(serde_json::to_value(state)?)
}

/// Desserializa o snapshot bruto, rodando antes a migração do formato
/// legado de overrides. A migração acontece UMA vez, aqui na carga; o
/// avaliador de permissões nunca vê o formato antigo.
pub fn from_snapshot(mut raw: Value) -> Result<StoreState, AppError> {
    migrate_permission_overrides(&mut raw);
    Ok(serde_json::from_value(raw)?)
}

// Formato legado: `permissionOverrides` como mapa slug -> bool. Forma
// canônica: lista dos slugs concedidos. Entradas explícitas em `false`
// são descartadas — o conjunto canônico só registra concessões.
fn migrate_permission_overrides(raw: &mut Value) {
    let Some(users) = raw.get_mut("users").and_then(Value::as_array_mut) else {
        return;
    };

    let mut migrated = 0usize;
    for user in users {
        let Some(fields) = user.as_object_mut() else {
            continue;
        };
        if !matches!(fields.get("permissionOverrides"), Some(Value::Object(_))) {
            continue;
        }
        if let Some(Value::Object(legacy)) = fields.remove("permissionOverrides") {
            let granted: Vec<Value> = legacy
                .into_iter()
                .filter(|(_, enabled)| enabled.as_bool().unwrap_or(false))
                .map(|(slug, _)| Value::String(slug))
                .collect();
            fields.insert("permissionOverrides".to_string(), Value::Array(granted));
            migrated += 1;
        }
    }

    if migrated > 0 {
        tracing::info!(
            "🔁 {} perfil(is) migrado(s) para o formato canônico de permissões",
            migrated
        );
    }
}

// ---
// Backends de persistência
// ---
// O store não sabe onde o snapshot mora; ele só entrega/recebe o Value.

pub trait SnapshotBackend: Send + Sync {
    fn load(&self) -> Result<Option<Value>, AppError>;
    fn persist(&self, snapshot: &Value) -> Result<(), AppError>;
}

/// Snapshot em um arquivo JSON no disco.
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SnapshotBackend for FileBackend {
    fn load(&self) -> Result<Option<Value>, AppError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&self.path)?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&text)?))
    }

    fn persist(&self, snapshot: &Value) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(snapshot)?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }
}

/// Snapshot guardado em memória; padrão dos testes.
#[derive(Default)]
pub struct MemoryBackend {
    cell: Mutex<Option<Value>>,
}

impl SnapshotBackend for MemoryBackend {
    fn load(&self) -> Result<Option<Value>, AppError> {
        Ok(self
            .cell
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone())
    }

    fn persist(&self, snapshot: &Value) -> Result<(), AppError> {
        *self
            .cell
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(snapshot.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::datastore::{Datastore, Envelope, Scope};
    use crate::db::query::Query;
    use serde_json::json;
    use std::collections::HashSet;
    use uuid::Uuid;

    fn categoria(nome: &str) -> Category {
        Category {
            envelope: Envelope::new(),
            name: nome.to_string(),
            description: None,
            product_count: 0,
        }
    }

    #[test]
    fn snapshot_em_arquivo_sobrevive_ao_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let loja = Uuid::new_v4();

        let mut esperados = HashSet::new();
        {
            let store = Datastore::open(Box::new(FileBackend::new(&path))).unwrap();
            store
                .transaction(|tx| {
                    for nome in ["Bebidas", "Padaria", "Limpeza"] {
                        let criada = tx.insert(Scope::Tenant(loja), categoria(nome))?;
                        esperados.insert(criada.envelope.id);
                    }
                    Ok(())
                })
                .unwrap();
        }

        // Reabre do zero e compara os conjuntos (igualdade independente de
        // ordem).
        let reaberto = Datastore::open(Box::new(FileBackend::new(&path))).unwrap();
        let linhas: Vec<Category> = reaberto.select(Scope::Tenant(loja), &Query::new());
        let ids: HashSet<Uuid> = linhas.iter().map(|c| c.envelope.id).collect();
        assert_eq!(ids, esperados);
    }

    #[test]
    fn overrides_legados_viram_lista_canonica_na_carga() {
        let user_id = Uuid::new_v4();
        let loja = Uuid::new_v4();
        let raw = json!({
            "users": [{
                "id": user_id,
                "businessId": loja,
                "createdAt": "2024-03-01T12:00:00Z",
                "name": "Vendedor Antigo",
                "role": "seller",
                "permissionOverrides": {
                    "can_manage_products": true,
                    "can_view_reports": false,
                    "can_collect_dues": true
                }
            }]
        });

        let state = from_snapshot(raw).unwrap();
        assert_eq!(state.users.len(), 1);
        let overrides: HashSet<&str> = state.users[0]
            .permission_overrides
            .iter()
            .map(String::as_str)
            .collect();
        // Só as concessões sobrevivem; o `false` explícito é descartado.
        assert_eq!(
            overrides,
            HashSet::from(["can_manage_products", "can_collect_dues"])
        );
    }

    #[test]
    fn formato_canonico_passa_direto_pela_migracao() {
        let raw = json!({
            "users": [{
                "id": Uuid::new_v4(),
                "businessId": Uuid::new_v4(),
                "createdAt": "2024-03-01T12:00:00Z",
                "name": "Vendedora Nova",
                "role": "seller",
                "permissionOverrides": ["can_view_reports"]
            }]
        });

        let state = from_snapshot(raw).unwrap();
        assert_eq!(
            state.users[0].permission_overrides,
            vec!["can_view_reports".to_string()]
        );
    }
}
