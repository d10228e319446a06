// src/db/datastore.rs

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::query::Query;
use crate::db::snapshot::{self, MemoryBackend, SnapshotBackend, StoreState, Table};

// ---
// O Envelope comum a todas as linhas
// ---
// Toda coleção compartilha este trio: id opaco, carimbo da loja e data de
// criação. As structs de domínio embutem o envelope com #[serde(flatten)],
// então os campos aparecem "achatados" no JSON persistido.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub id: Uuid,

    // None apenas em coleções globais (lojas, admins globais).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
}

impl Envelope {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            business_id: None,
            created_at: Utc::now(),
        }
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}

/// O contrato que cada linha tipada cumpre para viver no Datastore.
pub trait Record: Clone + Serialize + DeserializeOwned {
    const COLLECTION: &'static str;

    // Coleções globais (lojas, admins) podem ser gravadas sem carimbo.
    const TENANT_SCOPED: bool = true;

    fn envelope(&self) -> &Envelope;
    fn envelope_mut(&mut self) -> &mut Envelope;

    fn id(&self) -> Uuid {
        self.envelope().id
    }
}

// ---
// Escopo de loja
// ---
// O recorte por loja acontece AQUI, na borda do store, nunca nos chamadores:
// um `select` escopado jamais devolve linha de outra loja, e um `insert`
// escopado carimba o business_id antes de gravar.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Sem recorte; reservado a coleções globais e fluxos de admin global.
    Global,
    Tenant(Uuid),
}

impl Scope {
    fn visible(&self, envelope: &Envelope) -> bool {
        match self {
            Scope::Global => true,
            Scope::Tenant(tenant) => envelope.business_id == Some(*tenant),
        }
    }
}

// ---
// O Datastore
// ---
// Uma única trava serializa todas as mutações (superconjunto da
// serialização por loja que os hooks de estoque exigem). Cada transação
// trabalha sobre uma cópia do estado: se qualquer passo falhar, a cópia é
// descartada e nenhum efeito parcial fica visível; se tudo der certo, o
// snapshot inteiro é persistido ANTES de trocar o estado em memória.

pub struct Datastore {
    state: Mutex<StoreState>,
    backend: Box<dyn SnapshotBackend>,
}

impl Datastore {
    /// Abre o store sobre um backend de persistência, carregando (e
    /// migrando, se preciso) o snapshot existente.
    pub fn open(backend: Box<dyn SnapshotBackend>) -> Result<Self, AppError> {
        let state = match backend.load()? {
            Some(raw) => snapshot::from_snapshot(raw)?,
            None => StoreState::default(),
        };
        Ok(Self {
            state: Mutex::new(state),
            backend,
        })
    }

    /// Store vazio em memória; usado nos testes e como fallback sem
    /// STORE_PATH configurado.
    pub fn in_memory() -> Self {
        Self {
            state: Mutex::new(StoreState::default()),
            backend: Box::new(MemoryBackend::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn select<T: Record>(&self, scope: Scope, query: &Query) -> Vec<T>
    where
        StoreState: Table<T>,
    {
        select_in(&self.lock(), scope, query)
    }

    /// Modo "single": exatamente uma linha, senão `NotSingular`.
    pub fn select_single<T: Record>(&self, scope: Scope, query: &Query) -> Result<T, AppError>
    where
        StoreState: Table<T>,
    {
        single_in(&self.lock(), scope, query)
    }

    pub fn get<T: Record>(&self, scope: Scope, id: Uuid) -> Result<T, AppError>
    where
        StoreState: Table<T>,
    {
        get_in(&self.lock(), scope, id)
    }

    /// A fronteira de transação: a operação inteira (incluindo seus hooks)
    /// ou entra por completo, ou não deixa rastro nenhum.
    pub fn transaction<R>(
        &self,
        op: impl FnOnce(&mut Transaction<'_>) -> Result<R, AppError>,
    ) -> Result<R, AppError> {
        let mut guard = self.lock();
        let mut working = guard.clone();
        let result = op(&mut Transaction { state: &mut working })?;

        // Persiste antes de trocar: se a gravação falhar, o estado em
        // memória continua sendo o último confirmado.
        self.backend.persist(&snapshot::to_snapshot(&working)?)?;
        *guard = working;
        Ok(result)
    }
}

/// A visão mutável dentro de uma transação. Mesma superfície de consulta
/// do store, mais as mutações.
pub struct Transaction<'a> {
    state: &'a mut StoreState,
}

impl Transaction<'_> {
    pub fn select<T: Record>(&self, scope: Scope, query: &Query) -> Vec<T>
    where
        StoreState: Table<T>,
    {
        select_in(self.state, scope, query)
    }

    pub fn select_single<T: Record>(&self, scope: Scope, query: &Query) -> Result<T, AppError>
    where
        StoreState: Table<T>,
    {
        single_in(self.state, scope, query)
    }

    pub fn get<T: Record>(&self, scope: Scope, id: Uuid) -> Result<T, AppError>
    where
        StoreState: Table<T>,
    {
        get_in(self.state, scope, id)
    }

    /// Insere carimbando o business_id do escopo. Inserir uma coleção
    /// escopada sem loja é bug do chamador: `MissingTenant`, nunca uma
    /// linha órfã.
    pub fn insert<T: Record>(&mut self, scope: Scope, mut row: T) -> Result<T, AppError>
    where
        StoreState: Table<T>,
    {
        match scope {
            Scope::Tenant(tenant) => row.envelope_mut().business_id = Some(tenant),
            Scope::Global if T::TENANT_SCOPED => {
                return Err(AppError::MissingTenant(T::COLLECTION));
            }
            Scope::Global => {}
        }
        <StoreState as Table<T>>::rows_mut(self.state).push(row.clone());
        Ok(row)
    }

    /// Atualiza a linha via closure de patch e devolve o resultado.
    pub fn update<T: Record>(
        &mut self,
        scope: Scope,
        id: Uuid,
        patch: impl FnOnce(&mut T),
    ) -> Result<T, AppError>
    where
        StoreState: Table<T>,
    {
        let row = <StoreState as Table<T>>::rows_mut(self.state)
            .iter_mut()
            .find(|r| r.envelope().id == id && scope.visible(r.envelope()))
            .ok_or(AppError::NotFound(T::COLLECTION))?;
        patch(row);
        if T::TENANT_SCOPED && row.envelope().business_id.is_none() {
            return Err(AppError::MissingTenant(T::COLLECTION));
        }
        Ok(row.clone())
    }

    pub fn delete<T: Record>(&mut self, scope: Scope, id: Uuid) -> Result<(), AppError>
    where
        StoreState: Table<T>,
    {
        let rows = <StoreState as Table<T>>::rows_mut(self.state);
        let position = rows
            .iter()
            .position(|r| r.envelope().id == id && scope.visible(r.envelope()))
            .ok_or(AppError::NotFound(T::COLLECTION))?;
        rows.remove(position);
        Ok(())
    }
}

// ---
// Leitura compartilhada entre Datastore e Transaction
// ---

fn select_in<T: Record>(state: &StoreState, scope: Scope, query: &Query) -> Vec<T>
where
    StoreState: Table<T>,
{
    let rows: Vec<T> = <StoreState as Table<T>>::rows(state)
        .iter()
        .filter(|r| scope.visible(r.envelope()))
        .cloned()
        .collect();
    query.apply(rows)
}

fn single_in<T: Record>(state: &StoreState, scope: Scope, query: &Query) -> Result<T, AppError>
where
    StoreState: Table<T>,
{
    let mut rows = select_in(state, scope, query);
    match rows.len() {
        1 => Ok(rows.remove(0)),
        matched => Err(AppError::NotSingular {
            collection: T::COLLECTION,
            matched,
        }),
    }
}

fn get_in<T: Record>(state: &StoreState, scope: Scope, id: Uuid) -> Result<T, AppError>
where
    StoreState: Table<T>,
{
    <StoreState as Table<T>>::rows(state)
        .iter()
        .find(|r| r.envelope().id == id && scope.visible(r.envelope()))
        .cloned()
        .ok_or(AppError::NotFound(T::COLLECTION))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::inventory::Category;

    fn categoria(nome: &str) -> Category {
        Category {
            envelope: Envelope::new(),
            name: nome.to_string(),
            description: None,
            product_count: 0,
        }
    }

    #[test]
    fn select_nunca_vaza_linhas_de_outra_loja() {
        let store = Datastore::in_memory();
        let loja_a = Uuid::new_v4();
        let loja_b = Uuid::new_v4();

        store
            .transaction(|tx| {
                tx.insert(Scope::Tenant(loja_a), categoria("Bebidas"))?;
                tx.insert(Scope::Tenant(loja_b), categoria("Padaria"))?;
                Ok(())
            })
            .unwrap();

        let da_loja_a: Vec<Category> = store.select(Scope::Tenant(loja_a), &Query::new());
        assert_eq!(da_loja_a.len(), 1);
        assert_eq!(da_loja_a[0].name, "Bebidas");
        assert!(
            da_loja_a
                .iter()
                .all(|c| c.envelope.business_id == Some(loja_a))
        );
    }

    #[test]
    fn insert_global_de_colecao_escopada_falha_com_missing_tenant() {
        let store = Datastore::in_memory();
        let result = store.transaction(|tx| tx.insert(Scope::Global, categoria("Órfã")));
        assert!(matches!(result, Err(AppError::MissingTenant("categories"))));

        // Nada foi gravado.
        let todas: Vec<Category> = store.select(Scope::Global, &Query::new());
        assert!(todas.is_empty());
    }

    #[test]
    fn single_exige_exatamente_uma_linha() {
        let store = Datastore::in_memory();
        let loja = Uuid::new_v4();
        store
            .transaction(|tx| {
                tx.insert(Scope::Tenant(loja), categoria("A"))?;
                tx.insert(Scope::Tenant(loja), categoria("B"))?;
                Ok(())
            })
            .unwrap();

        let zero = store
            .select_single::<Category>(Scope::Tenant(loja), &Query::new().filter("name", "X"));
        assert!(matches!(
            zero,
            Err(AppError::NotSingular { matched: 0, .. })
        ));

        let dois = store.select_single::<Category>(Scope::Tenant(loja), &Query::new());
        assert!(matches!(
            dois,
            Err(AppError::NotSingular { matched: 2, .. })
        ));

        let um = store
            .select_single::<Category>(Scope::Tenant(loja), &Query::new().filter("name", "A"));
        assert!(um.is_ok());
    }

    #[test]
    fn update_e_delete_falham_com_not_found_fora_do_escopo() {
        let store = Datastore::in_memory();
        let loja_a = Uuid::new_v4();
        let loja_b = Uuid::new_v4();
        let criada = store
            .transaction(|tx| tx.insert(Scope::Tenant(loja_a), categoria("Bebidas")))
            .unwrap();

        // A loja B não enxerga (nem altera) a linha da loja A.
        let result = store.transaction(|tx| {
            tx.update::<Category>(Scope::Tenant(loja_b), criada.envelope.id, |c| {
                c.product_count = 99
            })
        });
        assert!(matches!(result, Err(AppError::NotFound("categories"))));

        let result =
            store.transaction(|tx| tx.delete::<Category>(Scope::Tenant(loja_b), criada.envelope.id));
        assert!(matches!(result, Err(AppError::NotFound("categories"))));
    }

    #[test]
    fn transacao_que_falha_nao_deixa_efeito_parcial() {
        let store = Datastore::in_memory();
        let loja = Uuid::new_v4();

        let result: Result<(), AppError> = store.transaction(|tx| {
            tx.insert(Scope::Tenant(loja), categoria("Primeira"))?;
            Err(AppError::NotFound("categories"))
        });
        assert!(result.is_err());

        let todas: Vec<Category> = store.select(Scope::Tenant(loja), &Query::new());
        assert!(todas.is_empty());
    }
}
