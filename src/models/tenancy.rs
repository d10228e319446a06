// src/models/tenancy.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::datastore::{Envelope, Record};

// ---
// 1. Business (O "Estabelecimento")
// ---
// A conta principal (Loja, Restaurante, Agência...). Nunca é removida
// fisicamente; o fluxo de encerramento é tratado fora do núcleo.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Business {
    #[serde(flatten)]
    pub envelope: Envelope,

    #[schema(example = "Mercearia Central")]
    pub name: String,

    pub owner_id: Uuid,

    pub industry: Industry,

    // Os menus que a UI exibe para este ramo de atividade.
    pub visible_menus: Vec<String>,
}

impl Record for Business {
    const COLLECTION: &'static str = "businesses";
    const TENANT_SCOPED: bool = false;

    fn envelope(&self) -> &Envelope {
        &self.envelope
    }
    fn envelope_mut(&mut self) -> &mut Envelope {
        &mut self.envelope
    }
}

// ---
// 2. Industry (O ramo de atividade)
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Industry {
    Retail,
    Restaurant,
    Agency,
    Service,
    Freelancer,
    Education,
}

impl Industry {
    /// O conjunto inicial de menus visíveis por ramo; o dono pode ajustar
    /// depois nas configurações.
    pub fn default_menus(&self) -> Vec<String> {
        let base = [
            "dashboard", "pos", "products", "stock", "customers", "due-book", "expenses",
            "reports", "team", "settings",
        ];
        let mut menus: Vec<String> = base.iter().map(|m| m.to_string()).collect();
        match self {
            Industry::Education => menus.insert(2, "courses".to_string()),
            Industry::Agency | Industry::Freelancer => menus.insert(2, "projects".to_string()),
            _ => {}
        }
        menus
    }
}
