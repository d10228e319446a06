// src/models/auth.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::datastore::{Envelope, Record};

// Representa um membro da equipe (ou um admin global, quando o envelope
// vem sem business_id). A autenticação em si é externa; aqui vive apenas
// o perfil que o avaliador de permissões consome.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(flatten)]
    pub envelope: Envelope,

    #[schema(example = "Dona Maria")]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    pub role: Role,

    // Forma canônica: conjunto de slugs concedidos. O formato legado
    // (mapa slug -> bool) é migrado uma única vez na carga do snapshot.
    #[serde(default)]
    pub permission_overrides: Vec<String>,

    #[serde(default)]
    pub commission: CommissionConfig,
}

impl Record for UserProfile {
    const COLLECTION: &'static str = "users";
    // Admins globais existem sem loja.
    const TENANT_SCOPED: bool = false;

    fn envelope(&self) -> &Envelope {
        &self.envelope
    }
    fn envelope_mut(&mut self) -> &mut Envelope {
        &mut self.envelope
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Owner,
    Manager,
    Seller,
    Admin,
    GlobalAdmin,
    Teacher,
    Staff,
}

impl Role {
    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "owner" => Some(Role::Owner),
            "manager" => Some(Role::Manager),
            "seller" => Some(Role::Seller),
            "admin" => Some(Role::Admin),
            "global_admin" => Some(Role::GlobalAdmin),
            "teacher" => Some(Role::Teacher),
            "staff" => Some(Role::Staff),
            _ => None,
        }
    }
}

// ---
// Configuração de comissão do vendedor
// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CommissionKind {
    Percentage,
    Fixed,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommissionConfig {
    pub kind: CommissionKind,

    #[schema(example = "5.0")]
    pub rate: Decimal,

    pub is_active: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_from: Option<NaiveDate>,
}

impl Default for CommissionConfig {
    fn default() -> Self {
        Self {
            kind: CommissionKind::Percentage,
            rate: Decimal::ZERO,
            is_active: false,
            effective_from: None,
        }
    }
}

impl CommissionConfig {
    /// O valor congelado na venda no momento da criação. Configuração
    /// inativa rende zero, mas continua registrada para auditoria.
    pub fn amount_for(&self, total: Decimal) -> Decimal {
        if !self.is_active {
            return Decimal::ZERO;
        }
        match self.kind {
            CommissionKind::Percentage => total * self.rate / Decimal::from(100),
            CommissionKind::Fixed => self.rate,
        }
    }

    /// A taxa percentual exposta no registro da venda (zero para comissão
    /// fixa).
    pub fn percentage(&self) -> Decimal {
        match self.kind {
            CommissionKind::Percentage => self.rate,
            CommissionKind::Fixed => Decimal::ZERO,
        }
    }
}
