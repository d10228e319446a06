// src/models/rbac.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::datastore::{Envelope, Record};
use crate::models::auth::Role;

// ---
// O catálogo de permissões
// ---
// Cada capacidade que a UI pode exibir/esconder e que o avaliador decide.
// O slug serializado (snake_case) é o que circula no conjunto de overrides
// e no snapshot persistido.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    CanViewDashboard,
    CanCreateSales,
    CanManageSales,
    CanManageProducts,
    CanManageCategories,
    CanManageStock,
    CanManageDamages,
    CanManageCustomers,
    CanManageExpenses,
    CanCollectDues,
    CanViewReports,
    CanManageSettings,
    CanManageTeam,
    CanManageBusinesses,
    CanEditSiteContent,
}

/// Classificação de risco — serve apenas para avisos na UI e NUNCA entra
/// na decisão de permitir/negar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl Permission {
    pub const ALL: [Permission; 15] = [
        Permission::CanViewDashboard,
        Permission::CanCreateSales,
        Permission::CanManageSales,
        Permission::CanManageProducts,
        Permission::CanManageCategories,
        Permission::CanManageStock,
        Permission::CanManageDamages,
        Permission::CanManageCustomers,
        Permission::CanManageExpenses,
        Permission::CanCollectDues,
        Permission::CanViewReports,
        Permission::CanManageSettings,
        Permission::CanManageTeam,
        Permission::CanManageBusinesses,
        Permission::CanEditSiteContent,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Permission::CanViewDashboard => "can_view_dashboard",
            Permission::CanCreateSales => "can_create_sales",
            Permission::CanManageSales => "can_manage_sales",
            Permission::CanManageProducts => "can_manage_products",
            Permission::CanManageCategories => "can_manage_categories",
            Permission::CanManageStock => "can_manage_stock",
            Permission::CanManageDamages => "can_manage_damages",
            Permission::CanManageCustomers => "can_manage_customers",
            Permission::CanManageExpenses => "can_manage_expenses",
            Permission::CanCollectDues => "can_collect_dues",
            Permission::CanViewReports => "can_view_reports",
            Permission::CanManageSettings => "can_manage_settings",
            Permission::CanManageTeam => "can_manage_team",
            Permission::CanManageBusinesses => "can_manage_businesses",
            Permission::CanEditSiteContent => "can_edit_site_content",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Permission> {
        Permission::ALL.iter().copied().find(|p| p.slug() == slug)
    }

    pub fn risk(&self) -> RiskLevel {
        match self {
            Permission::CanViewDashboard
            | Permission::CanCreateSales
            | Permission::CanViewReports => RiskLevel::Low,

            Permission::CanManageSales
            | Permission::CanManageProducts
            | Permission::CanManageCategories
            | Permission::CanManageStock
            | Permission::CanManageCustomers
            | Permission::CanCollectDues => RiskLevel::Medium,

            Permission::CanManageDamages
            | Permission::CanManageExpenses
            | Permission::CanManageSettings
            | Permission::CanManageTeam
            | Permission::CanManageBusinesses
            | Permission::CanEditSiteContent => RiskLevel::High,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Permission::CanViewDashboard => "Ver o painel da loja",
            Permission::CanCreateSales => "Registrar vendas no PDV",
            Permission::CanManageSales => "Editar e cancelar vendas",
            Permission::CanManageProducts => "Cadastrar e editar produtos",
            Permission::CanManageCategories => "Cadastrar e editar categorias",
            Permission::CanManageStock => "Lançar entradas de estoque",
            Permission::CanManageDamages => "Registrar perdas e avarias",
            Permission::CanManageCustomers => "Cadastrar e editar clientes",
            Permission::CanManageExpenses => "Lançar despesas",
            Permission::CanCollectDues => "Receber pagamentos de fiado",
            Permission::CanViewReports => "Ver relatórios e indicadores",
            Permission::CanManageSettings => "Alterar as configurações da loja",
            Permission::CanManageTeam => "Convidar e gerenciar a equipe",
            Permission::CanManageBusinesses => "Administrar lojas da plataforma",
            Permission::CanEditSiteContent => "Editar o conteúdo do site",
        }
    }
}

// Teto rígido: jamais concedíveis a papéis que não sejam dono, nem via
// override por usuário.
pub const FORBIDDEN_PERMISSIONS: [Permission; 2] = [
    Permission::CanManageBusinesses,
    Permission::CanEditSiteContent,
];

// O subconjunto que o dono/gerente pode ligar e desligar ao convidar um
// membro da equipe.
pub const CONFIGURABLE_PERMISSIONS: [Permission; 10] = [
    Permission::CanCreateSales,
    Permission::CanManageSales,
    Permission::CanManageProducts,
    Permission::CanManageCategories,
    Permission::CanManageStock,
    Permission::CanManageDamages,
    Permission::CanManageCustomers,
    Permission::CanManageExpenses,
    Permission::CanCollectDues,
    Permission::CanViewReports,
];

impl Role {
    /// A tabela estática papel -> permissões padrão. O bypass de dono e
    /// admin global NÃO mora aqui: ele é a primeira regra do avaliador,
    /// para continuar visível em auditoria.
    pub fn default_permissions(&self) -> &'static [Permission] {
        match self {
            Role::Owner | Role::GlobalAdmin => &Permission::ALL,

            Role::Admin => &[
                Permission::CanViewDashboard,
                Permission::CanCreateSales,
                Permission::CanManageSales,
                Permission::CanManageProducts,
                Permission::CanManageCategories,
                Permission::CanManageStock,
                Permission::CanManageDamages,
                Permission::CanManageCustomers,
                Permission::CanManageExpenses,
                Permission::CanCollectDues,
                Permission::CanViewReports,
                Permission::CanManageSettings,
                Permission::CanManageTeam,
            ],

            Role::Manager => &[
                Permission::CanViewDashboard,
                Permission::CanCreateSales,
                Permission::CanManageSales,
                Permission::CanManageProducts,
                Permission::CanManageCategories,
                Permission::CanManageStock,
                Permission::CanManageDamages,
                Permission::CanManageCustomers,
                Permission::CanManageExpenses,
                Permission::CanCollectDues,
                Permission::CanViewReports,
            ],

            Role::Seller => &[
                Permission::CanViewDashboard,
                Permission::CanCreateSales,
                Permission::CanManageCustomers,
                Permission::CanCollectDues,
            ],

            Role::Teacher => &[
                Permission::CanViewDashboard,
                Permission::CanCreateSales,
                Permission::CanManageCustomers,
            ],

            Role::Staff => &[Permission::CanViewDashboard],
        }
    }
}

// ---
// Convite de equipe
// ---
// O envio do código por e-mail é colaborador externo; o núcleo só valida
// e registra o convite.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamInvite {
    #[serde(flatten)]
    pub envelope: Envelope,

    #[schema(example = "7C4A8D09")]
    pub code: String,

    pub role: Role,

    // Slugs dentro de CONFIGURABLE_PERMISSIONS, validados na criação.
    pub permissions: Vec<String>,

    pub created_by: Uuid,

    pub consumed: bool,
}

impl Record for TeamInvite {
    const COLLECTION: &'static str = "invites";

    fn envelope(&self) -> &Envelope {
        &self.envelope
    }
    fn envelope_mut(&mut self) -> &mut Envelope {
        &mut self.envelope
    }
}

// O item do catálogo que a UI consome para montar a tela de convite.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PermissionInfo {
    pub slug: &'static str,
    pub description: &'static str,
    pub risk: RiskLevel,
    pub configurable: bool,
}
