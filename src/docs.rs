// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Tenancy ---
        handlers::tenancy::create_business,
        handlers::tenancy::list_my_businesses,
        handlers::tenancy::list_team,
        handlers::tenancy::update_member_commission,

        // --- INVENTORY ---
        handlers::inventory::create_category,
        handlers::inventory::get_all_categories,
        handlers::inventory::delete_category,
        handlers::inventory::create_product,
        handlers::inventory::get_all_products,
        handlers::inventory::update_product,
        handlers::inventory::delete_product,
        handlers::inventory::create_stock_entry,
        handlers::inventory::get_all_stock_entries,
        handlers::inventory::update_stock_entry,
        handlers::inventory::create_damage,
        handlers::inventory::get_all_damages,
        handlers::inventory::update_damage,

        // --- Sales ---
        handlers::sales::create_sale,
        handlers::sales::get_all_sales,
        handlers::sales::get_sale,
        handlers::sales::record_collection,
        handlers::sales::get_sale_collections,
        handlers::sales::create_expense,
        handlers::sales::get_all_expenses,

        // --- CRM ---
        handlers::crm::create_customer,
        handlers::crm::list_customers,

        // --- Settings ---
        handlers::settings::get_settings,
        handlers::settings::update_settings,

        // --- RBAC ---
        handlers::rbac::list_permissions,
        handlers::rbac::available_for_role,
        handlers::rbac::create_invite,
        handlers::rbac::list_invites,
        handlers::rbac::accept_invite,

        // --- Dashboard ---
        handlers::dashboard::get_summary,
        handlers::dashboard::get_valuation,
        handlers::dashboard::get_low_stock,
    ),
    components(
        schemas(
            // --- Envelope comum ---
            crate::db::datastore::Envelope,

            // --- Tenancy ---
            models::tenancy::Business,
            models::tenancy::Industry,
            handlers::tenancy::CreateBusinessPayload,
            handlers::tenancy::CreatedBusiness,

            // --- Auth / Team ---
            models::auth::UserProfile,
            models::auth::Role,
            models::auth::CommissionKind,
            models::auth::CommissionConfig,

            // --- Inventory ---
            models::inventory::Category,
            models::inventory::Product,
            models::inventory::StockEntry,
            models::inventory::StockEntryLine,
            models::inventory::DamageRecord,
            handlers::inventory::CreateCategoryPayload,
            handlers::inventory::CreateProductPayload,
            handlers::inventory::UpdateProductPayload,
            handlers::inventory::CreateStockEntryPayload,
            handlers::inventory::UpdateStockEntryPayload,
            handlers::inventory::StockEntryLinePayload,
            handlers::inventory::CreateDamagePayload,
            handlers::inventory::UpdateDamagePayload,

            // --- Sales ---
            models::sales::Sale,
            models::sales::SaleItem,
            models::sales::CollectionEntry,
            models::sales::PaymentMethod,
            models::sales::Expense,
            models::sales::ExpenseKind,
            handlers::sales::CreateSalePayload,
            handlers::sales::SaleLinePayload,
            handlers::sales::RecordCollectionPayload,
            handlers::sales::CreateExpensePayload,

            // --- CRM ---
            models::crm::Customer,
            handlers::crm::CreateCustomerPayload,

            // --- Settings ---
            models::settings::BusinessSettings,
            models::settings::GeneralInfo,
            models::settings::TaxConfig,
            models::settings::InvoiceConfig,
            models::settings::UpdateSettingsPayload,

            // --- RBAC ---
            models::rbac::Permission,
            models::rbac::RiskLevel,
            models::rbac::PermissionInfo,
            models::rbac::TeamInvite,
            handlers::rbac::CreateInvitePayload,
            handlers::rbac::AcceptInvitePayload,

            // --- Dashboard ---
            models::dashboard::StockValuation,
            models::dashboard::SalesSummary,
        )
    ),
    tags(
        (name = "Tenancy", description = "Abertura e listagem de lojas"),
        (name = "Team", description = "Equipe, convites e comissões"),
        (name = "Inventory", description = "Gestão de Estoque e Produtos"),
        (name = "Sales", description = "Vendas, fiado e despesas"),
        (name = "CRM", description = "Gestão de Clientes"),
        (name = "Settings", description = "Configurações da Loja"),
        (name = "RBAC", description = "Controle de Acesso (Papéis e Permissões)"),
        (name = "Dashboard", description = "Indicadores e Agregações")
    )
)]
pub struct ApiDoc;
