//src/main.rs

use axum::{
    Json, Router,
    middleware as axum_middleware,
    routing::{get, post, put},
};
use tokio::net::TcpListener;
use utoipa::OpenApi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

// Importações principais
use crate::config::AppState;
use crate::docs::ApiDoc;
use crate::middleware::auth::{auth_guard, tenant_guard};

#[tokio::main]
async fn main() {
    // Inicializa o logger.
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve
    // iniciar.
    let app_state = AppState::new().expect("Falha ao inicializar o estado da aplicação.");

    // Rotas públicas de abertura de conta + listagem das lojas do usuário
    let business_routes = Router::new()
        .route("/", post(handlers::tenancy::create_business))
        .merge(
            Router::new()
                .route("/mine", get(handlers::tenancy::list_my_businesses))
                .layer(axum_middleware::from_fn_with_state(
                    app_state.clone(),
                    auth_guard,
                )),
        );

    // Equipe: listagem, comissões e convites (tudo dentro da loja)
    let team_routes = Router::new()
        .route("/", get(handlers::tenancy::list_team))
        .route(
            "/members/{id}/commission",
            put(handlers::tenancy::update_member_commission),
        )
        .route(
            "/invites",
            post(handlers::rbac::create_invite).get(handlers::rbac::list_invites),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            tenant_guard,
        ));

    let inventory_routes = Router::new()
        .route(
            "/categories",
            post(handlers::inventory::create_category).get(handlers::inventory::get_all_categories),
        )
        .route(
            "/categories/{id}",
            axum::routing::delete(handlers::inventory::delete_category),
        )
        .route(
            "/products",
            post(handlers::inventory::create_product).get(handlers::inventory::get_all_products),
        )
        .route(
            "/products/{id}",
            put(handlers::inventory::update_product)
                .delete(handlers::inventory::delete_product),
        )
        .route(
            "/stock-entries",
            post(handlers::inventory::create_stock_entry)
                .get(handlers::inventory::get_all_stock_entries),
        )
        .route(
            "/stock-entries/{id}",
            put(handlers::inventory::update_stock_entry),
        )
        .route(
            "/damages",
            post(handlers::inventory::create_damage).get(handlers::inventory::get_all_damages),
        )
        .route("/damages/{id}", put(handlers::inventory::update_damage))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            tenant_guard,
        ));

    let sales_routes = Router::new()
        .route(
            "/",
            post(handlers::sales::create_sale).get(handlers::sales::get_all_sales),
        )
        .route("/{id}", get(handlers::sales::get_sale))
        .route(
            "/{id}/collections",
            post(handlers::sales::record_collection).get(handlers::sales::get_sale_collections),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            tenant_guard,
        ));

    let expense_routes = Router::new()
        .route(
            "/",
            post(handlers::sales::create_expense).get(handlers::sales::get_all_expenses),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            tenant_guard,
        ));

    let crm_routes = Router::new()
        .route(
            "/customers",
            post(handlers::crm::create_customer).get(handlers::crm::list_customers),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            tenant_guard,
        ));

    let settings_routes = Router::new()
        .route(
            "/",
            get(handlers::settings::get_settings).put(handlers::settings::update_settings),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            tenant_guard,
        ));

    let dashboard_routes = Router::new()
        .route("/summary", get(handlers::dashboard::get_summary))
        .route("/valuation", get(handlers::dashboard::get_valuation))
        .route("/low-stock", get(handlers::dashboard::get_low_stock))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            tenant_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/permissions", get(handlers::rbac::list_permissions))
        .route(
            "/api/permissions/available/{role}",
            get(handlers::rbac::available_for_role),
        )
        // Rota pública: o convidado ainda não tem perfil para autenticar
        .route(
            "/api/team/invites/accept",
            post(handlers::rbac::accept_invite),
        )
        .route(
            "/api/docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .nest("/api/businesses", business_routes)
        .nest("/api/team", team_routes)
        .nest("/api/inventory", inventory_routes)
        .nest("/api/sales", sales_routes)
        .nest("/api/expenses", expense_routes)
        .nest("/api/crm", crm_routes)
        .nest("/api/settings", settings_routes)
        .nest("/api/dashboard", dashboard_routes)
        .with_state(app_state);

    // Inicia o servidor
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
