use axum::http::{header, Method};
use axum::{middleware, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::handlers;
use crate::state::AppState;
use crate::system::middleware::request_logger::request_logger;

/// Конфигурация всех роутов приложения
pub fn configure_routes(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    let static_files = ServeDir::new(&state.static_dir);

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/", get(handlers::pages::home))
        // ========================================
        // D400 CLIENT REPORT API
        // ========================================
        .route(
            "/api/clients",
            get(handlers::d400_client_report::list_clients),
        )
        .route(
            "/api/branches/:client_id",
            get(handlers::d400_client_report::get_branches),
        )
        .route(
            "/api/report/:client_id",
            get(handlers::d400_client_report::get_report),
        )
        // ========================================
        // REPORT PAGES AND DOWNLOADS
        // ========================================
        .route("/report/view/:client_id", get(handlers::pages::report_view))
        .route(
            "/report/pdf/:client_id",
            get(handlers::d400_client_report::download_pdf),
        )
        .route(
            "/report/pdf-batch",
            get(handlers::d400_client_report::download_batch),
        )
        // Старые адреса
        .route("/relatorio/:client_id", get(handlers::pages::legacy_view))
        .route("/pdf/:client_id", get(handlers::pages::legacy_pdf))
        .fallback_service(static_files)
        .layer(middleware::from_fn(request_logger))
        .layer(cors)
        .with_state(state)
}
