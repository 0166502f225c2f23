use axum::{
    routing::{get, post},
    Router,
};

use crate::api::handlers;

/// Конфигурация всех роутов приложения
pub fn configure_routes() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // SYNC SETTINGS ROUTES (a001)
        // ========================================
        .route(
            "/api/settings",
            get(handlers::a001_sync_settings::get_settings)
                .post(handlers::a001_sync_settings::save_settings),
        )
        .route(
            "/api/settings/view",
            get(handlers::a001_sync_settings::get_editor_view),
        )
        .route(
            "/api/settings/test-key",
            post(handlers::a001_sync_settings::test_api_key),
        )
        // ========================================
        // WEBHOOK ROUTES (u101)
        // ========================================
        .route(
            "/api/hooks/woocommerce/order",
            post(handlers::usecases::u101_order_hook),
        )
        // ========================================
        // SUBSCRIPTION JOURNAL ROUTES
        // ========================================
        .route(
            "/api/journal",
            get(handlers::journal::list_recent).delete(handlers::journal::clear_all),
        )
}
