use axum::Json;

use contracts::domain::a001_sync_settings::aggregate::{
    KeyTestRequest, KeyTestResult, ProductRef, SaveSettingsResponse, SettingsEditorView,
    SyncSettingsDto,
};

use crate::domain::a001_sync_settings;
use crate::shared::config;
use crate::shared::getresponse::GetResponseClient;
use crate::shared::woocommerce::WooCommerceClient;

/// GET /api/settings
pub async fn get_settings() -> Result<Json<SyncSettingsDto>, axum::http::StatusCode> {
    match a001_sync_settings::service::load().await {
        Ok(settings) => Ok(Json(settings.to_dto())),
        Err(e) => {
            tracing::error!("Failed to load sync settings: {}", e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// POST /api/settings
pub async fn save_settings(
    Json(dto): Json<SyncSettingsDto>,
) -> Result<Json<SaveSettingsResponse>, axum::http::StatusCode> {
    match a001_sync_settings::service::save(dto).await {
        Ok(saved) => Ok(Json(SaveSettingsResponse {
            success: true,
            message: format!("Настройки сохранены: строк сопоставления {}", saved.mapping.len()),
        })),
        Err(e) => {
            tracing::error!("Failed to save sync settings: {}", e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// GET /api/settings/view
///
/// Собирает всё, что нужно редактору настроек: сохранённые настройки
/// (с пустой строкой-заготовкой, если сопоставление пустое), каталог
/// товаров магазина и список кампаний GetResponse. Недоступность
/// каталога или кампаний не валит ответ: редактор получает пустой
/// список и текст ошибки для подсказки.
pub async fn get_editor_view() -> Result<Json<SettingsEditorView>, axum::http::StatusCode> {
    let settings = match a001_sync_settings::service::load().await {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("Failed to load sync settings: {}", e);
            return Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (products, products_error) = load_products().await;

    let (campaigns, campaigns_error) = if settings.api_key.trim().is_empty() {
        (Vec::new(), None)
    } else {
        match GetResponseClient::new().list_campaigns(&settings.api_key).await {
            Ok(campaigns) => (campaigns, None),
            Err(e) => {
                tracing::warn!("Failed to list GetResponse campaigns: {}", e);
                (
                    Vec::new(),
                    Some("Не удалось получить список кампаний GetResponse".to_string()),
                )
            }
        }
    };

    Ok(Json(SettingsEditorView {
        settings: settings.to_dto().with_editor_padding(),
        products,
        campaigns,
        products_error,
        campaigns_error,
    }))
}

/// POST /api/settings/test-key
pub async fn test_api_key(Json(request): Json<KeyTestRequest>) -> Json<KeyTestResult> {
    Json(a001_sync_settings::service::test_api_key(&request.api_key).await)
}

/// Каталог товаров для селекта в редакторе. Магазин может быть
/// не настроен в config.toml, тогда селект остаётся пустым.
async fn load_products() -> (Vec<ProductRef>, Option<String>) {
    let config = match config::get_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load config: {}", e);
            return (
                Vec::new(),
                Some("Не удалось прочитать конфигурацию магазина".to_string()),
            );
        }
    };

    if !config.woocommerce.is_configured() {
        return (
            Vec::new(),
            Some("Доступ к WooCommerce не настроен в config.toml".to_string()),
        );
    }

    match WooCommerceClient::new(&config.woocommerce).list_products().await {
        Ok(products) => (
            products
                .into_iter()
                .map(|p| ProductRef {
                    id: p.id,
                    name: p.name,
                })
                .collect(),
            None,
        ),
        Err(e) => {
            tracing::warn!("Failed to list WooCommerce products: {}", e);
            (
                Vec::new(),
                Some("Не удалось получить каталог товаров магазина".to_string()),
            )
        }
    }
}
