use axum::Json;

use contracts::usecases::u101_order_subscribe::{
    HookOutcome, OrderHookRequest, OrderHookResponse,
};

use crate::shared::config;
use crate::shared::woocommerce::WooCommerceClient;
use crate::usecases;

// ============================================================================
// UseCase u101: Order Subscribe
// ============================================================================

/// POST /api/hooks/woocommerce/order
///
/// Вебхук WooCommerce о смене статуса заказа. Ответ всегда 200:
/// магазин не должен блокировать оформление заказа и повторять
/// доставку из-за наших сбоев, подробности идут в журнал и в тело.
pub async fn u101_order_hook(Json(request): Json<OrderHookRequest>) -> Json<OrderHookResponse> {
    let event_id = uuid::Uuid::new_v4().to_string();

    // Нас интересует только переход в completed; payload без статуса
    // тоже пропускается. Фактический статус перепроверяется по заказу
    // из магазина уже внутри executor.
    if !request.is_completed_transition() {
        let status = request.status.as_deref().unwrap_or("<absent>");
        tracing::debug!("Order {}: status '{}' ignored", request.id, status);
        return Json(acknowledge(
            &event_id,
            request.id,
            HookOutcome::SkippedStatus,
            format!("order status '{}' is not handled", status),
        ));
    }

    let config = match config::get_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Order hook {}: failed to load config: {}", event_id, e);
            return Json(acknowledge(
                &event_id,
                request.id,
                HookOutcome::Error,
                "internal configuration error".to_string(),
            ));
        }
    };

    let executor = usecases::u101_order_subscribe::SubscribeExecutor::new(WooCommerceClient::new(
        &config.woocommerce,
    ));

    Json(executor.handle_completed_order(&event_id, request.id).await)
}

/// Ответ без выполненных вызовов (скип или внутренняя ошибка)
fn acknowledge(
    event_id: &str,
    order_id: i64,
    status: HookOutcome,
    message: String,
) -> OrderHookResponse {
    OrderHookResponse {
        event_id: event_id.to_string(),
        order_id,
        status,
        message,
        attempted: 0,
        subscribed: 0,
        already_subscribed: 0,
        failed: 0,
    }
}
