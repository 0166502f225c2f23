pub mod repository;

use contracts::shared::journal::SubscribeStatus;
use self::repository::record_internal;

/// Записать исход вызова создания контакта в журнал подписок.
///
/// Запись выполняется в фоне и не задерживает обработку вебхука.
pub fn record(
    order_id: i64,
    product_id: i64,
    campaign_id: &str,
    email: &str,
    status: SubscribeStatus,
    detail: Option<String>,
) {
    record_internal(order_id, product_id, campaign_id, email, status, detail);
}
