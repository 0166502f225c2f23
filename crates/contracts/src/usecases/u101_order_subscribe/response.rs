use serde::{Deserialize, Serialize};

/// Итог обработки вебхука заказа.
///
/// Вебхук всегда получает HTTP 200 с этим телом: сбои подписки не должны
/// влиять на поток заказов магазина.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderHookResponse {
    /// Идентификатор события для поиска в логах
    pub event_id: String,
    pub order_id: i64,
    pub status: HookOutcome,
    pub message: String,
    /// Запланировано вызовов (товар x строка сопоставления)
    pub attempted: usize,
    pub subscribed: usize,
    pub already_subscribed: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookOutcome {
    /// Заказ обработан, вызовы выполнены (возможно, с ошибками отдельных вызовов)
    Processed,
    /// Статус заказа не "completed" — событие принято и пропущено
    SkippedStatus,
    /// Нет API ключа или сопоставление пусто — валидное бездействие
    SkippedUnconfigured,
    /// Заказ не найден или недоступен в магазине
    OrderNotFound,
    /// Внутренняя ошибка до планирования вызовов
    Error,
}
