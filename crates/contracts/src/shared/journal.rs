use serde::{Deserialize, Serialize};

/// Исход одного вызова создания контакта
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscribeStatus {
    /// Контакт принят GetResponse (2xx)
    Subscribed,
    /// Контакт уже есть в кампании (HTTP 409) — успех, не ошибка
    AlreadySubscribed,
    /// GetResponse отклонил запрос (HTTP >= 400, кроме 409)
    Rejected,
    /// Сетевая ошибка, ответ не получен
    TransportError,
}

impl SubscribeStatus {
    /// Значение для колонки status таблицы subscription_log
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscribeStatus::Subscribed => "subscribed",
            SubscribeStatus::AlreadySubscribed => "already_subscribed",
            SubscribeStatus::Rejected => "rejected",
            SubscribeStatus::TransportError => "transport_error",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            SubscribeStatus::Rejected | SubscribeStatus::TransportError
        )
    }
}

/// Запись журнала подписок (одна на каждый вызов создания контакта)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: i64,
    pub timestamp: String,
    pub order_id: i64,
    pub product_id: i64,
    pub campaign_id: String,
    pub email: String,
    pub status: String,
    pub detail: Option<String>,
}
