use serde::{Deserialize, Serialize};

/// Payload вебхука WooCommerce о смене статуса заказа.
///
/// Вебхук присылает заказ целиком; нам нужны только id и статус,
/// остальные поля игнорируются. Данные заказа перечитываются через
/// REST API перед обработкой, payload служит триггером.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderHookRequest {
    pub id: i64,
    #[serde(default)]
    pub status: Option<String>,
}

impl OrderHookRequest {
    /// Нас интересует только переход в completed. Payload без статуса —
    /// не наш переход: обрабатывать такое событие нельзя.
    pub fn is_completed_transition(&self) -> bool {
        self.status.as_deref() == Some("completed")
    }
}
