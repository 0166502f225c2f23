use std::sync::Arc;

use contracts::domain::a001_sync_settings::aggregate::{MappingRow, SyncSettings};
use contracts::shared::journal::SubscribeStatus;
use contracts::usecases::u101_order_subscribe::response::{HookOutcome, OrderHookResponse};

use crate::domain::a001_sync_settings;
use crate::shared::getresponse::{
    CampaignContactApi, ContactRequest, GetResponseClient, GetResponseError, SubscribeOutcome,
};
use crate::shared::journal;
use crate::shared::woocommerce::{WooCommerceClient, WooOrder};

/// Запланированный вызов создания контакта:
/// товар заказа x совпавшая строка сопоставления
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCall {
    pub product_id: i64,
    pub campaign_id: String,
}

/// Итог одного выполненного вызова
#[derive(Debug, Clone)]
pub struct CallResult {
    pub product_id: i64,
    pub campaign_id: String,
    pub status: SubscribeStatus,
    pub detail: Option<String>,
}

/// План вызовов по заказу: для каждой позиции заказа (в порядке позиций) —
/// по одному вызову на каждую строку сопоставления с тем же product_id.
///
/// Дубликаты по кампании не схлопываются: два товара, ведущие в одну
/// кампанию, дают два вызова. Повторную подписку гасит GetResponse
/// ответом 409.
pub fn plan_calls(order: &WooOrder, mapping: &[MappingRow]) -> Vec<PlannedCall> {
    let mut calls = Vec::new();
    for item in &order.line_items {
        for row in mapping {
            if row.product_id == item.product_id {
                calls.push(PlannedCall {
                    product_id: row.product_id,
                    campaign_id: row.campaign_id.clone(),
                });
            }
        }
    }
    calls
}

/// Выполнить план последовательно, без повторов.
/// Сбой одного вызова не прерывает остальные.
pub async fn subscribe_order(
    api: &dyn CampaignContactApi,
    order: &WooOrder,
    settings: &SyncSettings,
) -> Vec<CallResult> {
    // Статус берётся из перечитанного заказа, не из payload вебхука:
    // заказ, который успели вернуть или отменить, не подписывается
    if !order.is_completed() || !settings.is_configured() {
        return Vec::new();
    }

    let email = order.billing.email.clone();
    let name = order.billing.full_name();
    let mut results = Vec::new();

    for call in plan_calls(order, &settings.mapping) {
        let contact = ContactRequest::new(email.clone(), name.clone(), call.campaign_id.clone());
        let (status, detail) = match api.create_contact(&settings.api_key, &contact).await {
            Ok(SubscribeOutcome::Subscribed) => (SubscribeStatus::Subscribed, None),
            Ok(SubscribeOutcome::AlreadySubscribed) => (SubscribeStatus::AlreadySubscribed, None),
            Err(GetResponseError::Rejected { status, body }) => (
                SubscribeStatus::Rejected,
                Some(format!("HTTP {}: {}", status, body)),
            ),
            Err(GetResponseError::Transport(message)) => {
                (SubscribeStatus::TransportError, Some(message))
            }
        };
        results.push(CallResult {
            product_id: call.product_id,
            campaign_id: call.campaign_id,
            status,
            detail,
        });
    }

    results
}

/// Executor обработки события "заказ выполнен"
pub struct SubscribeExecutor {
    api: Arc<dyn CampaignContactApi>,
    shop: WooCommerceClient,
}

impl SubscribeExecutor {
    pub fn new(shop: WooCommerceClient) -> Self {
        Self {
            api: Arc::new(GetResponseClient::new()),
            shop,
        }
    }

    /// Полный цикл обработки заказа: настройки -> заказ -> план ->
    /// вызовы -> журнал.
    ///
    /// Любой путь завершается обычным ответом: ненастроенный сервис,
    /// отсутствующий заказ и заказ в другом статусе — валидное
    /// бездействие, сбой чтения настроек — исход error, сбои отдельных
    /// вызовов попадают в журнал и счётчик failed.
    pub async fn handle_completed_order(&self, event_id: &str, order_id: i64) -> OrderHookResponse {
        let settings = match a001_sync_settings::service::load().await {
            Ok(settings) => settings,
            Err(e) => {
                tracing::error!("Order {}: failed to load sync settings: {}", order_id, e);
                return summary(
                    event_id,
                    order_id,
                    HookOutcome::Error,
                    "failed to load sync settings".to_string(),
                    &[],
                );
            }
        };
        if !settings.is_configured() {
            tracing::info!("Order {}: sync is not configured, nothing to do", order_id);
            return summary(
                event_id,
                order_id,
                HookOutcome::SkippedUnconfigured,
                "API key or mapping is not configured".to_string(),
                &[],
            );
        }

        let order = match self.shop.get_order(order_id).await {
            Ok(Some(order)) => order,
            Ok(None) => {
                tracing::warn!("Order {} not found in shop", order_id);
                return summary(
                    event_id,
                    order_id,
                    HookOutcome::OrderNotFound,
                    format!("order {} not found", order_id),
                    &[],
                );
            }
            Err(e) => {
                tracing::error!("Failed to fetch order {}: {}", order_id, e);
                return summary(
                    event_id,
                    order_id,
                    HookOutcome::OrderNotFound,
                    format!("order {} could not be fetched", order_id),
                    &[],
                );
            }
        };

        // Вебхук мог доставить устаревшую подсказку "completed";
        // решает фактический статус заказа в магазине
        if !order.is_completed() {
            tracing::info!(
                "Order {}: actual status is '{}', skipping",
                order_id,
                order.status
            );
            return summary(
                event_id,
                order_id,
                HookOutcome::SkippedStatus,
                format!("order status '{}' is not handled", order.status),
                &[],
            );
        }

        let results = subscribe_order(self.api.as_ref(), &order, &settings).await;

        for result in &results {
            match result.status {
                SubscribeStatus::Subscribed => tracing::info!(
                    "Order {}: subscribed {} to campaign {} (product {})",
                    order_id,
                    order.billing.email,
                    result.campaign_id,
                    result.product_id
                ),
                SubscribeStatus::AlreadySubscribed => tracing::info!(
                    "Order {}: {} already subscribed to campaign {}",
                    order_id,
                    order.billing.email,
                    result.campaign_id
                ),
                SubscribeStatus::Rejected | SubscribeStatus::TransportError => tracing::error!(
                    "Order {}: subscription to campaign {} failed: {}",
                    order_id,
                    result.campaign_id,
                    result.detail.as_deref().unwrap_or("unknown error")
                ),
            }
            journal::record(
                order_id,
                result.product_id,
                &result.campaign_id,
                &order.billing.email,
                result.status,
                result.detail.clone(),
            );
        }

        summary(
            event_id,
            order_id,
            HookOutcome::Processed,
            format!("{} contact call(s) performed", results.len()),
            &results,
        )
    }
}

fn summary(
    event_id: &str,
    order_id: i64,
    status: HookOutcome,
    message: String,
    results: &[CallResult],
) -> OrderHookResponse {
    OrderHookResponse {
        event_id: event_id.to_string(),
        order_id,
        status,
        message,
        attempted: results.len(),
        subscribed: results
            .iter()
            .filter(|r| r.status == SubscribeStatus::Subscribed)
            .count(),
        already_subscribed: results
            .iter()
            .filter(|r| r.status == SubscribeStatus::AlreadySubscribed)
            .count(),
        failed: results.iter().filter(|r| r.status.is_failure()).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::woocommerce::{WooBilling, WooLineItem};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct MockApi {
        responses: Mutex<VecDeque<Result<SubscribeOutcome, GetResponseError>>>,
        calls: Mutex<Vec<(String, ContactRequest)>>,
    }

    impl MockApi {
        fn new(responses: Vec<Result<SubscribeOutcome, GetResponseError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CampaignContactApi for MockApi {
        async fn create_contact(
            &self,
            api_key: &str,
            contact: &ContactRequest,
        ) -> Result<SubscribeOutcome, GetResponseError> {
            self.calls
                .lock()
                .unwrap()
                .push((api_key.to_string(), contact.clone()));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(SubscribeOutcome::Subscribed))
        }
    }

    fn order(items: &[i64]) -> WooOrder {
        order_with_status("completed", items)
    }

    fn order_with_status(status: &str, items: &[i64]) -> WooOrder {
        WooOrder {
            id: 1001,
            status: status.to_string(),
            billing: WooBilling {
                email: "jan@example.com".to_string(),
                first_name: "Jan".to_string(),
                last_name: "Kowalski".to_string(),
            },
            line_items: items
                .iter()
                .map(|&product_id| WooLineItem { product_id })
                .collect(),
        }
    }

    fn settings(api_key: &str, rows: &[(i64, &str)]) -> SyncSettings {
        SyncSettings {
            api_key: api_key.to_string(),
            mapping: rows
                .iter()
                .map(|(product_id, campaign_id)| MappingRow {
                    product_id: *product_id,
                    campaign_id: campaign_id.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn single_mapped_item_plans_one_call() {
        let calls = plan_calls(&order(&[10]), &settings("k", &[(10, "C1")]).mapping);
        assert_eq!(
            calls,
            vec![PlannedCall {
                product_id: 10,
                campaign_id: "C1".to_string()
            }]
        );
    }

    #[test]
    fn two_products_mapped_to_same_campaign_plan_two_calls() {
        let calls = plan_calls(
            &order(&[10, 20]),
            &settings("k", &[(10, "C1"), (20, "C1")]).mapping,
        );
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|c| c.campaign_id == "C1"));
    }

    #[test]
    fn item_matching_several_rows_plans_several_calls() {
        let calls = plan_calls(
            &order(&[10]),
            &settings("k", &[(10, "C1"), (10, "C2")]).mapping,
        );
        assert_eq!(calls.len(), 2);
    }

    #[test]
    fn unmapped_items_plan_nothing() {
        let calls = plan_calls(&order(&[99]), &settings("k", &[(10, "C1")]).mapping);
        assert!(calls.is_empty());
    }

    #[tokio::test]
    async fn performs_one_call_per_plan_entry_with_order_identity() {
        let api = MockApi::new(vec![]);
        let results =
            subscribe_order(&api, &order(&[10, 20]), &settings("secret", &[(10, "C1"), (20, "C2")]))
                .await;

        assert_eq!(results.len(), 2);
        let calls = api.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, "secret");
        assert_eq!(calls[0].1.email, "jan@example.com");
        assert_eq!(calls[0].1.name, "Jan Kowalski");
        assert_eq!(calls[0].1.campaign.campaign_id, "C1");
        assert_eq!(calls[0].1.cycle_day, 0);
        assert_eq!(calls[1].1.campaign.campaign_id, "C2");
    }

    #[tokio::test]
    async fn conflict_is_success_noop_without_retry() {
        let api = MockApi::new(vec![Ok(SubscribeOutcome::AlreadySubscribed)]);
        let results = subscribe_order(&api, &order(&[10]), &settings("k", &[(10, "C1")])).await;

        assert_eq!(api.call_count(), 1);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, SubscribeStatus::AlreadySubscribed);
        assert!(!results[0].status.is_failure());
        assert!(results[0].detail.is_none());
    }

    #[tokio::test]
    async fn rejection_does_not_suppress_remaining_calls() {
        let api = MockApi::new(vec![
            Err(GetResponseError::Rejected {
                status: 400,
                body: "Invalid email".to_string(),
            }),
            Ok(SubscribeOutcome::Subscribed),
        ]);
        let results = subscribe_order(
            &api,
            &order(&[10, 20]),
            &settings("k", &[(10, "C1"), (20, "C2")]),
        )
        .await;

        assert_eq!(api.call_count(), 2);
        assert_eq!(results[0].status, SubscribeStatus::Rejected);
        assert!(results[0].detail.as_deref().unwrap().contains("400"));
        assert_eq!(results[1].status, SubscribeStatus::Subscribed);
    }

    #[tokio::test]
    async fn transport_error_is_recorded_with_detail() {
        let api = MockApi::new(vec![Err(GetResponseError::Transport(
            "failed to connect".to_string(),
        ))]);
        let results = subscribe_order(&api, &order(&[10]), &settings("k", &[(10, "C1")])).await;

        assert_eq!(results[0].status, SubscribeStatus::TransportError);
        assert_eq!(results[0].detail.as_deref(), Some("failed to connect"));
    }

    #[tokio::test]
    async fn empty_api_key_performs_zero_remote_calls() {
        let api = MockApi::new(vec![]);
        let results = subscribe_order(&api, &order(&[10]), &settings("", &[(10, "C1")])).await;

        assert!(results.is_empty());
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn non_completed_order_performs_zero_remote_calls() {
        // Статус "completed" из payload вебхука может устареть:
        // выполняем только то, что магазин подтверждает по факту
        for status in ["pending", "processing", "refunded", "cancelled"] {
            let api = MockApi::new(vec![]);
            let results = subscribe_order(
                &api,
                &order_with_status(status, &[10]),
                &settings("k", &[(10, "C1")]),
            )
            .await;

            assert!(results.is_empty(), "status '{}'", status);
            assert_eq!(api.call_count(), 0, "status '{}'", status);
        }
    }

    #[tokio::test]
    async fn empty_mapping_performs_zero_remote_calls() {
        let api = MockApi::new(vec![]);
        let results = subscribe_order(&api, &order(&[10]), &settings("k", &[])).await;

        assert!(results.is_empty());
        assert_eq!(api.call_count(), 0);
    }

    #[test]
    fn summary_counts_outcomes() {
        let results = vec![
            CallResult {
                product_id: 10,
                campaign_id: "C1".to_string(),
                status: SubscribeStatus::Subscribed,
                detail: None,
            },
            CallResult {
                product_id: 20,
                campaign_id: "C2".to_string(),
                status: SubscribeStatus::AlreadySubscribed,
                detail: None,
            },
            CallResult {
                product_id: 30,
                campaign_id: "C3".to_string(),
                status: SubscribeStatus::TransportError,
                detail: Some("timeout".to_string()),
            },
        ];
        let response = summary(
            "evt-1",
            1001,
            HookOutcome::Processed,
            "3 contact call(s) performed".to_string(),
            &results,
        );
        assert_eq!(response.attempted, 3);
        assert_eq!(response.subscribed, 1);
        assert_eq!(response.already_subscribed, 1);
        assert_eq!(response.failed, 1);
    }
}
