use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::shared::config::WooCommerceConfig;

const PER_PAGE: usize = 100;

/// HTTP-клиент WooCommerce REST API (/wp-json/wc/v3).
///
/// Аутентификация consumer key/secret через Basic auth; магазин должен
/// работать по HTTPS.
pub struct WooCommerceClient {
    client: reqwest::Client,
    base_url: String,
    consumer_key: String,
    consumer_secret: String,
}

impl WooCommerceClient {
    pub fn new(config: &WooCommerceConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            consumer_key: config.consumer_key.clone(),
            consumer_secret: config.consumer_secret.clone(),
        }
    }

    /// Получить весь каталог товаров (постранично, per_page=100).
    /// Используется селектом товаров в редакторе настроек.
    pub async fn list_products(&self) -> Result<Vec<WooProduct>> {
        let url = format!("{}/wp-json/wc/v3/products", self.base_url);
        let mut products: Vec<WooProduct> = Vec::new();
        let mut page: usize = 1;

        loop {
            let response = self
                .client
                .get(&url)
                .basic_auth(&self.consumer_key, Some(&self.consumer_secret))
                .query(&[
                    ("per_page", PER_PAGE.to_string()),
                    ("page", page.to_string()),
                ])
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let preview: String = body.chars().take(500).collect();
                anyhow::bail!(
                    "WooCommerce products request failed with status {}: {}",
                    status,
                    preview
                );
            }

            let batch: Vec<WooProduct> = response.json().await?;
            let batch_len = batch.len();
            products.extend(batch);

            if batch_len < PER_PAGE {
                break;
            }
            page += 1;
        }

        tracing::debug!("Fetched {} products from WooCommerce", products.len());
        Ok(products)
    }

    /// Получить заказ по id. 404 означает "заказа нет" и не является
    /// ошибкой: обработчик вебхука в этом случае молча бездействует.
    pub async fn get_order(&self, order_id: i64) -> Result<Option<WooOrder>> {
        let url = format!("{}/wp-json/wc/v3/orders/{}", self.base_url, order_id);
        let response = self
            .client
            .get(&url)
            .basic_auth(&self.consumer_key, Some(&self.consumer_secret))
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let preview: String = body.chars().take(500).collect();
            anyhow::bail!(
                "WooCommerce order request failed with status {}: {}",
                status,
                preview
            );
        }

        let order: WooOrder = response.json().await?;
        Ok(Some(order))
    }
}

// ============================================================================
// Wire-структуры WooCommerce REST API (используемое подмножество полей)
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WooProduct {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WooOrder {
    pub id: i64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub billing: WooBilling,
    #[serde(default)]
    pub line_items: Vec<WooLineItem>,
}

impl WooOrder {
    /// Статус заказа по данным магазина, не по payload вебхука.
    /// Подписка выполняется только для выполненных заказов.
    pub fn is_completed(&self) -> bool {
        self.status == "completed"
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WooBilling {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl WooBilling {
    /// Имя покупателя для контакта: имя и фамилия через один пробел,
    /// края обрезаны
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WooLineItem {
    #[serde(default)]
    pub product_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn billing(first: &str, last: &str) -> WooBilling {
        WooBilling {
            email: "jan@example.com".to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
        }
    }

    #[test]
    fn full_name_joins_with_single_space() {
        assert_eq!(billing("Jan", "Kowalski").full_name(), "Jan Kowalski");
    }

    #[test]
    fn full_name_trims_one_sided_names() {
        assert_eq!(billing("Jan", "").full_name(), "Jan");
        assert_eq!(billing("", "Kowalski").full_name(), "Kowalski");
    }

    #[test]
    fn full_name_empty_when_billing_has_no_names() {
        assert_eq!(billing("", "").full_name(), "");
    }

    #[test]
    fn only_completed_status_counts_as_completed() {
        let mut order = WooOrder {
            id: 1,
            status: "completed".to_string(),
            billing: WooBilling::default(),
            line_items: Vec::new(),
        };
        assert!(order.is_completed());

        for status in ["pending", "processing", "refunded", "cancelled", ""] {
            order.status = status.to_string();
            assert!(!order.is_completed(), "status '{}'", status);
        }
    }
}
