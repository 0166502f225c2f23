use async_trait::async_trait;
use contracts::domain::a001_sync_settings::aggregate::Campaign;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Базовый URL API GetResponse (фиксированный, v3)
pub const API_BASE: &str = "https://api.getresponse.com";

const REQUEST_TIMEOUT_SECS: u64 = 20;

/// Ошибки вызовов GetResponse
#[derive(Debug, Error)]
pub enum GetResponseError {
    /// Сетевой сбой: ответ от GetResponse не получен
    #[error("transport error: {0}")]
    Transport(String),

    /// GetResponse отклонил запрос (HTTP >= 400, кроме 409)
    #[error("GetResponse HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Успешный исход создания контакта
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeOutcome {
    /// Контакт принят (GetResponse отвечает 202 Accepted)
    Subscribed,
    /// Контакт уже есть в кампании (HTTP 409) — успех-noop
    AlreadySubscribed,
}

/// Тело POST /v3/contacts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactRequest {
    pub email: String,
    pub name: String,
    pub campaign: CampaignRef,
    #[serde(rename = "cycleDay")]
    pub cycle_day: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignRef {
    #[serde(rename = "campaignId")]
    pub campaign_id: String,
}

impl ContactRequest {
    pub fn new(email: impl Into<String>, name: impl Into<String>, campaign_id: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            campaign: CampaignRef {
                campaign_id: campaign_id.into(),
            },
            cycle_day: 0,
        }
    }
}

/// Seam для обработчика заказов: в тестах подменяется моком
#[async_trait]
pub trait CampaignContactApi: Send + Sync {
    /// Создать (подписать) контакт в кампании.
    /// HTTP 409 — не ошибка: контакт уже подписан.
    async fn create_contact(
        &self,
        api_key: &str,
        contact: &ContactRequest,
    ) -> Result<SubscribeOutcome, GetResponseError>;
}

/// HTTP-клиент GetResponse API v3.
///
/// Аутентификация заголовком `X-Auth-Token: api-key <ключ>`,
/// таймаут каждого запроса 20 секунд, без повторов.
pub struct GetResponseClient {
    client: reqwest::Client,
}

impl GetResponseClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// Получить список кампаний через GET /v3/campaigns.
    ///
    /// Пустой ключ — валидное состояние "не настроено": возвращает пустой
    /// список без HTTP вызова. Ошибку HTTP/сети поднимает вызывающему;
    /// редактор настроек сводит её к пустому списку с предупреждением.
    pub async fn list_campaigns(&self, api_key: &str) -> anyhow::Result<Vec<Campaign>> {
        let api_key = clean_api_key(api_key);
        if api_key.is_empty() {
            return Ok(Vec::new());
        }
        if !api_key.is_ascii() {
            anyhow::bail!("API key contains non-ASCII characters");
        }

        let url = format!("{}/v3/campaigns", API_BASE);
        let response = self
            .client
            .get(&url)
            .header("X-Auth-Token", auth_header(&api_key))
            .header("Content-Type", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // Логирует вызывающий: для него это advisory-сбой
            let body = response.text().await.unwrap_or_default();
            let preview: String = body.chars().take(500).collect();
            anyhow::bail!(
                "GetResponse campaigns request failed with status {}: {}",
                status,
                preview
            );
        }

        let campaigns: Vec<Campaign> = response.json().await?;
        Ok(campaigns)
    }
}

impl Default for GetResponseClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CampaignContactApi for GetResponseClient {
    async fn create_contact(
        &self,
        api_key: &str,
        contact: &ContactRequest,
    ) -> Result<SubscribeOutcome, GetResponseError> {
        let api_key = clean_api_key(api_key);
        if !api_key.is_ascii() {
            return Err(GetResponseError::Transport(
                "API key contains non-ASCII characters".to_string(),
            ));
        }

        let url = format!("{}/v3/contacts", API_BASE);
        let response = self
            .client
            .post(&url)
            .header("X-Auth-Token", auth_header(&api_key))
            .header("Content-Type", "application/json")
            .json(contact)
            .send()
            .await
            .map_err(|e| GetResponseError::Transport(describe_transport_error(&e)))?;

        let status = response.status().as_u16();
        let body = if status >= 400 {
            response.text().await.unwrap_or_default()
        } else {
            String::new()
        };
        classify_contact_status(status, body)
    }
}

/// Формат заголовка аутентификации GetResponse
fn auth_header(api_key: &str) -> String {
    format!("api-key {}", api_key)
}

/// Очистка ключа от пробелов и невидимых символов перед подстановкой
/// в HTTP заголовок
fn clean_api_key(raw: &str) -> String {
    raw.trim().replace(['\n', '\r', '\t'], "")
}

/// Классификация ответа POST /v3/contacts: 409 — успех-noop,
/// прочие >= 400 — отказ, остальное — подписка принята
fn classify_contact_status(
    status: u16,
    body: String,
) -> Result<SubscribeOutcome, GetResponseError> {
    if status == 409 {
        return Ok(SubscribeOutcome::AlreadySubscribed);
    }
    if status >= 400 {
        let preview: String = body.chars().take(500).collect();
        return Err(GetResponseError::Rejected {
            status,
            body: preview,
        });
    }
    Ok(SubscribeOutcome::Subscribed)
}

fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!(
            "timed out waiting for GetResponse (>{} s)",
            REQUEST_TIMEOUT_SECS
        )
    } else if e.is_connect() {
        format!("failed to connect to GetResponse: {}", e)
    } else if e.is_request() || e.is_builder() {
        format!("failed to build request: {}", e)
    } else {
        format!("{}", e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_header_uses_api_key_scheme() {
        assert_eq!(auth_header("abc123"), "api-key abc123");
    }

    #[test]
    fn clean_api_key_strips_whitespace_and_control_chars() {
        assert_eq!(clean_api_key("  abc123  "), "abc123");
        assert_eq!(clean_api_key("abc\n12\t3\r"), "abc123");
        assert_eq!(clean_api_key("   "), "");
    }

    #[test]
    fn accepted_response_is_subscribed() {
        let outcome = classify_contact_status(202, String::new()).unwrap();
        assert_eq!(outcome, SubscribeOutcome::Subscribed);
    }

    #[test]
    fn conflict_is_already_subscribed_not_an_error() {
        let outcome = classify_contact_status(409, "{\"code\":1008}".to_string()).unwrap();
        assert_eq!(outcome, SubscribeOutcome::AlreadySubscribed);
    }

    #[test]
    fn client_errors_are_rejections_with_status_and_body() {
        let err = classify_contact_status(400, "{\"message\":\"Invalid email\"}".to_string())
            .unwrap_err();
        match err {
            GetResponseError::Rejected { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("Invalid email"));
            }
            other => panic!("expected Rejected, got {:?}", other),
        }
    }

    #[test]
    fn server_errors_are_rejections() {
        let err = classify_contact_status(500, String::new()).unwrap_err();
        assert!(matches!(
            err,
            GetResponseError::Rejected { status: 500, .. }
        ));
    }

    #[test]
    fn contact_request_matches_wire_format() {
        let contact = ContactRequest::new("jan@example.com", "Jan Kowalski", "C1");
        let json = serde_json::to_value(&contact).unwrap();
        assert_eq!(json["email"], "jan@example.com");
        assert_eq!(json["name"], "Jan Kowalski");
        assert_eq!(json["campaign"]["campaignId"], "C1");
        assert_eq!(json["cycleDay"], 0);
    }
}
