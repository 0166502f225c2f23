use serde::{Deserialize, Serialize};

/// Строка сопоставления "товар -> кампания".
///
/// Инвариант: пара (product_id, campaign_id) уникальна внутри документа
/// настроек, product_id > 0, campaign_id не пустой. Инвариант обеспечивает
/// санитизация при сохранении (backend), другого пути записи нет.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRow {
    pub product_id: i64,
    pub campaign_id: String,
}

impl MappingRow {
    /// Ключ уникальности строки внутри документа настроек
    pub fn dedup_key(&self) -> String {
        format!("{}|{}", self.product_id, self.campaign_id)
    }
}

/// Документ настроек синхронизации (единственный на сервис).
///
/// Хранится как JSON в generic-хранилище `settings_store` под
/// фиксированным ключом; создаётся первым сохранением формы.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncSettings {
    pub api_key: String,
    pub mapping: Vec<MappingRow>,
}

impl SyncSettings {
    /// Настройки достаточны для обработки заказов:
    /// есть API ключ и хотя бы одна строка сопоставления.
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.mapping.is_empty()
    }

    /// Представление для формы редактирования (строки как строки формы)
    pub fn to_dto(&self) -> SyncSettingsDto {
        SyncSettingsDto {
            api_key: self.api_key.clone(),
            mapping: self
                .mapping
                .iter()
                .map(|row| MappingRowDto {
                    product: row.product_id.to_string(),
                    campaign: row.campaign_id.clone(),
                })
                .collect(),
        }
    }
}

/// Сырая строка формы сопоставления.
///
/// Селекты формы отдают значения строками; пустая строка = "не выбрано"
/// (placeholder-опция).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRowDto {
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub campaign: String,
}

/// Сырой документ формы настроек: упорядоченный массив строк.
///
/// Форма отправляет строки как список записей, порядок строк на странице
/// сохраняется в документе.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSettingsDto {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub mapping: Vec<MappingRowDto>,
}

impl SyncSettingsDto {
    /// Редактор всегда показывает минимум одну (пустую) строку
    pub fn with_editor_padding(mut self) -> Self {
        if self.mapping.is_empty() {
            self.mapping.push(MappingRowDto::default());
        }
        self
    }
}

/// Кампания GetResponse (только чтение, не персистится).
/// Форма совпадает с ответом GET /v3/campaigns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub campaign_id: String,
    pub name: String,
}

/// Товар магазина для селекта формы (только чтение)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    pub id: i64,
    pub name: String,
}

/// Модель страницы редактора настроек.
///
/// Advisory-списки (товары, кампании) при недоступности источника
/// приходят пустыми c текстом ошибки; страница рендерится всегда.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsEditorView {
    pub settings: SyncSettingsDto,
    pub products: Vec<ProductRef>,
    pub campaigns: Vec<Campaign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaigns_error: Option<String>,
}

/// Запрос проверки API ключа GetResponse
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyTestRequest {
    pub api_key: String,
}

/// Результат проверки API ключа GetResponse
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyTestResult {
    pub success: bool,
    pub message: String,
    pub duration_ms: u64,
    pub tested_at: chrono::DateTime<chrono::Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Ответ на сохранение настроек
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveSettingsResponse {
    pub success: bool,
    pub message: String,
}
