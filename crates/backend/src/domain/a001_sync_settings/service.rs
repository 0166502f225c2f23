use std::collections::HashSet;

use chrono::Utc;
use contracts::domain::a001_sync_settings::aggregate::{
    KeyTestResult, MappingRow, SyncSettings, SyncSettingsDto,
};

use super::repository;
use crate::shared::getresponse::GetResponseClient;

/// Очистка пользовательского значения до плоского текста:
/// вся HTML-разметка вырезается, края обрезаются
pub fn sanitize_text(raw: &str) -> String {
    let cleaned = ammonia::Builder::new()
        .tags(maplit::hashset![])
        .clean(raw)
        .to_string();
    cleaned.trim().to_string()
}

/// Санитизация сырой формы настроек — единственный путь мутации документа.
///
/// Правила:
/// - api_key — плоский текст; пустой после очистки ключ не сохраняется;
/// - строка сопоставления без товара или без кампании отбрасывается;
/// - product приводится к целому, нечисловые и неположительные значения
///   отбрасываются;
/// - дубликаты пар (product_id, campaign_id) схлопываются: остаётся первое
///   вхождение, относительный порядок строк сохраняется.
///
/// Функция идемпотентна: повторная санитизация уже очищенного документа
/// ничего не меняет.
pub fn sanitize(dto: SyncSettingsDto) -> SyncSettings {
    let api_key = sanitize_text(&dto.api_key);

    let mut mapping: Vec<MappingRow> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for row in dto.mapping {
        let product_raw = sanitize_text(&row.product);
        let campaign_id = sanitize_text(&row.campaign);
        if product_raw.is_empty() || campaign_id.is_empty() {
            continue;
        }
        let product_id = match product_raw.parse::<i64>() {
            Ok(v) if v > 0 => v,
            _ => continue,
        };

        let row = MappingRow {
            product_id,
            campaign_id,
        };
        if seen.insert(row.dedup_key()) {
            mapping.push(row);
        }
    }

    SyncSettings { api_key, mapping }
}

/// Текущие настройки; до первого сохранения — пустой документ
pub async fn load() -> anyhow::Result<SyncSettings> {
    Ok(repository::load().await?.unwrap_or_default())
}

/// Сохранить сырую форму: санитизация, затем upsert.
/// Возвращает очищенный документ — форма перерисовывается по нему.
pub async fn save(dto: SyncSettingsDto) -> anyhow::Result<SyncSettings> {
    let settings = sanitize(dto);
    repository::save(&settings).await?;
    tracing::info!(
        "Sync settings saved: {} mapping rows, api key {}",
        settings.mapping.len(),
        if settings.api_key.is_empty() {
            "absent"
        } else {
            "present"
        }
    );
    Ok(settings)
}

/// Проверка API ключа GetResponse живым запросом списка кампаний
pub async fn test_api_key(api_key: &str) -> KeyTestResult {
    let start = std::time::Instant::now();

    if api_key.trim().is_empty() {
        return KeyTestResult {
            success: false,
            message: "API ключ не может быть пустым".into(),
            duration_ms: 0,
            tested_at: Utc::now(),
            details: None,
        };
    }

    let client = GetResponseClient::new();
    match client.list_campaigns(api_key).await {
        Ok(campaigns) => KeyTestResult {
            success: true,
            message: format!(
                "Подключение к GetResponse установлено, кампаний: {}",
                campaigns.len()
            ),
            duration_ms: start.elapsed().as_millis() as u64,
            tested_at: Utc::now(),
            details: None,
        },
        Err(e) => KeyTestResult {
            success: false,
            message: "Не удалось получить список кампаний GetResponse".into(),
            duration_ms: start.elapsed().as_millis() as u64,
            tested_at: Utc::now(),
            details: Some(format!("{}", e)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a001_sync_settings::aggregate::MappingRowDto;

    fn dto(api_key: &str, rows: &[(&str, &str)]) -> SyncSettingsDto {
        SyncSettingsDto {
            api_key: api_key.to_string(),
            mapping: rows
                .iter()
                .map(|(product, campaign)| MappingRowDto {
                    product: product.to_string(),
                    campaign: campaign.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn incomplete_rows_are_dropped() {
        let settings = sanitize(dto("key", &[("5", ""), ("", "X")]));
        assert!(settings.mapping.is_empty());
    }

    #[test]
    fn duplicate_pairs_keep_first_occurrence_in_order() {
        let settings = sanitize(dto(
            "key",
            &[("10", "C1"), ("20", "C2"), ("10", "C1"), ("10", "C3")],
        ));
        let pairs: Vec<(i64, &str)> = settings
            .mapping
            .iter()
            .map(|r| (r.product_id, r.campaign_id.as_str()))
            .collect();
        assert_eq!(pairs, vec![(10, "C1"), (20, "C2"), (10, "C3")]);
    }

    #[test]
    fn same_product_may_map_to_several_campaigns() {
        let settings = sanitize(dto("key", &[("10", "C1"), ("10", "C2")]));
        assert_eq!(settings.mapping.len(), 2);
    }

    #[test]
    fn blank_api_key_is_not_retained() {
        assert_eq!(sanitize(dto("   ", &[])).api_key, "");
        assert_eq!(sanitize(dto("abc123", &[])).api_key, "abc123");
    }

    #[test]
    fn markup_is_stripped_from_api_key() {
        assert_eq!(sanitize(dto("<script>alert(1)</script>abc", &[])).api_key, "abc");
        assert_eq!(sanitize(dto("<b>abc123</b>", &[])).api_key, "abc123");
    }

    #[test]
    fn markup_is_stripped_from_campaign_id() {
        let settings = sanitize(dto("key", &[("10", "<i>C1</i>")]));
        assert_eq!(settings.mapping[0].campaign_id, "C1");
    }

    #[test]
    fn non_numeric_and_non_positive_products_are_dropped() {
        let settings = sanitize(dto(
            "key",
            &[("abc", "C1"), ("-5", "C1"), ("0", "C1"), ("12", "C1")],
        ));
        assert_eq!(settings.mapping.len(), 1);
        assert_eq!(settings.mapping[0].product_id, 12);
    }

    #[test]
    fn product_value_with_surrounding_spaces_parses() {
        let settings = sanitize(dto("key", &[(" 7 ", "C1")]));
        assert_eq!(settings.mapping[0].product_id, 7);
    }

    #[test]
    fn sanitize_is_idempotent() {
        let first = sanitize(dto(
            "<b>key</b>",
            &[("10", "C1"), ("10", "C1"), ("bad", "C2"), ("20", "")],
        ));
        let second = sanitize(first.to_dto());
        assert_eq!(first, second);
    }
}
