use chrono::Utc;
use contracts::domain::a001_sync_settings::aggregate::SyncSettings;
use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

use crate::shared::data::db::get_connection;

/// Ключ документа настроек синхронизации в settings_store
const SETTINGS_KEY: &str = "a001_sync_settings";

/// Прочитать документ настроек. None — ещё ни разу не сохраняли.
pub async fn load() -> anyhow::Result<Option<SyncSettings>> {
    let conn = get_connection();

    let query = r#"
        SELECT value_json
        FROM settings_store
        WHERE key = ?
    "#;

    let row = conn
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            query,
            vec![SETTINGS_KEY.into()],
        ))
        .await?;

    match row {
        Some(row) => {
            let value_json: String = row.try_get("", "value_json")?;
            let settings: SyncSettings = serde_json::from_str(&value_json)?;
            Ok(Some(settings))
        }
        None => Ok(None),
    }
}

/// Сохранить документ настроек (upsert по фиксированному ключу)
pub async fn save(settings: &SyncSettings) -> anyhow::Result<()> {
    let conn = get_connection();

    let value_json = serde_json::to_string(settings)?;
    let updated_at = Utc::now().to_rfc3339();

    let query = r#"
        INSERT INTO settings_store (key, value_json, updated_at)
        VALUES (?, ?, ?)
        ON CONFLICT(key) DO UPDATE SET
            value_json = excluded.value_json,
            updated_at = excluded.updated_at
    "#;

    conn.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        query,
        vec![SETTINGS_KEY.into(), value_json.into(), updated_at.into()],
    ))
    .await?;

    Ok(())
}
