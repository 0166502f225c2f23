use once_cell::sync::OnceCell;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

pub async fn initialize_database(db_path: Option<&str>) -> anyhow::Result<()> {
    let db_file = db_path.unwrap_or("target/db/app.db");
    if let Some(parent) = std::path::Path::new(db_file).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if std::path::Path::new(db_file).is_absolute() {
        std::path::PathBuf::from(db_file)
    } else {
        std::env::current_dir()?.join(db_file)
    };
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    let db_url = format!("sqlite://{}{}?mode=rwc", prefix, normalized);
    let conn = Database::connect(&db_url).await?;

    // Minimal schema bootstrap: generic settings store
    let check_settings_store = r#"
        SELECT name FROM sqlite_master
        WHERE type='table' AND name='settings_store';
    "#;
    let settings_store_exists = conn
        .query_all(Statement::from_string(
            DatabaseBackend::Sqlite,
            check_settings_store.to_string(),
        ))
        .await?;

    if settings_store_exists.is_empty() {
        tracing::info!("Creating settings_store table");
        let create_settings_store_sql = r#"
            CREATE TABLE settings_store (
                key TEXT PRIMARY KEY NOT NULL,
                value_json TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
        "#;
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            create_settings_store_sql.to_string(),
        ))
        .await?;
    }

    // Journal of contact-creation calls
    let check_subscription_log = r#"
        SELECT name FROM sqlite_master
        WHERE type='table' AND name='subscription_log';
    "#;
    let subscription_log_exists = conn
        .query_all(Statement::from_string(
            DatabaseBackend::Sqlite,
            check_subscription_log.to_string(),
        ))
        .await?;

    if subscription_log_exists.is_empty() {
        tracing::info!("Creating subscription_log table");
        let create_subscription_log_sql = r#"
            CREATE TABLE subscription_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                order_id INTEGER NOT NULL,
                product_id INTEGER NOT NULL,
                campaign_id TEXT NOT NULL,
                email TEXT NOT NULL,
                status TEXT NOT NULL,
                detail TEXT
            );
        "#;
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            create_subscription_log_sql.to_string(),
        ))
        .await?;
    }

    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("Failed to set DB_CONN"))?;
    Ok(())
}

pub fn get_connection() -> &'static DatabaseConnection {
    DB_CONN
        .get()
        .expect("Database connection has not been initialized")
}
