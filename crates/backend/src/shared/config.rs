use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::path::{Path, PathBuf};

static CONFIG: OnceCell<Config> = OnceCell::new();

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub woocommerce: WooCommerceConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

/// Доступ к WooCommerce REST API магазина
#[derive(Debug, Deserialize, Clone)]
pub struct WooCommerceConfig {
    /// Базовый URL магазина, например "https://shop.example.com"
    pub base_url: String,
    pub consumer_key: String,
    pub consumer_secret: String,
}

impl WooCommerceConfig {
    pub fn is_configured(&self) -> bool {
        !self.base_url.trim().is_empty()
            && !self.consumer_key.trim().is_empty()
            && !self.consumer_secret.trim().is_empty()
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[database]
path = "target/db/app.db"

[woocommerce]
base_url = ""
consumer_key = ""
consumer_secret = ""
"#;

/// Кэшированная конфигурация процесса: файл читается при первом
/// обращении, дальше все обработчики видят один и тот же снимок
pub fn get_config() -> anyhow::Result<&'static Config> {
    CONFIG.get_or_try_init(load_config)
}

/// Чтение config.toml: сначала рядом с исполняемым файлом,
/// при отсутствии — встроенный дефолт
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                let config: Config = toml::from_str(&contents)?;
                return Ok(config);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

/// Путь к файлу БД из конфигурации; относительный путь разрешается
/// от директории исполняемого файла
pub fn get_database_path(config: &Config) -> anyhow::Result<PathBuf> {
    let db_path_str = &config.database.path;
    let db_path = Path::new(db_path_str);

    if db_path.is_absolute() {
        return Ok(db_path.to_path_buf());
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let resolved_path = exe_dir.join(db_path);
            return Ok(resolved_path);
        }
    }

    // Fallback: use relative to current directory
    Ok(PathBuf::from(db_path_str))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config: Result<Config, _> = toml::from_str(DEFAULT_CONFIG);
        assert!(config.is_ok());
        let config = config.unwrap();
        assert_eq!(config.database.path, "target/db/app.db");
        assert!(!config.woocommerce.is_configured());
    }

    #[test]
    fn test_woocommerce_section_parses() {
        let config: Config = toml::from_str(
            r#"
            [database]
            path = "target/db/app.db"

            [woocommerce]
            base_url = "https://shop.example.com"
            consumer_key = "ck_123"
            consumer_secret = "cs_456"
            "#,
        )
        .unwrap();
        assert!(config.woocommerce.is_configured());
        assert_eq!(config.woocommerce.base_url, "https://shop.example.com");
    }
}
