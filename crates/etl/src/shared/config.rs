use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub ozon: OzonConfig,
    #[serde(default)]
    pub wildberries: WildberriesConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

/// Адреса Ozon Seller API (переопределяются в config.toml для тестов)
#[derive(Debug, Deserialize, Clone)]
pub struct OzonConfig {
    #[serde(default = "default_ozon_base_url")]
    pub base_url: String,
}

impl Default for OzonConfig {
    fn default() -> Self {
        Self {
            base_url: default_ozon_base_url(),
        }
    }
}

fn default_ozon_base_url() -> String {
    "https://api-seller.ozon.ru".to_string()
}

/// Адреса Wildberries API: контент и статистика живут на разных хостах
#[derive(Debug, Deserialize, Clone)]
pub struct WildberriesConfig {
    #[serde(default = "default_wb_content_url")]
    pub content_api_url: String,
    #[serde(default = "default_wb_statistics_url")]
    pub statistics_api_url: String,
}

impl Default for WildberriesConfig {
    fn default() -> Self {
        Self {
            content_api_url: default_wb_content_url(),
            statistics_api_url: default_wb_statistics_url(),
        }
    }
}

fn default_wb_content_url() -> String {
    "https://content-api.wildberries.ru".to_string()
}

fn default_wb_statistics_url() -> String {
    "https://statistics-api.wildberries.ru".to_string()
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[database]
path = "target/db/etl.db"
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    // Try to find config.toml next to the executable
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

    // Fall back to default config
    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

/// Get the database file path from configuration
/// Resolves relative paths relative to the executable directory
pub fn get_database_path(config: &Config) -> anyhow::Result<PathBuf> {
    let db_path_str = &config.database.path;
    let db_path = Path::new(db_path_str);

    // If absolute path, use as is
    if db_path.is_absolute() {
        return Ok(db_path.to_path_buf());
    }

    // If relative path, resolve it relative to the executable directory
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
        assert_eq!(config.database.path, "target/db/etl.db");
        assert_eq!(config.ozon.base_url, "https://api-seller.ozon.ru");
        assert_eq!(
            config.wildberries.statistics_api_url,
            "https://statistics-api.wildberries.ru"
        );
    }

    #[test]
    fn test_api_urls_overridable() {
        let toml_str = r#"
            [database]
            path = "test.db"

            [ozon]
            base_url = "http://localhost:8081"

            [wildberries]
            content_api_url = "http://localhost:8082"
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.ozon.base_url, "http://localhost:8081");
        assert_eq!(config.wildberries.content_api_url, "http://localhost:8082");
        // Непереопределённое поле получает значение по умолчанию
        assert_eq!(
            config.wildberries.statistics_api_url,
            "https://statistics-api.wildberries.ru"
        );
    }
}
