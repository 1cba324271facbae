use super::{MarketplaceClient, TestConnectionResult};
use crate::shared::config::Config;
use async_trait::async_trait;
use contracts::domain::a001_client::aggregate::Client;

/// Клиент для работы с API Wildberries
pub struct WildberriesClient;

#[async_trait]
impl MarketplaceClient for WildberriesClient {
    async fn test_connection(config: &Config, client: &Client) -> TestConnectionResult {
        if client.api_key.trim().is_empty() {
            return TestConnectionResult {
                success: false,
                message: "API-ключ не может быть пустым".into(),
                details: None,
            };
        }

        let http = match reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
        {
            Ok(c) => c,
            Err(e) => {
                return TestConnectionResult {
                    success: false,
                    message: "Ошибка создания HTTP клиента".into(),
                    details: Some(format!("{}", e)),
                }
            }
        };

        // ping доступен на любом хосте WB API
        let url = format!("{}/ping", config.wildberries.statistics_api_url);

        let response = match http
            .get(&url)
            .header("Authorization", &client.api_key)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                let error_msg = if e.is_timeout() {
                    "Превышено время ожидания ответа от Wildberries API (>10 сек)".to_string()
                } else if e.is_connect() {
                    format!("Не удалось установить соединение с Wildberries API. Ошибка: {}", e)
                } else {
                    format!("Ошибка запроса: {}", e)
                };

                return TestConnectionResult {
                    success: false,
                    message: error_msg,
                    details: Some(format!("URL: {}", url)),
                };
            }
        };

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return TestConnectionResult {
                success: false,
                message: format!("Wildberries API вернул ошибку (HTTP {})", status.as_u16()),
                details: Some(error_text),
            };
        }

        TestConnectionResult {
            success: true,
            message: "Подключение к Wildberries успешно установлено".into(),
            details: Some("API-ключ валиден".into()),
        }
    }
}
