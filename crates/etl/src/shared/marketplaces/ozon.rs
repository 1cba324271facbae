use super::{MarketplaceClient, TestConnectionResult};
use crate::shared::config::Config;
use async_trait::async_trait;
use contracts::domain::a001_client::aggregate::Client;

/// Клиент для работы с API Ozon
pub struct OzonClient;

#[async_trait]
impl MarketplaceClient for OzonClient {
    async fn test_connection(config: &Config, client: &Client) -> TestConnectionResult {
        // Валидация входных данных
        if client.api_key.trim().is_empty() {
            return TestConnectionResult {
                success: false,
                message: "API-ключ не может быть пустым".into(),
                details: None,
            };
        }

        // Для Ozon требуется Client-Id
        let client_id = match &client.client_id {
            Some(id) if !id.trim().is_empty() => id.clone(),
            _ => {
                return TestConnectionResult {
                    success: false,
                    message: "Для Ozon требуется Client-Id".into(),
                    details: None,
                }
            }
        };

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

        // Лёгкий метод API для проверки валидности ключей
        let url = format!("{}/v1/roles", config.ozon.base_url);

        let response = match http
            .post(&url)
            .header("Client-Id", &client_id)
            .header("Api-Key", &client.api_key)
            .header("Content-Type", "application/json")
            .body("{}")
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                let error_msg = if e.is_timeout() {
                    "Превышено время ожидания ответа от Ozon API (>10 сек)".to_string()
                } else if e.is_connect() {
                    format!("Не удалось установить соединение с Ozon API. Ошибка: {}", e)
                } else {
                    format!("Ошибка запроса: {}", e)
                };

                return TestConnectionResult {
                    success: false,
                    message: error_msg,
                    details: Some(format!("URL: {}, Client-Id: {}", url, client_id)),
                };
            }
        };

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return TestConnectionResult {
                success: false,
                message: format!("Ozon API вернул ошибку (HTTP {})", status.as_u16()),
                details: Some(error_text),
            };
        }

        TestConnectionResult {
            success: true,
            message: "Подключение к Ozon успешно установлено".into(),
            details: Some("API-ключ и Client-Id валидны".into()),
        }
    }
}
