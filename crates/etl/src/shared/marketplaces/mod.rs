pub mod ozon;
pub mod wildberries;

use async_trait::async_trait;
use contracts::domain::a001_client::aggregate::Client;
use contracts::enums::marketplace_type::MarketplaceType;

use crate::shared::config::Config;

/// Результат тестирования подключения к маркетплейсу
#[derive(Debug, Clone)]
pub struct TestConnectionResult {
    pub success: bool,
    pub message: String,
    pub details: Option<String>,
}

/// Трейт для клиента маркетплейса
#[async_trait]
pub trait MarketplaceClient {
    /// Тестирование подключения к маркетплейсу
    async fn test_connection(config: &Config, client: &Client) -> TestConnectionResult;
}

/// Основная функция для тестирования подключения к маркетплейсу
pub async fn test_marketplace_connection(
    config: &Config,
    client: &Client,
) -> TestConnectionResult {
    match client.marketplace {
        MarketplaceType::Ozon => ozon::OzonClient::test_connection(config, client).await,
        MarketplaceType::Wildberries => {
            wildberries::WildberriesClient::test_connection(config, client).await
        }
    }
}
