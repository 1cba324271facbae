use anyhow::Result;
use contracts::domain::a001_client::aggregate::Client;
use contracts::enums::marketplace_type::MarketplaceType;

use super::repository;

/// Создать подключение клиента
pub async fn create(
    code: String,
    description: String,
    marketplace: MarketplaceType,
    api_key: String,
    client_id: Option<String>,
) -> Result<Client> {
    if repository::get_by_code(&code).await?.is_some() {
        anyhow::bail!("Подключение с кодом '{}' уже существует", code);
    }

    let client = Client::new_for_insert(code, description, marketplace, api_key, client_id);
    client.validate().map_err(|e| anyhow::anyhow!(e))?;

    repository::upsert(&client).await?;
    tracing::info!(
        "Created client connection {} ({})",
        client.code,
        client.marketplace.display_name()
    );
    Ok(client)
}

/// Получить подключение по коду; ошибка если не найдено
pub async fn require_by_code(code: &str) -> Result<Client> {
    repository::get_by_code(code)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Подключение с кодом '{}' не найдено", code))
}

/// Список всех подключений
pub async fn list_all() -> Result<Vec<Client>> {
    repository::list_all().await
}

/// Список активных подключений
pub async fn list_active() -> Result<Vec<Client>> {
    repository::list_active().await
}
