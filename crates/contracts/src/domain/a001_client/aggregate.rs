use crate::domain::common::{AggregateId, EntityMetadata};
use crate::enums::marketplace_type::MarketplaceType;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// ID типа для подключения клиента
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(pub Uuid);

impl ClientId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AggregateId for ClientId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }
    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(ClientId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

/// Подключение клиента к маркетплейсу (агрегат).
///
/// Ключи API хранятся здесь, а не в переменных окружения: исполнители
/// импорта и расчёта получают подключение явно, что позволяет тестировать
/// их на фикстурах.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    /// Короткий код клиента (уникален, используется в CLI)
    pub code: String,
    pub description: String,
    /// Тип маркетплейса
    pub marketplace: MarketplaceType,
    /// API-ключ маркетплейса
    pub api_key: String,
    /// Client-Id для Ozon Seller API (для Wildberries не нужен)
    pub client_id: Option<String>,
    pub is_active: bool,
    pub metadata: EntityMetadata,
}

impl Client {
    pub fn new_for_insert(
        code: String,
        description: String,
        marketplace: MarketplaceType,
        api_key: String,
        client_id: Option<String>,
    ) -> Self {
        Self {
            id: ClientId::new_v4(),
            code,
            description,
            marketplace,
            api_key,
            client_id,
            is_active: true,
            metadata: EntityMetadata::new(),
        }
    }

    pub fn to_string_id(&self) -> String {
        self.id.as_string()
    }

    pub fn touch_updated(&mut self) {
        self.metadata.touch();
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.code.trim().is_empty() {
            return Err("Код не может быть пустым".into());
        }
        if self.description.trim().is_empty() {
            return Err("Описание не может быть пустым".into());
        }
        if self.api_key.trim().is_empty() {
            return Err("API-ключ обязателен".into());
        }
        if self.marketplace == MarketplaceType::Ozon
            && self.client_id.as_deref().map_or(true, |s| s.trim().is_empty())
        {
            return Err("Для Ozon требуется Client-Id".into());
        }
        Ok(())
    }
}
