use serde::{Deserialize, Serialize};

/// Типы маркетплейсов
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketplaceType {
    Ozon,
    Wildberries,
}

impl MarketplaceType {
    /// Получить код маркетплейса
    pub fn code(&self) -> &'static str {
        match self {
            MarketplaceType::Ozon => "mp-ozon",
            MarketplaceType::Wildberries => "mp-wb",
        }
    }

    /// Получить человекочитаемое название
    pub fn display_name(&self) -> &'static str {
        match self {
            MarketplaceType::Ozon => "Ozon",
            MarketplaceType::Wildberries => "Wildberries",
        }
    }

    /// Получить все типы маркетплейсов
    pub fn all() -> Vec<MarketplaceType> {
        vec![MarketplaceType::Ozon, MarketplaceType::Wildberries]
    }

    /// Парсинг из строки
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "mp-ozon" => Some(MarketplaceType::Ozon),
            "mp-wb" => Some(MarketplaceType::Wildberries),
            _ => None,
        }
    }
}

impl ToString for MarketplaceType {
    fn to_string(&self) -> String {
        self.code().to_string()
    }
}
