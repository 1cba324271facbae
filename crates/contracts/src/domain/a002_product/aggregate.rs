use crate::domain::common::{AggregateId, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// ID типа для товара
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub Uuid);

impl ProductId {
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

impl AggregateId for ProductId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }
    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(ProductId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

/// Товар с себестоимостью (агрегат).
///
/// Артикул — основной идентификатор SKU, баркод — запасной путь
/// сопоставления для позиций без актуального артикула.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    /// Артикул (уникален)
    pub article: String,
    pub barcode: Option<String>,
    pub description: String,
    /// Себестоимость за единицу; None — пока оператор не загрузил файл цен
    pub cost_price: Option<f64>,
    pub metadata: EntityMetadata,
}

impl Product {
    pub fn new_for_insert(
        article: String,
        barcode: Option<String>,
        description: String,
        cost_price: Option<f64>,
    ) -> Self {
        Self {
            id: ProductId::new_v4(),
            article,
            barcode,
            description,
            cost_price,
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
        if self.article.trim().is_empty() {
            return Err("Артикул не может быть пустым".into());
        }
        if let Some(cost) = self.cost_price {
            if cost < 0.0 {
                return Err("Себестоимость не может быть отрицательной".into());
            }
        }
        Ok(())
    }
}
