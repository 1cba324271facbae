use crate::enums::order_doc_type::OrderDocType;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Строка заказа (факт).
///
/// Одна запись на одну товарную позицию заказа. Натуральный ключ —
/// (order_no, article): повторный импорт того же периода делает upsert
/// и не создаёт дублей.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderFact {
    /// Номер заказа/отправления на маркетплейсе
    pub order_no: String,
    /// Артикул продавца
    pub article: String,
    /// Ссылка на подключение клиента (UUID как строка)
    pub client_ref: String,
    /// Код маркетплейса ("mp-ozon" / "mp-wb")
    pub marketplace: String,
    pub barcode: Option<String>,
    /// Название товара
    pub title: Option<String>,
    /// Количество (всегда положительное, знак несёт doc_type)
    pub qty: f64,
    /// Цена за единицу
    pub price: f64,
    /// Продажа или возврат
    pub doc_type: OrderDocType,
    pub order_date: NaiveDate,
}

impl OrderFact {
    /// Сумма строки
    pub fn amount(&self) -> f64 {
        self.qty * self.price
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.order_no.trim().is_empty() {
            return Err("Номер заказа обязателен".into());
        }
        if self.article.trim().is_empty() {
            return Err("Артикул обязателен".into());
        }
        if self.qty < 0.0 {
            return Err("Количество не может быть отрицательным".into());
        }
        Ok(())
    }
}
