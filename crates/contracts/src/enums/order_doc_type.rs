use serde::{Deserialize, Serialize};

/// Тип строки заказа: продажа или возврат
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderDocType {
    Sale,
    Return,
}

impl OrderDocType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderDocType::Sale => "sale",
            OrderDocType::Return => "return",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "sale" => Some(OrderDocType::Sale),
            "return" => Some(OrderDocType::Return),
            _ => None,
        }
    }
}
