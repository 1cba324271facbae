use serde::{Deserialize, Serialize};

/// Категории расходов, в которые классифицируются операции маркетплейсов.
/// Маркетплейсы не дают закрытой таксономии типов операций, поэтому
/// категория определяется эвристикой по ключевым словам.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpenseBucket {
    /// Комиссия маркетплейса, эквайринг
    Commission,
    /// Логистика, доставка, обработка отправлений
    Logistics,
    /// Возвраты покупателям
    Returns,
    /// Всё остальное (неклассифицированные операции)
    Other,
}

impl ExpenseBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseBucket::Commission => "commission",
            ExpenseBucket::Logistics => "logistics",
            ExpenseBucket::Returns => "returns",
            ExpenseBucket::Other => "other",
        }
    }

    /// Человекочитаемое название категории
    pub fn display_name(&self) -> &'static str {
        match self {
            ExpenseBucket::Commission => "Комиссия",
            ExpenseBucket::Logistics => "Логистика",
            ExpenseBucket::Returns => "Возвраты",
            ExpenseBucket::Other => "Прочее",
        }
    }
}
