use serde::{Deserialize, Serialize};

/// Итоги одного запуска импорта
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportStats {
    pub products_loaded: usize,
    pub orders_loaded: usize,
    pub transactions_loaded: usize,
    /// Пропущенные записи (без обязательных полей и т.п.)
    pub skipped: usize,
}

impl ImportStats {
    pub fn merge(&mut self, other: &ImportStats) {
        self.products_loaded += other.products_loaded;
        self.orders_loaded += other.orders_loaded;
        self.transactions_loaded += other.transactions_loaded;
        self.skipped += other.skipped;
    }
}
