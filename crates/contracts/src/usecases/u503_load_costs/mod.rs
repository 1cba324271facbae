use serde::{Deserialize, Serialize};

/// Итоги загрузки файла себестоимости
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CostUploadResult {
    /// Всего строк в файле (без заголовка)
    pub total_rows: usize,
    /// Обновлено товаров
    pub updated: usize,
    /// Артикулы, не найденные в справочнике (уникальные, в порядке файла)
    pub not_matched: Vec<String>,
    /// Строки, отброшенные при разборе: (номер строки, причина)
    pub skipped_rows: Vec<(usize, String)>,
}
