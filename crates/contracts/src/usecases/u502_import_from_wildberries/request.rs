use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Запрос на импорт данных из Wildberries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRequest {
    /// Код подключения клиента (a001_client)
    pub client_code: String,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
}
