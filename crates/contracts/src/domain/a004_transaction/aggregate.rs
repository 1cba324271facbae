use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Финансовая операция маркетплейса (факт).
///
/// Одна запись на одно событие из финансового отчёта: комиссия,
/// логистика, удержание, корректировка. Тип операции — свободный текст
/// из API, категория присваивается классификатором при расчёте метрик.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionFact {
    /// Уникальный ID операции (с префиксом маркетплейса, напр. "OZON-123")
    pub operation_id: String,
    /// Ссылка на подключение клиента (UUID как строка)
    pub client_ref: String,
    /// Код маркетплейса ("mp-ozon" / "mp-wb")
    pub marketplace: String,
    /// Тип операции как его назвал маркетплейс
    pub operation_type: String,
    /// Сумма со знаком: минус — списание, плюс — начисление
    pub amount: f64,
    pub operation_date: NaiveDate,
}

impl TransactionFact {
    pub fn validate(&self) -> Result<(), String> {
        if self.operation_id.trim().is_empty() {
            return Err("ID операции обязателен".into());
        }
        if self.operation_type.trim().is_empty() {
            return Err("Тип операции обязателен".into());
        }
        Ok(())
    }
}
