use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Дневная метрика маржинальности по клиенту.
///
/// Производная запись (materialized view): полностью пересчитывается
/// при каждом запуске агрегации за дату, а не дописывается.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyMetrics {
    pub client_ref: String,
    pub date: NaiveDate,
    /// Число заказов (уникальных order_no среди продаж)
    pub orders_count: i64,
    /// Выручка: Σ(qty × price) по продажам
    pub revenue_sum: f64,
    /// Возвраты: строки-возвраты плюс операции категории "возвраты"
    pub returns_sum: f64,
    /// Себестоимость проданного: Σ(qty × себестоимость)
    pub cogs_sum: f64,
    pub commission_sum: f64,
    pub logistics_sum: f64,
    /// Прочие расходы (только списания; начисления не учитываются)
    pub other_expenses_sum: f64,
    /// revenue − returns − cogs − commission − logistics − other
    pub profit_sum: f64,
    /// profit / revenue × 100; None при нулевой выручке
    pub margin_percent: Option<f64>,
    /// Число строк продаж без найденной себестоимости
    pub uncosted_lines: i64,
}
