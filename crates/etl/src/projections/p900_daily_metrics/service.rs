use anyhow::Result;
use chrono::{Duration, NaiveDate};
use sea_orm::TransactionTrait;
use std::collections::HashSet;

use contracts::domain::a003_order::aggregate::OrderFact;
use contracts::domain::a004_transaction::aggregate::TransactionFact;
use contracts::enums::expense_bucket::ExpenseBucket;
use contracts::enums::order_doc_type::OrderDocType;
use contracts::projections::p900_daily_metrics::dto::DailyMetrics;

use super::classifier::TransactionClassifier;
use super::repository;
use crate::domain::a002_product::service::{CostSnapshot, CostSource};
use crate::domain::a003_order;
use crate::domain::a004_transaction;
use crate::shared::data::db::get_connection;

/// Итоги запуска агрегации
#[derive(Debug, Default)]
pub struct AggregateStats {
    pub dates_processed: usize,
    /// Даты, откатившиеся из-за ошибки: (дата, текст ошибки)
    pub dates_failed: Vec<(NaiveDate, String)>,
}

/// Посчитать дневную метрику по фактам одной даты.
///
/// Чистая функция: все данные передаются снаружи, что позволяет
/// тестировать арифметику без базы.
///
/// Формула прибыли: revenue − returns − cogs − commission − logistics −
/// other. Возвраты вычитаются до себестоимости; себестоимость считается
/// только по проданным строкам.
pub fn build_daily_metrics(
    client_ref: &str,
    date: NaiveDate,
    order_lines: &[OrderFact],
    transactions: &[TransactionFact],
    costs: &CostSnapshot,
    classifier: &TransactionClassifier,
) -> DailyMetrics {
    let mut revenue = 0.0;
    let mut returns = 0.0;
    let mut cogs = 0.0;
    let mut uncosted_lines: i64 = 0;
    let mut sale_orders: HashSet<&str> = HashSet::new();

    for line in order_lines {
        match line.doc_type {
            OrderDocType::Sale => {
                revenue += line.amount();
                sale_orders.insert(line.order_no.as_str());

                let resolved = costs.resolve(&line.article, line.barcode.as_deref());
                if resolved.source == CostSource::Uncosted {
                    uncosted_lines += 1;
                    tracing::warn!(
                        "No cost for article {} (order {}), counting as zero",
                        line.article,
                        line.order_no
                    );
                }
                cogs += line.qty * resolved.cost;
            }
            OrderDocType::Return => {
                returns += line.amount();
            }
        }
    }

    let mut commission = 0.0;
    let mut logistics = 0.0;
    let mut other = 0.0;

    for txn in transactions {
        match classifier.classify(&txn.operation_type) {
            ExpenseBucket::Commission => commission += txn.amount.abs(),
            ExpenseBucket::Logistics => logistics += txn.amount.abs(),
            // Возвраты из финансовых отчётов попадают в returns_sum:
            // Ozon отдаёт возвраты операциями, WB — строками заказов
            ExpenseBucket::Returns => returns += txn.amount.abs(),
            ExpenseBucket::Other => {
                // Начисления (плюсовые суммы) расходами не считаем,
                // иначе кредиты маркетплейса задвоят затраты
                if txn.amount < 0.0 {
                    other += txn.amount.abs();
                }
            }
        }
    }

    let profit = revenue - returns - cogs - commission - logistics - other;
    let margin_percent = if revenue > 0.0 {
        Some(((profit / revenue * 100.0) * 100.0).round() / 100.0)
    } else {
        None
    };

    DailyMetrics {
        client_ref: client_ref.to_string(),
        date,
        orders_count: sale_orders.len() as i64,
        revenue_sum: revenue,
        returns_sum: returns,
        cogs_sum: cogs,
        commission_sum: commission,
        logistics_sum: logistics,
        other_expenses_sum: other,
        profit_sum: profit,
        margin_percent,
        uncosted_lines,
    }
}

/// Даты, которые осталось посчитать.
///
/// Сравниваем последнюю дату метрик с последней датой заказов: пропуски
/// от несостоявшихся запусков добиваются автоматически при следующем
/// вызове. Пустая таблица метрик — начинаем с самой ранней даты заказов;
/// метрики догнали заказы — пустой список.
pub fn dates_to_aggregate(
    latest_metric: Option<NaiveDate>,
    earliest_order: Option<NaiveDate>,
    latest_order: Option<NaiveDate>,
) -> Vec<NaiveDate> {
    let (Some(earliest_order), Some(latest_order)) = (earliest_order, latest_order) else {
        return Vec::new();
    };

    let start = match latest_metric {
        Some(metric_date) if metric_date >= latest_order => return Vec::new(),
        Some(metric_date) => (metric_date + Duration::days(1)).max(earliest_order),
        None => earliest_order,
    };

    let mut dates = Vec::new();
    let mut current = start;
    while current <= latest_order {
        dates.push(current);
        current += Duration::days(1);
    }
    dates
}

/// Посчитать и записать метрику за одну дату с уже готовым снимком цен
async fn aggregate_date_with(
    client_ref: &str,
    date: NaiveDate,
    costs: &CostSnapshot,
    classifier: &TransactionClassifier,
) -> Result<DailyMetrics> {
    let order_lines = a003_order::repository::list_by_client_date(client_ref, date).await?;
    let transactions =
        a004_transaction::repository::list_by_client_date(client_ref, date).await?;

    let metrics = build_daily_metrics(client_ref, date, &order_lines, &transactions, costs, classifier);

    // Запись в транзакции: ошибка откатывает только эту дату
    let txn = get_connection().begin().await?;
    repository::upsert_entry(&txn, &metrics).await?;
    txn.commit().await?;

    tracing::info!(
        "Aggregated {} for {}: revenue {:.2}, profit {:.2}, margin {:?}",
        date,
        client_ref,
        metrics.revenue_sum,
        metrics.profit_sum,
        metrics.margin_percent
    );

    Ok(metrics)
}

/// Посчитать метрику за одну дату
pub async fn aggregate_date(client_ref: &str, date: NaiveDate) -> Result<DailyMetrics> {
    let costs = crate::domain::a002_product::service::load_cost_snapshot().await?;
    let classifier = TransactionClassifier::new();
    aggregate_date_with(client_ref, date, &costs, &classifier).await
}

/// Посчитать метрики за период.
///
/// Ошибка одной даты логируется и не останавливает остальные: плохой
/// день не должен блокировать backfill.
pub async fn aggregate_range(
    client_ref: &str,
    date_from: NaiveDate,
    date_to: NaiveDate,
) -> Result<AggregateStats> {
    if date_from > date_to {
        anyhow::bail!("date_from {} позже date_to {}", date_from, date_to);
    }

    // Снимок цен один на весь запуск
    let costs = crate::domain::a002_product::service::load_cost_snapshot().await?;
    let classifier = TransactionClassifier::new();

    let mut stats = AggregateStats::default();
    let mut current = date_from;
    while current <= date_to {
        match aggregate_date_with(client_ref, current, &costs, &classifier).await {
            Ok(_) => stats.dates_processed += 1,
            Err(e) => {
                tracing::error!("Failed to aggregate {} for {}: {}", current, client_ref, e);
                stats.dates_failed.push((current, e.to_string()));
            }
        }
        current += Duration::days(1);
    }

    Ok(stats)
}

/// Догнать метрики до последней даты заказов клиента
pub async fn aggregate_pending(client_ref: &str) -> Result<AggregateStats> {
    let latest_metric = repository::max_metric_date(client_ref).await?;
    let earliest_order = a003_order::repository::min_order_date(client_ref).await?;
    let latest_order = a003_order::repository::max_order_date(client_ref).await?;

    let dates = dates_to_aggregate(latest_metric, earliest_order, latest_order);
    if dates.is_empty() {
        tracing::info!("Metrics are up to date for {}", client_ref);
        return Ok(AggregateStats::default());
    }

    tracing::info!(
        "Backfilling {} date(s) for {}: {} .. {}",
        dates.len(),
        client_ref,
        dates[0],
        dates[dates.len() - 1]
    );
    aggregate_range(client_ref, dates[0], dates[dates.len() - 1]).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a002_product::aggregate::Product;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn sale(order_no: &str, article: &str, qty: f64, price: f64) -> OrderFact {
        OrderFact {
            order_no: order_no.to_string(),
            article: article.to_string(),
            client_ref: "client-1".to_string(),
            marketplace: "mp-ozon".to_string(),
            barcode: None,
            title: None,
            qty,
            price,
            doc_type: OrderDocType::Sale,
            order_date: date("2024-01-15"),
        }
    }

    fn ret(order_no: &str, article: &str, qty: f64, price: f64) -> OrderFact {
        OrderFact {
            doc_type: OrderDocType::Return,
            ..sale(order_no, article, qty, price)
        }
    }

    fn txn(operation_id: &str, operation_type: &str, amount: f64) -> TransactionFact {
        TransactionFact {
            operation_id: operation_id.to_string(),
            client_ref: "client-1".to_string(),
            marketplace: "mp-ozon".to_string(),
            operation_type: operation_type.to_string(),
            amount,
            operation_date: date("2024-01-15"),
        }
    }

    fn snapshot(costed: &[(&str, f64)]) -> CostSnapshot {
        let products: Vec<Product> = costed
            .iter()
            .map(|(article, cost)| {
                Product::new_for_insert(
                    article.to_string(),
                    None,
                    format!("Товар {}", article),
                    Some(*cost),
                )
            })
            .collect();
        CostSnapshot::from_products(&products)
    }

    #[test]
    fn test_end_to_end_scenario() {
        // Клиент 1, 2024-01-15: две продажи (2×100 + 1×50 = 250),
        // возврат 1×50, себестоимость 40/шт по проданным (120),
        // комиссия −20, логистика −10 → прибыль 50, маржа 20.00
        let order_lines = vec![
            sale("o-1", "A1", 2.0, 100.0),
            sale("o-2", "A2", 1.0, 50.0),
            ret("o-3", "A1", 1.0, 50.0),
        ];
        let transactions = vec![
            txn("t-1", "Комиссия за продажу", -20.0),
            txn("t-2", "Логистика", -10.0),
        ];
        let costs = snapshot(&[("A1", 40.0), ("A2", 40.0)]);
        let classifier = TransactionClassifier::new();

        let m = build_daily_metrics(
            "client-1",
            date("2024-01-15"),
            &order_lines,
            &transactions,
            &costs,
            &classifier,
        );

        assert_eq!(m.orders_count, 2);
        assert_eq!(m.revenue_sum, 250.0);
        assert_eq!(m.returns_sum, 50.0);
        assert_eq!(m.cogs_sum, 120.0);
        assert_eq!(m.commission_sum, 20.0);
        assert_eq!(m.logistics_sum, 10.0);
        assert_eq!(m.other_expenses_sum, 0.0);
        assert_eq!(m.profit_sum, 50.0);
        assert_eq!(m.margin_percent, Some(20.0));
        assert_eq!(m.uncosted_lines, 0);
    }

    #[test]
    fn test_zero_sales_gives_null_margin() {
        let order_lines = vec![ret("o-1", "A1", 1.0, 50.0)];
        let costs = snapshot(&[("A1", 40.0)]);
        let classifier = TransactionClassifier::new();

        let m = build_daily_metrics(
            "client-1",
            date("2024-01-15"),
            &order_lines,
            &[],
            &costs,
            &classifier,
        );

        assert_eq!(m.revenue_sum, 0.0);
        assert_eq!(m.orders_count, 0);
        assert_eq!(m.margin_percent, None);
    }

    #[test]
    fn test_profit_identity() {
        let order_lines = vec![
            sale("o-1", "A1", 3.0, 199.9),
            sale("o-2", "A2", 1.0, 75.5),
            ret("o-3", "A2", 1.0, 75.5),
        ];
        let transactions = vec![
            txn("t-1", "Комиссия", -31.4),
            txn("t-2", "Доставка", -18.0),
            txn("t-3", "Хранение", -7.25),
        ];
        let costs = snapshot(&[("A1", 90.0), ("A2", 30.0)]);
        let classifier = TransactionClassifier::new();

        let m = build_daily_metrics(
            "client-1",
            date("2024-01-15"),
            &order_lines,
            &transactions,
            &costs,
            &classifier,
        );

        let expected = m.revenue_sum
            - m.returns_sum
            - m.cogs_sum
            - m.commission_sum
            - m.logistics_sum
            - m.other_expenses_sum;
        assert_eq!(m.profit_sum, expected);
    }

    #[test]
    fn test_positive_other_amounts_excluded_from_expenses() {
        // Начисление (плюсовая сумма) в категории "прочее" — не расход
        let transactions = vec![
            txn("t-1", "Корректировка", 15.0),
            txn("t-2", "Хранение", -5.0),
        ];
        let costs = snapshot(&[]);
        let classifier = TransactionClassifier::new();

        let m = build_daily_metrics(
            "client-1",
            date("2024-01-15"),
            &[],
            &transactions,
            &costs,
            &classifier,
        );

        assert_eq!(m.other_expenses_sum, 5.0);
    }

    #[test]
    fn test_return_transactions_add_to_returns_sum() {
        let transactions = vec![txn("t-1", "Возврат покупателю", -120.0)];
        let costs = snapshot(&[]);
        let classifier = TransactionClassifier::new();

        let m = build_daily_metrics(
            "client-1",
            date("2024-01-15"),
            &[],
            &transactions,
            &costs,
            &classifier,
        );

        assert_eq!(m.returns_sum, 120.0);
        assert_eq!(m.other_expenses_sum, 0.0);
    }

    #[test]
    fn test_uncosted_sale_counts_zero_cogs() {
        let order_lines = vec![sale("o-1", "NO-COST", 2.0, 100.0)];
        let costs = snapshot(&[]);
        let classifier = TransactionClassifier::new();

        let m = build_daily_metrics(
            "client-1",
            date("2024-01-15"),
            &order_lines,
            &[],
            &costs,
            &classifier,
        );

        assert_eq!(m.cogs_sum, 0.0);
        assert_eq!(m.uncosted_lines, 1);
        assert_eq!(m.profit_sum, 200.0);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        // Повторный расчёт по тем же фактам даёт побайтно ту же метрику
        let order_lines = vec![sale("o-1", "A1", 2.0, 100.0), ret("o-2", "A1", 1.0, 100.0)];
        let transactions = vec![txn("t-1", "Комиссия", -12.5)];
        let costs = snapshot(&[("A1", 40.0)]);
        let classifier = TransactionClassifier::new();

        let first = build_daily_metrics(
            "client-1",
            date("2024-01-15"),
            &order_lines,
            &transactions,
            &costs,
            &classifier,
        );
        let second = build_daily_metrics(
            "client-1",
            date("2024-01-15"),
            &order_lines,
            &transactions,
            &costs,
            &classifier,
        );

        assert_eq!(first, second);
    }

    #[test]
    fn test_dates_to_aggregate_empty_metrics_starts_from_earliest_order() {
        let dates = dates_to_aggregate(
            None,
            Some(date("2024-01-10")),
            Some(date("2024-01-12")),
        );
        assert_eq!(
            dates,
            vec![date("2024-01-10"), date("2024-01-11"), date("2024-01-12")]
        );
    }

    #[test]
    fn test_dates_to_aggregate_continues_after_latest_metric() {
        let dates = dates_to_aggregate(
            Some(date("2024-01-10")),
            Some(date("2024-01-01")),
            Some(date("2024-01-12")),
        );
        assert_eq!(dates, vec![date("2024-01-11"), date("2024-01-12")]);
    }

    #[test]
    fn test_dates_to_aggregate_noop_when_caught_up() {
        let dates = dates_to_aggregate(
            Some(date("2024-01-12")),
            Some(date("2024-01-01")),
            Some(date("2024-01-12")),
        );
        assert!(dates.is_empty());
    }

    #[test]
    fn test_dates_to_aggregate_noop_without_orders() {
        let dates = dates_to_aggregate(Some(date("2024-01-12")), None, None);
        assert!(dates.is_empty());
    }
}
