use anyhow::Result;
use chrono::NaiveDate;
use contracts::domain::a001_client::aggregate::Client;
use contracts::usecases::common::ImportStats;
use contracts::usecases::u502_import_from_wildberries::request::ImportRequest;

use super::processors::{finance_report, product, sales};
use super::wildberries_api_client::{WildberriesApiClient, WildberriesCursor};
use crate::shared::config::WildberriesConfig;

const CARD_PAGE_SIZE: i32 = 100;
const REPORT_PAGE_SIZE: i32 = 100000;

/// Executor для UseCase импорта из Wildberries.
///
/// Импорт последовательный: товары → продажи → финансовый отчёт.
pub struct ImportExecutor {
    api_client: WildberriesApiClient,
}

impl ImportExecutor {
    pub fn new(config: &WildberriesConfig) -> Self {
        Self {
            api_client: WildberriesApiClient::new(config),
        }
    }

    /// Выполнить импорт
    pub async fn run(&self, request: &ImportRequest, client: &Client) -> Result<ImportStats> {
        tracing::info!(
            "Starting Wildberries import for {} ({} .. {})",
            client.code,
            request.date_from,
            request.date_to
        );

        let mut stats = ImportStats::default();
        self.import_products(client, &mut stats).await?;
        self.import_sales(request, client, &mut stats).await?;
        self.import_finance_report(request, client, &mut stats)
            .await?;

        tracing::info!(
            "Wildberries import finished for {}: {} products, {} order lines, {} transactions, {} skipped",
            client.code,
            stats.products_loaded,
            stats.orders_loaded,
            stats.transactions_loaded,
            stats.skipped
        );
        Ok(stats)
    }

    /// Импорт карточек товаров (курсорная пагинация)
    async fn import_products(&self, client: &Client, stats: &mut ImportStats) -> Result<()> {
        let mut cursor: Option<WildberriesCursor> = None;

        loop {
            let page = self
                .api_client
                .fetch_product_list(client, CARD_PAGE_SIZE, cursor.clone())
                .await?;

            for card in &page.cards {
                match product::process_card(client, card).await {
                    Ok(()) => stats.products_loaded += 1,
                    Err(e) => {
                        tracing::warn!("Skipping card {}: {}", card.nm_id, e);
                        stats.skipped += 1;
                    }
                }
            }

            if page.cards.len() < CARD_PAGE_SIZE as usize {
                break;
            }
            cursor = Some(page.cursor);
        }

        Ok(())
    }

    /// Импорт продаж и возвратов.
    ///
    /// Statistics API отдаёт все события начиная с dateFrom, поэтому
    /// строки после date_to отфильтровываем сами.
    async fn import_sales(
        &self,
        request: &ImportRequest,
        client: &Client,
        stats: &mut ImportStats,
    ) -> Result<()> {
        let rows = self.api_client.fetch_sales(client, request.date_from).await?;

        for row in &rows {
            if !row_in_period(row.sale_dt.as_deref(), request.date_to) {
                continue;
            }
            match sales::process_sale_row(client, row).await {
                Ok(true) => stats.orders_loaded += 1,
                Ok(false) => stats.skipped += 1,
                Err(e) => {
                    tracing::warn!("Skipping WB sale row {:?}: {}", row.srid, e);
                    stats.skipped += 1;
                }
            }
        }

        Ok(())
    }

    /// Импорт финансового отчёта (пагинация по rrdid)
    async fn import_finance_report(
        &self,
        request: &ImportRequest,
        client: &Client,
        stats: &mut ImportStats,
    ) -> Result<()> {
        let mut rrdid: i64 = 0;

        loop {
            let rows = self
                .api_client
                .fetch_finance_report(
                    client,
                    request.date_from,
                    request.date_to,
                    rrdid,
                    REPORT_PAGE_SIZE,
                )
                .await?;

            if rows.is_empty() {
                break;
            }

            for row in &rows {
                match finance_report::process_report_row(client, row).await {
                    Ok(written) => stats.transactions_loaded += written,
                    Err(e) => {
                        tracing::warn!("Skipping WB report row {}: {}", row.rrd_id, e);
                        stats.skipped += 1;
                    }
                }
            }

            rrdid = rows[rows.len() - 1].rrd_id;

            if rows.len() < REPORT_PAGE_SIZE as usize {
                break;
            }
        }

        Ok(())
    }
}

/// Строка попадает в период, если её дата не позже date_to
fn row_in_period(raw_date: Option<&str>, date_to: NaiveDate) -> bool {
    match raw_date {
        Some(raw) if raw.len() >= 10 => match raw[..10].parse::<NaiveDate>() {
            Ok(d) => d <= date_to,
            Err(_) => false,
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_in_period() {
        let date_to = "2024-01-15".parse().unwrap();
        assert!(row_in_period(Some("2024-01-15T10:30:00"), date_to));
        assert!(row_in_period(Some("2024-01-01"), date_to));
        assert!(!row_in_period(Some("2024-01-16T00:00:00"), date_to));
        assert!(!row_in_period(Some("garbage"), date_to));
        assert!(!row_in_period(None, date_to));
    }
}
