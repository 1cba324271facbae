use anyhow::Result;
use contracts::domain::a001_client::aggregate::Client;
use contracts::usecases::common::ImportStats;
use contracts::usecases::u501_import_from_ozon::request::ImportRequest;

use super::ozon_api_client::OzonApiClient;
use super::processors::{order, product, transaction};
use crate::shared::config::OzonConfig;

const PRODUCT_PAGE_SIZE: i32 = 1000;
const POSTING_PAGE_SIZE: i32 = 100;
const TRANSACTION_PAGE_SIZE: i64 = 1000;

/// Executor для UseCase импорта из OZON.
///
/// Импорт последовательный: товары → заказы → финансовые операции.
/// Без ретраев: упавший запрос валит весь запуск, оператор перезапускает
/// вручную.
pub struct ImportExecutor {
    api_client: OzonApiClient,
}

impl ImportExecutor {
    pub fn new(config: &OzonConfig) -> Self {
        Self {
            api_client: OzonApiClient::new(config),
        }
    }

    /// Выполнить импорт
    pub async fn run(&self, request: &ImportRequest, client: &Client) -> Result<ImportStats> {
        tracing::info!(
            "Starting OZON import for {} ({} .. {})",
            client.code,
            request.date_from,
            request.date_to
        );

        let mut stats = ImportStats::default();
        self.import_products(client, &mut stats).await?;
        self.import_postings(request, client, &mut stats).await?;
        self.import_transactions(request, client, &mut stats).await?;

        tracing::info!(
            "OZON import finished for {}: {} products, {} order lines, {} transactions, {} skipped",
            client.code,
            stats.products_loaded,
            stats.orders_loaded,
            stats.transactions_loaded,
            stats.skipped
        );
        Ok(stats)
    }

    /// Импорт справочника товаров (пагинация по last_id)
    async fn import_products(&self, client: &Client, stats: &mut ImportStats) -> Result<()> {
        let mut last_id: Option<String> = None;

        loop {
            let page = self
                .api_client
                .fetch_product_list(client, PRODUCT_PAGE_SIZE, last_id.clone())
                .await?;

            if page.result.items.is_empty() {
                break;
            }

            let product_ids: Vec<i64> =
                page.result.items.iter().map(|i| i.product_id).collect();
            let info = self
                .api_client
                .fetch_product_info_list(client, &product_ids)
                .await?;

            for item in &info.items {
                match product::process_product(client, item).await {
                    Ok(()) => stats.products_loaded += 1,
                    Err(e) => {
                        tracing::warn!("Skipping product {}: {}", item.id, e);
                        stats.skipped += 1;
                    }
                }
            }

            if page.result.last_id.is_empty()
                || page.result.items.len() < PRODUCT_PAGE_SIZE as usize
            {
                break;
            }
            last_id = Some(page.result.last_id);
        }

        Ok(())
    }

    /// Импорт отправлений FBS (пагинация по offset)
    async fn import_postings(
        &self,
        request: &ImportRequest,
        client: &Client,
        stats: &mut ImportStats,
    ) -> Result<()> {
        let mut offset = 0;

        loop {
            let page = self
                .api_client
                .fetch_fbs_postings(
                    client,
                    request.date_from,
                    request.date_to,
                    POSTING_PAGE_SIZE,
                    offset,
                )
                .await?;

            for posting in &page.result.postings {
                match order::process_posting(client, posting).await {
                    Ok(written) => stats.orders_loaded += written,
                    Err(e) => {
                        tracing::warn!("Skipping posting {}: {}", posting.posting_number, e);
                        stats.skipped += 1;
                    }
                }
            }

            if !page.result.has_next {
                break;
            }
            offset += POSTING_PAGE_SIZE;
        }

        Ok(())
    }

    /// Импорт финансовых операций (пагинация по страницам)
    async fn import_transactions(
        &self,
        request: &ImportRequest,
        client: &Client,
        stats: &mut ImportStats,
    ) -> Result<()> {
        let mut page_no: i64 = 1;

        loop {
            let page = self
                .api_client
                .fetch_transactions(
                    client,
                    request.date_from,
                    request.date_to,
                    page_no,
                    TRANSACTION_PAGE_SIZE,
                )
                .await?;

            for operation in &page.result.operations {
                match transaction::process_operation(client, operation).await {
                    Ok(()) => stats.transactions_loaded += 1,
                    Err(e) => {
                        tracing::warn!("Skipping operation {}: {}", operation.operation_id, e);
                        stats.skipped += 1;
                    }
                }
            }

            if page_no >= page.result.page_count {
                break;
            }
            page_no += 1;
        }

        Ok(())
    }
}
