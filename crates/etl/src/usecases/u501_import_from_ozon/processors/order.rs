use anyhow::Result;
use chrono::{DateTime, Utc};
use contracts::domain::a001_client::aggregate::Client;
use contracts::domain::a003_order::aggregate::OrderFact;
use contracts::enums::marketplace_type::MarketplaceType;
use contracts::enums::order_doc_type::OrderDocType;

use super::super::ozon_api_client::OzonPosting;
use crate::domain::a003_order;

/// Конвертировать отправление FBS в строки заказов и записать их.
///
/// Возвращает число записанных строк. Отменённые отправления пропускаем:
/// деньги по ним не двигались.
pub async fn process_posting(client: &Client, posting: &OzonPosting) -> Result<usize> {
    if posting.status == "cancelled" {
        tracing::debug!("Posting {} is cancelled, skipping", posting.posting_number);
        return Ok(0);
    }

    let order_date = match &posting.in_process_at {
        Some(raw) => raw
            .parse::<DateTime<Utc>>()
            .map_err(|e| {
                anyhow::anyhow!(
                    "Posting {}: bad in_process_at '{}': {}",
                    posting.posting_number,
                    raw,
                    e
                )
            })?
            .date_naive(),
        None => {
            tracing::warn!(
                "Posting {} has no in_process_at, skipping",
                posting.posting_number
            );
            return Ok(0);
        }
    };

    let mut written = 0;
    for product in &posting.products {
        // Цена приходит строкой ("1390.000000")
        let price: f64 = product.price.trim().parse().map_err(|e| {
            anyhow::anyhow!(
                "Posting {}: bad price '{}' for {}: {}",
                posting.posting_number,
                product.price,
                product.offer_id,
                e
            )
        })?;

        let fact = OrderFact {
            order_no: posting.posting_number.clone(),
            article: product.offer_id.clone(),
            client_ref: client.to_string_id(),
            marketplace: MarketplaceType::Ozon.code().to_string(),
            barcode: None,
            title: Some(product.name.clone()),
            qty: product.quantity as f64,
            price,
            doc_type: OrderDocType::Sale,
            order_date,
        };
        fact.validate().map_err(|e| anyhow::anyhow!(e))?;

        a003_order::repository::upsert_entry(&fact).await?;
        written += 1;
    }

    Ok(written)
}
