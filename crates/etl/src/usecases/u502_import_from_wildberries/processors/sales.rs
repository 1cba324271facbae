use anyhow::Result;
use chrono::NaiveDate;
use contracts::domain::a001_client::aggregate::Client;
use contracts::domain::a003_order::aggregate::OrderFact;
use contracts::enums::marketplace_type::MarketplaceType;
use contracts::enums::order_doc_type::OrderDocType;

use super::super::wildberries_api_client::WbSaleRow;
use crate::domain::a003_order;

/// Занести строку продажи/возврата WB в a003_order_fact.
///
/// Возвращает false, если строка пропущена (нет обязательных полей или
/// событие не является продажей/возвратом).
pub async fn process_sale_row(client: &Client, row: &WbSaleRow) -> Result<bool> {
    let srid = match &row.srid {
        Some(s) if !s.trim().is_empty() => s.clone(),
        _ => {
            tracing::warn!("WB sale row without srid, skipping");
            return Ok(false);
        }
    };

    let article = match &row.supplier_article {
        Some(a) if !a.trim().is_empty() => a.clone(),
        _ => {
            tracing::warn!("WB sale row {} without supplierArticle, skipping", srid);
            return Ok(false);
        }
    };

    // saleID: S...-продажа, R...-возврат; прочие события (сторно и т.п.)
    // в заказы не попадают
    let doc_type = match row.sale_id.as_deref() {
        Some(id) if id.starts_with('S') => OrderDocType::Sale,
        Some(id) if id.starts_with('R') => OrderDocType::Return,
        other => {
            tracing::debug!("WB sale row {} has saleID {:?}, skipping", srid, other);
            return Ok(false);
        }
    };

    let order_date: NaiveDate = match row.sale_dt.as_deref() {
        Some(raw) if raw.len() >= 10 => raw[..10]
            .parse()
            .map_err(|e| anyhow::anyhow!("WB sale row {}: bad date '{}': {}", srid, raw, e))?,
        _ => anyhow::bail!("WB sale row {} has no date", srid),
    };

    let qty = row.quantity.unwrap_or(1).abs() as f64;
    let price = row.price_with_disc.unwrap_or(0.0).abs();

    let fact = OrderFact {
        order_no: srid,
        article,
        client_ref: client.to_string_id(),
        marketplace: MarketplaceType::Wildberries.code().to_string(),
        barcode: row.barcode.clone(),
        title: row.subject.clone(),
        qty,
        price,
        doc_type,
        order_date,
    };
    fact.validate().map_err(|e| anyhow::anyhow!(e))?;

    a003_order::repository::upsert_entry(&fact).await?;
    Ok(true)
}
