use anyhow::Result;
use contracts::domain::a001_client::aggregate::Client;

use super::super::ozon_api_client::OzonProductInfo;
use crate::domain::a002_product::service::{find_or_create_for_import, FindOrCreateParams};

/// Занести карточку товара OZON в справочник a002_product
pub async fn process_product(_client: &Client, info: &OzonProductInfo) -> Result<()> {
    if info.offer_id.trim().is_empty() {
        anyhow::bail!("Product {} has empty offer_id", info.id);
    }

    find_or_create_for_import(FindOrCreateParams {
        article: info.offer_id.clone(),
        barcode: info.barcodes.first().cloned(),
        title: info.name.clone(),
    })
    .await?;

    Ok(())
}
