use anyhow::Result;
use contracts::domain::a001_client::aggregate::Client;

use super::super::wildberries_api_client::WildberriesCard;
use crate::domain::a002_product::service::{find_or_create_for_import, FindOrCreateParams};

/// Занести карточку товара WB в справочник a002_product
pub async fn process_card(_client: &Client, card: &WildberriesCard) -> Result<()> {
    if card.vendor_code.trim().is_empty() {
        anyhow::bail!("Card {} has empty vendorCode", card.nm_id);
    }

    // Баркод берём из первого размера (для безразмерных товаров он один)
    let barcode = card
        .sizes
        .iter()
        .flat_map(|s| s.skus.iter())
        .next()
        .cloned();

    find_or_create_for_import(FindOrCreateParams {
        article: card.vendor_code.clone(),
        barcode,
        title: card.title.clone().unwrap_or_default(),
    })
    .await?;

    Ok(())
}
