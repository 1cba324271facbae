use anyhow::Result;
use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};

use contracts::domain::a002_product::aggregate::{Product, ProductId};
use contracts::domain::common::{AggregateId, EntityMetadata};

use crate::shared::data::db::get_connection;

/// Модель товара
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a002_product")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub article: String,
    #[sea_orm(nullable)]
    pub barcode: Option<String>,
    pub description: String,
    #[sea_orm(nullable)]
    pub cost_price: Option<f64>,
    #[sea_orm(nullable)]
    pub created_at: Option<String>,
    #[sea_orm(nullable)]
    pub updated_at: Option<String>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

fn model_to_aggregate(m: Model) -> Result<Product> {
    let mut metadata = EntityMetadata::new();
    if let Some(created) = m.created_at.as_deref().and_then(|s| s.parse().ok()) {
        metadata.created_at = created;
    }
    if let Some(updated) = m.updated_at.as_deref().and_then(|s| s.parse().ok()) {
        metadata.updated_at = updated;
    }
    metadata.version = m.version;

    Ok(Product {
        id: ProductId::from_string(&m.id).map_err(|e| anyhow::anyhow!(e))?,
        article: m.article,
        barcode: m.barcode,
        description: m.description,
        cost_price: m.cost_price,
        metadata,
    })
}

fn aggregate_to_active(product: &Product) -> ActiveModel {
    ActiveModel {
        id: Set(product.to_string_id()),
        article: Set(product.article.clone()),
        barcode: Set(product.barcode.clone()),
        description: Set(product.description.clone()),
        cost_price: Set(product.cost_price),
        created_at: Set(Some(product.metadata.created_at.to_rfc3339())),
        updated_at: Set(Some(Utc::now().to_rfc3339())),
        version: Set(product.metadata.version),
    }
}

/// Upsert товара по артикулу (артикул уникален)
pub async fn upsert_by_article(product: &Product) -> Result<()> {
    let existing = Entity::find()
        .filter(Column::Article.eq(&product.article))
        .one(conn())
        .await?;

    if let Some(existing_model) = existing {
        let mut active: ActiveModel = existing_model.into();
        // id существующей записи сохраняем
        active.barcode = Set(product.barcode.clone());
        active.description = Set(product.description.clone());
        active.cost_price = Set(product.cost_price);
        active.updated_at = Set(Some(Utc::now().to_rfc3339()));
        active.update(conn()).await?;
    } else {
        let active = aggregate_to_active(product);
        active.insert(conn()).await?;
    }

    Ok(())
}

/// Найти товар по артикулу
pub async fn find_by_article(article: &str) -> Result<Option<Product>> {
    let item = Entity::find()
        .filter(Column::Article.eq(article))
        .one(conn())
        .await?;
    item.map(model_to_aggregate).transpose()
}

/// Найти товар по баркоду
pub async fn find_by_barcode(barcode: &str) -> Result<Option<Product>> {
    let item = Entity::find()
        .filter(Column::Barcode.eq(barcode))
        .one(conn())
        .await?;
    item.map(model_to_aggregate).transpose()
}

/// Установить себестоимость товара
pub async fn set_cost(product: &Product, cost: f64) -> Result<()> {
    let existing = Entity::find_by_id(product.to_string_id())
        .one(conn())
        .await?
        .ok_or_else(|| anyhow::anyhow!("Product not found: {}", product.article))?;

    let mut active: ActiveModel = existing.into();
    active.cost_price = Set(Some(cost));
    active.updated_at = Set(Some(Utc::now().to_rfc3339()));
    active.update(conn()).await?;
    Ok(())
}

/// Все товары (для снимка себестоимости)
pub async fn list_all() -> Result<Vec<Product>> {
    let items = Entity::find()
        .order_by_asc(Column::Article)
        .all(conn())
        .await?;
    items.into_iter().map(model_to_aggregate).collect()
}
