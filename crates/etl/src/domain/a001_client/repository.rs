use anyhow::Result;
use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};

use contracts::domain::a001_client::aggregate::{Client, ClientId};
use contracts::domain::common::{AggregateId, EntityMetadata};
use contracts::enums::marketplace_type::MarketplaceType;

use crate::shared::data::db::get_connection;

/// Модель подключения клиента
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a001_client")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub description: String,
    pub marketplace: String,
    pub api_key: String,
    #[sea_orm(nullable)]
    pub client_id: Option<String>,
    pub is_active: i32,
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

fn model_to_aggregate(m: Model) -> Result<Client> {
    let marketplace = MarketplaceType::from_code(&m.marketplace)
        .ok_or_else(|| anyhow::anyhow!("Unknown marketplace code: {}", m.marketplace))?;

    let mut metadata = EntityMetadata::new();
    if let Some(created) = m.created_at.as_deref().and_then(|s| s.parse().ok()) {
        metadata.created_at = created;
    }
    if let Some(updated) = m.updated_at.as_deref().and_then(|s| s.parse().ok()) {
        metadata.updated_at = updated;
    }
    metadata.version = m.version;

    Ok(Client {
        id: ClientId::from_string(&m.id).map_err(|e| anyhow::anyhow!(e))?,
        code: m.code,
        description: m.description,
        marketplace,
        api_key: m.api_key,
        client_id: m.client_id,
        is_active: m.is_active != 0,
        metadata,
    })
}

fn aggregate_to_active(client: &Client) -> ActiveModel {
    ActiveModel {
        id: Set(client.to_string_id()),
        code: Set(client.code.clone()),
        description: Set(client.description.clone()),
        marketplace: Set(client.marketplace.code().to_string()),
        api_key: Set(client.api_key.clone()),
        client_id: Set(client.client_id.clone()),
        is_active: Set(if client.is_active { 1 } else { 0 }),
        created_at: Set(Some(client.metadata.created_at.to_rfc3339())),
        updated_at: Set(Some(Utc::now().to_rfc3339())),
        version: Set(client.metadata.version),
    }
}

/// Upsert подключения по id
pub async fn upsert(client: &Client) -> Result<()> {
    let existing = Entity::find_by_id(client.to_string_id()).one(conn()).await?;

    let active = aggregate_to_active(client);
    if existing.is_some() {
        active.update(conn()).await?;
    } else {
        active.insert(conn()).await?;
    }

    Ok(())
}

/// Получить подключение по коду
pub async fn get_by_code(code: &str) -> Result<Option<Client>> {
    let item = Entity::find()
        .filter(Column::Code.eq(code))
        .one(conn())
        .await?;
    item.map(model_to_aggregate).transpose()
}

/// Список всех подключений
pub async fn list_all() -> Result<Vec<Client>> {
    let items = Entity::find()
        .order_by_asc(Column::Code)
        .all(conn())
        .await?;
    items.into_iter().map(model_to_aggregate).collect()
}

/// Список активных подключений
pub async fn list_active() -> Result<Vec<Client>> {
    let items = Entity::find()
        .filter(Column::IsActive.eq(1))
        .order_by_asc(Column::Code)
        .all(conn())
        .await?;
    items.into_iter().map(model_to_aggregate).collect()
}
