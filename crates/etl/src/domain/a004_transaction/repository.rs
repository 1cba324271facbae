use anyhow::Result;
use chrono::{NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};

use contracts::domain::a004_transaction::aggregate::TransactionFact;

use crate::shared::data::db::get_connection;

/// Модель финансовой операции
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a004_transaction_fact")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub operation_id: String,

    pub client_ref: String,
    pub marketplace: String,
    pub operation_type: String,
    pub amount: f64,
    pub operation_date: String,

    pub loaded_at_utc: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

fn model_to_fact(m: Model) -> Result<TransactionFact> {
    let operation_date: NaiveDate = m.operation_date.parse().map_err(|e| {
        anyhow::anyhow!(
            "Bad operation_date '{}' in operation {}: {}",
            m.operation_date,
            m.operation_id,
            e
        )
    })?;

    Ok(TransactionFact {
        operation_id: m.operation_id,
        client_ref: m.client_ref,
        marketplace: m.marketplace,
        operation_type: m.operation_type,
        amount: m.amount,
        operation_date,
    })
}

/// Upsert операции по operation_id
pub async fn upsert_entry(fact: &TransactionFact) -> Result<()> {
    let existing = Entity::find_by_id(&fact.operation_id).one(conn()).await?;

    let active = ActiveModel {
        operation_id: Set(fact.operation_id.clone()),
        client_ref: Set(fact.client_ref.clone()),
        marketplace: Set(fact.marketplace.clone()),
        operation_type: Set(fact.operation_type.clone()),
        amount: Set(fact.amount),
        operation_date: Set(fact.operation_date.format("%Y-%m-%d").to_string()),
        loaded_at_utc: Set(Utc::now().to_rfc3339()),
    };

    if existing.is_some() {
        active.update(conn()).await?;
    } else {
        active.insert(conn()).await?;
    }

    Ok(())
}

/// Операции клиента за дату
pub async fn list_by_client_date(
    client_ref: &str,
    date: NaiveDate,
) -> Result<Vec<TransactionFact>> {
    let date_str = date.format("%Y-%m-%d").to_string();
    let items = Entity::find()
        .filter(Column::ClientRef.eq(client_ref))
        .filter(Column::OperationDate.eq(date_str))
        .all(conn())
        .await?;
    items.into_iter().map(model_to_fact).collect()
}
