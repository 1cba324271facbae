use anyhow::Result;
use chrono::{NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, FromQueryResult, QueryFilter, Set, Statement};
use serde::{Deserialize, Serialize};

use contracts::domain::a003_order::aggregate::OrderFact;
use contracts::enums::order_doc_type::OrderDocType;

use crate::shared::data::db::get_connection;

/// Модель строки заказа.
/// NK (Natural Key): (order_no, article)
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a003_order_fact")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub order_no: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub article: String,

    pub client_ref: String,
    pub marketplace: String,
    #[sea_orm(nullable)]
    pub barcode: Option<String>,
    #[sea_orm(nullable)]
    pub title: Option<String>,

    pub qty: f64,
    pub price: f64,
    pub doc_type: String,
    pub order_date: String,

    pub loaded_at_utc: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

fn model_to_fact(m: Model) -> Result<OrderFact> {
    let doc_type = OrderDocType::from_code(&m.doc_type)
        .ok_or_else(|| anyhow::anyhow!("Unknown doc_type '{}' in order {}", m.doc_type, m.order_no))?;
    let order_date: NaiveDate = m
        .order_date
        .parse()
        .map_err(|e| anyhow::anyhow!("Bad order_date '{}' in order {}: {}", m.order_date, m.order_no, e))?;

    Ok(OrderFact {
        order_no: m.order_no,
        article: m.article,
        client_ref: m.client_ref,
        marketplace: m.marketplace,
        barcode: m.barcode,
        title: m.title,
        qty: m.qty,
        price: m.price,
        doc_type,
        order_date,
    })
}

fn fact_to_active(fact: &OrderFact) -> ActiveModel {
    ActiveModel {
        order_no: Set(fact.order_no.clone()),
        article: Set(fact.article.clone()),
        client_ref: Set(fact.client_ref.clone()),
        marketplace: Set(fact.marketplace.clone()),
        barcode: Set(fact.barcode.clone()),
        title: Set(fact.title.clone()),
        qty: Set(fact.qty),
        price: Set(fact.price),
        doc_type: Set(fact.doc_type.as_str().to_string()),
        order_date: Set(fact.order_date.format("%Y-%m-%d").to_string()),
        loaded_at_utc: Set(Utc::now().to_rfc3339()),
    }
}

/// Upsert строки заказа по NK (order_no, article)
pub async fn upsert_entry(fact: &OrderFact) -> Result<()> {
    let existing = Entity::find()
        .filter(Column::OrderNo.eq(&fact.order_no))
        .filter(Column::Article.eq(&fact.article))
        .one(conn())
        .await?;

    let active = fact_to_active(fact);
    if existing.is_some() {
        active.update(conn()).await?;
    } else {
        active.insert(conn()).await?;
    }

    Ok(())
}

/// Строки заказов клиента за дату
pub async fn list_by_client_date(client_ref: &str, date: NaiveDate) -> Result<Vec<OrderFact>> {
    let date_str = date.format("%Y-%m-%d").to_string();
    let items = Entity::find()
        .filter(Column::ClientRef.eq(client_ref))
        .filter(Column::OrderDate.eq(date_str))
        .all(conn())
        .await?;
    items.into_iter().map(model_to_fact).collect()
}

#[derive(Debug, FromQueryResult)]
struct DateBound {
    value: Option<String>,
}

async fn date_bound(client_ref: &str, agg: &str) -> Result<Option<NaiveDate>> {
    let sql = format!(
        "SELECT {}(order_date) AS value FROM a003_order_fact WHERE client_ref = ?",
        agg
    );
    let stmt = Statement::from_sql_and_values(
        sea_orm::DatabaseBackend::Sqlite,
        &sql,
        [client_ref.into()],
    );
    let row = DateBound::find_by_statement(stmt).one(conn()).await?;
    Ok(row.and_then(|r| r.value).and_then(|s| s.parse().ok()))
}

/// Самая ранняя дата заказа клиента
pub async fn min_order_date(client_ref: &str) -> Result<Option<NaiveDate>> {
    date_bound(client_ref, "MIN").await
}

/// Самая поздняя дата заказа клиента
pub async fn max_order_date(client_ref: &str) -> Result<Option<NaiveDate>> {
    date_bound(client_ref, "MAX").await
}
