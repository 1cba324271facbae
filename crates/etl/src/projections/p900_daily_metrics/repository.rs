use anyhow::Result;
use chrono::{NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, QueryFilter, QueryOrder, Set,
    Statement,
};
use serde::{Deserialize, Serialize};

use contracts::projections::p900_daily_metrics::dto::DailyMetrics;

use crate::shared::data::db::get_connection;

/// Модель дневной метрики.
/// NK (Natural Key): (client_ref, date)
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "p900_daily_metrics")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub client_ref: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub date: String,

    pub orders_count: i64,
    pub revenue_sum: f64,
    pub returns_sum: f64,
    pub cogs_sum: f64,
    pub commission_sum: f64,
    pub logistics_sum: f64,
    pub other_expenses_sum: f64,
    pub profit_sum: f64,
    #[sea_orm(nullable)]
    pub margin_percent: Option<f64>,
    pub uncosted_lines: i64,

    pub computed_at_utc: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

fn model_to_dto(m: Model) -> Result<DailyMetrics> {
    let date: NaiveDate = m
        .date
        .parse()
        .map_err(|e| anyhow::anyhow!("Bad metric date '{}': {}", m.date, e))?;

    Ok(DailyMetrics {
        client_ref: m.client_ref,
        date,
        orders_count: m.orders_count,
        revenue_sum: m.revenue_sum,
        returns_sum: m.returns_sum,
        cogs_sum: m.cogs_sum,
        commission_sum: m.commission_sum,
        logistics_sum: m.logistics_sum,
        other_expenses_sum: m.other_expenses_sum,
        profit_sum: m.profit_sum,
        margin_percent: m.margin_percent,
        uncosted_lines: m.uncosted_lines,
    })
}

fn dto_to_active(metrics: &DailyMetrics) -> ActiveModel {
    ActiveModel {
        client_ref: Set(metrics.client_ref.clone()),
        date: Set(metrics.date.format("%Y-%m-%d").to_string()),
        orders_count: Set(metrics.orders_count),
        revenue_sum: Set(metrics.revenue_sum),
        returns_sum: Set(metrics.returns_sum),
        cogs_sum: Set(metrics.cogs_sum),
        commission_sum: Set(metrics.commission_sum),
        logistics_sum: Set(metrics.logistics_sum),
        other_expenses_sum: Set(metrics.other_expenses_sum),
        profit_sum: Set(metrics.profit_sum),
        margin_percent: Set(metrics.margin_percent),
        uncosted_lines: Set(metrics.uncosted_lines),
        computed_at_utc: Set(Utc::now().to_rfc3339()),
    }
}

/// Upsert метрики по NK (client_ref, date).
///
/// Принимает любое подключение, чтобы запись можно было выполнить
/// внутри транзакции, охватывающей одну дату.
pub async fn upsert_entry<C: ConnectionTrait>(db: &C, metrics: &DailyMetrics) -> Result<()> {
    let date_str = metrics.date.format("%Y-%m-%d").to_string();
    let existing = Entity::find()
        .filter(Column::ClientRef.eq(&metrics.client_ref))
        .filter(Column::Date.eq(&date_str))
        .one(db)
        .await?;

    let active = dto_to_active(metrics);
    if existing.is_some() {
        active.update(db).await?;
    } else {
        active.insert(db).await?;
    }

    Ok(())
}

/// Метрики клиента за период (для отчёта в CLI)
pub async fn list_by_client(
    client_ref: &str,
    date_from: NaiveDate,
    date_to: NaiveDate,
) -> Result<Vec<DailyMetrics>> {
    let items = Entity::find()
        .filter(Column::ClientRef.eq(client_ref))
        .filter(Column::Date.gte(date_from.format("%Y-%m-%d").to_string()))
        .filter(Column::Date.lte(date_to.format("%Y-%m-%d").to_string()))
        .order_by_asc(Column::Date)
        .all(conn())
        .await?;
    items.into_iter().map(model_to_dto).collect()
}

#[derive(Debug, FromQueryResult)]
struct DateBound {
    value: Option<String>,
}

/// Самая поздняя дата, за которую уже посчитаны метрики
pub async fn max_metric_date(client_ref: &str) -> Result<Option<NaiveDate>> {
    let sql = "SELECT MAX(date) AS value FROM p900_daily_metrics WHERE client_ref = ?";
    let stmt = Statement::from_sql_and_values(
        sea_orm::DatabaseBackend::Sqlite,
        sql,
        [client_ref.into()],
    );
    let row = DateBound::find_by_statement(stmt).one(conn()).await?;
    Ok(row.and_then(|r| r.value).and_then(|s| s.parse().ok()))
}
