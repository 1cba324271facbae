use anyhow::Result;
use chrono::NaiveDate;
use contracts::domain::a001_client::aggregate::Client;
use contracts::domain::a004_transaction::aggregate::TransactionFact;
use contracts::enums::marketplace_type::MarketplaceType;

use super::super::ozon_api_client::OzonTransactionOperation;
use crate::domain::a004_transaction;

/// Занести финансовую операцию OZON в a004_transaction_fact
pub async fn process_operation(client: &Client, operation: &OzonTransactionOperation) -> Result<()> {
    // operation_date: "2024-01-15 07:21:44" либо ISO-вариант;
    // первые 10 символов — всегда дата
    let raw_date = operation.operation_date.trim();
    if raw_date.len() < 10 {
        anyhow::bail!(
            "Operation {}: bad operation_date '{}'",
            operation.operation_id,
            operation.operation_date
        );
    }
    let operation_date: NaiveDate = raw_date[..10].parse().map_err(|e| {
        anyhow::anyhow!(
            "Operation {}: bad operation_date '{}': {}",
            operation.operation_id,
            operation.operation_date,
            e
        )
    })?;

    let label = if operation.operation_type_name.trim().is_empty() {
        operation.operation_type.clone()
    } else {
        operation.operation_type_name.clone()
    };

    let fact = TransactionFact {
        operation_id: format!("OZON-{}", operation.operation_id),
        client_ref: client.to_string_id(),
        marketplace: MarketplaceType::Ozon.code().to_string(),
        operation_type: label,
        amount: operation.amount,
        operation_date,
    };
    fact.validate().map_err(|e| anyhow::anyhow!(e))?;

    a004_transaction::repository::upsert_entry(&fact).await?;
    Ok(())
}
