use anyhow::Result;
use chrono::NaiveDate;
use contracts::domain::a001_client::aggregate::Client;
use contracts::domain::a004_transaction::aggregate::TransactionFact;
use contracts::enums::marketplace_type::MarketplaceType;

use super::super::wildberries_api_client::WbFinanceRow;
use crate::domain::a004_transaction;

/// Разложить строку финансового отчёта WB на финансовые операции.
///
/// Одна строка отчёта несёт до трёх удержаний: комиссию, логистику и
/// штраф. Каждое ненулевое удержание становится отдельной операцией со
/// своим суффиксом ID, суммы записываются со знаком минус (списание).
/// Возвращает число записанных операций.
pub async fn process_report_row(client: &Client, row: &WbFinanceRow) -> Result<usize> {
    let operation_date: NaiveDate = match row.rr_dt.as_deref() {
        Some(raw) if raw.len() >= 10 => raw[..10].parse().map_err(|e| {
            anyhow::anyhow!("WB report row {}: bad rr_dt '{}': {}", row.rrd_id, raw, e)
        })?,
        _ => anyhow::bail!("WB report row {} has no rr_dt", row.rrd_id),
    };

    let client_ref = client.to_string_id();
    let marketplace = MarketplaceType::Wildberries.code().to_string();
    let mut written = 0;

    // Возвраты ("Возврат", "Частичный возврат") несут сумму в отдельных
    // строках продаж, здесь учитываем только удержания
    let charges: [(&str, &str, f64); 3] = [
        ("C", "Комиссия за продажу", row.ppvz_sales_commission),
        ("L", "Логистика", row.delivery_rub),
        ("P", "Штраф", row.penalty),
    ];

    for (suffix, default_label, amount) in charges {
        if amount == 0.0 {
            continue;
        }

        // Для штрафов WB даёт содержательное имя операции — сохраняем его
        let label = if suffix == "P" && !row.supplier_oper_name.trim().is_empty() {
            format!("Штраф: {}", row.supplier_oper_name)
        } else {
            default_label.to_string()
        };

        let fact = TransactionFact {
            operation_id: format!("WB-{}-{}", row.rrd_id, suffix),
            client_ref: client_ref.clone(),
            marketplace: marketplace.clone(),
            operation_type: label,
            amount: -amount.abs(),
            operation_date,
        };
        fact.validate().map_err(|e| anyhow::anyhow!(e))?;

        a004_transaction::repository::upsert_entry(&fact).await?;
        written += 1;
    }

    Ok(written)
}
