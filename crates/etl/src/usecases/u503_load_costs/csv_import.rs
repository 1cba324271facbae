use anyhow::Result;
use serde::Deserialize;
use std::collections::HashSet;
use std::io::Read;
use thiserror::Error;

use contracts::usecases::u503_load_costs::CostUploadResult;

use crate::domain::a002_product::repository;

/// Ошибки разбора строки файла себестоимости
#[derive(Debug, Error)]
pub enum CostRowError {
    #[error("пустой артикул")]
    EmptyArticle,
    #[error("не удалось разобрать цену '{0}'")]
    BadCost(String),
    #[error("отрицательная цена {0}")]
    NegativeCost(f64),
}

/// Строка CSV-файла себестоимости: артикул;баркод;цена
#[derive(Debug, Clone, Deserialize)]
pub struct CostCsvRow {
    pub article: String,
    #[serde(default)]
    pub barcode: Option<String>,
    pub cost: String,
}

/// Разобранная запись себестоимости
#[derive(Debug, Clone)]
pub struct CostEntry {
    pub article: String,
    pub barcode: Option<String>,
    pub cost: f64,
}

fn parse_row(row: &CostCsvRow) -> std::result::Result<CostEntry, CostRowError> {
    let article = row.article.trim();
    if article.is_empty() {
        return Err(CostRowError::EmptyArticle);
    }

    // Операторы выгружают цены из таблиц с запятой в качестве
    // десятичного разделителя
    let normalized = row.cost.trim().replace(',', ".").replace(' ', "");
    let cost: f64 = normalized
        .parse()
        .map_err(|_| CostRowError::BadCost(row.cost.clone()))?;
    if cost < 0.0 {
        return Err(CostRowError::NegativeCost(cost));
    }

    let barcode = row
        .barcode
        .as_deref()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());

    Ok(CostEntry {
        article: article.to_string(),
        barcode,
        cost,
    })
}

/// Разобрать CSV-файл себестоимости (разделитель ';', первая строка — заголовок).
///
/// Возвращает валидные записи и отброшенные строки с причинами;
/// кривая строка не валит весь файл.
pub fn parse_cost_rows<R: Read>(reader: R) -> Result<(Vec<CostEntry>, Vec<(usize, String)>)> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut entries = Vec::new();
    let mut skipped = Vec::new();

    for (idx, record) in csv_reader.deserialize::<CostCsvRow>().enumerate() {
        // Нумерация строк файла: заголовок — строка 1
        let line_no = idx + 2;
        match record {
            Ok(row) => match parse_row(&row) {
                Ok(entry) => entries.push(entry),
                Err(e) => skipped.push((line_no, e.to_string())),
            },
            Err(e) => skipped.push((line_no, format!("ошибка формата CSV: {}", e))),
        }
    }

    Ok((entries, skipped))
}

/// Загрузить файл себестоимости в справочник товаров.
///
/// Сопоставление как при расчёте: сначала артикул, затем баркод.
/// Ненайденные артикулы попадают в отчёт для оператора, но не валят
/// загрузку.
pub async fn import_costs_from_file(path: &str) -> Result<CostUploadResult> {
    tracing::info!("Loading cost file {}", path);
    let file = std::fs::File::open(path)
        .map_err(|e| anyhow::anyhow!("Не удалось открыть файл {}: {}", path, e))?;

    let (entries, skipped_rows) = parse_cost_rows(file)?;

    let mut result = CostUploadResult {
        total_rows: entries.len() + skipped_rows.len(),
        skipped_rows,
        ..Default::default()
    };

    // Keep unique list (stable order) so the report doesn't show repeated articles.
    let mut not_matched_seen: HashSet<String> = HashSet::new();

    for entry in &entries {
        let product = match repository::find_by_article(&entry.article).await? {
            Some(p) => Some(p),
            None => match &entry.barcode {
                Some(barcode) => repository::find_by_barcode(barcode).await?,
                None => None,
            },
        };

        match product {
            Some(product) => {
                repository::set_cost(&product, entry.cost).await?;
                result.updated += 1;
            }
            None => {
                if not_matched_seen.insert(entry.article.clone()) {
                    result.not_matched.push(entry.article.clone());
                }
            }
        }
    }

    tracing::info!(
        "Cost upload finished: {} rows, {} updated, {} not matched, {} skipped",
        result.total_rows,
        result.updated,
        result.not_matched.len(),
        result.skipped_rows.len()
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_rows() {
        let data = "article;barcode;cost\nA1;B1;100.50\nA2;;40\n";
        let (entries, skipped) = parse_cost_rows(data.as_bytes()).unwrap();

        assert_eq!(entries.len(), 2);
        assert!(skipped.is_empty());
        assert_eq!(entries[0].article, "A1");
        assert_eq!(entries[0].barcode.as_deref(), Some("B1"));
        assert_eq!(entries[0].cost, 100.5);
        assert_eq!(entries[1].barcode, None);
        assert_eq!(entries[1].cost, 40.0);
    }

    #[test]
    fn test_parse_decimal_comma() {
        let data = "article;barcode;cost\nA1;;1234,56\n";
        let (entries, skipped) = parse_cost_rows(data.as_bytes()).unwrap();

        assert_eq!(entries.len(), 1);
        assert!(skipped.is_empty());
        assert_eq!(entries[0].cost, 1234.56);
    }

    #[test]
    fn test_bad_rows_reported_not_fatal() {
        let data = "article;barcode;cost\n;B1;100\nA2;;дорого\nA3;;-5\nA4;;50\n";
        let (entries, skipped) = parse_cost_rows(data.as_bytes()).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].article, "A4");
        assert_eq!(skipped.len(), 3);
        // Номера строк файла с учётом заголовка
        assert_eq!(skipped[0].0, 2);
        assert_eq!(skipped[1].0, 3);
        assert_eq!(skipped[2].0, 4);
        assert!(skipped[0].1.contains("пустой артикул"));
        assert!(skipped[1].1.contains("дорого"));
    }
}
