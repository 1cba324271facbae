use anyhow::Result;
use std::collections::HashMap;

use contracts::domain::a002_product::aggregate::{Product, ProductId};

use super::repository;

/// Параметры поиска/создания товара при импорте
#[derive(Debug, Clone)]
pub struct FindOrCreateParams {
    pub article: String,
    pub barcode: Option<String>,
    pub title: String,
}

/// Найти товар по артикулу или создать новый.
///
/// Себестоимость существующей записи не трогаем: её ведёт оператор через
/// загрузку файла цен. Баркод дозаполняем, если раньше был неизвестен.
pub async fn find_or_create_for_import(params: FindOrCreateParams) -> Result<ProductId> {
    if let Some(mut existing) = repository::find_by_article(&params.article).await? {
        let needs_barcode = existing.barcode.is_none() && params.barcode.is_some();
        if needs_barcode {
            existing.barcode = params.barcode.clone();
            existing.touch_updated();
            repository::upsert_by_article(&existing).await?;
        }
        return Ok(existing.id);
    }

    let product = Product::new_for_insert(
        params.article.clone(),
        params.barcode.clone(),
        params.title.clone(),
        None,
    );
    product.validate().map_err(|e| anyhow::anyhow!(e))?;
    repository::upsert_by_article(&product).await?;
    tracing::debug!("Created product for article {}", params.article);
    Ok(product.id)
}

/// Источник найденной себестоимости
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostSource {
    /// Совпадение по артикулу
    Article,
    /// Совпадение по баркоду
    Barcode,
    /// Себестоимость не найдена, принята за ноль
    Uncosted,
}

/// Результат разрешения себестоимости для строки заказа
#[derive(Debug, Clone, Copy)]
pub struct ResolvedCost {
    pub cost: f64,
    pub source: CostSource,
}

/// Снимок себестоимости на момент запуска агрегации.
///
/// Все строки одного запуска видят одни и те же цены; изменение цен
/// задним числом влияет на исторические метрики только при явном
/// перерасчёте за те даты.
#[derive(Debug, Default)]
pub struct CostSnapshot {
    by_article: HashMap<String, f64>,
    by_barcode: HashMap<String, f64>,
}

impl CostSnapshot {
    pub fn from_products(products: &[Product]) -> Self {
        let mut by_article = HashMap::new();
        let mut by_barcode = HashMap::new();
        for p in products {
            if let Some(cost) = p.cost_price {
                by_article.insert(p.article.clone(), cost);
                if let Some(barcode) = &p.barcode {
                    by_barcode.insert(barcode.clone(), cost);
                }
            }
        }
        Self {
            by_article,
            by_barcode,
        }
    }

    /// Разрешить себестоимость: сначала артикул, затем баркод.
    ///
    /// Артикул — более надёжный идентификатор; баркод — запасной путь
    /// для позиций, у которых актуального артикула нет. Отсутствие
    /// себестоимости — не ошибка: строка считается по нулевой цене и
    /// помечается для внимания оператора.
    pub fn resolve(&self, article: &str, barcode: Option<&str>) -> ResolvedCost {
        if let Some(&cost) = self.by_article.get(article) {
            return ResolvedCost {
                cost,
                source: CostSource::Article,
            };
        }
        if let Some(barcode) = barcode {
            if let Some(&cost) = self.by_barcode.get(barcode) {
                return ResolvedCost {
                    cost,
                    source: CostSource::Barcode,
                };
            }
        }
        ResolvedCost {
            cost: 0.0,
            source: CostSource::Uncosted,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.by_article.is_empty() && self.by_barcode.is_empty()
    }
}

/// Загрузить снимок себестоимости из справочника товаров
pub async fn load_cost_snapshot() -> Result<CostSnapshot> {
    let products = repository::list_all().await?;
    let snapshot = CostSnapshot::from_products(&products);
    if snapshot.is_empty() {
        tracing::warn!("Cost snapshot is empty: no products with cost_price loaded");
    }
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(article: &str, barcode: Option<&str>, cost: Option<f64>) -> Product {
        Product::new_for_insert(
            article.to_string(),
            barcode.map(|s| s.to_string()),
            format!("Товар {}", article),
            cost,
        )
    }

    #[test]
    fn test_article_takes_priority_over_barcode() {
        let products = vec![
            product("A1", None, Some(100.0)),
            product("A2", Some("B1"), Some(200.0)),
        ];
        let snapshot = CostSnapshot::from_products(&products);

        let resolved = snapshot.resolve("A1", Some("B1"));
        assert_eq!(resolved.cost, 100.0);
        assert_eq!(resolved.source, CostSource::Article);
    }

    #[test]
    fn test_barcode_fallback() {
        let products = vec![product("A2", Some("B1"), Some(200.0))];
        let snapshot = CostSnapshot::from_products(&products);

        let resolved = snapshot.resolve("UNKNOWN", Some("B1"));
        assert_eq!(resolved.cost, 200.0);
        assert_eq!(resolved.source, CostSource::Barcode);
    }

    #[test]
    fn test_uncosted_when_no_match() {
        let products = vec![product("A1", None, Some(100.0))];
        let snapshot = CostSnapshot::from_products(&products);

        let resolved = snapshot.resolve("UNKNOWN", Some("NO-SUCH-BARCODE"));
        assert_eq!(resolved.cost, 0.0);
        assert_eq!(resolved.source, CostSource::Uncosted);
    }

    #[test]
    fn test_null_cost_does_not_match() {
        // Товар без загруженной себестоимости не участвует в снимке:
        // строка должна уйти в fallback по баркоду
        let products = vec![
            product("A1", None, None),
            product("A2", Some("B1"), Some(200.0)),
        ];
        let snapshot = CostSnapshot::from_products(&products);

        let resolved = snapshot.resolve("A1", Some("B1"));
        assert_eq!(resolved.cost, 200.0);
        assert_eq!(resolved.source, CostSource::Barcode);
    }
}
