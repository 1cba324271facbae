use chrono::{Duration, NaiveDate};
use clap::{Args, Parser, Subcommand};
use contracts::enums::marketplace_type::MarketplaceType;

#[derive(Parser, Debug)]
#[command(
    name = "etl",
    version,
    about = "Импорт данных маркетплейсов и расчёт дневной маржинальности"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Импорт товаров, заказов и финансовых операций клиента за период
    Import(ImportArgs),
    /// Загрузка файла себестоимости (CSV: article;barcode;cost)
    LoadCosts(LoadCostsArgs),
    /// Расчёт дневных метрик; без дат — добивка пропущенных дат
    Aggregate(AggregateArgs),
    /// Вывод дневных метрик за период
    Report(ReportArgs),
    /// Подключения клиентов
    #[command(subcommand)]
    Client(ClientCommand),
    /// Проверка подключения к API маркетплейса
    TestConnection(TestConnectionArgs),
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Код подключения клиента
    #[arg(long)]
    pub client: String,
    /// Начало периода (YYYY-MM-DD); по умолчанию — вчера
    #[arg(long)]
    pub from: Option<NaiveDate>,
    /// Конец периода (YYYY-MM-DD); по умолчанию — вчера
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct LoadCostsArgs {
    /// Путь к CSV-файлу
    #[arg(long)]
    pub file: String,
}

#[derive(Args, Debug)]
pub struct AggregateArgs {
    /// Код подключения клиента; без него — все активные клиенты
    #[arg(long)]
    pub client: Option<String>,
    /// Одна дата (YYYY-MM-DD)
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub date: Option<NaiveDate>,
    /// Начало периода (YYYY-MM-DD)
    #[arg(long, requires = "to")]
    pub from: Option<NaiveDate>,
    /// Конец периода (YYYY-MM-DD)
    #[arg(long, requires = "from")]
    pub to: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Код подключения клиента
    #[arg(long)]
    pub client: String,
    /// Начало периода (YYYY-MM-DD)
    #[arg(long)]
    pub from: NaiveDate,
    /// Конец периода (YYYY-MM-DD)
    #[arg(long)]
    pub to: NaiveDate,
}

#[derive(Subcommand, Debug)]
pub enum ClientCommand {
    /// Добавить подключение
    Add(ClientAddArgs),
    /// Список подключений
    List,
}

#[derive(Args, Debug)]
pub struct ClientAddArgs {
    /// Короткий код подключения (уникален)
    #[arg(long)]
    pub code: String,
    /// Название
    #[arg(long)]
    pub description: String,
    /// Маркетплейс: ozon | wb
    #[arg(long, value_parser = parse_marketplace)]
    pub marketplace: MarketplaceType,
    /// API-ключ маркетплейса
    #[arg(long)]
    pub api_key: String,
    /// Client-Id (обязателен для Ozon)
    #[arg(long)]
    pub client_id: Option<String>,
}

#[derive(Args, Debug)]
pub struct TestConnectionArgs {
    /// Код подключения клиента
    #[arg(long)]
    pub client: String,
}

/// Разбор маркетплейса из аргумента CLI: принимаем и код, и короткое имя
fn parse_marketplace(value: &str) -> Result<MarketplaceType, String> {
    let lower = value.to_lowercase();
    if let Some(mp) = MarketplaceType::from_code(&lower) {
        return Ok(mp);
    }
    match lower.as_str() {
        "ozon" => Ok(MarketplaceType::Ozon),
        "wb" | "wildberries" => Ok(MarketplaceType::Wildberries),
        _ => Err(format!(
            "неизвестный маркетплейс '{}', ожидается ozon | wb",
            value
        )),
    }
}

/// Определить период импорта: по умолчанию — вчера.
///
/// Указан только from — берём период от from до вчера; указан только to —
/// один день to.
pub fn resolve_period(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    today: NaiveDate,
) -> anyhow::Result<(NaiveDate, NaiveDate)> {
    let yesterday = today - Duration::days(1);
    let to = to.unwrap_or(yesterday);
    let from = from.unwrap_or(to);
    if from > to {
        anyhow::bail!("Дата начала {} позже даты конца {}", from, to);
    }
    Ok((from, to))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_resolve_period_defaults_to_yesterday() {
        let (from, to) = resolve_period(None, None, date("2024-01-16")).unwrap();
        assert_eq!(from, date("2024-01-15"));
        assert_eq!(to, date("2024-01-15"));
    }

    #[test]
    fn test_resolve_period_from_only() {
        let (from, to) = resolve_period(Some(date("2024-01-10")), None, date("2024-01-16")).unwrap();
        assert_eq!(from, date("2024-01-10"));
        assert_eq!(to, date("2024-01-15"));
    }

    #[test]
    fn test_resolve_period_rejects_inverted_range() {
        let result = resolve_period(
            Some(date("2024-01-20")),
            Some(date("2024-01-10")),
            date("2024-01-25"),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_marketplace_aliases() {
        assert_eq!(parse_marketplace("ozon").unwrap(), MarketplaceType::Ozon);
        assert_eq!(parse_marketplace("wb").unwrap(), MarketplaceType::Wildberries);
        assert_eq!(
            parse_marketplace("mp-wb").unwrap(),
            MarketplaceType::Wildberries
        );
        assert!(parse_marketplace("amazon").is_err());
    }
}
