#![allow(clippy::too_many_arguments, clippy::type_complexity)]

pub mod cli;
pub mod domain;
pub mod projections;
pub mod shared;
pub mod usecases;

use anyhow::Result;
use clap::Parser;
use contracts::enums::marketplace_type::MarketplaceType;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, ClientCommand, Command};
use shared::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Создаем директорию для логов
    let log_dir = std::path::Path::new("target").join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file_path = log_dir.join("etl.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| {
                // Отключаем логи SQL запросов, но оставляем логи приложения
                "info,sqlx=warn,sea_orm=warn".into()
            }),
        ))
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::sync::Arc::new(log_file))
                .with_ansi(false),
        )
        .init();

    let args = Cli::parse();

    let config = shared::config::load_config()?;
    let db_path = shared::config::get_database_path(&config)?;
    shared::data::db::initialize_database(db_path.to_str())
        .await
        .map_err(|e| anyhow::anyhow!("db init failed: {e}"))?;

    run_command(args, &config).await
}

async fn run_command(args: Cli, config: &Config) -> Result<()> {
    match args.command {
        Command::Import(import_args) => {
            let client = domain::a001_client::service::require_by_code(&import_args.client).await?;
            let today = chrono::Utc::now().date_naive();
            let (date_from, date_to) =
                cli::resolve_period(import_args.from, import_args.to, today)?;

            let stats = match client.marketplace {
                MarketplaceType::Ozon => {
                    let executor =
                        usecases::u501_import_from_ozon::executor::ImportExecutor::new(&config.ozon);
                    let request = contracts::usecases::u501_import_from_ozon::request::ImportRequest {
                        client_code: client.code.clone(),
                        date_from,
                        date_to,
                    };
                    executor.run(&request, &client).await?
                }
                MarketplaceType::Wildberries => {
                    let executor =
                        usecases::u502_import_from_wildberries::executor::ImportExecutor::new(
                            &config.wildberries,
                        );
                    let request =
                        contracts::usecases::u502_import_from_wildberries::request::ImportRequest {
                            client_code: client.code.clone(),
                            date_from,
                            date_to,
                        };
                    executor.run(&request, &client).await?
                }
            };

            println!(
                "Импорт {} завершён: товаров {}, строк заказов {}, операций {}, пропущено {}",
                client.code,
                stats.products_loaded,
                stats.orders_loaded,
                stats.transactions_loaded,
                stats.skipped
            );
        }

        Command::LoadCosts(load_args) => {
            let result =
                usecases::u503_load_costs::csv_import::import_costs_from_file(&load_args.file)
                    .await?;

            println!(
                "Загрузка себестоимости: строк {}, обновлено {}, не найдено {}, отброшено {}",
                result.total_rows,
                result.updated,
                result.not_matched.len(),
                result.skipped_rows.len()
            );
            for article in &result.not_matched {
                println!("  не найден артикул: {}", article);
            }
            for (line_no, reason) in &result.skipped_rows {
                println!("  строка {}: {}", line_no, reason);
            }
        }

        Command::Aggregate(agg_args) => {
            let clients = match &agg_args.client {
                Some(code) => vec![domain::a001_client::service::require_by_code(code).await?],
                None => domain::a001_client::service::list_active().await?,
            };
            if clients.is_empty() {
                println!("Нет активных подключений клиентов");
                return Ok(());
            }

            for client in &clients {
                let client_ref = client.to_string_id();
                let stats = if let Some(date) = agg_args.date {
                    projections::p900_daily_metrics::service::aggregate_range(
                        &client_ref,
                        date,
                        date,
                    )
                    .await?
                } else if let (Some(from), Some(to)) = (agg_args.from, agg_args.to) {
                    projections::p900_daily_metrics::service::aggregate_range(&client_ref, from, to)
                        .await?
                } else {
                    projections::p900_daily_metrics::service::aggregate_pending(&client_ref).await?
                };

                println!(
                    "{}: посчитано дат {}, с ошибками {}",
                    client.code,
                    stats.dates_processed,
                    stats.dates_failed.len()
                );
                for (date, error) in &stats.dates_failed {
                    println!("  {} — {}", date, error);
                }
            }
        }

        Command::Report(report_args) => {
            let client = domain::a001_client::service::require_by_code(&report_args.client).await?;
            let metrics = projections::p900_daily_metrics::repository::list_by_client(
                &client.to_string_id(),
                report_args.from,
                report_args.to,
            )
            .await?;

            if metrics.is_empty() {
                println!("Нет метрик за период {} .. {}", report_args.from, report_args.to);
                return Ok(());
            }

            println!(
                "{:<12} {:>7} {:>12} {:>10} {:>10} {:>10} {:>10} {:>10} {:>12} {:>8}",
                "Дата",
                "Заказы",
                "Выручка",
                "Возвраты",
                "Себест.",
                "Комиссия",
                "Логистика",
                "Прочее",
                "Прибыль",
                "Маржа %"
            );
            for m in &metrics {
                println!(
                    "{:<12} {:>7} {:>12.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>12.2} {:>8}",
                    m.date,
                    m.orders_count,
                    m.revenue_sum,
                    m.returns_sum,
                    m.cogs_sum,
                    m.commission_sum,
                    m.logistics_sum,
                    m.other_expenses_sum,
                    m.profit_sum,
                    m.margin_percent
                        .map(|p| format!("{:.2}", p))
                        .unwrap_or_else(|| "—".to_string())
                );
            }
        }

        Command::Client(client_cmd) => match client_cmd {
            ClientCommand::Add(add_args) => {
                let client = domain::a001_client::service::create(
                    add_args.code,
                    add_args.description,
                    add_args.marketplace,
                    add_args.api_key,
                    add_args.client_id,
                )
                .await?;
                println!(
                    "Подключение {} ({}) создано: {}",
                    client.code,
                    client.marketplace.display_name(),
                    client.to_string_id()
                );
            }
            ClientCommand::List => {
                let clients = domain::a001_client::service::list_all().await?;
                if clients.is_empty() {
                    println!("Подключений нет");
                } else {
                    for c in &clients {
                        println!(
                            "{:<16} {:<12} {:<8} {}",
                            c.code,
                            c.marketplace.display_name(),
                            if c.is_active { "активно" } else { "выкл." },
                            c.description
                        );
                    }
                }
            }
        },

        Command::TestConnection(test_args) => {
            let client = domain::a001_client::service::require_by_code(&test_args.client).await?;
            let result =
                shared::marketplaces::test_marketplace_connection(config, &client).await;

            println!("{}", result.message);
            if let Some(details) = &result.details {
                println!("  {}", details);
            }
            if !result.success {
                anyhow::bail!("Проверка подключения {} не прошла", client.code);
            }
        }
    }

    Ok(())
}
