use once_cell::sync::OnceCell;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

async fn table_exists(conn: &DatabaseConnection, name: &str) -> anyhow::Result<bool> {
    let sql = "SELECT name FROM sqlite_master WHERE type='table' AND name=?;";
    let rows = conn
        .query_all(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            sql,
            [name.into()],
        ))
        .await?;
    Ok(!rows.is_empty())
}

async fn execute(conn: &DatabaseConnection, sql: &str) -> anyhow::Result<()> {
    conn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        sql.to_string(),
    ))
    .await?;
    Ok(())
}

pub async fn initialize_database(db_path: Option<&str>) -> anyhow::Result<()> {
    let db_file = db_path.unwrap_or("target/db/etl.db");
    if let Some(parent) = std::path::Path::new(db_file).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if std::path::Path::new(db_file).is_absolute() {
        std::path::PathBuf::from(db_file)
    } else {
        std::env::current_dir()?.join(db_file)
    };
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    let db_url = format!("sqlite://{}{}?mode=rwc", prefix, normalized);
    let conn = Database::connect(&db_url).await?;

    // a001_client
    if !table_exists(&conn, "a001_client").await? {
        tracing::info!("Creating a001_client table");
        execute(
            &conn,
            r#"
            CREATE TABLE a001_client (
                id TEXT PRIMARY KEY NOT NULL,
                code TEXT NOT NULL DEFAULT '',
                description TEXT NOT NULL,
                marketplace TEXT NOT NULL,
                api_key TEXT NOT NULL,
                client_id TEXT,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT,
                updated_at TEXT,
                version INTEGER NOT NULL DEFAULT 0
            );
        "#,
        )
        .await?;
        execute(
            &conn,
            "CREATE UNIQUE INDEX idx_a001_code ON a001_client (code);",
        )
        .await?;
    }

    // a002_product
    if !table_exists(&conn, "a002_product").await? {
        tracing::info!("Creating a002_product table");
        execute(
            &conn,
            r#"
            CREATE TABLE a002_product (
                id TEXT PRIMARY KEY NOT NULL,
                article TEXT NOT NULL,
                barcode TEXT,
                description TEXT NOT NULL DEFAULT '',
                cost_price REAL,
                created_at TEXT,
                updated_at TEXT,
                version INTEGER NOT NULL DEFAULT 0
            );
        "#,
        )
        .await?;
        execute(
            &conn,
            "CREATE UNIQUE INDEX idx_a002_article ON a002_product (article);",
        )
        .await?;
        execute(
            &conn,
            "CREATE INDEX idx_a002_barcode ON a002_product (barcode);",
        )
        .await?;
    } else {
        // Ранние версии таблицы не имели колонки barcode; добавляем при необходимости
        let pragma = format!("PRAGMA table_info('{}');", "a002_product");
        let cols = conn
            .query_all(Statement::from_string(DatabaseBackend::Sqlite, pragma))
            .await?;
        let mut has_barcode = false;
        for row in cols {
            let name: String = row.try_get("", "name").unwrap_or_default();
            if name == "barcode" {
                has_barcode = true;
            }
        }
        if !has_barcode {
            tracing::info!("Adding barcode column to a002_product");
            execute(&conn, "ALTER TABLE a002_product ADD COLUMN barcode TEXT;").await?;
        }
    }

    // a003_order_fact
    if !table_exists(&conn, "a003_order_fact").await? {
        tracing::info!("Creating a003_order_fact table");
        execute(
            &conn,
            r#"
            CREATE TABLE a003_order_fact (
                order_no TEXT NOT NULL,
                article TEXT NOT NULL,
                client_ref TEXT NOT NULL,
                marketplace TEXT NOT NULL,
                barcode TEXT,
                title TEXT,
                qty REAL NOT NULL,
                price REAL NOT NULL,
                doc_type TEXT NOT NULL,
                order_date TEXT NOT NULL,
                loaded_at_utc TEXT NOT NULL,
                PRIMARY KEY (order_no, article)
            );
        "#,
        )
        .await?;
        execute(
            &conn,
            "CREATE INDEX idx_a003_client_date ON a003_order_fact (client_ref, order_date);",
        )
        .await?;
    }

    // a004_transaction_fact
    if !table_exists(&conn, "a004_transaction_fact").await? {
        tracing::info!("Creating a004_transaction_fact table");
        execute(
            &conn,
            r#"
            CREATE TABLE a004_transaction_fact (
                operation_id TEXT PRIMARY KEY NOT NULL,
                client_ref TEXT NOT NULL,
                marketplace TEXT NOT NULL,
                operation_type TEXT NOT NULL,
                amount REAL NOT NULL,
                operation_date TEXT NOT NULL,
                loaded_at_utc TEXT NOT NULL
            );
        "#,
        )
        .await?;
        execute(
            &conn,
            "CREATE INDEX idx_a004_client_date ON a004_transaction_fact (client_ref, operation_date);",
        )
        .await?;
    }

    // p900_daily_metrics
    if !table_exists(&conn, "p900_daily_metrics").await? {
        tracing::info!("Creating p900_daily_metrics table");
        execute(
            &conn,
            r#"
            CREATE TABLE p900_daily_metrics (
                client_ref TEXT NOT NULL,
                date TEXT NOT NULL,
                orders_count INTEGER NOT NULL DEFAULT 0,
                revenue_sum REAL NOT NULL DEFAULT 0,
                returns_sum REAL NOT NULL DEFAULT 0,
                cogs_sum REAL NOT NULL DEFAULT 0,
                commission_sum REAL NOT NULL DEFAULT 0,
                logistics_sum REAL NOT NULL DEFAULT 0,
                other_expenses_sum REAL NOT NULL DEFAULT 0,
                profit_sum REAL NOT NULL DEFAULT 0,
                margin_percent REAL,
                uncosted_lines INTEGER NOT NULL DEFAULT 0,
                computed_at_utc TEXT NOT NULL,
                PRIMARY KEY (client_ref, date)
            );
        "#,
        )
        .await?;
    }

    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("Failed to set DB_CONN"))?;
    Ok(())
}

pub fn get_connection() -> &'static DatabaseConnection {
    DB_CONN
        .get()
        .expect("Database connection has not been initialized")
}
