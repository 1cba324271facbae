use anyhow::Result;
use contracts::domain::a001_client::aggregate::Client;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;

use crate::shared::config::WildberriesConfig;

/// HTTP-клиент для работы с Wildberries API.
///
/// Карточки товаров и статистика живут на разных хостах: контентный API
/// и statistics API имеют отдельные base URL.
pub struct WildberriesApiClient {
    client: reqwest::Client,
    content_api_url: String,
    statistics_api_url: String,
}

impl WildberriesApiClient {
    pub fn new(config: &WildberriesConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
            content_api_url: config.content_api_url.trim_end_matches('/').to_string(),
            statistics_api_url: config.statistics_api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Записать в лог-файл
    fn log_to_file(&self, message: &str) {
        if let Ok(mut file) = OpenOptions::new()
            .create(true)
            .append(true)
            .open("wildberries_api_requests.log")
        {
            let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f");
            let _ = writeln!(file, "[{}] {}", timestamp, message);
        }
    }

    fn check_api_key(client: &Client) -> Result<()> {
        if client.api_key.trim().is_empty() {
            anyhow::bail!("API Key is required for Wildberries API");
        }
        Ok(())
    }

    /// Получить список товаров через POST /content/v2/get/cards/list
    pub async fn fetch_product_list(
        &self,
        client: &Client,
        limit: i32,
        cursor: Option<WildberriesCursor>,
    ) -> Result<WildberriesProductListResponse> {
        Self::check_api_key(client)?;

        let url = format!("{}/content/v2/get/cards/list", self.content_api_url);

        // Wildberries API использует курсорную пагинацию
        let request_body = WildberriesProductListRequest {
            settings: WildberriesSettings {
                cursor: cursor.unwrap_or_default(),
                filter: WildberriesFilter { with_photo: -1 },
            },
            limit,
        };

        let body = serde_json::to_string(&request_body)?;
        self.log_to_file(&format!(
            "=== REQUEST ===\nPOST {}\nAuthorization: ****\nBody: {}",
            url, body
        ));

        let response = match self
            .client
            .post(&url)
            .header("Authorization", &client.api_key)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                self.log_to_file(&format!("Request failed: {:?}", e));
                tracing::error!("Wildberries API connection error: {}", e);
                if e.is_timeout() {
                    anyhow::bail!("Request timeout: API не ответил в течение 30 секунд");
                } else if e.is_connect() {
                    anyhow::bail!("Connection error: не удалось подключиться к серверу WB");
                } else {
                    anyhow::bail!("Request error: {}", e);
                }
            }
        };

        let status = response.status();
        self.log_to_file(&format!("Response status: {}", status));

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            self.log_to_file(&format!("ERROR Response body:\n{}", body));
            tracing::error!("Wildberries API request failed: {}", body);
            anyhow::bail!(
                "Wildberries API request failed with status {}: {}",
                status,
                body
            );
        }

        let body = response.text().await?;
        self.log_to_file(&format!("=== RESPONSE BODY ===\n{}\n", body));

        match serde_json::from_str::<WildberriesProductListResponse>(&body) {
            Ok(data) => {
                tracing::info!(
                    "Wildberries cards response: {} items, cursor.total={}",
                    data.cards.len(),
                    data.cursor.total
                );
                Ok(data)
            }
            Err(e) => {
                self.log_to_file(&format!("Failed to parse response: {}", e));
                tracing::error!("Failed to parse Wildberries API response: {}", e);
                anyhow::bail!("Failed to parse Wildberries API JSON: {}", e)
            }
        }
    }

    /// Получить продажи и возвраты через Statistics API
    /// GET /api/v1/supplier/sales
    pub async fn fetch_sales(
        &self,
        client: &Client,
        date_from: chrono::NaiveDate,
    ) -> Result<Vec<WbSaleRow>> {
        Self::check_api_key(client)?;

        let url = format!("{}/api/v1/supplier/sales", self.statistics_api_url);
        let date_from_str = date_from.format("%Y-%m-%d").to_string();

        self.log_to_file(&format!(
            "=== REQUEST ===\nGET {}?dateFrom={}\nAuthorization: ****",
            url, date_from_str
        ));

        let response = self
            .client
            .get(&url)
            .header("Authorization", &client.api_key)
            .query(&[("dateFrom", date_from_str)])
            .send()
            .await?;

        let status = response.status();
        self.log_to_file(&format!("Response status: {}", status));

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            self.log_to_file(&format!("ERROR Response body:\n{}", body));
            tracing::error!("Wildberries Sales API request failed: {}", body);
            anyhow::bail!(
                "Wildberries Sales API failed with status {}: {}",
                status,
                body
            );
        }

        let body = response.text().await?;
        self.log_to_file(&format!("=== RESPONSE BODY ===\n{}\n", body));

        match serde_json::from_str::<Vec<WbSaleRow>>(&body) {
            Ok(data) => {
                self.log_to_file(&format!("Successfully parsed {} sale rows", data.len()));
                Ok(data)
            }
            Err(e) => {
                self.log_to_file(&format!("Failed to parse JSON: {}", e));
                tracing::error!("Failed to parse Wildberries sales response: {}", e);
                anyhow::bail!("Failed to parse sales response: {}", e)
            }
        }
    }

    /// Получить детализацию финансового отчёта
    /// GET /api/v5/supplier/reportDetailByPeriod (пагинация по rrdid)
    pub async fn fetch_finance_report(
        &self,
        client: &Client,
        date_from: chrono::NaiveDate,
        date_to: chrono::NaiveDate,
        rrdid: i64,
        limit: i32,
    ) -> Result<Vec<WbFinanceRow>> {
        Self::check_api_key(client)?;

        let url = format!(
            "{}/api/v5/supplier/reportDetailByPeriod",
            self.statistics_api_url
        );

        self.log_to_file(&format!(
            "=== REQUEST ===\nGET {}?dateFrom={}&dateTo={}&rrdid={}&limit={}\nAuthorization: ****",
            url, date_from, date_to, rrdid, limit
        ));

        let response = self
            .client
            .get(&url)
            .header("Authorization", &client.api_key)
            .query(&[
                ("dateFrom", date_from.format("%Y-%m-%d").to_string()),
                ("dateTo", date_to.format("%Y-%m-%d").to_string()),
                ("rrdid", rrdid.to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        self.log_to_file(&format!("Response status: {}", status));

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            self.log_to_file(&format!("ERROR Response body:\n{}", body));
            tracing::error!("Wildberries finance report request failed: {}", body);
            anyhow::bail!(
                "Wildberries finance report failed with status {}: {}",
                status,
                body
            );
        }

        let body = response.text().await?;
        self.log_to_file(&format!("=== RESPONSE BODY ===\n{}\n", body));

        // Пустой отчёт приходит как "null"
        if body.trim() == "null" || body.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str::<Vec<WbFinanceRow>>(&body) {
            Ok(data) => {
                self.log_to_file(&format!("Successfully parsed {} report rows", data.len()));
                Ok(data)
            }
            Err(e) => {
                self.log_to_file(&format!("Failed to parse JSON: {}", e));
                tracing::error!("Failed to parse Wildberries finance report: {}", e);
                anyhow::bail!("Failed to parse finance report: {}", e)
            }
        }
    }
}

// ============================================================================
// Request/Response structures для Wildberries API
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct WildberriesProductListRequest {
    pub settings: WildberriesSettings,
    pub limit: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct WildberriesSettings {
    pub cursor: WildberriesCursor,
    pub filter: WildberriesFilter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WildberriesCursor {
    #[serde(rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(rename = "nmID", skip_serializing_if = "Option::is_none")]
    pub nm_id: Option<i64>,
    #[serde(default)]
    pub total: i64,
}

impl Default for WildberriesCursor {
    fn default() -> Self {
        Self {
            updated_at: None,
            nm_id: None,
            total: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WildberriesFilter {
    #[serde(rename = "withPhoto")]
    pub with_photo: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WildberriesProductListResponse {
    #[serde(default)]
    pub cards: Vec<WildberriesCard>,
    pub cursor: WildberriesCursor,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WildberriesCard {
    #[serde(rename = "nmID")]
    pub nm_id: i64,
    #[serde(rename = "vendorCode")]
    pub vendor_code: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub sizes: Vec<WildberriesSize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WildberriesSize {
    #[serde(default)]
    pub skus: Vec<String>,
}

// ============================================================================
// Sales structures
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct WbSaleRow {
    /// Уникальный идентификатор строки продажи
    #[serde(default)]
    pub srid: Option<String>,
    /// Артикул продавца
    #[serde(rename = "supplierArticle", default)]
    pub supplier_article: Option<String>,
    /// Штрихкод
    #[serde(default)]
    pub barcode: Option<String>,
    /// Название товара
    #[serde(default)]
    pub subject: Option<String>,
    /// Дата продажи
    #[serde(rename = "date", default)]
    pub sale_dt: Option<String>,
    /// Цена со скидкой продавца (за единицу)
    #[serde(rename = "priceWithDisc", default)]
    pub price_with_disc: Option<f64>,
    /// Количество
    #[serde(default)]
    pub quantity: Option<i32>,
    /// ID события: S...-продажа, R...-возврат
    #[serde(rename = "saleID", default)]
    pub sale_id: Option<String>,
}

// ============================================================================
// Finance report structures
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct WbFinanceRow {
    /// Уникальный ID строки отчёта
    #[serde(rename = "rrd_id")]
    pub rrd_id: i64,
    /// Дата операции
    #[serde(rename = "rr_dt", default)]
    pub rr_dt: Option<String>,
    /// Тип операции, как его называет WB ("Продажа", "Логистика", ...)
    #[serde(rename = "supplier_oper_name", default)]
    pub supplier_oper_name: String,
    /// Комиссия с продажи
    #[serde(rename = "ppvz_sales_commission", default)]
    pub ppvz_sales_commission: f64,
    /// Стоимость логистики
    #[serde(rename = "delivery_rub", default)]
    pub delivery_rub: f64,
    /// Штрафы
    #[serde(rename = "penalty", default)]
    pub penalty: f64,
}
