use anyhow::Result;
use contracts::domain::a001_client::aggregate::Client;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;

use crate::shared::config::OzonConfig;

/// HTTP-клиент для работы с OZON Seller API
pub struct OzonApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl OzonApiClient {
    pub fn new(config: &OzonConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Записать в лог-файл
    fn log_to_file(&self, message: &str) {
        if let Ok(mut file) = OpenOptions::new()
            .create(true)
            .append(true)
            .open("ozon_api_requests.log")
        {
            let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f");
            let _ = writeln!(file, "[{}] {}", timestamp, message);
        }
    }

    /// Общий POST к OZON API с заголовками авторизации
    async fn post_json<Req: Serialize, Resp: for<'de> Deserialize<'de>>(
        &self,
        client: &Client,
        path: &str,
        request_body: &Req,
    ) -> Result<Resp> {
        let client_id = client
            .client_id
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Client-Id is required for OZON API"))?;

        if client.api_key.trim().is_empty() {
            anyhow::bail!("Api-Key is required for OZON API");
        }

        let url = format!("{}{}", self.base_url, path);
        let body = serde_json::to_string(request_body)?;
        self.log_to_file(&format!(
            "=== REQUEST ===\nPOST {}\nClient-Id: {}\nApi-Key: ****\nBody: {}",
            url, client_id, body
        ));

        let response = match self
            .client
            .post(&url)
            .header("Client-Id", client_id)
            .header("Api-Key", &client.api_key)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                self.log_to_file(&format!("Request failed: {:?}", e));
                tracing::error!("OZON API connection error: {}", e);
                if e.is_timeout() {
                    anyhow::bail!("Request timeout: OZON API не ответил в течение 30 секунд");
                } else if e.is_connect() {
                    anyhow::bail!("Connection error: не удалось подключиться к OZON API");
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
            tracing::error!("OZON API request failed: {}", body);
            anyhow::bail!("OZON API request failed with status {}: {}", status, body);
        }

        let body = response.text().await?;
        self.log_to_file(&format!("=== RESPONSE BODY ===\n{}\n", body));

        let preview: String = body.chars().take(500).collect();
        tracing::debug!("OZON API response preview: {}", preview);

        serde_json::from_str::<Resp>(&body).map_err(|e| {
            self.log_to_file(&format!("Failed to parse JSON: {}", e));
            tracing::error!("Failed to parse OZON API response: {}", e);
            anyhow::anyhow!("Failed to parse OZON API JSON: {}. Response: {}", e, preview)
        })
    }

    /// Получить список товаров через POST /v3/product/list
    pub async fn fetch_product_list(
        &self,
        client: &Client,
        limit: i32,
        last_id: Option<String>,
    ) -> Result<OzonProductListResponse> {
        let request_body = OzonProductListRequest {
            filter: OzonProductListFilter {
                visibility: "ALL".to_string(),
            },
            last_id: last_id.unwrap_or_default(),
            limit,
        };
        self.post_json(client, "/v3/product/list", &request_body).await
    }

    /// Получить карточки товаров (с баркодами) через POST /v3/product/info/list
    pub async fn fetch_product_info_list(
        &self,
        client: &Client,
        product_ids: &[i64],
    ) -> Result<OzonProductInfoResponse> {
        let request_body = OzonProductInfoRequest {
            product_id: product_ids.to_vec(),
        };
        self.post_json(client, "/v3/product/info/list", &request_body)
            .await
    }

    /// Получить отправления FBS через POST /v3/posting/fbs/list
    pub async fn fetch_fbs_postings(
        &self,
        client: &Client,
        date_from: chrono::NaiveDate,
        date_to: chrono::NaiveDate,
        limit: i32,
        offset: i32,
    ) -> Result<OzonPostingListResponse> {
        let request_body = OzonPostingListRequest {
            dir: "ASC".to_string(),
            filter: OzonPostingListFilter {
                since: format!("{}T00:00:00Z", date_from.format("%Y-%m-%d")),
                to: format!("{}T23:59:59Z", date_to.format("%Y-%m-%d")),
            },
            limit,
            offset,
            with: OzonPostingListWith { financial_data: true },
        };
        self.post_json(client, "/v3/posting/fbs/list", &request_body)
            .await
    }

    /// Получить финансовые операции через POST /v3/finance/transaction/list
    pub async fn fetch_transactions(
        &self,
        client: &Client,
        date_from: chrono::NaiveDate,
        date_to: chrono::NaiveDate,
        page: i64,
        page_size: i64,
    ) -> Result<OzonTransactionListResponse> {
        let request_body = OzonTransactionListRequest {
            filter: OzonTransactionListFilter {
                date: OzonTransactionDateRange {
                    from: format!("{}T00:00:00.000Z", date_from.format("%Y-%m-%d")),
                    to: format!("{}T23:59:59.999Z", date_to.format("%Y-%m-%d")),
                },
                transaction_type: "all".to_string(),
            },
            page,
            page_size,
        };
        self.post_json(client, "/v3/finance/transaction/list", &request_body)
            .await
    }
}

// ============================================================================
// Request/Response structures для OZON API
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct OzonProductListRequest {
    pub filter: OzonProductListFilter,
    pub last_id: String,
    pub limit: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct OzonProductListFilter {
    pub visibility: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OzonProductListResponse {
    pub result: OzonProductListResult,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OzonProductListResult {
    #[serde(default)]
    pub items: Vec<OzonProductListItem>,
    #[serde(default)]
    pub last_id: String,
    #[serde(default)]
    pub total: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OzonProductListItem {
    pub product_id: i64,
    pub offer_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OzonProductInfoRequest {
    pub product_id: Vec<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OzonProductInfoResponse {
    #[serde(default)]
    pub items: Vec<OzonProductInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OzonProductInfo {
    pub id: i64,
    pub offer_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub barcodes: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OzonPostingListRequest {
    pub dir: String,
    pub filter: OzonPostingListFilter,
    pub limit: i32,
    pub offset: i32,
    pub with: OzonPostingListWith,
}

#[derive(Debug, Clone, Serialize)]
pub struct OzonPostingListFilter {
    pub since: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OzonPostingListWith {
    pub financial_data: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OzonPostingListResponse {
    pub result: OzonPostingListResult,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OzonPostingListResult {
    #[serde(default)]
    pub postings: Vec<OzonPosting>,
    #[serde(default)]
    pub has_next: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OzonPosting {
    pub posting_number: String,
    #[serde(default)]
    pub status: String,
    /// Дата передачи отправления в обработку
    #[serde(default)]
    pub in_process_at: Option<String>,
    #[serde(default)]
    pub products: Vec<OzonPostingProduct>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OzonPostingProduct {
    pub offer_id: String,
    #[serde(default)]
    pub name: String,
    pub quantity: i64,
    /// Цена приходит строкой: "1390.000000"
    #[serde(default)]
    pub price: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OzonTransactionListRequest {
    pub filter: OzonTransactionListFilter,
    pub page: i64,
    pub page_size: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OzonTransactionListFilter {
    pub date: OzonTransactionDateRange,
    pub transaction_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OzonTransactionDateRange {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OzonTransactionListResponse {
    pub result: OzonTransactionListResult,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OzonTransactionListResult {
    #[serde(default)]
    pub operations: Vec<OzonTransactionOperation>,
    #[serde(default)]
    pub page_count: i64,
    #[serde(default)]
    pub row_count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OzonTransactionOperation {
    pub operation_id: i64,
    #[serde(default)]
    pub operation_type: String,
    /// Человекочитаемое название операции — его и классифицируем
    #[serde(default)]
    pub operation_type_name: String,
    #[serde(default)]
    pub operation_date: String,
    #[serde(default)]
    pub amount: f64,
}
