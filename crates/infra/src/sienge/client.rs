//! Sienge API client: request dispatch and typed resource operations

use std::sync::Arc;

use async_trait::async_trait;
use capexflow_core::sienge_ports::SiengeGateway;
use capexflow_domain::types::sienge::{
    ApiErrorBody, BillCredit, BillCreditFilters, BillDebt, BillDebtFilters, Category, CostCenter,
    CostCenterFilters, PaginatedResponse, Payment, PaymentFilters, Receipt, ReceiptFilters,
    Supplier, SupplierFilters,
};
use capexflow_domain::{CapexFlowError, Result, SiengeConfig};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::http::HttpClient;
use super::errors::SiengeError;
use super::query::{to_query_string, QueryParams};

const BILL_DEBT_PATH: &str = "/bill-debt/v1";
const BILL_CREDIT_PATH: &str = "/bill-credit/v1";
const SUPPLIER_PATH: &str = "/supplier/v1";
const COST_CENTER_PATH: &str = "/cost-center/v1";
const CATEGORY_PATH: &str = "/category/v1";
const PAYMENT_PATH: &str = "/payment/v1";
const RECEIPT_PATH: &str = "/receipt/v1";

/// Provides bearer tokens for authenticated Sienge calls.
///
/// Implemented by the session manager; tests substitute static providers.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Retrieve a token valid for at least the next request. Implementations
    /// refresh stale sessions before returning.
    async fn access_token(&self) -> Result<String>;
}

#[async_trait]
impl AccessTokenProvider for crate::auth::SessionManager {
    async fn access_token(&self) -> Result<String> {
        crate::auth::SessionManager::access_token(self).await
    }
}

/// HTTP client for the Sienge financial API.
///
/// Dispatches one request per call with a bounded timeout and typed error
/// translation. Performs no retries and no caching; both live in the
/// data-service layer above.
pub struct SiengeClient {
    base_url: String,
    http: HttpClient,
    token_provider: Arc<dyn AccessTokenProvider>,
}

impl SiengeClient {
    /// Create a new Sienge client.
    ///
    /// # Arguments
    /// * `config` - validated connection settings (base URL, timeout)
    /// * `token_provider` - source of bearer tokens, normally the session
    ///   manager
    ///
    /// # Errors
    /// Returns `CapexFlowError::Config` when the configuration is invalid.
    pub fn new(config: &SiengeConfig, token_provider: Arc<dyn AccessTokenProvider>) -> Result<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http =
            HttpClient::builder().timeout(config.timeout()).default_headers(headers).build()?;

        Ok(Self { base_url: config.normalized_base_url().to_string(), http, token_provider })
    }

    /// Execute one request and decode the JSON body.
    ///
    /// Non-2xx responses never yield data: the JSON error body's `message`
    /// is extracted when present, otherwise the `HTTP <status>: <reason>`
    /// line is synthesized, and the call fails with that message.
    async fn dispatch<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &str,
        requires_auth: bool,
    ) -> Result<T> {
        let mut url = format!("{}{}", self.base_url, path);
        if !query.is_empty() {
            url.push('?');
            url.push_str(query);
        }

        let mut builder = self.http.request(method, &url);
        if requires_auth {
            let token = self.token_provider.access_token().await?;
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let response = self.http.send(builder).await?;
        let status = response.status();

        if !status.is_success() {
            let fallback = format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            );
            let message = match response.json::<ApiErrorBody>().await {
                Ok(body) => body.message,
                Err(_) => fallback,
            };
            debug!(%status, path, "Sienge API call failed");
            return Err(SiengeError::from_response(status, message).into());
        }

        response
            .json::<T>()
            .await
            .map_err(|e| CapexFlowError::Internal(format!("failed to parse {path} response: {e}")))
    }

    async fn list<T, Q>(&self, path: &str, filters: &Q) -> Result<PaginatedResponse<T>>
    where
        T: DeserializeOwned,
        Q: QueryParams + Sync,
    {
        self.dispatch(Method::GET, path, &to_query_string(filters), true).await
    }

    async fn get_by_id<T: DeserializeOwned>(&self, path: &str, id: i64) -> Result<T> {
        self.dispatch(Method::GET, &format!("{path}/{id}"), "", true).await
    }
}

#[async_trait]
impl SiengeGateway for SiengeClient {
    async fn bill_debts(&self, filters: &BillDebtFilters) -> Result<PaginatedResponse<BillDebt>> {
        self.list(BILL_DEBT_PATH, filters).await
    }

    async fn bill_debt(&self, id: i64) -> Result<BillDebt> {
        self.get_by_id(BILL_DEBT_PATH, id).await
    }

    async fn bill_credits(
        &self,
        filters: &BillCreditFilters,
    ) -> Result<PaginatedResponse<BillCredit>> {
        self.list(BILL_CREDIT_PATH, filters).await
    }

    async fn bill_credit(&self, id: i64) -> Result<BillCredit> {
        self.get_by_id(BILL_CREDIT_PATH, id).await
    }

    async fn suppliers(&self, filters: &SupplierFilters) -> Result<PaginatedResponse<Supplier>> {
        self.list(SUPPLIER_PATH, filters).await
    }

    async fn supplier(&self, id: i64) -> Result<Supplier> {
        self.get_by_id(SUPPLIER_PATH, id).await
    }

    async fn cost_centers(
        &self,
        filters: &CostCenterFilters,
    ) -> Result<PaginatedResponse<CostCenter>> {
        self.list(COST_CENTER_PATH, filters).await
    }

    async fn cost_center(&self, id: i64) -> Result<CostCenter> {
        self.get_by_id(COST_CENTER_PATH, id).await
    }

    async fn categories(&self) -> Result<PaginatedResponse<Category>> {
        self.dispatch(Method::GET, CATEGORY_PATH, "", true).await
    }

    async fn category(&self, id: i64) -> Result<Category> {
        self.get_by_id(CATEGORY_PATH, id).await
    }

    async fn payments(&self, filters: &PaymentFilters) -> Result<PaginatedResponse<Payment>> {
        self.list(PAYMENT_PATH, filters).await
    }

    async fn payment(&self, id: i64) -> Result<Payment> {
        self.get_by_id(PAYMENT_PATH, id).await
    }

    async fn receipts(&self, filters: &ReceiptFilters) -> Result<PaginatedResponse<Receipt>> {
        self.list(RECEIPT_PATH, filters).await
    }

    async fn receipt(&self, id: i64) -> Result<Receipt> {
        self.get_by_id(RECEIPT_PATH, id).await
    }
}
