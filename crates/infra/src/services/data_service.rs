//! Cached read-side over the Sienge gateway
//!
//! Consumers never call the gateway directly: this service adds the two
//! policies the dispatcher does not have:
//! - time-based staleness caching, keyed by `(resource, canonical query
//!   string)`, with one TTL tier per data class
//! - a bounded retry with capped exponential backoff, applied to transient
//!   failures only
//!
//! Transactional data (bills, payments, receipts) goes stale in 2 minutes,
//! master data (suppliers, cost centers) in 5, near-static data (categories)
//! in 10.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use capexflow_core::sienge_ports::SiengeGateway;
use capexflow_core::stats::compute_financial_stats;
use capexflow_domain::constants::{
    MASTER_DATA_STALE_SECS, MAX_FETCH_ATTEMPTS, RETRY_BACKOFF_BASE_MS, RETRY_BACKOFF_CAP_MS,
    STATIC_DATA_STALE_SECS, TRANSACTIONAL_STALE_SECS,
};
use capexflow_domain::types::sienge::{
    BillCredit, BillCreditFilters, BillDebt, BillDebtFilters, Category, CostCenter,
    CostCenterFilters, PaginatedResponse, Payment, PaymentFilters, Receipt, ReceiptFilters,
    Supplier, SupplierFilters,
};
use capexflow_domain::types::stats::FinancialStats;
use capexflow_domain::Result;
use moka::sync::Cache;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::sienge::errors::SiengeErrorCategory;
use crate::sienge::query::{to_query_string, QueryParams};

/// Staleness windows per data class
#[derive(Debug, Clone)]
pub struct StalenessConfig {
    pub transactional: Duration,
    pub master_data: Duration,
    pub static_data: Duration,
}

impl Default for StalenessConfig {
    fn default() -> Self {
        Self {
            transactional: Duration::from_secs(TRANSACTIONAL_STALE_SECS),
            master_data: Duration::from_secs(MASTER_DATA_STALE_SECS),
            static_data: Duration::from_secs(STATIC_DATA_STALE_SECS),
        }
    }
}

/// Retry policy for transient gateway failures
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts (initial try + retries)
    pub max_attempts: usize,
    pub base_backoff: Duration,
    pub backoff_cap: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_FETCH_ATTEMPTS,
            base_backoff: Duration::from_millis(RETRY_BACKOFF_BASE_MS),
            backoff_cap: Duration::from_millis(RETRY_BACKOFF_CAP_MS),
        }
    }
}

impl RetryPolicy {
    fn delay_for(&self, retry_number: usize) -> Duration {
        let shift = retry_number.saturating_sub(1).min(8) as u32;
        let multiplier = 1u32 << shift;
        self.base_backoff.saturating_mul(multiplier).min(self.backoff_cap)
    }
}

const CACHE_MAX_CAPACITY: u64 = 1_000;

/// Everything the dashboard renders in one refresh cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub bill_debts: Vec<BillDebt>,
    pub bill_credits: Vec<BillCredit>,
    pub suppliers: Vec<Supplier>,
    pub cost_centers: Vec<CostCenter>,
    pub categories: Vec<Category>,
    pub payments: Vec<Payment>,
    pub receipts: Vec<Receipt>,
}

/// Cached, retrying read-side over a [`SiengeGateway`]
pub struct FinanceDataService {
    gateway: Arc<dyn SiengeGateway>,
    retry: RetryPolicy,
    transactional: Cache<String, Arc<serde_json::Value>>,
    master_data: Cache<String, Arc<serde_json::Value>>,
    static_data: Cache<String, Arc<serde_json::Value>>,
}

impl FinanceDataService {
    /// Create a service with the default staleness tiers and retry policy.
    #[must_use]
    pub fn new(gateway: Arc<dyn SiengeGateway>) -> Self {
        Self::with_policies(gateway, StalenessConfig::default(), RetryPolicy::default())
    }

    /// Create a service with custom policies (used by tests to shrink
    /// backoff delays and TTLs).
    #[must_use]
    pub fn with_policies(
        gateway: Arc<dyn SiengeGateway>,
        staleness: StalenessConfig,
        retry: RetryPolicy,
    ) -> Self {
        let cache = |ttl: Duration| {
            Cache::builder().max_capacity(CACHE_MAX_CAPACITY).time_to_live(ttl).build()
        };

        Self {
            gateway,
            retry,
            transactional: cache(staleness.transactional),
            master_data: cache(staleness.master_data),
            static_data: cache(staleness.static_data),
        }
    }

    /// Drop every cached response. The next call per key goes upstream.
    pub fn invalidate_all(&self) {
        self.transactional.invalidate_all();
        self.master_data.invalidate_all();
        self.static_data.invalidate_all();
    }

    // ------------------------------------------------------------------
    // Transactional data (2 min staleness)
    // ------------------------------------------------------------------

    pub async fn bill_debts(
        &self,
        filters: &BillDebtFilters,
    ) -> Result<PaginatedResponse<BillDebt>> {
        let key = cache_key("bill-debts", filters);
        self.get_or_fetch(&self.transactional, key, || self.gateway.bill_debts(filters)).await
    }

    pub async fn bill_debt(&self, id: i64) -> Result<BillDebt> {
        let key = format!("bill-debt/{id}");
        self.get_or_fetch(&self.transactional, key, || self.gateway.bill_debt(id)).await
    }

    pub async fn bill_credits(
        &self,
        filters: &BillCreditFilters,
    ) -> Result<PaginatedResponse<BillCredit>> {
        let key = cache_key("bill-credits", filters);
        self.get_or_fetch(&self.transactional, key, || self.gateway.bill_credits(filters)).await
    }

    pub async fn bill_credit(&self, id: i64) -> Result<BillCredit> {
        let key = format!("bill-credit/{id}");
        self.get_or_fetch(&self.transactional, key, || self.gateway.bill_credit(id)).await
    }

    pub async fn payments(&self, filters: &PaymentFilters) -> Result<PaginatedResponse<Payment>> {
        let key = cache_key("payments", filters);
        self.get_or_fetch(&self.transactional, key, || self.gateway.payments(filters)).await
    }

    pub async fn payment(&self, id: i64) -> Result<Payment> {
        let key = format!("payment/{id}");
        self.get_or_fetch(&self.transactional, key, || self.gateway.payment(id)).await
    }

    pub async fn receipts(&self, filters: &ReceiptFilters) -> Result<PaginatedResponse<Receipt>> {
        let key = cache_key("receipts", filters);
        self.get_or_fetch(&self.transactional, key, || self.gateway.receipts(filters)).await
    }

    pub async fn receipt(&self, id: i64) -> Result<Receipt> {
        let key = format!("receipt/{id}");
        self.get_or_fetch(&self.transactional, key, || self.gateway.receipt(id)).await
    }

    // ------------------------------------------------------------------
    // Master data (5 min staleness)
    // ------------------------------------------------------------------

    pub async fn suppliers(&self, filters: &SupplierFilters) -> Result<PaginatedResponse<Supplier>> {
        let key = cache_key("suppliers", filters);
        self.get_or_fetch(&self.master_data, key, || self.gateway.suppliers(filters)).await
    }

    pub async fn supplier(&self, id: i64) -> Result<Supplier> {
        let key = format!("supplier/{id}");
        self.get_or_fetch(&self.master_data, key, || self.gateway.supplier(id)).await
    }

    pub async fn cost_centers(
        &self,
        filters: &CostCenterFilters,
    ) -> Result<PaginatedResponse<CostCenter>> {
        let key = cache_key("cost-centers", filters);
        self.get_or_fetch(&self.master_data, key, || self.gateway.cost_centers(filters)).await
    }

    pub async fn cost_center(&self, id: i64) -> Result<CostCenter> {
        let key = format!("cost-center/{id}");
        self.get_or_fetch(&self.master_data, key, || self.gateway.cost_center(id)).await
    }

    // ------------------------------------------------------------------
    // Near-static data (10 min staleness)
    // ------------------------------------------------------------------

    pub async fn categories(&self) -> Result<PaginatedResponse<Category>> {
        self.get_or_fetch(&self.static_data, "categories".to_string(), || {
            self.gateway.categories()
        })
        .await
    }

    pub async fn category(&self, id: i64) -> Result<Category> {
        let key = format!("category/{id}");
        self.get_or_fetch(&self.static_data, key, || self.gateway.category(id)).await
    }

    // ------------------------------------------------------------------
    // Aggregates
    // ------------------------------------------------------------------

    /// Fetch everything the dashboard shows in one concurrent sweep,
    /// failing fast on the first unrecoverable error.
    pub async fn dashboard_snapshot(&self) -> Result<DashboardSnapshot> {
        let page_of_100 = Some(100);

        let bill_debt_filters = BillDebtFilters { size: page_of_100, ..Default::default() };
        let bill_credit_filters = BillCreditFilters { size: page_of_100, ..Default::default() };
        let supplier_filters = SupplierFilters { size: page_of_100, ..Default::default() };
        let cost_center_filters = CostCenterFilters { size: page_of_100, ..Default::default() };
        let payment_filters = PaymentFilters { size: page_of_100, ..Default::default() };
        let receipt_filters = ReceiptFilters { size: page_of_100, ..Default::default() };

        let (bill_debts, bill_credits, suppliers, cost_centers, categories, payments, receipts) =
            futures::try_join!(
                self.bill_debts(&bill_debt_filters),
                self.bill_credits(&bill_credit_filters),
                self.suppliers(&supplier_filters),
                self.cost_centers(&cost_center_filters),
                self.categories(),
                self.payments(&payment_filters),
                self.receipts(&receipt_filters),
            )?;

        Ok(DashboardSnapshot {
            bill_debts: bill_debts.content,
            bill_credits: bill_credits.content,
            suppliers: suppliers.content,
            cost_centers: cost_centers.content,
            categories: categories.content,
            payments: payments.content,
            receipts: receipts.content,
        })
    }

    /// Aggregate KPI statistics over the first thousand bills, payments and
    /// receipts.
    pub async fn financial_stats(&self) -> Result<FinancialStats> {
        let page_of_1000 = Some(1_000);

        let bill_debt_filters = BillDebtFilters { size: page_of_1000, ..Default::default() };
        let bill_credit_filters = BillCreditFilters { size: page_of_1000, ..Default::default() };
        let payment_filters = PaymentFilters { size: page_of_1000, ..Default::default() };
        let receipt_filters = ReceiptFilters { size: page_of_1000, ..Default::default() };

        let (bill_debts, bill_credits, payments, receipts) = futures::try_join!(
            self.bill_debts(&bill_debt_filters),
            self.bill_credits(&bill_credit_filters),
            self.payments(&payment_filters),
            self.receipts(&receipt_filters),
        )?;

        Ok(compute_financial_stats(
            &bill_debts.content,
            &bill_credits.content,
            &payments.content,
            &receipts.content,
        ))
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    async fn get_or_fetch<T, F, Fut>(
        &self,
        cache: &Cache<String, Arc<serde_json::Value>>,
        key: String,
        fetch: F,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(cached) = cache.get(&key) {
            match serde_json::from_value::<T>((*cached).clone()) {
                Ok(value) => {
                    debug!(key, "serving cached response");
                    return Ok(value);
                }
                Err(e) => {
                    debug!(key, error = %e, "evicting undecodable cache entry");
                    cache.invalidate(&key);
                }
            }
        }

        let value = self.fetch_with_retry(&key, fetch).await?;

        match serde_json::to_value(&value) {
            Ok(json) => cache.insert(key, Arc::new(json)),
            // A cache-encoding failure must not fail the fetch itself.
            Err(e) => warn!(error = %e, "failed to cache response"),
        }

        Ok(value)
    }

    async fn fetch_with_retry<T, F, Fut>(&self, key: &str, fetch: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match fetch().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    let retryable = SiengeErrorCategory::classify(&e).is_retryable();
                    if !retryable || attempt >= self.retry.max_attempts {
                        return Err(e);
                    }

                    let delay = self.retry.delay_for(attempt);
                    warn!(key, attempt, error = %e, delay_ms = delay.as_millis() as u64,
                        "transient Sienge failure, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

fn cache_key<Q: QueryParams>(resource: &str, filters: &Q) -> String {
    format!("{resource}?{}", to_query_string(filters))
}
