//! Sienge integration port interfaces

use async_trait::async_trait;
use capexflow_domain::types::sienge::{
    BillCredit, BillCreditFilters, BillDebt, BillDebtFilters, Category, CostCenter,
    CostCenterFilters, PaginatedResponse, Payment, PaymentFilters, Receipt, ReceiptFilters,
    Supplier, SupplierFilters,
};
use capexflow_domain::Result;

/// Read-only gateway to the Sienge financial API.
///
/// The data service and dashboard layers depend on this trait rather than the
/// concrete HTTP client, so tests can substitute an in-memory gateway.
#[async_trait]
pub trait SiengeGateway: Send + Sync {
    /// List accounts payable matching the filters
    async fn bill_debts(&self, filters: &BillDebtFilters) -> Result<PaginatedResponse<BillDebt>>;

    /// Fetch a single account payable
    async fn bill_debt(&self, id: i64) -> Result<BillDebt>;

    /// List accounts receivable matching the filters
    async fn bill_credits(
        &self,
        filters: &BillCreditFilters,
    ) -> Result<PaginatedResponse<BillCredit>>;

    /// Fetch a single account receivable
    async fn bill_credit(&self, id: i64) -> Result<BillCredit>;

    /// List suppliers matching the filters
    async fn suppliers(&self, filters: &SupplierFilters) -> Result<PaginatedResponse<Supplier>>;

    /// Fetch a single supplier
    async fn supplier(&self, id: i64) -> Result<Supplier>;

    /// List cost centers matching the filters
    async fn cost_centers(
        &self,
        filters: &CostCenterFilters,
    ) -> Result<PaginatedResponse<CostCenter>>;

    /// Fetch a single cost center
    async fn cost_center(&self, id: i64) -> Result<CostCenter>;

    /// List all categories
    async fn categories(&self) -> Result<PaginatedResponse<Category>>;

    /// Fetch a single category
    async fn category(&self, id: i64) -> Result<Category>;

    /// List payments matching the filters
    async fn payments(&self, filters: &PaymentFilters) -> Result<PaginatedResponse<Payment>>;

    /// Fetch a single payment
    async fn payment(&self, id: i64) -> Result<Payment>;

    /// List receipts matching the filters
    async fn receipts(&self, filters: &ReceiptFilters) -> Result<PaginatedResponse<Receipt>>;

    /// Fetch a single receipt
    async fn receipt(&self, id: i64) -> Result<Receipt>;
}
