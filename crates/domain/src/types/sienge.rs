//! Sienge resource models
//!
//! Types mirroring the Sienge financial API (bill-debt/bill-credit v1
//! resource model). Wire format is camelCase JSON; dates arrive as ISO-8601
//! strings and are kept as strings, since the dashboard only displays and
//! aggregates them.

use serde::{Deserialize, Serialize};

/// Settlement status shared by payable and receivable bills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillStatus {
    Pending,
    Paid,
    Overdue,
    Cancelled,
}

/// Category classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CategoryKind {
    Expense,
    Revenue,
}

/// Embedded supplier reference on a bill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierRef {
    pub id: i64,
    pub name: String,
    pub document: String,
}

/// Embedded customer reference on a receivable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRef {
    pub id: i64,
    pub name: String,
    pub document: String,
}

/// Embedded cost-center reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostCenterRef {
    pub id: i64,
    pub code: String,
    pub name: String,
}

/// Embedded category reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: i64,
    pub name: String,
}

/// Account payable (bill debt)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillDebt {
    pub id: i64,
    pub code: String,
    pub description: String,
    pub amount: f64,
    pub due_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<String>,
    pub status: BillStatus,
    pub supplier: SupplierRef,
    pub cost_center: CostCenterRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Account receivable (bill credit)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillCredit {
    pub id: i64,
    pub code: String,
    pub description: String,
    pub amount: f64,
    pub due_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<String>,
    pub status: BillStatus,
    pub customer: CustomerRef,
    pub cost_center: CostCenterRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Postal address attached to a supplier record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

/// Supplier (fornecedor)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub document: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Cost center (centro de custo)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostCenter {
    pub id: i64,
    pub code: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_cost_center: Option<CostCenterRef>,
    pub created_at: String,
    pub updated_at: String,
}

/// Expense/revenue category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub code: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub active: bool,
    #[serde(rename = "type")]
    pub kind: CategoryKind,
    pub created_at: String,
    pub updated_at: String,
}

/// Payment against a bill debt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: i64,
    pub bill_id: i64,
    pub amount: f64,
    pub payment_date: String,
    pub payment_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
    pub created_at: String,
}

/// Receipt against a bill credit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub id: i64,
    pub bill_id: i64,
    pub amount: f64,
    pub receipt_date: String,
    pub receipt_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
    pub created_at: String,
}

/// Spring-style page envelope returned by every list endpoint.
///
/// Only the fields the dashboard consumes are modeled; unknown envelope
/// fields (sort descriptors etc.) are ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub content: Vec<T>,
    #[serde(default)]
    pub total_elements: i64,
    #[serde(default)]
    pub total_pages: i64,
    #[serde(default)]
    pub number_of_elements: i64,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub number: i64,
    #[serde(default)]
    pub first: bool,
    #[serde(default)]
    pub last: bool,
    #[serde(default)]
    pub empty: bool,
}

impl<T> PaginatedResponse<T> {
    /// Wrap a plain list in a single-page envelope. Used by tests and by
    /// callers that aggregate already-fetched pages.
    #[must_use]
    pub fn single_page(content: Vec<T>) -> Self {
        let len = content.len() as i64;
        Self {
            content,
            total_elements: len,
            total_pages: 1,
            number_of_elements: len,
            size: len,
            number: 0,
            first: true,
            last: true,
            empty: len == 0,
        }
    }
}

/// Error payload shape the Sienge API uses for non-2xx responses
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub error: Option<String>,
    pub message: String,
    #[serde(default)]
    pub path: Option<String>,
}

// ============================================================================
// Query filter sets
// ============================================================================
// One struct per list endpoint. `None` fields are omitted from the serialized
// query string entirely (never sent as `key=`).

/// Filters for the bill-debt list endpoint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BillDebtFilters {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub status: Option<String>,
    pub due_date_from: Option<String>,
    pub due_date_to: Option<String>,
    pub supplier_id: Option<i64>,
    pub cost_center_id: Option<i64>,
    pub category_id: Option<i64>,
    pub amount_from: Option<f64>,
    pub amount_to: Option<f64>,
}

/// Filters for the bill-credit list endpoint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BillCreditFilters {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub status: Option<String>,
    pub due_date_from: Option<String>,
    pub due_date_to: Option<String>,
    pub customer_id: Option<i64>,
    pub cost_center_id: Option<i64>,
    pub category_id: Option<i64>,
    pub amount_from: Option<f64>,
    pub amount_to: Option<f64>,
}

/// Filters for the supplier list endpoint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SupplierFilters {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub active: Option<bool>,
    pub search: Option<String>,
}

/// Filters for the cost-center list endpoint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CostCenterFilters {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub active: Option<bool>,
    pub search: Option<String>,
}

/// Filters for the payment list endpoint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentFilters {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub bill_id: Option<i64>,
    pub payment_date_from: Option<String>,
    pub payment_date_to: Option<String>,
}

/// Filters for the receipt list endpoint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReceiptFilters {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub bill_id: Option<i64>,
    pub receipt_date_from: Option<String>,
    pub receipt_date_to: Option<String>,
}
