//! Canonical query-string serialization for filter sets
//!
//! Fields are emitted in declaration order and absent (`None`) fields are
//! omitted entirely, never sent as `key=`. Field-wise-equal filters always
//! produce the same string: the data service uses it as a cache key.

use capexflow_domain::types::sienge::{
    BillCreditFilters, BillDebtFilters, CostCenterFilters, PaymentFilters, ReceiptFilters,
    SupplierFilters,
};
use url::form_urlencoded;

/// A filter set that can be rendered as query-string pairs.
///
/// Implementations list their fields in a fixed declared order; values are
/// already stringified (booleans as `true`/`false`, numbers in decimal form).
pub trait QueryParams {
    fn query_pairs(&self) -> Vec<(&'static str, String)>;
}

/// Serialize a filter set into a percent-encoded query string (no leading
/// `?`). An empty filter set produces an empty string.
#[must_use]
pub fn to_query_string<Q: QueryParams>(filters: &Q) -> String {
    let pairs = filters.query_pairs();
    if pairs.is_empty() {
        return String::new();
    }

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        serializer.append_pair(key, &value);
    }
    serializer.finish()
}

fn push<T: ToString>(pairs: &mut Vec<(&'static str, String)>, key: &'static str, value: &Option<T>) {
    if let Some(value) = value {
        pairs.push((key, value.to_string()));
    }
}

impl QueryParams for BillDebtFilters {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push(&mut pairs, "page", &self.page);
        push(&mut pairs, "size", &self.size);
        push(&mut pairs, "status", &self.status);
        push(&mut pairs, "dueDateFrom", &self.due_date_from);
        push(&mut pairs, "dueDateTo", &self.due_date_to);
        push(&mut pairs, "supplierId", &self.supplier_id);
        push(&mut pairs, "costCenterId", &self.cost_center_id);
        push(&mut pairs, "categoryId", &self.category_id);
        push(&mut pairs, "amountFrom", &self.amount_from);
        push(&mut pairs, "amountTo", &self.amount_to);
        pairs
    }
}

impl QueryParams for BillCreditFilters {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push(&mut pairs, "page", &self.page);
        push(&mut pairs, "size", &self.size);
        push(&mut pairs, "status", &self.status);
        push(&mut pairs, "dueDateFrom", &self.due_date_from);
        push(&mut pairs, "dueDateTo", &self.due_date_to);
        push(&mut pairs, "customerId", &self.customer_id);
        push(&mut pairs, "costCenterId", &self.cost_center_id);
        push(&mut pairs, "categoryId", &self.category_id);
        push(&mut pairs, "amountFrom", &self.amount_from);
        push(&mut pairs, "amountTo", &self.amount_to);
        pairs
    }
}

impl QueryParams for SupplierFilters {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push(&mut pairs, "page", &self.page);
        push(&mut pairs, "size", &self.size);
        push(&mut pairs, "active", &self.active);
        push(&mut pairs, "search", &self.search);
        pairs
    }
}

impl QueryParams for CostCenterFilters {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push(&mut pairs, "page", &self.page);
        push(&mut pairs, "size", &self.size);
        push(&mut pairs, "active", &self.active);
        push(&mut pairs, "search", &self.search);
        pairs
    }
}

impl QueryParams for PaymentFilters {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push(&mut pairs, "page", &self.page);
        push(&mut pairs, "size", &self.size);
        push(&mut pairs, "billId", &self.bill_id);
        push(&mut pairs, "paymentDateFrom", &self.payment_date_from);
        push(&mut pairs, "paymentDateTo", &self.payment_date_to);
        pairs
    }
}

impl QueryParams for ReceiptFilters {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push(&mut pairs, "page", &self.page);
        push(&mut pairs, "size", &self.size);
        push(&mut pairs, "billId", &self.bill_id);
        push(&mut pairs, "receiptDateFrom", &self.receipt_date_from);
        push(&mut pairs, "receiptDateTo", &self.receipt_date_to);
        pairs
    }
}
