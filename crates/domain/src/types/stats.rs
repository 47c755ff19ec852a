//! Aggregated financial statistics

use serde::{Deserialize, Serialize};

/// Dashboard-level aggregates over payables, receivables, payments and
/// receipts. Produced by `capexflow-core`'s stats service; consumed by the
/// KPI widgets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialStats {
    pub total_receivables: f64,
    pub total_payables: f64,
    pub pending_receivables: f64,
    pub pending_payables: f64,
    pub overdue_receivables: f64,
    pub overdue_payables: f64,
    pub total_payments: u64,
    pub total_receipts: u64,
    pub average_payment_amount: f64,
    pub average_receipt_amount: f64,
}
