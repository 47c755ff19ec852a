//! Financial statistics aggregation
//!
//! Pure computation over already-fetched Sienge data; the KPI cards on the
//! dashboard render straight from [`FinancialStats`].

use capexflow_domain::types::sienge::{BillCredit, BillDebt, BillStatus, Payment, Receipt};
use capexflow_domain::types::stats::FinancialStats;

/// Aggregate payables, receivables, payments and receipts into dashboard
/// statistics.
///
/// Cancelled bills still count toward the grand totals (they were committed
/// spend at some point) but never toward pending/overdue buckets.
#[must_use]
pub fn compute_financial_stats(
    debts: &[BillDebt],
    credits: &[BillCredit],
    payments: &[Payment],
    receipts: &[Receipt],
) -> FinancialStats {
    let mut stats = FinancialStats::default();

    for credit in credits {
        stats.total_receivables += credit.amount;
        match credit.status {
            BillStatus::Pending => stats.pending_receivables += credit.amount,
            BillStatus::Overdue => stats.overdue_receivables += credit.amount,
            BillStatus::Paid | BillStatus::Cancelled => {}
        }
    }

    for debt in debts {
        stats.total_payables += debt.amount;
        match debt.status {
            BillStatus::Pending => stats.pending_payables += debt.amount,
            BillStatus::Overdue => stats.overdue_payables += debt.amount,
            BillStatus::Paid | BillStatus::Cancelled => {}
        }
    }

    stats.total_payments = payments.len() as u64;
    if !payments.is_empty() {
        let total: f64 = payments.iter().map(|p| p.amount).sum();
        stats.average_payment_amount = total / payments.len() as f64;
    }

    stats.total_receipts = receipts.len() as u64;
    if !receipts.is_empty() {
        let total: f64 = receipts.iter().map(|r| r.amount).sum();
        stats.average_receipt_amount = total / receipts.len() as f64;
    }

    stats
}
