//! Application services

pub mod data_service;

pub use data_service::{DashboardSnapshot, FinanceDataService, RetryPolicy, StalenessConfig};
