//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Session lifecycle
pub const TOKEN_REFRESH_MARGIN_SECS: i64 = 300; // re-authenticate 5 min before expiry
pub const SESSION_STORAGE_KEY: &str = "sienge_session";

// Request dispatch
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// Data-service staleness tiers
pub const TRANSACTIONAL_STALE_SECS: u64 = 120; // bills, payments, receipts
pub const MASTER_DATA_STALE_SECS: u64 = 300; // suppliers, cost centers
pub const STATIC_DATA_STALE_SECS: u64 = 600; // categories

// Data-service retry policy (transient failures only)
pub const MAX_FETCH_ATTEMPTS: usize = 3;
pub const RETRY_BACKOFF_BASE_MS: u64 = 1_000;
pub const RETRY_BACKOFF_CAP_MS: u64 = 30_000;
