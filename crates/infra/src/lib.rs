//! # CapexFlow Infrastructure
//!
//! Infrastructure implementations of the core ports.
//!
//! This crate contains:
//! - The Sienge HTTP client and request dispatcher
//! - Session lifecycle management (token exchange, proactive refresh,
//!   durable persistence)
//! - The cached read-side data service
//! - Configuration loading and tracing setup
//!
//! ## Architecture
//! - Implements traits defined in `capexflow-core`
//! - Depends on `capexflow-domain` and `capexflow-core`
//! - Contains all "impure" code (network I/O, filesystem, clocks)

pub mod auth;
pub mod config;
pub mod http;
pub mod observability;
pub mod services;
pub mod sienge;

// Re-export commonly used items
pub use auth::{FileSessionStore, MemorySessionStore, Session, SessionManager, SessionStore};
pub use http::HttpClient;
pub use services::FinanceDataService;
pub use sienge::{AccessTokenProvider, SiengeClient};
