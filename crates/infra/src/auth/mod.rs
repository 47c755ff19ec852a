//! Sienge session lifecycle
//!
//! Owns the bearer token from acquisition to disposal:
//! - Credential exchange against the token endpoint (grant shape is a
//!   configuration decision, see [`capexflow_domain::CredentialsGrant`])
//! - Expiry tracking with a 5-minute proactive refresh margin
//! - A background refresh task that wakes just before the margin, is
//!   replaced on re-authentication, and is cancelled on logout
//! - Durable persistence so a restarted process resumes its session
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────┐
//! │ SessionManager │  Lifecycle orchestrator (single-flight refresh)
//! └───────┬────────┘
//!         ├──► TokenClient    (HTTP credential exchange)
//!         ├──► SessionStore   (durable persistence, fixed storage key)
//!         └──► Clock          (injectable time source)
//! ```
//!
//! The manager is constructed once by the hosting application and shared via
//! `Arc`; consumers only read `is_authenticated()` or request tokens.

pub mod manager;
pub mod session;
pub mod store;
pub mod token_client;

pub use manager::SessionManager;
pub use session::{Session, TokenResponse};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore};
pub use token_client::TokenClient;
