//! Sienge API integration
//!
//! The request dispatcher, typed resource operations, filter serialization
//! and error classification for the Sienge financial API.

pub mod client;
pub mod errors;
pub mod query;

pub use client::{AccessTokenProvider, SiengeClient};
pub use errors::{SiengeError, SiengeErrorCategory};
pub use query::{to_query_string, QueryParams};
