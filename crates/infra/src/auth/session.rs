//! Session state and expiry math

use capexflow_domain::constants::TOKEN_REFRESH_MARGIN_SECS;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A live bearer token with its expiry metadata.
///
/// At most one Session exists per manager; a successful authentication
/// atomically replaces the previous one. The same shape is what gets
/// JSON-encoded into the durable store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token for API authentication
    pub access_token: String,

    /// Token type (always "Bearer" in practice)
    pub token_type: String,

    /// Wall-clock time the token was issued (recorded locally)
    pub issued_at: DateTime<Utc>,

    /// Token lifetime in seconds, as reported by the server
    pub expires_in: i64,

    /// Granted scopes, if the server reported them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl Session {
    /// Build a Session from a token response, stamping `issued_at` with the
    /// provided wall-clock time.
    #[must_use]
    pub fn from_response(response: TokenResponse, issued_at: DateTime<Utc>) -> Self {
        Self {
            access_token: response.access_token,
            token_type: response.token_type.unwrap_or_else(|| "Bearer".to_string()),
            issued_at,
            expires_in: response.expires_in,
            scope: response.scope,
        }
    }

    /// Absolute expiry timestamp
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.issued_at + chrono::Duration::seconds(self.expires_in)
    }

    /// True while the token has not yet expired
    #[must_use]
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at()
    }

    /// True once `now` has entered the refresh margin before expiry.
    /// The margin is fixed at 300 seconds.
    #[must_use]
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at() - chrono::Duration::seconds(TOKEN_REFRESH_MARGIN_SECS)
    }

    /// Seconds from `now` until the refresh margin is reached, rounded up
    /// to whole seconds so a sleep of this length always lands past the
    /// margin. Zero or negative when the refresh is already due.
    #[must_use]
    pub fn seconds_until_refresh(&self, now: DateTime<Utc>) -> i64 {
        let remaining =
            self.expires_at() - chrono::Duration::seconds(TOKEN_REFRESH_MARGIN_SECS) - now;
        let ms = remaining.num_milliseconds();
        let secs = ms / 1_000;
        if ms % 1_000 > 0 {
            secs + 1
        } else {
            secs
        }
    }
}

/// Token response from the Sienge token endpoint.
///
/// Field aliases cover the two response shapes seen across deployments
/// (`access_token` vs `token`, `expires_in` vs `expiresIn`).
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    #[serde(alias = "token")]
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(alias = "expiresIn")]
    pub expires_in: i64,
    #[serde(default)]
    pub scope: Option<String>,
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use capexflow_core::time::{Clock, MockClock};

    use super::*;

    fn session_with(expires_in: i64, issued_at: DateTime<Utc>) -> Session {
        Session {
            access_token: "tok".to_string(),
            token_type: "Bearer".to_string(),
            issued_at,
            expires_in,
            scope: None,
        }
    }

    #[test]
    fn refresh_margin_boundary_is_300_seconds_before_expiry() {
        let clock = MockClock::new();
        let session = session_with(3600, clock.now_utc());

        // One second before the margin: still fresh.
        clock.advance(Duration::from_secs(3600 - 301));
        assert!(!session.needs_refresh(clock.now_utc()));
        assert_eq!(session.seconds_until_refresh(clock.now_utc()), 1);

        // Two seconds later, one second past the margin: refresh due.
        clock.advance(Duration::from_secs(2));
        assert!(session.needs_refresh(clock.now_utc()));
    }

    #[test]
    fn is_valid_ignores_the_refresh_margin() {
        let clock = MockClock::new();
        let session = session_with(3600, clock.now_utc());

        // Inside the margin but before expiry: refresh is due, token still valid.
        clock.advance(Duration::from_secs(3600 - 100));
        assert!(session.needs_refresh(clock.now_utc()));
        assert!(session.is_valid(clock.now_utc()));

        clock.advance(Duration::from_secs(101));
        assert!(!session.is_valid(clock.now_utc()));
    }

    #[test]
    fn short_lived_tokens_need_refresh_immediately() {
        let clock = MockClock::new();
        let session = session_with(120, clock.now_utc());

        assert!(session.needs_refresh(clock.now_utc()));
        assert!(session.seconds_until_refresh(clock.now_utc()) <= 0);
    }

    #[test]
    fn from_response_defaults_token_type_to_bearer() {
        let response: TokenResponse = serde_json::from_str(
            r#"{"access_token": "abc", "expires_in": 3600}"#,
        )
        .expect("valid response");
        let session = Session::from_response(response, Utc::now());

        assert_eq!(session.token_type, "Bearer");
        assert_eq!(session.expires_in, 3600);
    }

    #[test]
    fn token_response_accepts_alternate_field_names() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"token": "abc", "expiresIn": 900}"#).expect("valid response");
        assert_eq!(response.access_token, "abc");
        assert_eq!(response.expires_in, 900);
    }

    #[test]
    fn session_round_trips_through_json() {
        let session = session_with(3600, Utc::now());
        let json = serde_json::to_string(&session).expect("serialize");
        let back: Session = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, session);
    }
}
