//! Session lifecycle orchestration
//!
//! State machine: `Unauthenticated → Authenticated → NeedsRefresh →
//! Authenticated` (refresh success) or `→ Unauthenticated` (refresh failure,
//! forced logout). `logout()` transitions to `Unauthenticated` at any time
//! and cancels the proactive-refresh task.

use std::sync::Arc;

use capexflow_domain::{CapexFlowError, Result};
use capexflow_core::time::Clock;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::session::Session;
use super::store::SessionStore;
use super::token_client::TokenClient;

/// Shared state behind the manager. Split out so the background refresh task
/// can hold it without keeping the manager itself alive.
struct SessionCore {
    token_client: TokenClient,
    store: Arc<dyn SessionStore>,
    storage_key: String,
    clock: Arc<dyn Clock>,
    session: RwLock<Option<Session>>,
    /// Single-flight guard: concurrent callers that all observe a stale
    /// session serialize here, and only the first performs the exchange.
    refresh_lock: Mutex<()>,
}

impl SessionCore {
    async fn snapshot(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    async fn is_authenticated(&self) -> bool {
        let now = self.clock.now_utc();
        self.session.read().await.as_ref().is_some_and(|s| s.is_valid(now))
    }

    /// True when a refresh is due. An absent session counts: the next
    /// authenticated request must trigger an exchange.
    async fn needs_refresh(&self) -> bool {
        let now = self.clock.now_utc();
        self.session.read().await.as_ref().map_or(true, |s| s.needs_refresh(now))
    }

    /// Seconds until the proactive refresh is due, or `None` when there is no
    /// session to refresh.
    async fn seconds_until_refresh(&self) -> Option<i64> {
        let now = self.clock.now_utc();
        self.session.read().await.as_ref().map(|s| s.seconds_until_refresh(now))
    }

    /// Perform one credential exchange and install the resulting session.
    ///
    /// Must be called with `refresh_lock` held. A failed exchange forces a
    /// logout (memory and durable store cleared) before the error propagates.
    async fn exchange_and_install(&self) -> Result<Session> {
        let response = match self.token_client.fetch_token().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "credential exchange failed, clearing session");
                self.force_clear().await;
                return Err(e);
            }
        };

        let session = Session::from_response(response, self.clock.now_utc());

        // Persist before install so a restarted process never resurrects a
        // token the durable store does not know about.
        self.store.store(&self.storage_key, &session).await?;
        *self.session.write().await = Some(session.clone());

        info!(expires_in = session.expires_in, "session established");
        Ok(session)
    }

    /// Refresh the session iff still needed once the single-flight lock is
    /// acquired. Concurrent callers each observe the exchange performed by
    /// whichever caller entered first.
    async fn ensure_fresh(&self) -> Result<()> {
        if !self.needs_refresh().await {
            return Ok(());
        }

        let _guard = self.refresh_lock.lock().await;
        if self.needs_refresh().await {
            self.exchange_and_install().await?;
        }
        Ok(())
    }

    /// Clear in-memory and durable state. Store failures are logged, not
    /// propagated: this runs on failure paths that already carry an error.
    async fn force_clear(&self) {
        *self.session.write().await = None;
        if let Err(e) = self.store.delete(&self.storage_key).await {
            warn!(error = %e, "failed to delete persisted session");
        }
    }
}

/// Session manager for the Sienge API.
///
/// Owns the only live [`Session`] and keeps it fresh with zero caller
/// intervention: a background task re-authenticates shortly before expiry,
/// and every token hand-out re-checks freshness on demand. Construct once
/// and share via `Arc`.
pub struct SessionManager {
    core: Arc<SessionCore>,
    refresh_task: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl SessionManager {
    /// Create a new session manager.
    ///
    /// # Arguments
    /// * `token_client` - client performing the credential exchange
    /// * `store` - durable session store
    /// * `storage_key` - fixed key for the durable record (see
    ///   `capexflow_domain::constants::SESSION_STORAGE_KEY`)
    /// * `clock` - time source; inject a mock for deterministic tests
    #[must_use]
    pub fn new(
        token_client: TokenClient,
        store: Arc<dyn SessionStore>,
        storage_key: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            core: Arc::new(SessionCore {
                token_client,
                store,
                storage_key: storage_key.into(),
                clock,
                session: RwLock::new(None),
                refresh_lock: Mutex::new(()),
            }),
            refresh_task: std::sync::Mutex::new(None),
        }
    }

    /// Load a previously persisted session, if one exists and has not
    /// expired. Should be called on startup. Returns whether a session was
    /// restored; restoring also arms the proactive-refresh task.
    ///
    /// # Errors
    /// Returns an error only when the durable store itself fails.
    pub async fn initialize(&self) -> Result<bool> {
        match self.core.store.load(&self.core.storage_key).await? {
            Some(session) if session.is_valid(self.core.clock.now_utc()) => {
                *self.core.session.write().await = Some(session);
                self.restart_refresh_task();
                info!("restored persisted session");
                Ok(true)
            }
            Some(_) => {
                debug!("persisted session expired, discarding");
                self.core.store.delete(&self.core.storage_key).await?;
                Ok(false)
            }
            None => {
                debug!("no persisted session found");
                Ok(false)
            }
        }
    }

    /// Perform the credential exchange now, replacing any live session, and
    /// (re-)arm the proactive-refresh task.
    ///
    /// # Errors
    /// `Auth` when the exchange is rejected; transport errors pass through.
    /// A failure clears any previous session (forced logout).
    pub async fn authenticate(&self) -> Result<Session> {
        let session = {
            let _guard = self.core.refresh_lock.lock().await;
            self.core.exchange_and_install().await?
        };
        self.restart_refresh_task();
        Ok(session)
    }

    /// True iff a session exists and its token has not expired. A session
    /// inside the refresh margin is still authenticated.
    pub async fn is_authenticated(&self) -> bool {
        self.core.is_authenticated().await
    }

    /// Hand out a bearer token, re-authenticating first when the live
    /// session is stale or absent. This is what the request dispatcher calls
    /// before every authenticated request.
    ///
    /// # Errors
    /// Propagates the exchange failure when a needed refresh fails.
    pub async fn access_token(&self) -> Result<String> {
        self.core.ensure_fresh().await?;

        let session = self.core.session.read().await;
        session
            .as_ref()
            .map(|s| s.access_token.clone())
            .ok_or_else(|| CapexFlowError::Auth("not authenticated".to_string()))
    }

    /// Current session, if any (no refresh side effects)
    pub async fn session(&self) -> Option<Session> {
        self.core.snapshot().await
    }

    /// Clear the session everywhere: in memory, in the durable store, and
    /// the pending proactive refresh. Idempotent.
    ///
    /// # Errors
    /// Returns an error when the durable store deletion fails; memory and
    /// the scheduled refresh are cleared regardless.
    pub async fn logout(&self) -> Result<()> {
        self.abort_refresh_task();
        *self.core.session.write().await = None;
        self.core.store.delete(&self.core.storage_key).await?;
        info!("logged out");
        Ok(())
    }

    /// Replace the background refresh task with a fresh one for the current
    /// session. The previous task is aborted so a logged-out or replaced
    /// session can never be resurrected by a stale timer.
    fn restart_refresh_task(&self) {
        let core = Arc::clone(&self.core);
        let handle = tokio::spawn(run_refresh_loop(core));

        let mut slot = self.refresh_task.lock().expect("refresh task mutex poisoned");
        if let Some(previous) = slot.replace(handle) {
            previous.abort();
        }
    }

    fn abort_refresh_task(&self) {
        let mut slot = self.refresh_task.lock().expect("refresh task mutex poisoned");
        if let Some(task) = slot.take() {
            task.abort();
        }
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.refresh_task.lock() {
            if let Some(task) = slot.take() {
                task.abort();
            }
        }
    }
}

/// Background proactive-refresh loop.
///
/// Sleeps until the refresh margin of the current session, refreshes, and
/// recomputes from the new session. Exits when there is nothing to refresh:
/// no session (logged out, or a refresh failed and forced logout), or a
/// token whose lifetime is shorter than the margin. In the latter case no
/// timer is armed and freshness is enforced on demand by `access_token`.
async fn run_refresh_loop(core: Arc<SessionCore>) {
    loop {
        let Some(delay_secs) = core.seconds_until_refresh().await else {
            debug!("no session to refresh, stopping proactive refresh");
            return;
        };

        if delay_secs <= 0 {
            debug!("token lifetime within refresh margin, relying on on-demand refresh");
            return;
        }

        debug!(delay_secs, "proactive refresh armed");
        tokio::time::sleep(std::time::Duration::from_secs(delay_secs as u64)).await;

        match core.ensure_fresh().await {
            Ok(()) => continue,
            Err(e) => {
                // ensure_fresh already forced the logout.
                error!(error = %e, "proactive refresh failed");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use capexflow_core::time::{MockClock, SystemClock};
    use capexflow_domain::constants::SESSION_STORAGE_KEY;
    use capexflow_domain::{CredentialsGrant, SiengeConfig};
    use chrono::Utc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::super::store::MemorySessionStore;
    use super::*;

    fn config_for(base_url: String) -> SiengeConfig {
        SiengeConfig {
            base_url,
            grant: CredentialsGrant::ClientCredentials {
                client_id: "capexflow".to_string(),
                client_secret: "s3cret".to_string(),
            },
            scope: None,
            timeout_secs: 5,
        }
    }

    fn manager_for(base_url: String, store: Arc<dyn SessionStore>) -> SessionManager {
        let token_client = TokenClient::new(config_for(base_url)).expect("token client");
        SessionManager::new(token_client, store, SESSION_STORAGE_KEY, Arc::new(SystemClock))
    }

    fn token_body(token: &str, expires_in: i64) -> serde_json::Value {
        serde_json::json!({
            "access_token": token,
            "token_type": "Bearer",
            "expires_in": expires_in,
            "scope": "financial.read"
        })
    }

    #[tokio::test]
    async fn starts_unauthenticated() {
        let manager =
            manager_for("http://localhost:9".to_string(), Arc::new(MemorySessionStore::new()));
        assert!(!manager.is_authenticated().await);
    }

    #[tokio::test]
    async fn initialize_returns_false_on_empty_store() {
        let manager =
            manager_for("http://localhost:9".to_string(), Arc::new(MemorySessionStore::new()));
        assert!(!manager.initialize().await.expect("initialize"));
    }

    #[tokio::test]
    async fn authenticate_then_is_authenticated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok-1", 3600)))
            .expect(1)
            .mount(&server)
            .await;

        let manager = manager_for(server.uri(), Arc::new(MemorySessionStore::new()));
        let session = manager.authenticate().await.expect("authenticate");

        assert_eq!(session.access_token, "tok-1");
        assert!(manager.is_authenticated().await);
    }

    #[tokio::test]
    async fn failed_exchange_forces_logout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": "invalid_client"
            })))
            .mount(&server)
            .await;

        let store = Arc::new(MemorySessionStore::new());
        // Seed a session so the failure has something to clear.
        store
            .store(
                SESSION_STORAGE_KEY,
                &Session {
                    access_token: "stale".to_string(),
                    token_type: "Bearer".to_string(),
                    issued_at: Utc::now(),
                    expires_in: 3600,
                    scope: None,
                },
            )
            .await
            .expect("seed store");

        let manager = manager_for(server.uri(), store.clone());
        assert!(manager.initialize().await.expect("initialize"));

        let err = manager.authenticate().await.unwrap_err();
        assert!(matches!(err, CapexFlowError::Auth(_)));
        assert!(!manager.is_authenticated().await);
        assert_eq!(store.load(SESSION_STORAGE_KEY).await.expect("load"), None);
    }

    #[tokio::test]
    async fn initialize_discards_expired_sessions() {
        let store = Arc::new(MemorySessionStore::new());
        let clock = MockClock::new();
        let expired = Session {
            access_token: "old".to_string(),
            token_type: "Bearer".to_string(),
            issued_at: clock.now_utc() - chrono::Duration::seconds(7200),
            expires_in: 3600,
            scope: None,
        };
        store.store(SESSION_STORAGE_KEY, &expired).await.expect("seed store");

        let token_client =
            TokenClient::new(config_for("http://localhost:9".to_string())).expect("token client");
        let manager = SessionManager::new(
            token_client,
            store.clone(),
            SESSION_STORAGE_KEY,
            Arc::new(clock),
        );

        assert!(!manager.initialize().await.expect("initialize"));
        assert!(!manager.is_authenticated().await);
        assert_eq!(store.load(SESSION_STORAGE_KEY).await.expect("load"), None);
    }

    #[tokio::test]
    async fn logout_is_idempotent() {
        let manager =
            manager_for("http://localhost:9".to_string(), Arc::new(MemorySessionStore::new()));
        manager.logout().await.expect("first logout");
        manager.logout().await.expect("second logout");
        assert!(!manager.is_authenticated().await);
    }
}
