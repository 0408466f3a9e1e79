use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use chrono::{DateTime, Duration, Utc};
use medcab_auth::{AccessToken, TokenStore};
use medcab_client::{ApiError, ErrorKind, ProtectedClient, RequestOptions, UnauthorizedSignal};
use medcab_config::AuthConfig;
use medcab_types::auth::{AuthTokens, Credentials, Registration};
use medcab_types::identity::{DoctorProfile, ProfileUpdate, ProfileUpdateResponse, User};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::error::SessionError;

const NAVIGATION_CAPACITY: usize = 16;

/// Shortest registration code the sign-up form accepts.
pub const MIN_REGISTRATION_CODE_LEN: usize = 10;

/// Where the views should go after a session transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Authenticated landing view.
    Dashboard,
    /// Sign-in view. `replace` drops the current entry from history.
    Login { replace: bool },
}

/// What `initialize` does when the profile fetch fails for a reason other
/// than an authorization failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProfileFailurePolicy {
    /// Tear the session down and send the user to sign in.
    #[default]
    Logout,
    /// Leave the persisted token in place so a later `initialize` can retry.
    /// The in-memory session stays unauthenticated.
    KeepSession,
}

/// Read-only copy of the session handed to views.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub authenticated: bool,
    pub loading: bool,
    pub user: Option<User>,
    pub profile: Option<DoctorProfile>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct SessionState {
    token: Option<AccessToken>,
    profile: Option<DoctorProfile>,
    user: Option<User>,
    loading: bool,
}

impl SessionState {
    fn establish(&mut self, token: AccessToken, profile: DoctorProfile) -> User {
        let user = User::from(&profile);
        self.token = Some(token);
        self.profile = Some(profile);
        self.user = Some(user.clone());
        user
    }

    fn reset(&mut self) {
        self.token = None;
        self.profile = None;
        self.user = None;
    }
}

/// Owner of the one authentication session of the running client.
///
/// All mutation goes through the operations below; views only ever see
/// clones through the read accessors.
pub struct SessionManager {
    client: ProtectedClient,
    auth: AuthConfig,
    policy: ProfileFailurePolicy,
    state: RwLock<SessionState>,
    navigation: broadcast::Sender<Navigation>,
}

impl SessionManager {
    pub fn new(client: ProtectedClient, auth: AuthConfig) -> Self {
        let (navigation, _) = broadcast::channel(NAVIGATION_CAPACITY);
        Self {
            client,
            auth,
            policy: ProfileFailurePolicy::default(),
            state: RwLock::new(SessionState::default()),
            navigation,
        }
    }

    pub fn with_profile_failure_policy(mut self, policy: ProfileFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn client(&self) -> &ProtectedClient {
        &self.client
    }

    fn store(&self) -> &Arc<dyn TokenStore> {
        self.client.store()
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn leeway(&self) -> Duration {
        let seconds = u32::try_from(self.auth.expiry_leeway_seconds).unwrap_or(u32::MAX);
        Duration::seconds(i64::from(seconds))
    }

    pub fn current_user(&self) -> Option<User> {
        self.read().user.clone()
    }

    pub fn current_profile(&self) -> Option<DoctorProfile> {
        self.read().profile.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.read().token.as_ref().map(|token| token.as_str().to_string())
    }

    /// A session is authenticated exactly when an identity is present.
    pub fn is_authenticated(&self) -> bool {
        self.read().user.is_some()
    }

    pub fn auth_is_loading(&self) -> bool {
        self.read().loading
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.read();
        SessionSnapshot {
            authenticated: state.user.is_some(),
            loading: state.loading,
            user: state.user.clone(),
            profile: state.profile.clone(),
            expires_at: state.token.as_ref().map(AccessToken::expires_at),
        }
    }

    pub fn subscribe_navigation(&self) -> broadcast::Receiver<Navigation> {
        self.navigation.subscribe()
    }

    /// Restore the session persisted by a previous run.
    ///
    /// A missing, malformed or expired token ends unauthenticated without
    /// touching the network. Only failures of the profile fetch other than
    /// authorization failures are returned as errors.
    pub async fn initialize(&self) -> Result<(), SessionError> {
        self.write().loading = true;
        let _loading = LoadingFlag(&self.state);
        self.restore().await
    }

    async fn restore(&self) -> Result<(), SessionError> {
        let Some(raw) = self.store().load()? else {
            debug!("no persisted token, starting unauthenticated");
            self.write().reset();
            return Ok(());
        };

        let token = match AccessToken::parse(raw) {
            Ok(token) => token,
            Err(error) => {
                warn!(%error, "discarding unreadable persisted token");
                self.logout()?;
                return Ok(());
            }
        };

        if token.is_expired(self.leeway()) {
            info!(expires_at = %token.expires_at(), "persisted token expired");
            self.logout()?;
            return Ok(());
        }

        match self.fetch_profile(&token).await {
            Ok(profile) => {
                let user = self.write().establish(token, profile);
                info!(user_id = user.id, "session restored");
                Ok(())
            }
            Err(error) if error.kind() == ErrorKind::Authorization => {
                info!(%error, "persisted token rejected by backend");
                self.logout()?;
                Ok(())
            }
            Err(error) => {
                warn!(%error, policy = ?self.policy, "profile fetch failed during startup");
                match self.policy {
                    ProfileFailurePolicy::Logout => self.logout()?,
                    ProfileFailurePolicy::KeepSession => self.write().reset(),
                }
                Err(error.into())
            }
        }
    }

    /// Exchange credentials for a session.
    ///
    /// On any failure nothing is persisted, the session stays
    /// unauthenticated and no navigation is emitted.
    pub async fn login(&self, credentials: &Credentials) -> Result<User, SessionError> {
        let options = RequestOptions::new(medcab_client::Method::POST).json(credentials)?;
        let tokens: AuthTokens = self
            .client
            .send_anonymous(&self.auth.login_path, options)
            .await?
            .ok_or(ApiError::EmptyResponse(medcab_client::StatusCode::NO_CONTENT))?;

        let token = AccessToken::parse(tokens.access)?;
        let profile = self.fetch_profile(&token).await?;

        self.store().save(token.as_str())?;
        let user = self.write().establish(token, profile);

        info!(user_id = user.id, email = %user.email, "signed in");
        self.navigate(Navigation::Dashboard);
        Ok(user)
    }

    /// Clear the persisted token and every piece of derived identity.
    ///
    /// Always emits `Navigation::Login { replace: true }`, also when no
    /// session was active.
    pub fn logout(&self) -> Result<(), SessionError> {
        let cleared = self.store().clear();
        let was_authenticated = {
            let mut state = self.write();
            let was_authenticated = state.user.is_some();
            state.reset();
            was_authenticated
        };

        if was_authenticated {
            info!("signed out");
        } else {
            debug!("logout without active session");
        }

        self.navigate(Navigation::Login { replace: true });
        cleared.map_err(SessionError::from)
    }

    /// Replace the profile and re-derive the current user. No network call.
    pub fn update_profile(&self, profile: DoctorProfile) -> Result<User, SessionError> {
        let mut state = self.write();
        if state.user.is_none() {
            return Err(SessionError::NotAuthenticated);
        }
        let user = User::from(&profile);
        state.profile = Some(profile);
        state.user = Some(user.clone());
        Ok(user)
    }

    /// Send a profile edit and apply what the backend stored.
    pub async fn submit_profile_update(&self, update: &ProfileUpdate) -> Result<User, SessionError> {
        if !self.is_authenticated() {
            return Err(SessionError::NotAuthenticated);
        }

        let response: ProfileUpdateResponse = self
            .client
            .put(&self.auth.profile_update_path, update)
            .await?;

        let mut profile = DoctorProfile::from(response);
        if profile.workplaces.is_none() {
            profile.workplaces = self.read().profile.as_ref().and_then(|p| p.workplaces.clone());
        }

        let user = self.update_profile(profile)?;
        debug!(user_id = user.id, "profile updated");
        Ok(user)
    }

    /// Create a doctor account, then send the user to sign in.
    pub async fn register(&self, registration: &Registration) -> Result<(), SessionError> {
        if registration.registration_code.trim().chars().count() < MIN_REGISTRATION_CODE_LEN {
            return Err(SessionError::InvalidRegistrationCode {
                min: MIN_REGISTRATION_CODE_LEN,
            });
        }

        let options = RequestOptions::new(medcab_client::Method::POST).json(registration)?;
        self.client
            .send_anonymous::<serde_json::Value>(&self.auth.register_path, options)
            .await?;

        info!(email = %registration.email, "doctor account registered");
        self.navigate(Navigation::Login { replace: true });
        Ok(())
    }

    /// Check the token's expiry locally before issuing a request. An expired
    /// token ends the session exactly like a rejected one.
    pub fn ensure_fresh(&self) -> Result<(), SessionError> {
        let expired = match self.read().token.as_ref() {
            Some(token) => token.is_expired(self.leeway()),
            None => return Err(SessionError::NotAuthenticated),
        };

        if expired {
            info!("access token expired locally");
            self.logout()?;
            return Err(SessionError::Expired);
        }
        Ok(())
    }

    /// Become the handler of authorization failures raised by the client.
    ///
    /// Every `401`/`403` on a bearer request logs out once, before the
    /// request returns its error. Returns `false` when a handler is already
    /// installed on the client.
    pub fn attach(self: &Arc<Self>) -> bool {
        let manager = Arc::downgrade(self);
        self.client
            .install_unauthorized_handler(Arc::new(move |signal: &UnauthorizedSignal| {
                force_logout(&manager, signal)
            }))
    }

    async fn fetch_profile(&self, token: &AccessToken) -> Result<DoctorProfile, ApiError> {
        self.client
            .get_with_token(&self.auth.profile_path, token.as_str())
            .await
    }

    fn navigate(&self, target: Navigation) {
        debug!(?target, "navigation requested");
        if self.navigation.send(target).is_err() {
            debug!("no navigation subscriber");
        }
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read();
        f.debug_struct("SessionManager")
            .field("authenticated", &state.user.is_some())
            .field("loading", &state.loading)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

fn force_logout(manager: &Weak<SessionManager>, signal: &UnauthorizedSignal) {
    let Some(manager) = manager.upgrade() else {
        debug!("session manager dropped, ignoring unauthorized signal");
        return;
    };

    info!(endpoint = %signal.endpoint, status = %signal.status, "forcing logout");
    if let Err(error) = manager.logout() {
        warn!(%error, "failed to clear persisted token");
    }
}

/// Clears the loading flag even when `initialize` is dropped mid-flight.
struct LoadingFlag<'a>(&'a RwLock<SessionState>);

impl Drop for LoadingFlag<'_> {
    fn drop(&mut self) {
        self.0
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .loading = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medcab_auth::MemoryTokenStore;
    use medcab_config::ApiConfig;

    fn manager(store: MemoryTokenStore) -> SessionManager {
        let client = ProtectedClient::new(&ApiConfig::default(), Arc::new(store))
            .expect("client should build");
        SessionManager::new(client, AuthConfig::default())
    }

    fn profile(full_name: &str) -> DoctorProfile {
        DoctorProfile {
            id: 1,
            full_name: full_name.into(),
            email: "doc@clinic.test".into(),
            specialty: None,
            license_number: None,
            phone_number: None,
            address: None,
            workplaces: None,
        }
    }

    #[test]
    fn fresh_manager_is_unauthenticated() {
        let manager = manager(MemoryTokenStore::new());
        let snapshot = manager.snapshot();
        assert!(!snapshot.authenticated);
        assert!(!snapshot.loading);
        assert!(snapshot.user.is_none());
        assert!(manager.token().is_none());
    }

    #[test]
    fn update_profile_requires_session() {
        let manager = manager(MemoryTokenStore::new());
        let err = manager
            .update_profile(profile("Nour Haddad"))
            .expect_err("no session to update");
        assert!(matches!(err, SessionError::NotAuthenticated));
        assert!(manager.current_profile().is_none());
    }

    #[test]
    fn ensure_fresh_without_token_is_not_authenticated() {
        let manager = manager(MemoryTokenStore::new());
        assert!(matches!(
            manager.ensure_fresh(),
            Err(SessionError::NotAuthenticated)
        ));
    }

    #[test]
    fn logout_emits_login_navigation_even_when_signed_out() {
        let manager = manager(MemoryTokenStore::with_token("leftover"));
        let mut navigation = manager.subscribe_navigation();

        manager.logout().expect("logout should succeed");

        assert_eq!(
            navigation.try_recv().ok(),
            Some(Navigation::Login { replace: true })
        );
        assert_eq!(manager.store().load().ok().flatten(), None);
    }
}
