//! Session store: credential lifecycle and the login/registration flow.
//!
//! # Responsibility
//! - Own the [`Credential`] and its persisted copy.
//! - Run login and registration against the remote API.
//! - Hold the account profile while authenticated.
//!
//! # Invariants
//! - `authenticated` is derived from the credential, never stored.
//! - A stored token at construction starts the store authenticated with no
//!   network round trip.
//! - Login/register failures are returned as values; nothing is left unhandled.
//! - Logout and invalidation bump the generation so late completions are dropped.

use super::{lock, RequestSlot, SlotGuard};
use crate::api::{ApiError, NoteApi, RegisterRequest};
use crate::error::OperationError;
use crate::logging::sanitize_for_log;
use crate::model::credential::{BearerToken, Credential};
use crate::model::user::{display_name_from_email, UserProfile};
use crate::persist::TokenStore;
use log::{debug, info, warn};
use std::sync::{Arc, Mutex};
use std::time::Instant;

pub const REGISTRATION_NOTICE: &str = "Registration successful! Please login.";

/// Observable authentication phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    Anonymous,
    /// Login or registration request in flight.
    Authenticating,
    Authenticated,
}

/// Which form the anonymous screen shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthForm {
    #[default]
    Login,
    Register,
}

/// Successful (or skipped) auth intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    LoggedIn,
    Registered { notice: &'static str },
    /// Another auth request is already in flight.
    Busy,
    /// The session was torn down while the request was in flight.
    Stale,
}

/// Result of a profile load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileOutcome {
    Loaded,
    Anonymous,
    Busy,
    Stale,
    Failed(ApiError),
}

#[derive(Debug, Default)]
struct SessionState {
    credential: Credential,
    form: AuthForm,
    profile: Option<UserProfile>,
    slot: RequestSlot,
    generation: u64,
}

fn session_slot(state: &mut SessionState) -> &mut RequestSlot {
    &mut state.slot
}

/// Owner of the credential.
pub struct SessionStore<A: NoteApi> {
    api: Arc<A>,
    tokens: Arc<dyn TokenStore>,
    state: Mutex<SessionState>,
}

impl<A: NoteApi> SessionStore<A> {
    /// Creates the store, restoring a previously persisted token if present.
    ///
    /// An unreadable persisted entry is logged and treated as absent.
    pub fn new(api: Arc<A>, tokens: Arc<dyn TokenStore>) -> Self {
        let credential = match tokens.load() {
            Ok(Some(token)) => {
                info!("event=session_restore module=session status=ok");
                Credential::with_token(token)
            }
            Ok(None) => Credential::anonymous(),
            Err(err) => {
                warn!(
                    "event=session_restore module=session status=error error={}",
                    err
                );
                Credential::anonymous()
            }
        };

        Self {
            api,
            tokens,
            state: Mutex::new(SessionState {
                credential,
                ..SessionState::default()
            }),
        }
    }

    pub fn phase(&self) -> AuthPhase {
        let state = lock(&self.state);
        if state.credential.is_authenticated() {
            AuthPhase::Authenticated
        } else if state.slot.is_busy() {
            AuthPhase::Authenticating
        } else {
            AuthPhase::Anonymous
        }
    }

    pub fn is_authenticated(&self) -> bool {
        lock(&self.state).credential.is_authenticated()
    }

    pub fn token(&self) -> Option<BearerToken> {
        lock(&self.state).credential.token().cloned()
    }

    pub fn is_pending(&self) -> bool {
        lock(&self.state).slot.is_busy()
    }

    pub fn form(&self) -> AuthForm {
        lock(&self.state).form
    }

    pub fn profile(&self) -> Option<UserProfile> {
        lock(&self.state).profile.clone()
    }

    /// Flips between the login and registration forms.
    pub fn toggle_form(&self) -> AuthForm {
        let mut state = lock(&self.state);
        state.form = match state.form {
            AuthForm::Login => AuthForm::Register,
            AuthForm::Register => AuthForm::Login,
        };
        state.form
    }

    /// Registers a new account; the display name is the email's local part.
    ///
    /// Success returns the informational notice and switches to the login form.
    pub async fn register(&self, email: &str, password: &str) -> Result<AuthOutcome, OperationError> {
        let Some(_guard) = SlotGuard::acquire(&self.state, session_slot) else {
            debug!("event=register module=session status=skipped reason=busy");
            return Ok(AuthOutcome::Busy);
        };
        let generation = lock(&self.state).generation;
        let started_at = Instant::now();
        info!("event=register module=session status=start");

        let request = RegisterRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
            full_name: display_name_from_email(email),
        };
        let result = self.api.register(&request).await;

        let mut state = lock(&self.state);
        if state.generation != generation {
            info!("event=register module=session status=skipped reason=stale");
            return Ok(AuthOutcome::Stale);
        }
        match result {
            Ok(()) => {
                state.form = AuthForm::Login;
                info!(
                    "event=register module=session status=ok duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(AuthOutcome::Registered {
                    notice: REGISTRATION_NOTICE,
                })
            }
            Err(err) => {
                log_auth_failure("register", &err, started_at);
                Err(OperationError::from_auth(&err))
            }
        }
    }

    /// Exchanges credentials for a bearer token and persists it.
    ///
    /// On failure the credential stays absent.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthOutcome, OperationError> {
        let Some(_guard) = SlotGuard::acquire(&self.state, session_slot) else {
            debug!("event=login module=session status=skipped reason=busy");
            return Ok(AuthOutcome::Busy);
        };
        let generation = lock(&self.state).generation;
        let started_at = Instant::now();
        info!("event=login module=session status=start");

        let result = self.api.login(email.trim(), password).await;

        let token = {
            let mut state = lock(&self.state);
            if state.generation != generation {
                info!("event=login module=session status=skipped reason=stale");
                return Ok(AuthOutcome::Stale);
            }
            match result {
                Ok(token) => {
                    state.credential = Credential::with_token(token.clone());
                    state.form = AuthForm::Login;
                    token
                }
                Err(err) => {
                    log_auth_failure("login", &err, started_at);
                    return Err(OperationError::from_auth(&err));
                }
            }
        };

        if let Err(err) = self.tokens.save(&token) {
            warn!("event=token_save module=session status=error error={}", err);
        }
        info!(
            "event=login module=session status=ok duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(AuthOutcome::LoggedIn)
    }

    /// Ends the session unconditionally.
    pub fn logout(&self) {
        self.teardown("logout");
    }

    /// Ends the session because the server rejected the token.
    pub fn invalidate(&self) {
        self.teardown("unauthorized");
    }

    /// Fetches the account profile; failures are diagnostic only.
    pub async fn load_profile(&self) -> ProfileOutcome {
        let Some(token) = self.token() else {
            return ProfileOutcome::Anonymous;
        };
        let Some(_guard) = SlotGuard::acquire(&self.state, session_slot) else {
            return ProfileOutcome::Busy;
        };
        let generation = lock(&self.state).generation;

        let result = self.api.current_user(&token).await;

        let mut state = lock(&self.state);
        if state.generation != generation {
            info!("event=profile_load module=session status=skipped reason=stale");
            return ProfileOutcome::Stale;
        }
        match result {
            Ok(profile) => {
                state.profile = Some(profile);
                info!("event=profile_load module=session status=ok");
                ProfileOutcome::Loaded
            }
            Err(err) => {
                warn!(
                    "event=profile_load module=session status=error error_code={}",
                    err.code()
                );
                ProfileOutcome::Failed(err)
            }
        }
    }

    fn teardown(&self, reason: &str) {
        {
            let mut state = lock(&self.state);
            state.credential.clear();
            state.profile = None;
            state.slot.reset();
            state.generation += 1;
        }
        if let Err(err) = self.tokens.clear() {
            warn!("event=token_clear module=session status=error error={}", err);
        }
        info!("event=logout module=session status=ok reason={}", reason);
    }
}

fn log_auth_failure(event: &str, err: &ApiError, started_at: Instant) {
    warn!(
        "event={} module=session status=error error_code={} detail={} duration_ms={}",
        event,
        err.code(),
        sanitize_for_log(err.detail().unwrap_or("-"), 120),
        started_at.elapsed().as_millis()
    );
}
