//! Client controller: one snapshot, one set of intents.
//!
//! # Responsibility
//! - Compose the session store and the note store for the presentation layer.
//! - Hold the last operation error and the informational notice.
//! - Load notes exactly once per anonymous-to-authenticated transition.
//! - Demote the session when the server rejects the stored token.
//!
//! # Invariants
//! - Every intent clears the previous error before it starts.
//! - Logout always leaves no credential, no notes and no draft.
//! - Refresh failures never set the error slot.

use crate::api::{HttpNoteApi, NoteApi};
use crate::config::{ClientConfig, ConfigError};
use crate::error::OperationError;
use crate::logging::init_logging;
use crate::model::note::{NoteCollection, NoteId};
use crate::model::user::UserProfile;
use crate::persist::{FileTokenStore, MemoryTokenStore, TokenStore};
use crate::service::lock;
use crate::service::note_store::{CreateOutcome, NoteStore, RefreshOutcome};
use crate::service::session_store::{AuthForm, AuthOutcome, AuthPhase, ProfileOutcome, SessionStore};
use crate::validation::SubmitCheck;
use log::{debug, info, warn};
use std::sync::{Arc, Mutex};

/// Result of the last backend health check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackendStatus {
    #[default]
    Unknown,
    Healthy,
    Unreachable,
}

/// Read-only view handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub authenticated: bool,
    pub auth_phase: AuthPhase,
    pub auth_form: AuthForm,
    pub notes: NoteCollection,
    pub note_count: usize,
    pub draft: String,
    pub draft_word_count: usize,
    /// Draft checked against both quotas; drives the submit control.
    pub submit: SubmitCheck,
    pub pending_delete: Option<NoteId>,
    pub error: Option<OperationError>,
    /// Non-error message, e.g. after a successful registration.
    pub notice: Option<String>,
    /// A request is in flight in either store; mutating controls are disabled.
    pub pending_request: bool,
    pub profile: Option<UserProfile>,
    pub backend: BackendStatus,
}

impl Snapshot {
    /// Whether the submit control should be enabled.
    pub fn can_submit(&self) -> bool {
        self.authenticated && self.submit.is_ok() && !self.pending_request
    }
}

#[derive(Debug, Default)]
struct ViewState {
    error: Option<OperationError>,
    notice: Option<String>,
    backend: BackendStatus,
    /// Authentication as last acted upon; drives the load-on-login edge.
    observed_authenticated: bool,
}

pub struct ClientController<A: NoteApi> {
    api: Arc<A>,
    session: SessionStore<A>,
    notes: NoteStore<A>,
    view: Mutex<ViewState>,
}

impl ClientController<HttpNoteApi> {
    /// Wires the HTTP adapter and the configured token store, starting
    /// file logging when a log directory is configured.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        if let Some(log_dir) = &config.log_dir {
            init_logging(&config.log_level, &log_dir.to_string_lossy())?;
        }
        let api = Arc::new(HttpNoteApi::from_config(config)?);
        let tokens: Arc<dyn TokenStore> = match &config.token_file {
            Some(path) => Arc::new(FileTokenStore::new(path)),
            None => Arc::new(MemoryTokenStore::new()),
        };
        info!(
            "event=controller_init module=controller status=ok persisted_token={}",
            config.token_file.is_some()
        );
        Ok(Self::new(api, tokens))
    }
}

impl<A: NoteApi> ClientController<A> {
    pub fn new(api: Arc<A>, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            session: SessionStore::new(Arc::clone(&api), tokens),
            notes: NoteStore::new(Arc::clone(&api)),
            api,
            view: Mutex::new(ViewState::default()),
        }
    }

    /// Loads notes if a restored token already authenticates the session.
    pub async fn start(&self) {
        self.sync_authentication().await;
    }

    pub fn snapshot(&self) -> Snapshot {
        let authenticated = self.session.is_authenticated();
        let notes = self.notes.notes();
        let view = lock(&self.view);
        Snapshot {
            authenticated,
            auth_phase: self.session.phase(),
            auth_form: self.session.form(),
            note_count: notes.len(),
            notes,
            draft: self.notes.draft(),
            draft_word_count: self.notes.draft_word_count(),
            submit: self.notes.submit_check(),
            pending_delete: self.notes.pending_delete(),
            error: view.error.clone(),
            notice: view.notice.clone(),
            pending_request: self.session.is_pending() || self.notes.is_pending(),
            profile: self.session.profile(),
            backend: view.backend,
        }
    }

    pub fn toggle_auth_form(&self) -> AuthForm {
        self.clear_messages();
        self.session.toggle_form()
    }

    pub async fn login(&self, email: &str, password: &str) {
        self.clear_messages();
        match self.session.login(email, password).await {
            Ok(AuthOutcome::LoggedIn) => self.sync_authentication().await,
            Ok(_) => {}
            Err(err) => self.set_error(err),
        }
    }

    pub async fn register(&self, email: &str, password: &str) {
        self.clear_messages();
        match self.session.register(email, password).await {
            Ok(AuthOutcome::Registered { notice }) => {
                lock(&self.view).notice = Some(notice.to_string());
            }
            Ok(_) => {}
            Err(err) => self.set_error(err),
        }
    }

    pub fn logout(&self) {
        self.session.logout();
        self.notes.clear();
        let mut view = lock(&self.view);
        view.error = None;
        view.notice = None;
        view.observed_authenticated = false;
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        self.notes.set_draft(text);
    }

    /// Submits the current draft.
    pub async fn create_note(&self) {
        let Some(token) = self.session.token() else {
            debug!("event=note_create module=controller status=skipped reason=anonymous");
            return;
        };
        self.clear_error();
        let draft = self.notes.draft();
        match self.notes.create(&token, &draft).await {
            Ok(CreateOutcome::Created { refresh }) => self.after_refresh(&refresh),
            Ok(_) => {}
            Err(err) => {
                if err.is_unauthorized() {
                    self.demote();
                }
                self.set_error(err);
            }
        }
    }

    /// Asks for confirmation before deleting `id`.
    pub fn delete_note(&self, id: NoteId) -> bool {
        self.notes.request_delete(id)
    }

    pub fn cancel_delete(&self) {
        self.notes.cancel_delete();
    }

    pub async fn confirm_delete(&self) {
        let Some(token) = self.session.token() else {
            self.notes.cancel_delete();
            return;
        };
        self.clear_error();
        let outcome = self.notes.confirm_delete(&token).await;
        if outcome.is_unauthorized() {
            self.demote();
        }
    }

    /// Reloads the listing; failures are logged only.
    pub async fn refresh_notes(&self) {
        if let Some(token) = self.session.token() {
            let outcome = self.notes.refresh(&token).await;
            self.after_refresh(&outcome);
        }
    }

    pub async fn load_profile(&self) {
        if let ProfileOutcome::Failed(err) = self.session.load_profile().await {
            if err.is_unauthorized() {
                self.demote();
            }
        }
    }

    /// Checks the backend health endpoint.
    pub async fn check_backend(&self) -> BackendStatus {
        let status = match self.api.health().await {
            Ok(()) => BackendStatus::Healthy,
            Err(err) => {
                warn!(
                    "event=health_check module=controller status=error error_code={}",
                    err.code()
                );
                BackendStatus::Unreachable
            }
        };
        lock(&self.view).backend = status;
        status
    }

    async fn sync_authentication(&self) {
        let token = {
            let mut view = lock(&self.view);
            match self.session.token() {
                Some(token) if !view.observed_authenticated => {
                    view.observed_authenticated = true;
                    token
                }
                _ => return,
            }
        };
        info!("event=session_edge module=controller status=ok action=load_notes");
        let outcome = self.notes.refresh(&token).await;
        self.after_refresh(&outcome);
    }

    fn after_refresh(&self, outcome: &RefreshOutcome) {
        if outcome.is_unauthorized() {
            self.demote();
        }
    }

    /// Returns to anonymous after the server rejected the token.
    fn demote(&self) {
        warn!("event=session_demote module=controller status=ok reason=unauthorized");
        self.session.invalidate();
        self.notes.clear();
        let mut view = lock(&self.view);
        view.observed_authenticated = false;
        view.notice = None;
    }

    fn clear_messages(&self) {
        let mut view = lock(&self.view);
        view.error = None;
        view.notice = None;
    }

    fn clear_error(&self) {
        lock(&self.view).error = None;
    }

    fn set_error(&self, err: OperationError) {
        lock(&self.view).error = Some(err);
    }
}
