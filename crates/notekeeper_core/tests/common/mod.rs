//! Scripted in-memory backend shared by the scenario tests.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use notekeeper_core::{
    ApiError, ApiResult, BearerToken, ClientController, MemoryTokenStore, Note, NoteApi, NoteId,
    RegisterRequest, TokenStore, UserProfile,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

pub const EMAIL: &str = "test@test.com";
pub const PASSWORD: &str = "test123";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Register { email: String, full_name: String },
    Login { email: String },
    ListNotes,
    CreateNote { content: String },
    DeleteNote { id: String },
    CurrentUser,
    Health,
}

#[derive(Default)]
struct Backend {
    accounts: HashMap<String, String>,
    issued: Vec<String>,
    login_token: Option<String>,
    notes: Vec<Note>,
    next_id: i64,
    calls: Vec<Call>,
    failures: HashMap<&'static str, VecDeque<ApiError>>,
    gates: HashMap<&'static str, oneshot::Receiver<()>>,
}

/// Fake notes backend with the same rules as the real one: 10-note quota,
/// 50-word limit, per-account listing, bearer tokens issued on login.
#[derive(Default)]
pub struct FakeApi {
    backend: Mutex<Backend>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Backend with the standard test account already registered.
    pub fn with_account() -> Arc<Self> {
        let api = Self::new();
        api.add_account(EMAIL, PASSWORD);
        api
    }

    pub fn add_account(&self, email: &str, password: &str) {
        self.backend()
            .accounts
            .insert(email.to_string(), password.to_string());
    }

    /// Fixes the token value the next logins return.
    pub fn set_login_token(&self, token: &str) {
        self.backend().login_token = Some(token.to_string());
    }

    /// Marks `token` as valid without a login call.
    pub fn issue_token(&self, token: &str) {
        self.backend().issued.push(token.to_string());
    }

    /// Server-side token revocation; later calls get 401.
    pub fn revoke_tokens(&self) {
        self.backend().issued.clear();
    }

    pub fn seed_notes(&self, contents: &[&str]) {
        for content in contents {
            self.insert_note(content);
        }
    }

    pub fn server_notes(&self) -> Vec<Note> {
        self.backend().notes.clone()
    }

    pub fn server_note_ids(&self) -> Vec<String> {
        self.backend()
            .notes
            .iter()
            .map(|note| note.id.to_string())
            .collect()
    }

    /// Deletes a note behind the client's back.
    pub fn remove_server_note(&self, id: &str) {
        self.backend().notes.retain(|note| note.id.as_str() != id);
    }

    /// Makes the next call named `call` fail with `err`.
    pub fn fail_next(&self, call: &'static str, err: ApiError) {
        self.backend()
            .failures
            .entry(call)
            .or_default()
            .push_back(err);
    }

    /// Holds the next call named `call` until the returned sender fires.
    pub fn hold_next(&self, call: &'static str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.backend().gates.insert(call, rx);
        tx
    }

    pub fn calls(&self) -> Vec<Call> {
        self.backend().calls.clone()
    }

    pub fn count_calls(&self, matcher: impl Fn(&Call) -> bool) -> usize {
        self.backend().calls.iter().filter(|call| matcher(call)).count()
    }

    pub fn list_calls(&self) -> usize {
        self.count_calls(|call| matches!(call, Call::ListNotes))
    }

    pub fn create_calls(&self) -> usize {
        self.count_calls(|call| matches!(call, Call::CreateNote { .. }))
    }

    fn backend(&self) -> std::sync::MutexGuard<'_, Backend> {
        self.backend.lock().unwrap()
    }

    fn insert_note(&self, content: &str) -> Note {
        let mut backend = self.backend();
        backend.next_id += 1;
        let id = backend.next_id;
        let note = Note {
            id: NoteId::new(id.to_string()),
            content: content.to_string(),
            created_at: timestamp(id),
            word_count: Some(content.split_whitespace().count() as u32),
        };
        backend.notes.push(note.clone());
        note
    }

    /// Records the call, waits on its gate if one is set, then returns any
    /// scripted failure.
    async fn enter(&self, name: &'static str, call: Call) -> ApiResult<()> {
        let gate = {
            let mut backend = self.backend();
            backend.calls.push(call);
            backend.gates.remove(name)
        };
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        let failure = self
            .backend()
            .failures
            .get_mut(name)
            .and_then(VecDeque::pop_front);
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn authorize(&self, token: &BearerToken) -> ApiResult<()> {
        if self
            .backend()
            .issued
            .iter()
            .any(|issued| issued == token.as_str())
        {
            Ok(())
        } else {
            Err(ApiError::Unauthorized {
                detail: Some("Could not validate credentials".to_string()),
            })
        }
    }
}

#[async_trait]
impl NoteApi for FakeApi {
    async fn register(&self, request: &RegisterRequest) -> ApiResult<()> {
        self.enter(
            "register",
            Call::Register {
                email: request.email.clone(),
                full_name: request.full_name.clone(),
            },
        )
        .await?;
        let mut backend = self.backend();
        if backend.accounts.contains_key(&request.email) {
            return Err(ApiError::Rejected {
                status: 400,
                detail: Some("Email already registered".to_string()),
            });
        }
        backend
            .accounts
            .insert(request.email.clone(), request.password.clone());
        Ok(())
    }

    async fn login(&self, email: &str, password: &str) -> ApiResult<BearerToken> {
        self.enter(
            "login",
            Call::Login {
                email: email.to_string(),
            },
        )
        .await?;
        let mut backend = self.backend();
        if backend.accounts.get(email).map(String::as_str) != Some(password) {
            return Err(ApiError::Unauthorized {
                detail: Some("Incorrect email or password".to_string()),
            });
        }
        let raw = backend
            .login_token
            .clone()
            .unwrap_or_else(|| format!("token-for-{email}"));
        backend.issued.push(raw.clone());
        Ok(BearerToken::new(raw).unwrap())
    }

    async fn list_notes(&self, token: &BearerToken) -> ApiResult<Vec<Note>> {
        self.enter("list_notes", Call::ListNotes).await?;
        self.authorize(token)?;
        Ok(self.server_notes())
    }

    async fn create_note(&self, token: &BearerToken, content: &str) -> ApiResult<()> {
        self.enter(
            "create_note",
            Call::CreateNote {
                content: content.to_string(),
            },
        )
        .await?;
        self.authorize(token)?;
        if self.backend().notes.len() >= 10 {
            return Err(ApiError::Rejected {
                status: 400,
                detail: Some("Maximum number of notes (10) reached".to_string()),
            });
        }
        self.insert_note(content);
        Ok(())
    }

    async fn delete_note(&self, token: &BearerToken, id: &NoteId) -> ApiResult<()> {
        self.enter("delete_note", Call::DeleteNote { id: id.to_string() })
            .await?;
        self.authorize(token)?;
        let mut backend = self.backend();
        let before = backend.notes.len();
        backend.notes.retain(|note| &note.id != id);
        if backend.notes.len() == before {
            return Err(ApiError::Rejected {
                status: 404,
                detail: Some("Note not found".to_string()),
            });
        }
        Ok(())
    }

    async fn current_user(&self, token: &BearerToken) -> ApiResult<UserProfile> {
        self.enter("current_user", Call::CurrentUser).await?;
        self.authorize(token)?;
        Ok(UserProfile {
            id: 1,
            email: EMAIL.to_string(),
            full_name: Some("test".to_string()),
            is_active: true,
            created_at: timestamp(0),
        })
    }

    async fn health(&self) -> ApiResult<()> {
        self.enter("health", Call::Health).await
    }
}

pub fn timestamp(offset_minutes: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000 + offset_minutes * 60, 0).unwrap()
}

pub fn words(n: usize) -> String {
    vec!["word"; n].join(" ")
}

pub fn network_down() -> ApiError {
    ApiError::Network("connection refused".to_string())
}

/// Controller over `api` with an empty in-memory token store.
pub fn controller(api: &Arc<FakeApi>) -> (ClientController<FakeApi>, Arc<MemoryTokenStore>) {
    let tokens = Arc::new(MemoryTokenStore::new());
    let store: Arc<dyn TokenStore> = tokens.clone();
    (ClientController::new(Arc::clone(api), store), tokens)
}

/// Controller that is already logged in with the standard account.
pub async fn logged_in(api: &Arc<FakeApi>) -> (ClientController<FakeApi>, Arc<MemoryTokenStore>) {
    let (controller, tokens) = controller(api);
    controller.login(EMAIL, PASSWORD).await;
    assert!(controller.snapshot().authenticated);
    (controller, tokens)
}
