//! In-crate fakes shared by unit tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::future::poll_fn;
use std::rc::Rc;
use std::task::Poll;

use crate::admin::LocalAdminStore;
use crate::controller::{Navigator, Notice, Notifier};
use crate::credentials::{AdminCredential, AdminDirectory};
use crate::provider::{AuthBroadcaster, AuthChange, AuthChanges, AuthEvent, IdentityProvider, ProviderError};
use crate::state::{AuthAction, AuthState, AuthStore, SharedAuthState};
use crate::storage::MemoryStore;
use crate::user::{Identity, IdentityData, Profile, Session, User, UserMetadata};

pub fn directory() -> AdminDirectory {
    AdminDirectory::new(vec![
        AdminCredential::with_password("admin", "admin", "admin@example.com", "Master Administrator"),
        AdminCredential::with_password("kekko934", "1029229Km", "kekko934.admin@example.com", "Kekko (Admin)"),
        AdminCredential::with_password("valentina", "123456789", "valentina.admin@example.com", "Valentina (Admin)"),
    ])
}

pub fn admin_store() -> (LocalAdminStore<MemoryStore>, MemoryStore) {
    let storage = MemoryStore::new();
    (LocalAdminStore::new(storage.clone(), directory()), storage)
}

pub fn provider_user(id: &str, email: &str) -> User {
    User { id: id.to_owned(), email: Some(email.to_owned()), ..User::default() }
}

pub fn session_for(user: User) -> Session {
    Session {
        access_token: format!("access-{}", user.id),
        refresh_token: format!("refresh-{}", user.id),
        expires_at: None,
        user,
    }
}

pub fn pending_signup_user(email: &str) -> User {
    User {
        id: "new-user".to_owned(),
        email: Some(email.to_owned()),
        identities: vec![Identity { identity_data: IdentityData { email_verified: Some(false) } }],
        ..User::default()
    }
}

/// Return `Pending` once so other futures in the same task get polled.
pub async fn yield_now() {
    let mut yielded = false;
    poll_fn(|cx| {
        if yielded {
            Poll::Ready(())
        } else {
            yielded = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    })
    .await;
}

/// Scripted [`IdentityProvider`] with call counters.
#[derive(Default)]
pub struct FakeProvider {
    pub session: RefCell<Option<Session>>,
    pub session_error: RefCell<Option<ProviderError>>,
    pub sign_in_error: RefCell<Option<ProviderError>>,
    pub sign_up_result: RefCell<Option<Result<User, ProviderError>>>,
    pub sign_out_error: RefCell<Option<ProviderError>>,
    /// Suspend once after emitting `SignedOut`, like a real network call.
    pub sign_out_yields: Cell<bool>,
    pub profiles: RefCell<HashMap<String, Result<Profile, ProviderError>>>,
    pub last_sign_up_metadata: RefCell<Option<UserMetadata>>,
    pub get_session_calls: Cell<usize>,
    pub sign_in_calls: Cell<usize>,
    pub sign_out_calls: Cell<usize>,
    pub profile_calls: Cell<usize>,
    pub changes: AuthBroadcaster,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        let provider = Self::default();
        *provider.session.borrow_mut() = Some(session);
        provider
    }

    pub fn set_profile(&self, user_id: &str, profile: Result<Profile, ProviderError>) {
        self.profiles.borrow_mut().insert(user_id.to_owned(), profile);
    }

    pub fn network_calls(&self) -> usize {
        self.get_session_calls.get() + self.sign_in_calls.get() + self.sign_out_calls.get() + self.profile_calls.get()
    }
}

#[async_trait::async_trait(?Send)]
impl IdentityProvider for FakeProvider {
    async fn sign_in_with_password(&self, email: &str, _password: &str) -> Result<Session, ProviderError> {
        self.sign_in_calls.set(self.sign_in_calls.get() + 1);
        if let Some(err) = self.sign_in_error.borrow().clone() {
            return Err(err);
        }
        let session = session_for(provider_user(&format!("id-{email}"), email));
        *self.session.borrow_mut() = Some(session.clone());
        self.changes.emit(AuthChange::new(AuthEvent::SignedIn, Some(session.clone())));
        Ok(session)
    }

    async fn sign_up(&self, email: &str, _password: &str, metadata: &UserMetadata) -> Result<User, ProviderError> {
        *self.last_sign_up_metadata.borrow_mut() = Some(metadata.clone());
        self.sign_up_result
            .borrow()
            .clone()
            .unwrap_or_else(|| Ok(pending_signup_user(email)))
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.sign_out_calls.set(self.sign_out_calls.get() + 1);
        *self.session.borrow_mut() = None;
        self.changes.emit(AuthChange::new(AuthEvent::SignedOut, None));
        if self.sign_out_yields.get() {
            yield_now().await;
        }
        match self.sign_out_error.borrow().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn get_session(&self) -> Result<Option<Session>, ProviderError> {
        self.get_session_calls.set(self.get_session_calls.get() + 1);
        if let Some(err) = self.session_error.borrow().clone() {
            return Err(err);
        }
        Ok(self.session.borrow().clone())
    }

    async fn fetch_profile(&self, user_id: &str) -> Result<Profile, ProviderError> {
        self.profile_calls.set(self.profile_calls.get() + 1);
        self.profiles.borrow().get(user_id).cloned().unwrap_or_else(|| {
            Err(ProviderError::Api {
                status: 406,
                code: Some("PGRST116".to_owned()),
                message: "JSON object requested, multiple (or no) rows returned".to_owned(),
            })
        })
    }

    fn on_auth_state_change(&self) -> AuthChanges {
        self.changes.subscribe()
    }
}

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub notices: Rc<RefCell<Vec<Notice>>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.borrow_mut().push(notice);
    }
}

impl RecordingNotifier {
    pub fn titles(&self) -> Vec<String> {
        self.notices.borrow().iter().map(|n| n.title.clone()).collect()
    }
}

#[derive(Clone, Default)]
pub struct RecordingNavigator {
    pub paths: Rc<RefCell<Vec<String>>>,
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.paths.borrow_mut().push(path.to_owned());
    }
}

/// [`AuthStore`] that keeps every state it passes through.
#[derive(Clone, Default)]
pub struct RecordingStore {
    pub state: SharedAuthState,
    pub history: Rc<RefCell<Vec<AuthState>>>,
}

impl RecordingStore {
    pub fn new(initial: AuthState) -> Self {
        Self { state: SharedAuthState::new(initial), history: Rc::default() }
    }
}

impl AuthStore for RecordingStore {
    fn snapshot(&self) -> AuthState {
        self.state.snapshot()
    }

    fn dispatch(&self, action: AuthAction) {
        self.state.dispatch(action);
        self.history.borrow_mut().push(self.state.snapshot());
    }
}
