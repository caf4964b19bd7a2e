//! Observable authentication state.
//!
//! [`AuthStore`] holds the `{is_authenticated, user, loading}` snapshot that
//! the rest of the application reads. It changes only through
//! [`Transition`]s, and every change is pushed synchronously to all current
//! listeners in registration order.

use parking_lot::{Mutex, ReentrantMutex};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Display projection of the signed-in account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role
            .as_deref()
            .is_some_and(|role| role.eq_ignore_ascii_case("admin"))
    }
}

/// Point-in-time view of the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSnapshot {
    pub is_authenticated: bool,
    pub user: Option<User>,
    pub loading: bool,
}

impl AuthSnapshot {
    /// State before hydration or bootstrap has settled.
    pub fn initial() -> Self {
        Self {
            is_authenticated: false,
            user: None,
            loading: true,
        }
    }

    pub fn logged_out() -> Self {
        Self {
            is_authenticated: false,
            user: None,
            loading: false,
        }
    }
}

/// The only ways the snapshot may change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Hydration found token evidence and is fetching the profile.
    HydrateStart,
    /// Profile fetched during hydration.
    HydrateSuccess(User),
    /// Hydration found nothing, or the profile fetch failed.
    HydrateFailure,
    /// Tokens were issued (login or bootstrap refresh).
    Login,
    /// Profile fetched after login.
    ProfileLoaded(User),
    Logout,
}

impl Transition {
    fn apply(self, current: &AuthSnapshot) -> AuthSnapshot {
        match self {
            Transition::HydrateStart => AuthSnapshot {
                loading: true,
                ..current.clone()
            },
            Transition::HydrateSuccess(user) => AuthSnapshot {
                is_authenticated: true,
                user: Some(user),
                loading: false,
            },
            Transition::HydrateFailure | Transition::Logout => AuthSnapshot::logged_out(),
            Transition::Login => AuthSnapshot {
                is_authenticated: true,
                loading: false,
                ..current.clone()
            },
            Transition::ProfileLoaded(user) => AuthSnapshot {
                is_authenticated: true,
                user: Some(user),
                loading: current.loading,
            },
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Transition::HydrateStart => "hydrate_start",
            Transition::HydrateSuccess(_) => "hydrate_success",
            Transition::HydrateFailure => "hydrate_failure",
            Transition::Login => "login",
            Transition::ProfileLoaded(_) => "profile_loaded",
            Transition::Logout => "logout",
        }
    }
}

/// Listener callback type.
pub type AuthListener = Arc<dyn Fn(&AuthSnapshot) + Send + Sync>;

/// Handle returned by [`AuthStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Clone)]
struct ListenerEntry {
    id: ListenerId,
    active: Arc<AtomicBool>,
    callback: AuthListener,
}

struct Inner {
    snapshot: Mutex<AuthSnapshot>,
    listeners: Mutex<Vec<ListenerEntry>>,
    next_id: AtomicU64,
    /// Held across apply-and-notify so listeners observe transitions in order.
    /// Reentrant so a listener may itself trigger a transition.
    notify_lock: ReentrantMutex<()>,
}

/// Shared, observable auth state. Clones observe the same state.
#[derive(Clone)]
pub struct AuthStore {
    inner: Arc<Inner>,
}

impl Default for AuthStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                snapshot: Mutex::new(AuthSnapshot::initial()),
                listeners: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
                notify_lock: ReentrantMutex::new(()),
            }),
        }
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        self.inner.snapshot.lock().clone()
    }

    /// Register a listener. It is called on every subsequent transition.
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&AuthSnapshot) + Send + Sync + 'static,
    {
        let id = ListenerId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.inner.listeners.lock().push(ListenerEntry {
            id,
            active: Arc::new(AtomicBool::new(true)),
            callback: Arc::new(listener),
        });
        id
    }

    /// Remove a listener. Safe to call from inside a listener.
    ///
    /// Returns false if the id was not registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.inner.listeners.lock();
        match listeners.iter().position(|entry| entry.id == id) {
            Some(index) => {
                let entry = listeners.remove(index);
                entry.active.store(false, Ordering::SeqCst);
                true
            }
            None => false,
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().len()
    }

    /// Drop every listener.
    pub fn clear_listeners(&self) {
        let drained: Vec<ListenerEntry> = self.inner.listeners.lock().drain(..).collect();
        for entry in drained {
            entry.active.store(false, Ordering::SeqCst);
        }
    }

    /// Apply a transition and notify listeners.
    pub(crate) fn apply(&self, transition: Transition) -> AuthSnapshot {
        let _ordered = self.inner.notify_lock.lock();

        let name = transition.name();
        let next = {
            let mut snapshot = self.inner.snapshot.lock();
            let next = transition.apply(&snapshot);
            *snapshot = next.clone();
            next
        };

        debug!(
            transition = name,
            authenticated = next.is_authenticated,
            has_user = next.user.is_some(),
            loading = next.loading,
            "Auth state transition"
        );

        // Snapshot the list so listeners may (un)subscribe while being notified.
        let listeners: Vec<ListenerEntry> = self.inner.listeners.lock().clone();
        for entry in listeners {
            if entry.active.load(Ordering::SeqCst) {
                (entry.callback)(&next);
            }
        }

        next
    }
}
