//! Session store for Slidesmith.
//!
//! Process-wide mapping from session identifier to one slide deck plus its
//! presentation settings. Each session sits behind its own mutex so read-modify-write
//! sequences on one deck never interleave, while different sessions proceed in parallel.
//! Storage is volatile; the [`SessionStorage`] seam allows another backend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info};
use uuid::Uuid;

use crate::types::deck::Slide;
use crate::types::errors::SessionError;
use crate::types::session::{DeckSetting, Session, VersionSnapshot, AI_FLAG};
use crate::types::settings::DeckSettings;

/// Shared handle to one session's deck.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Backing map from session id to session handle.
pub trait SessionStorage: Send + Sync {
    fn get(&self, id: &str) -> Option<SessionHandle>;
    /// Installs `session` under `id`, replacing any previous session.
    fn insert(&self, id: &str, session: Session) -> SessionHandle;
    /// Returns the existing handle, or atomically installs the session built by `make`.
    /// The flag is true when a new session was installed.
    fn get_or_insert_with(&self, id: &str, make: &dyn Fn() -> Session) -> (SessionHandle, bool);
    fn ids(&self) -> Vec<String>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Default storage: a `HashMap` behind a read-write lock. No eviction.
#[derive(Default)]
pub struct InMemoryStorage {
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for InMemoryStorage {
    fn get(&self, id: &str) -> Option<SessionHandle> {
        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        sessions.get(id).cloned()
    }

    fn insert(&self, id: &str, session: Session) -> SessionHandle {
        let handle = Arc::new(Mutex::new(session));
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        sessions.insert(id.to_string(), Arc::clone(&handle));
        handle
    }

    fn get_or_insert_with(&self, id: &str, make: &dyn Fn() -> Session) -> (SessionHandle, bool) {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = sessions.get(id) {
            return (Arc::clone(handle), false);
        }
        let handle = Arc::new(Mutex::new(make()));
        sessions.insert(id.to_string(), Arc::clone(&handle));
        (handle, true)
    }

    fn ids(&self) -> Vec<String> {
        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        sessions.keys().cloned().collect()
    }

    fn len(&self) -> usize {
        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        sessions.len()
    }
}

/// Trait defining the session store interface.
pub trait SessionStoreTrait {
    /// Installs a fresh empty session. Overwrites any existing session with the same id.
    fn create_session(&self, id: &str) -> Session;
    /// Get-or-create: the guard every request path uses before touching a deck.
    fn ensure_session(&self, id: &str) -> SessionHandle;
    fn get_session(&self, id: &str) -> Option<Session>;
    /// Slides of the session, or `[]` for an unknown id.
    fn get_slides(&self, id: &str) -> Vec<Slide>;
    fn replace_slides(&self, id: &str, slides: Vec<Slide>) -> Result<(), SessionError>;
    fn update_setting(&self, id: &str, setting: DeckSetting, value: &str) -> Result<(), SessionError>;
    fn toggle_extension(&self, id: &str, name: &str, enabled: bool) -> Result<(), SessionError>;
}

/// Session store implementation over a pluggable [`SessionStorage`].
pub struct SessionStore {
    storage: Box<dyn SessionStorage>,
    defaults: DeckSettings,
}

impl SessionStore {
    /// Creates an in-memory store.
    pub fn new(defaults: DeckSettings) -> Self {
        Self::with_storage(Box::new(InMemoryStorage::new()), defaults)
    }

    pub fn with_storage(storage: Box<dyn SessionStorage>, defaults: DeckSettings) -> Self {
        Self { storage, defaults }
    }

    pub fn defaults(&self) -> &DeckSettings {
        &self.defaults
    }

    pub fn session_count(&self) -> usize {
        self.storage.len()
    }

    pub fn session_ids(&self) -> Vec<String> {
        self.storage.ids()
    }

    /// Generates a new random session id and installs an empty session for it.
    pub fn issue_session(&self) -> String {
        let id = Uuid::new_v4().to_string();
        self.create_session(&id);
        id
    }

    /// Runs `f` on the session under its lock and bumps `updatedAt` when `f` succeeds.
    pub fn with_session<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut Session) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let handle = self
            .storage
            .get(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;
        let mut session = lock(&handle);
        let result = f(&mut session)?;
        session.updated_at = unix_timestamp();
        Ok(result)
    }

    /// Read-only access to the session under its lock.
    pub fn read_session<T>(&self, id: &str, f: impl FnOnce(&Session) -> T) -> Result<T, SessionError> {
        let handle = self
            .storage
            .get(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;
        let session = lock(&handle);
        Ok(f(&session))
    }
}

impl SessionStoreTrait for SessionStore {
    fn create_session(&self, id: &str) -> Session {
        let session = Session::new(&self.defaults, unix_timestamp());
        self.storage.insert(id, session.clone());
        info!(session_id = %id, "Created session");
        session
    }

    fn ensure_session(&self, id: &str) -> SessionHandle {
        let (handle, created) = self
            .storage
            .get_or_insert_with(id, &|| Session::new(&self.defaults, unix_timestamp()));
        if created {
            info!(session_id = %id, "Created session on first use");
        }
        handle
    }

    fn get_session(&self, id: &str) -> Option<Session> {
        self.storage.get(id).map(|handle| lock(&handle).clone())
    }

    fn get_slides(&self, id: &str) -> Vec<Slide> {
        self.storage
            .get(id)
            .map(|handle| lock(&handle).slides.clone())
            .unwrap_or_default()
    }

    /// Swaps the whole slide sequence. With AI enabled, the new slides are also
    /// recorded in the version history, evicting the oldest snapshot beyond the limit.
    fn replace_slides(&self, id: &str, slides: Vec<Slide>) -> Result<(), SessionError> {
        let limit = self.defaults.version_history_limit;
        self.with_session(id, |session| {
            if session.extensions.ai_enabled && limit > 0 {
                let history = &mut session.extensions.version_history;
                history.push_back(VersionSnapshot {
                    slides: slides.clone(),
                    timestamp: unix_timestamp(),
                });
                while history.len() > limit {
                    history.pop_front();
                }
            }
            debug!(session_id = %id, slides = slides.len(), "Replaced slides");
            session.slides = slides;
            Ok(())
        })
    }

    fn update_setting(&self, id: &str, setting: DeckSetting, value: &str) -> Result<(), SessionError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(SessionError::InvalidSetting(format!("{} cannot be empty", setting)));
        }
        self.with_session(id, |session| {
            match setting {
                DeckSetting::Theme => session.theme = value.to_string(),
                DeckSetting::ColorPalette => session.color_palette = value.to_string(),
                DeckSetting::FontFamily => session.font_family = value.to_string(),
            }
            Ok(())
        })
    }

    /// Stores any flag name; only `ai` changes behavior.
    fn toggle_extension(&self, id: &str, name: &str, enabled: bool) -> Result<(), SessionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::InvalidSetting(
                "Extension name cannot be empty".to_string(),
            ));
        }
        self.with_session(id, |session| {
            session.extensions.flags.insert(name.to_string(), enabled);
            if name == AI_FLAG {
                session.extensions.ai_enabled = enabled;
            }
            Ok(())
        })
    }
}

/// Locks a session, recovering the guard if a previous holder panicked.
pub fn lock(handle: &SessionHandle) -> MutexGuard<'_, Session> {
    handle.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Current Unix time in seconds.
pub fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
