// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Identity state and the Initializing → Anonymous ⇄ Authenticated lifecycle.
//!
//! The gate is an explicit object handed to whoever needs it. Every transition bumps
//! an epoch so in-flight work can tell that the session it started under is gone,
//! even if the same identity signs in again.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::{Mutex, RwLock};
use rusqlite::Connection;
use serde::Serialize;
use tracing::{info, warn};

use crate::cache::ViewModelCache;
use crate::db::{delete_setting, get_setting, init_schema, set_setting};
use crate::errors::ClientError;
use crate::views::ViewId;

pub const IDENTITY_KEY: &str = "session_identity";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Initializing,
    Anonymous,
    Authenticated,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Initializing => "initializing",
            Self::Anonymous => "anonymous",
            Self::Authenticated => "authenticated",
        })
    }
}

/// What a view may do given the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Render,
    RedirectToLogin,
    /// Session restore has not finished; render nothing.
    Pending,
}

/// Persistence for the one identity key.
pub trait IdentityStore: Send + Sync {
    fn load(&self) -> Result<Option<String>, ClientError>;
    fn save(&self, identity: &str) -> Result<(), ClientError>;
    fn clear(&self) -> Result<(), ClientError>;
}

/// Identity kept in the local `settings` table.
pub struct SqliteIdentityStore {
    conn: Mutex<Connection>,
}

impl SqliteIdentityStore {
    pub fn new(conn: Connection) -> Result<Self, ClientError> {
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl IdentityStore for SqliteIdentityStore {
    fn load(&self) -> Result<Option<String>, ClientError> {
        Ok(get_setting(&self.conn.lock(), IDENTITY_KEY)?)
    }

    fn save(&self, identity: &str) -> Result<(), ClientError> {
        Ok(set_setting(&self.conn.lock(), IDENTITY_KEY, identity)?)
    }

    fn clear(&self) -> Result<(), ClientError> {
        Ok(delete_setting(&self.conn.lock(), IDENTITY_KEY)?)
    }
}

#[derive(Debug, Default)]
pub struct MemoryIdentityStore {
    slot: Mutex<Option<String>>,
    loads: AtomicUsize,
}

impl MemoryIdentityStore {
    pub fn with_identity(identity: &str) -> Self {
        Self {
            slot: Mutex::new(Some(identity.to_string())),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn stored(&self) -> Option<String> {
        self.slot.lock().clone()
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl IdentityStore for MemoryIdentityStore {
    fn load(&self) -> Result<Option<String>, ClientError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.slot.lock().clone())
    }

    fn save(&self, identity: &str) -> Result<(), ClientError> {
        *self.slot.lock() = Some(identity.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        *self.slot.lock() = None;
        Ok(())
    }
}

impl<T: IdentityStore + ?Sized> IdentityStore for Arc<T> {
    fn load(&self) -> Result<Option<String>, ClientError> {
        (**self).load()
    }

    fn save(&self, identity: &str) -> Result<(), ClientError> {
        (**self).save(identity)
    }

    fn clear(&self) -> Result<(), ClientError> {
        (**self).clear()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub status: SessionStatus,
    pub identity: Option<String>,
    pub epoch: u64,
}

#[derive(Debug)]
struct GateState {
    session: Session,
    /// Identity of the last session that ended, for cache hygiene on the next login.
    previous: Option<String>,
}

pub struct SessionGate {
    state: RwLock<GateState>,
    store: Box<dyn IdentityStore>,
    cache: Arc<ViewModelCache>,
}

impl SessionGate {
    pub fn new(store: impl IdentityStore + 'static, cache: Arc<ViewModelCache>) -> Self {
        Self {
            state: RwLock::new(GateState {
                session: Session {
                    status: SessionStatus::Initializing,
                    identity: None,
                    epoch: 0,
                },
                previous: None,
            }),
            store: Box::new(store),
            cache,
        }
    }

    /// Restores a persisted identity. Only the first call reads storage.
    pub fn initialize(&self) -> SessionStatus {
        let mut st = self.state.write();
        if st.session.status != SessionStatus::Initializing {
            return st.session.status;
        }
        let stored = match self.store.load() {
            Ok(v) => v.filter(|s| !s.trim().is_empty()),
            Err(e) => {
                warn!(error = %e, "could not read stored identity; starting signed out");
                None
            }
        };
        st.session.status = if stored.is_some() {
            SessionStatus::Authenticated
        } else {
            SessionStatus::Anonymous
        };
        st.session.identity = stored;
        st.session.epoch += 1;
        info!(status = %st.session.status, "session initialized");
        st.session.status
    }

    pub fn login(&self, identifier: &str) -> Result<(), ClientError> {
        let identity = identifier.trim();
        if identity.is_empty() {
            return Err(ClientError::validation("identifier", "must not be empty"));
        }
        let stale = {
            let mut st = self.state.write();
            if st.session.status != SessionStatus::Anonymous {
                return Err(ClientError::InvalidTransition {
                    from: st.session.status,
                    action: "log in",
                });
            }
            self.store.save(identity)?;
            st.session.status = SessionStatus::Authenticated;
            st.session.identity = Some(identity.to_string());
            st.session.epoch += 1;
            st.previous.take().filter(|p| p != identity)
        };
        if let Some(prev) = stale {
            self.cache.invalidate(&prev);
        }
        info!(identity, "signed in");
        Ok(())
    }

    pub fn logout(&self) -> Result<(), ClientError> {
        let outgoing = {
            let mut st = self.state.write();
            if st.session.status != SessionStatus::Authenticated {
                return Err(ClientError::InvalidTransition {
                    from: st.session.status,
                    action: "log out",
                });
            }
            self.store.clear()?;
            let outgoing = st.session.identity.take().unwrap_or_default();
            st.session.status = SessionStatus::Anonymous;
            st.session.epoch += 1;
            st.previous = Some(outgoing.clone());
            outgoing
        };
        self.cache.invalidate(&outgoing);
        info!(identity = %outgoing, "signed out");
        Ok(())
    }

    pub fn current_identity(&self) -> Option<String> {
        self.state.read().session.identity.clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.state.read().session.status
    }

    pub fn snapshot(&self) -> Session {
        self.state.read().session.clone()
    }

    pub fn access(&self, view: ViewId) -> Access {
        if !view.is_protected() {
            return Access::Render;
        }
        match self.status() {
            SessionStatus::Initializing => Access::Pending,
            SessionStatus::Anonymous => Access::RedirectToLogin,
            SessionStatus::Authenticated => Access::Render,
        }
    }

    /// Identity for a protected operation, or `NotAuthenticated`.
    pub fn require(&self) -> Result<String, ClientError> {
        let st = self.state.read();
        match (&st.session.status, &st.session.identity) {
            (SessionStatus::Authenticated, Some(id)) => Ok(id.clone()),
            _ => Err(ClientError::NotAuthenticated),
        }
    }

    /// Runs `f` with the identity only if the session is still the one at `epoch`.
    /// The session cannot transition while `f` runs.
    pub fn with_epoch<R>(&self, epoch: u64, f: impl FnOnce(&str) -> R) -> Option<R> {
        let st = self.state.read();
        match (&st.session.status, &st.session.identity) {
            (SessionStatus::Authenticated, Some(id)) if st.session.epoch == epoch => Some(f(id)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate(store: MemoryIdentityStore) -> SessionGate {
        SessionGate::new(store, Arc::new(ViewModelCache::new()))
    }

    #[test]
    fn nothing_renders_while_initializing() {
        let g = gate(MemoryIdentityStore::default());
        assert_eq!(g.access(ViewId::Dashboard), Access::Pending);
        assert_eq!(g.access(ViewId::Login), Access::Render);
        g.initialize();
        assert_eq!(g.access(ViewId::Dashboard), Access::RedirectToLogin);
    }

    #[test]
    fn login_requires_finished_initialize() {
        let g = gate(MemoryIdentityStore::default());
        assert!(matches!(
            g.login("42"),
            Err(ClientError::InvalidTransition { from: SessionStatus::Initializing, .. })
        ));
    }

    #[test]
    fn epoch_moves_on_every_transition() {
        let g = gate(MemoryIdentityStore::default());
        g.initialize();
        let e0 = g.snapshot().epoch;
        g.login("a").unwrap();
        let e1 = g.snapshot().epoch;
        g.logout().unwrap();
        g.login("a").unwrap();
        let e3 = g.snapshot().epoch;
        assert!(e0 < e1 && e1 < e3);
        assert!(g.with_epoch(e1, |_| ()).is_none());
        assert_eq!(g.with_epoch(e3, |id| id.to_string()).as_deref(), Some("a"));
    }
}
