// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::Arc;

use finview::ClientError;
use finview::aggregate::AccountsModel;
use finview::cache::ViewModelCache;
use finview::session::{
    Access, IDENTITY_KEY, IdentityStore, MemoryIdentityStore, SessionGate, SessionStatus,
    SqliteIdentityStore,
};
use finview::views::{Snapshot, ViewId, ViewModel};
use rusqlite::Connection;
use tempfile::tempdir;

fn accounts_snapshot() -> Snapshot {
    Snapshot::ready(ViewModel::Accounts(Arc::new(AccountsModel { accounts: vec![] })))
}

#[test]
fn stored_identity_restores_authenticated() {
    let store = Arc::new(MemoryIdentityStore::with_identity("42"));
    let gate = SessionGate::new(Arc::clone(&store), Arc::new(ViewModelCache::new()));
    assert_eq!(gate.status(), SessionStatus::Initializing);
    assert_eq!(gate.initialize(), SessionStatus::Authenticated);
    assert_eq!(gate.current_identity().as_deref(), Some("42"));
    assert_eq!(gate.initialize(), SessionStatus::Authenticated);
    assert_eq!(store.load_count(), 1);
}

#[test]
fn empty_storage_starts_anonymous() {
    let gate = SessionGate::new(MemoryIdentityStore::default(), Arc::new(ViewModelCache::new()));
    assert_eq!(gate.initialize(), SessionStatus::Anonymous);
    assert_eq!(gate.access(ViewId::Analytics), Access::RedirectToLogin);
    assert_eq!(gate.require(), Err(ClientError::NotAuthenticated));
}

#[test]
fn login_rejects_blank_identifier() {
    let store = Arc::new(MemoryIdentityStore::default());
    let gate = SessionGate::new(Arc::clone(&store), Arc::new(ViewModelCache::new()));
    gate.initialize();
    assert!(matches!(
        gate.login("   "),
        Err(ClientError::Validation {
            field: "identifier",
            ..
        })
    ));
    assert_eq!(gate.status(), SessionStatus::Anonymous);
    assert_eq!(store.stored(), None);
}

#[test]
fn login_persists_and_logout_clears() {
    let store = Arc::new(MemoryIdentityStore::default());
    let gate = SessionGate::new(Arc::clone(&store), Arc::new(ViewModelCache::new()));
    gate.initialize();
    gate.login(" 7 ").unwrap();
    assert_eq!(store.stored().as_deref(), Some("7"));
    assert_eq!(gate.access(ViewId::Dashboard), Access::Render);
    gate.logout().unwrap();
    assert_eq!(store.stored(), None);
    assert_eq!(gate.status(), SessionStatus::Anonymous);
}

#[test]
fn transitions_out_of_order_are_rejected() {
    let gate = SessionGate::new(
        MemoryIdentityStore::with_identity("a"),
        Arc::new(ViewModelCache::new()),
    );
    gate.initialize();
    assert!(matches!(
        gate.login("b"),
        Err(ClientError::InvalidTransition {
            from: SessionStatus::Authenticated,
            ..
        })
    ));
    gate.logout().unwrap();
    assert!(matches!(
        gate.logout(),
        Err(ClientError::InvalidTransition {
            from: SessionStatus::Anonymous,
            ..
        })
    ));
}

#[test]
fn logout_drops_only_the_outgoing_identity() {
    let cache = Arc::new(ViewModelCache::new());
    let gate = SessionGate::new(MemoryIdentityStore::with_identity("a"), Arc::clone(&cache));
    gate.initialize();
    cache.put(ViewId::Accounts, "a", accounts_snapshot());
    cache.put(ViewId::Dashboard, "a", accounts_snapshot());
    cache.put(ViewId::Accounts, "other", accounts_snapshot());

    gate.logout().unwrap();

    assert!(cache.get(ViewId::Accounts, "a").is_none());
    assert!(cache.get(ViewId::Dashboard, "a").is_none());
    assert!(cache.get(ViewId::Accounts, "other").is_some());
}

#[test]
fn switching_identity_never_serves_previous_entries() {
    let cache = Arc::new(ViewModelCache::new());
    let gate = SessionGate::new(MemoryIdentityStore::with_identity("a"), Arc::clone(&cache));
    gate.initialize();
    cache.put(ViewId::Accounts, "a", accounts_snapshot());
    gate.logout().unwrap();
    // a late writer for the old identity
    cache.put(ViewId::Accounts, "a", accounts_snapshot());
    gate.login("b").unwrap();
    assert!(cache.get(ViewId::Accounts, "a").is_none());
    assert!(cache.is_empty());
}

#[test]
fn sqlite_store_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("finview.sqlite");
    {
        let store = SqliteIdentityStore::new(Connection::open(&path).unwrap()).unwrap();
        let gate = SessionGate::new(store, Arc::new(ViewModelCache::new()));
        assert_eq!(gate.initialize(), SessionStatus::Anonymous);
        gate.login("user-9").unwrap();
    }
    {
        let conn = Connection::open(&path).unwrap();
        let raw: String = conn
            .query_row(
                "SELECT value FROM settings WHERE key=?1",
                [IDENTITY_KEY],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(raw, "user-9");
        let gate = SessionGate::new(
            SqliteIdentityStore::new(conn).unwrap(),
            Arc::new(ViewModelCache::new()),
        );
        assert_eq!(gate.initialize(), SessionStatus::Authenticated);
        assert_eq!(gate.current_identity().as_deref(), Some("user-9"));
        gate.logout().unwrap();
    }
    let store = SqliteIdentityStore::new(Connection::open(&path).unwrap()).unwrap();
    assert_eq!(store.load().unwrap(), None);
}
