// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{Book, StubService, app_with, dec};
use finview::ClientError;
use finview::aggregate::{AnalyticsModel, DashboardModel};
use finview::cache::ViewModelCache;
use finview::orchestrator::{Descriptor, FetchOrchestrator, JoinHealth};
use finview::session::{MemoryIdentityStore, SessionGate};
use finview::utils::current_month;
use finview::views::{Degradation, NoticeLevel, ViewId, ViewState};

fn signed_in_gate(id: &str) -> Arc<SessionGate> {
    let gate = SessionGate::new(
        MemoryIdentityStore::with_identity(id),
        Arc::new(ViewModelCache::new()),
    );
    gate.initialize();
    Arc::new(gate)
}

#[tokio::test]
async fn one_failing_descriptor_keeps_the_others() {
    let orch = FetchOrchestrator::new(signed_in_gate("u1"), None);
    let set = (
        Descriptor::new("net_worth", async { Ok(dec("10")) }, dec("0")),
        Descriptor::new(
            "spending",
            async { Err::<Vec<u32>, _>(ClientError::Network("down".into())) },
            Vec::new(),
        ),
        Descriptor::new("label", async { Ok("ok".to_string()) }, String::new()),
    );
    let joined = orch.join(ViewId::Analytics, set).await.unwrap().unwrap();
    assert!(joined.had_partial_failure());
    assert_eq!(joined.health(), JoinHealth::Partial);
    assert_eq!(joined.fallen_back, vec!["spending"]);
    let (nw, spending, label) = joined.slots;
    assert_eq!(nw.value, dec("10"));
    assert!(spending.value.is_empty());
    assert!(matches!(spending.failure, Some(ClientError::Network(_))));
    assert_eq!(label.value, "ok");
}

#[tokio::test]
async fn every_descriptor_failing_is_reported_as_failed() {
    let orch = FetchOrchestrator::new(signed_in_gate("u1"), None);
    let set = vec![
        Descriptor::new("a", async { Err(ClientError::Network("x".into())) }, 1u8),
        Descriptor::new("b", async { Err(ClientError::Network("y".into())) }, 2u8),
    ];
    let joined = orch.join(ViewId::Accounts, set).await.unwrap().unwrap();
    assert_eq!(joined.health(), JoinHealth::Failed);
    let values: Vec<_> = joined.slots.into_iter().map(|s| s.value).collect();
    assert_eq!(values, vec![1, 2]);
}

#[tokio::test]
async fn slow_descriptor_times_out_to_fallback() {
    let orch = FetchOrchestrator::new(signed_in_gate("u1"), Some(Duration::from_millis(30)));
    let set = (
        Descriptor::new(
            "slow",
            async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(1u32)
            },
            0u32,
        ),
        Descriptor::new("fast", async { Ok(2u32) }, 0u32),
    );
    let joined = orch.join(ViewId::Dashboard, set).await.unwrap().unwrap();
    let (slow, fast) = joined.slots;
    assert_eq!(slow.value, 0);
    assert!(matches!(slow.failure, Some(ClientError::Timeout(_))));
    assert_eq!(fast.value, 2);
}

#[tokio::test]
async fn join_requires_a_session() {
    let gate = SessionGate::new(MemoryIdentityStore::default(), Arc::new(ViewModelCache::new()));
    gate.initialize();
    let orch = FetchOrchestrator::new(Arc::new(gate), None);
    let set = vec![Descriptor::new("a", async { Ok(1) }, 0)];
    assert_eq!(
        orch.join(ViewId::Dashboard, set).await.unwrap_err(),
        ClientError::NotAuthenticated
    );
}

#[tokio::test]
async fn analytics_partial_failure_degrades_with_fallback() {
    let svc = Arc::new(StubService::with_book("u1", Book::sample()));
    svc.fail("spending");
    let app = app_with(svc.clone(), Some("u1"));

    let state = app.load_analytics(current_month()).await.unwrap();
    match &state {
        ViewState::Degraded { model, degradation } => {
            assert_eq!(
                degradation,
                &Degradation::Partial {
                    sources: vec!["spending"]
                }
            );
            assert!(!model.has_spending());
            assert_eq!(model.net_worth.display, "$1,234.50");
            assert_eq!(model.budgets.len(), 1);
        }
        other => panic!("expected degraded, got {other:?}"),
    }
    let notices = app.notices.active();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Warning);
    assert!(notices[0].message.contains("spending"));
    assert!(app.state::<AnalyticsModel>().degradation().is_some());
}

#[tokio::test]
async fn analytics_total_failure_is_aggregation_failed() {
    let svc = Arc::new(StubService::with_book("u1", Book::sample()));
    for e in ["net_worth", "spending", "budgets"] {
        svc.fail(e);
    }
    let app = app_with(svc, Some("u1"));
    let state = app.load_analytics(current_month()).await.unwrap();
    assert_eq!(state.degradation(), Some(&Degradation::AggregationFailed));
    let model = state.model().unwrap();
    assert_eq!(model.net_worth.value, dec("0"));
    assert!(!model.has_budgets());
}

#[tokio::test]
async fn response_for_a_previous_identity_is_dropped() {
    let svc = Arc::new(StubService::with_book("a", Book::sample()));
    let gate = svc.gate("a");
    let app = app_with(svc.clone(), Some("a"));

    let (state, ()) = tokio::join!(app.load_dashboard(), async {
        app.logout().unwrap();
        app.login("b").unwrap();
        gate.open();
    });

    assert!(state.unwrap().is_loading());
    assert_eq!(svc.calls("transactions"), 1);
    assert!(app.cache.get(ViewId::Dashboard, "a").is_none());
    assert!(app.cache.get(ViewId::Dashboard, "b").is_none());
    assert!(app.state::<DashboardModel>().is_loading());
}

#[tokio::test]
async fn same_identity_signing_back_in_still_drops_old_response() {
    let svc = Arc::new(StubService::with_book("a", Book::sample()));
    let gate = svc.gate("a");
    let app = app_with(svc, Some("a"));

    let (state, ()) = tokio::join!(app.load_dashboard(), async {
        app.logout().unwrap();
        app.login("a").unwrap();
        gate.open();
    });

    assert!(state.unwrap().is_loading());
    assert!(app.cache.get(ViewId::Dashboard, "a").is_none());
}

#[tokio::test]
async fn newer_request_supersedes_older_one() {
    let svc = Arc::new(StubService::with_book("a", Book::sample()));
    let gate = svc.gate("a");
    let app = app_with(svc.clone(), Some("a"));

    let (first, second, ()) = tokio::join!(app.load_dashboard(), app.load_dashboard(), async {
        gate.open();
    });

    assert!(first.unwrap().is_loading());
    let second = second.unwrap();
    assert_eq!(second.model().unwrap().summary.balance, dec("900.00"));
    assert_eq!(svc.calls("transactions"), 2);
    assert!(matches!(
        app.state::<DashboardModel>(),
        ViewState::Ready(_)
    ));
}

#[tokio::test]
async fn navigating_away_turns_the_load_into_a_no_op() {
    let svc = Arc::new(StubService::with_book("a", Book::sample()));
    let gate = svc.gate("a");
    let app = app_with(svc.clone(), Some("a"));

    let (state, ()) = tokio::join!(app.load_accounts(), async {
        app.orchestrator.abandon(ViewId::Accounts);
        gate.open();
    });

    assert!(state.unwrap().is_loading());
    assert_eq!(svc.calls("accounts"), 1);
    assert!(app.cached(ViewId::Accounts).is_none());
}
