// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Concurrent fan-out of independent remote reads with per-read fallbacks.
//!
//! Every descriptor settles on its own: a failure or timeout is replaced by the
//! descriptor's fallback and never cancels its siblings. The caller only sees the
//! join once all of them have settled, and only if the session and the request
//! generation that issued it are still current.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{self, BoxFuture, FutureExt};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::errors::ClientError;
use crate::session::{SessionGate, SessionStatus};
use crate::views::ViewId;

/// One remote read plus the value to use when it fails.
pub struct Descriptor<T> {
    label: &'static str,
    fetch: BoxFuture<'static, Result<T, ClientError>>,
    fallback: T,
}

impl<T: Send + 'static> Descriptor<T> {
    pub fn new<F>(label: &'static str, fetch: F, fallback: T) -> Self
    where
        F: Future<Output = Result<T, ClientError>> + Send + 'static,
    {
        Self {
            label,
            fetch: fetch.boxed(),
            fallback,
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Awaits the read; any error or an expired deadline yields the fallback.
    pub async fn settle(self, deadline: Option<Duration>) -> Slot<T> {
        let Descriptor {
            label,
            fetch,
            fallback,
        } = self;
        let result = match deadline {
            Some(d) => match tokio::time::timeout(d, fetch).await {
                Ok(r) => r,
                Err(_) => Err(ClientError::Timeout(d)),
            },
            None => fetch.await,
        };
        match result {
            Ok(value) => Slot {
                label,
                value,
                failure: None,
            },
            Err(error) => {
                warn!(source = label, %error, "remote read fell back");
                Slot {
                    label,
                    value: fallback,
                    failure: Some(error),
                }
            }
        }
    }
}

/// A settled descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot<T> {
    pub label: &'static str,
    pub value: T,
    /// Why the fallback was used, if it was.
    pub failure: Option<ClientError>,
}

impl<T> Slot<T> {
    pub fn fell_back(&self) -> bool {
        self.failure.is_some()
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// Settled slots of a join, inspected without knowing their value types.
pub trait SlotSet {
    fn len(&self) -> usize;
    fn fallen_back(&self) -> Vec<&'static str>;
}

/// A group of descriptors that can be settled together.
pub trait DescriptorSet: Send + 'static {
    type Slots: SlotSet + Send + 'static;

    fn settle_all(self, deadline: Option<Duration>) -> BoxFuture<'static, Self::Slots>;
}

impl<T: Send + 'static> SlotSet for Vec<Slot<T>> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn fallen_back(&self) -> Vec<&'static str> {
        self.iter().filter(|s| s.fell_back()).map(|s| s.label).collect()
    }
}

impl<T: Send + 'static> DescriptorSet for Vec<Descriptor<T>> {
    type Slots = Vec<Slot<T>>;

    fn settle_all(self, deadline: Option<Duration>) -> BoxFuture<'static, Self::Slots> {
        future::join_all(self.into_iter().map(move |d| d.settle(deadline))).boxed()
    }
}

macro_rules! tuple_descriptor_set {
    ($($v:ident: $t:ident),+) => {
        impl<$($t: Send + 'static),+> SlotSet for ($(Slot<$t>,)+) {
            fn len(&self) -> usize {
                [$(stringify!($t)),+].len()
            }

            fn fallen_back(&self) -> Vec<&'static str> {
                let ($($v,)+) = self;
                let mut out = Vec::new();
                $(
                    if $v.fell_back() {
                        out.push($v.label);
                    }
                )+
                out
            }
        }

        impl<$($t: Send + 'static),+> DescriptorSet for ($(Descriptor<$t>,)+) {
            type Slots = ($(Slot<$t>,)+);

            fn settle_all(self, deadline: Option<Duration>) -> BoxFuture<'static, Self::Slots> {
                let ($($v,)+) = self;
                async move { futures::join!($($v.settle(deadline)),+) }.boxed()
            }
        }
    };
}

tuple_descriptor_set!(a: A, b: B);
tuple_descriptor_set!(a: A, b: B, c: C);
tuple_descriptor_set!(a: A, b: B, c: C, d: D);

/// Identifies one orchestration: who issued it and which request it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub view: ViewId,
    pub identity: String,
    pub epoch: u64,
    pub generation: u64,
}

/// How much of a join came back real.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinHealth {
    Complete,
    /// Some, but not all, descriptors fell back.
    Partial,
    /// Every descriptor fell back.
    Failed,
}

#[derive(Debug)]
pub struct Joined<S> {
    pub slots: S,
    pub ticket: Ticket,
    pub fallen_back: Vec<&'static str>,
    total: usize,
}

impl<S> Joined<S> {
    pub fn had_partial_failure(&self) -> bool {
        !self.fallen_back.is_empty()
    }

    pub fn health(&self) -> JoinHealth {
        if self.fallen_back.is_empty() {
            JoinHealth::Complete
        } else if self.fallen_back.len() == self.total {
            JoinHealth::Failed
        } else {
            JoinHealth::Partial
        }
    }
}

pub struct FetchOrchestrator {
    session: Arc<SessionGate>,
    deadline: Option<Duration>,
    generations: Mutex<HashMap<(ViewId, String), u64>>,
}

impl FetchOrchestrator {
    pub fn new(session: Arc<SessionGate>, deadline: Option<Duration>) -> Self {
        Self {
            session,
            deadline,
            generations: Mutex::new(HashMap::new()),
        }
    }

    /// Starts a new request for `view` under the current session, superseding any
    /// earlier request for the same view and identity.
    pub fn issue(&self, view: ViewId) -> Result<Ticket, ClientError> {
        let session = self.session.snapshot();
        let identity = match (session.status, session.identity) {
            (SessionStatus::Authenticated, Some(id)) => id,
            _ => return Err(ClientError::NotAuthenticated),
        };
        let mut generations = self.generations.lock();
        let generation = generations.entry((view, identity.clone())).or_insert(0);
        *generation += 1;
        Ok(Ticket {
            view,
            identity,
            epoch: session.epoch,
            generation: *generation,
        })
    }

    /// Makes any in-flight request for `view` a no-op when it settles.
    pub fn abandon(&self, view: ViewId) {
        if let Some(identity) = self.session.current_identity() {
            *self
                .generations
                .lock()
                .entry((view, identity))
                .or_insert(0) += 1;
        }
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        let latest = self
            .generations
            .lock()
            .get(&(ticket.view, ticket.identity.clone()))
            .copied();
        latest == Some(ticket.generation)
            && self
                .session
                .with_epoch(ticket.epoch, |id| id == ticket.identity)
                .unwrap_or(false)
    }

    /// Runs `f` only while `ticket` is still current; the session cannot change
    /// underneath it.
    pub fn commit<R>(&self, ticket: &Ticket, f: impl FnOnce(&str) -> R) -> Option<R> {
        let latest = self
            .generations
            .lock()
            .get(&(ticket.view, ticket.identity.clone()))
            .copied();
        if latest != Some(ticket.generation) {
            return None;
        }
        self.session
            .with_epoch(ticket.epoch, |id| (id == ticket.identity).then(|| f(id)))
            .flatten()
    }

    /// Settles every descriptor concurrently. `Ok(None)` means the join went stale
    /// (identity switched or a newer request was issued) and was discarded.
    pub async fn join<S: DescriptorSet>(
        &self,
        view: ViewId,
        set: S,
    ) -> Result<Option<Joined<S::Slots>>, ClientError> {
        let ticket = self.issue(view)?;
        Ok(self.join_with(ticket, set).await)
    }

    pub async fn join_with<S: DescriptorSet>(
        &self,
        ticket: Ticket,
        set: S,
    ) -> Option<Joined<S::Slots>> {
        let slots = set.settle_all(self.deadline).await;
        if !self.is_current(&ticket) {
            debug!(view = ?ticket.view, identity = %ticket.identity, "discarding stale join");
            return None;
        }
        let fallen_back = slots.fallen_back();
        let total = slots.len();
        Some(Joined {
            slots,
            ticket,
            fallen_back,
            total,
        })
    }
}
