// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Screens, their load states, and user-facing notices.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use crate::aggregate::{
    AccountsModel, AnalyticsModel, CategoriesModel, DashboardModel, TransactionsModel,
};
use crate::orchestrator::{JoinHealth, Joined};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewId {
    Login,
    Dashboard,
    Transactions,
    Accounts,
    Categories,
    Analytics,
}

impl ViewId {
    pub const ALL: [ViewId; 6] = [
        ViewId::Login,
        ViewId::Dashboard,
        ViewId::Transactions,
        ViewId::Accounts,
        ViewId::Categories,
        ViewId::Analytics,
    ];

    /// Everything except the login screen needs a signed-in identity.
    pub fn is_protected(&self) -> bool {
        !matches!(self, ViewId::Login)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewId::Login => "login",
            ViewId::Dashboard => "dashboard",
            ViewId::Transactions => "transactions",
            ViewId::Accounts => "accounts",
            ViewId::Categories => "categories",
            ViewId::Analytics => "analytics",
        }
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a built model is not the full picture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Degradation {
    /// These sources fell back; the rest are real.
    Partial { sources: Vec<&'static str> },
    /// Every source fell back; the model is made of fallbacks only.
    AggregationFailed,
}

impl Degradation {
    pub fn of<S>(joined: &Joined<S>) -> Option<Self> {
        match joined.health() {
            JoinHealth::Complete => None,
            JoinHealth::Partial => Some(Self::Partial {
                sources: joined.fallen_back.clone(),
            }),
            JoinHealth::Failed => Some(Self::AggregationFailed),
        }
    }
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Partial { sources } => {
                write!(f, "some data could not be loaded: {}", sources.join(", "))
            }
            Self::AggregationFailed => f.write_str("no data could be loaded"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ViewModel {
    Dashboard(Arc<DashboardModel>),
    Analytics(Arc<AnalyticsModel>),
    Transactions(Arc<TransactionsModel>),
    Accounts(Arc<AccountsModel>),
    Categories(Arc<CategoriesModel>),
}

impl ViewModel {
    pub fn view(&self) -> ViewId {
        match self {
            Self::Dashboard(_) => ViewId::Dashboard,
            Self::Analytics(_) => ViewId::Analytics,
            Self::Transactions(_) => ViewId::Transactions,
            Self::Accounts(_) => ViewId::Accounts,
            Self::Categories(_) => ViewId::Categories,
        }
    }
}

/// A model type that backs exactly one view.
pub trait Model: Sized + Send + Sync + 'static {
    const VIEW: ViewId;

    fn wrap(model: Arc<Self>) -> ViewModel;
    fn unwrap(model: &ViewModel) -> Option<Arc<Self>>;
}

macro_rules! view_model {
    ($ty:ty, $variant:ident) => {
        impl Model for $ty {
            const VIEW: ViewId = ViewId::$variant;

            fn wrap(model: Arc<Self>) -> ViewModel {
                ViewModel::$variant(model)
            }

            fn unwrap(model: &ViewModel) -> Option<Arc<Self>> {
                match model {
                    ViewModel::$variant(m) => Some(Arc::clone(m)),
                    _ => None,
                }
            }
        }
    };
}

view_model!(DashboardModel, Dashboard);
view_model!(AnalyticsModel, Analytics);
view_model!(TransactionsModel, Transactions);
view_model!(AccountsModel, Accounts);
view_model!(CategoriesModel, Categories);

/// What the cache holds for one view: the model and whether it was degraded.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub model: ViewModel,
    pub degradation: Option<Degradation>,
}

impl Snapshot {
    pub fn ready(model: ViewModel) -> Self {
        Self {
            model,
            degradation: None,
        }
    }

    pub fn degraded(model: ViewModel, degradation: Degradation) -> Self {
        Self {
            model,
            degradation: Some(degradation),
        }
    }

    pub fn state<M: Model>(&self) -> ViewState<M> {
        match M::unwrap(&self.model) {
            Some(model) => ViewState::settled(model, self.degradation.clone()),
            None => ViewState::Loading,
        }
    }
}

/// Load state of one view. There is no error state: failures degrade.
#[derive(Debug)]
pub enum ViewState<M> {
    Loading,
    Ready(Arc<M>),
    Degraded {
        model: Arc<M>,
        degradation: Degradation,
    },
}

impl<M> Clone for ViewState<M> {
    fn clone(&self) -> Self {
        match self {
            Self::Loading => Self::Loading,
            Self::Ready(m) => Self::Ready(Arc::clone(m)),
            Self::Degraded { model, degradation } => Self::Degraded {
                model: Arc::clone(model),
                degradation: degradation.clone(),
            },
        }
    }
}

impl<M> ViewState<M> {
    pub fn settled(model: Arc<M>, degradation: Option<Degradation>) -> Self {
        match degradation {
            None => Self::Ready(model),
            Some(degradation) => Self::Degraded { model, degradation },
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn model(&self) -> Option<&Arc<M>> {
        match self {
            Self::Loading => None,
            Self::Ready(m) | Self::Degraded { model: m, .. } => Some(m),
        }
    }

    pub fn degradation(&self) -> Option<&Degradation> {
        match self {
            Self::Degraded { degradation, .. } => Some(degradation),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug, Default)]
struct NoticeBoard {
    next_id: u64,
    active: Vec<Notice>,
}

/// Dismissible messages for the user, oldest first.
#[derive(Debug, Default)]
pub struct Notices {
    board: Mutex<NoticeBoard>,
}

impl Notices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, level: NoticeLevel, message: impl Into<String>) -> u64 {
        let mut board = self.board.lock();
        board.next_id += 1;
        let id = board.next_id;
        board.active.push(Notice {
            id,
            level,
            message: message.into(),
        });
        id
    }

    /// Returns false if `id` was already dismissed or never existed.
    pub fn dismiss(&self, id: u64) -> bool {
        let mut board = self.board.lock();
        let before = board.active.len();
        board.active.retain(|n| n.id != id);
        board.active.len() != before
    }

    pub fn active(&self) -> Vec<Notice> {
        self.board.lock().active.clone()
    }

    /// Removes and returns everything currently shown.
    pub fn drain(&self) -> Vec<Notice> {
        std::mem::take(&mut self.board.lock().active)
    }
}
