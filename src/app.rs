// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The explicit context every screen loads through.
//!
//! Loaders issue a ticket, fan out their reads through the orchestrator, aggregate
//! whatever settled, and publish the model into the cache only while the ticket is
//! still current. A loader that lost the race returns [`ViewState::Loading`]; the
//! request that superseded it fills the view.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;

use crate::aggregate::{
    self, AccountsModel, AnalyticsModel, CategoriesModel, DashboardModel, TransactionsModel,
};
use crate::cache::ViewModelCache;
use crate::config::ClientConfig;
use crate::errors::ClientError;
use crate::models::{
    AccountDraft, BudgetDraft, CategoryDraft, Created, DateRange, TransactionDraft,
};
use crate::orchestrator::{Descriptor, FetchOrchestrator, Slot, Ticket};
use crate::remote::RemoteService;
use crate::session::{IdentityStore, SessionGate, SessionStatus};
use crate::utils::month_bounds;
use crate::views::{Degradation, Model, NoticeLevel, Notices, Snapshot, ViewId, ViewState};

pub struct App {
    pub session: Arc<SessionGate>,
    pub cache: Arc<ViewModelCache>,
    pub orchestrator: FetchOrchestrator,
    pub service: Arc<dyn RemoteService>,
    pub config: ClientConfig,
    pub notices: Notices,
}

impl App {
    pub fn new(
        config: ClientConfig,
        store: impl IdentityStore + 'static,
        service: Arc<dyn RemoteService>,
    ) -> Self {
        let cache = Arc::new(ViewModelCache::new());
        let session = Arc::new(SessionGate::new(store, Arc::clone(&cache)));
        let orchestrator = FetchOrchestrator::new(Arc::clone(&session), config.descriptor_timeout);
        Self {
            session,
            cache,
            orchestrator,
            service,
            config,
            notices: Notices::new(),
        }
    }

    pub fn initialize(&self) -> SessionStatus {
        self.session.initialize()
    }

    pub fn login(&self, identifier: &str) -> Result<(), ClientError> {
        self.session.login(identifier)
    }

    pub fn logout(&self) -> Result<(), ClientError> {
        self.session.logout()
    }

    /// Cached snapshot for `view` under the current identity.
    pub fn cached(&self, view: ViewId) -> Option<Arc<Snapshot>> {
        let identity = self.session.current_identity()?;
        self.cache.get(view, &identity)
    }

    /// Current state of the view backed by `M`, from the cache alone.
    pub fn state<M: Model>(&self) -> ViewState<M> {
        self.cached(M::VIEW)
            .map(|s| s.state::<M>())
            .unwrap_or(ViewState::Loading)
    }

    pub async fn load_dashboard(&self) -> Result<ViewState<DashboardModel>, ClientError> {
        let ticket = self.orchestrator.issue(ViewId::Dashboard)?;
        let svc = Arc::clone(&self.service);
        let owner = ticket.identity.clone();
        let set = vec![Descriptor::new(
            "transactions",
            async move { svc.transactions(&owner, None).await },
            Vec::new(),
        )];
        let Some(joined) = self.orchestrator.join_with(ticket, set).await else {
            return Ok(ViewState::Loading);
        };
        let degradation = Degradation::of(&joined);
        let txns = first_value(joined.slots);
        let model = aggregate::dashboard(&txns, self.config.recent_limit);
        Ok(self.publish(&joined.ticket, model, degradation))
    }

    /// Net worth, the month's spending and the month's budget progress.
    pub async fn load_analytics(
        &self,
        month: NaiveDate,
    ) -> Result<ViewState<AnalyticsModel>, ClientError> {
        let ticket = self.orchestrator.issue(ViewId::Analytics)?;
        let (first, last) = month_bounds(month);
        let range = DateRange::new(first, last)?;
        let owner = ticket.identity.clone();
        let set = (
            {
                let (svc, owner) = (Arc::clone(&self.service), owner.clone());
                Descriptor::new(
                    "net_worth",
                    async move { svc.net_worth(&owner).await },
                    Decimal::ZERO,
                )
            },
            {
                let (svc, owner) = (Arc::clone(&self.service), owner.clone());
                Descriptor::new(
                    "spending",
                    async move { svc.spending(&owner, range).await },
                    Vec::new(),
                )
            },
            {
                let svc = Arc::clone(&self.service);
                Descriptor::new(
                    "budgets",
                    async move { svc.budget_progress(&owner, first).await },
                    Vec::new(),
                )
            },
        );
        let Some(joined) = self.orchestrator.join_with(ticket, set).await else {
            return Ok(ViewState::Loading);
        };
        let degradation = Degradation::of(&joined);
        let (net_worth, spending, budgets) = joined.slots;
        let model = aggregate::analytics(
            first,
            net_worth.value,
            &spending.value,
            &budgets.value,
            &self.config.currency_symbol,
        );
        Ok(self.publish(&joined.ticket, model, degradation))
    }

    /// The transaction list plus the categories and accounts its entry form offers.
    pub async fn load_transactions(
        &self,
        range: Option<DateRange>,
    ) -> Result<ViewState<TransactionsModel>, ClientError> {
        let ticket = self.orchestrator.issue(ViewId::Transactions)?;
        let owner = ticket.identity.clone();
        let set = (
            {
                let (svc, owner) = (Arc::clone(&self.service), owner.clone());
                Descriptor::new(
                    "transactions",
                    async move { svc.transactions(&owner, range).await },
                    Vec::new(),
                )
            },
            {
                let (svc, owner) = (Arc::clone(&self.service), owner.clone());
                Descriptor::new(
                    "categories",
                    async move { svc.categories(&owner, None).await },
                    Vec::new(),
                )
            },
            {
                let svc = Arc::clone(&self.service);
                Descriptor::new(
                    "accounts",
                    async move { svc.accounts(&owner).await },
                    Vec::new(),
                )
            },
        );
        let Some(joined) = self.orchestrator.join_with(ticket, set).await else {
            return Ok(ViewState::Loading);
        };
        let degradation = Degradation::of(&joined);
        let (txns, categories, accounts) = joined.slots;
        let model = aggregate::transactions_view(
            range,
            txns.into_value(),
            categories.into_value(),
            accounts.into_value(),
        );
        Ok(self.publish(&joined.ticket, model, degradation))
    }

    pub async fn load_accounts(&self) -> Result<ViewState<AccountsModel>, ClientError> {
        let ticket = self.orchestrator.issue(ViewId::Accounts)?;
        let svc = Arc::clone(&self.service);
        let owner = ticket.identity.clone();
        let set = vec![Descriptor::new(
            "accounts",
            async move { svc.accounts(&owner).await },
            Vec::new(),
        )];
        let Some(joined) = self.orchestrator.join_with(ticket, set).await else {
            return Ok(ViewState::Loading);
        };
        let degradation = Degradation::of(&joined);
        let model = AccountsModel {
            accounts: first_value(joined.slots),
        };
        Ok(self.publish(&joined.ticket, model, degradation))
    }

    /// All categories, split by type. Filtering for display happens on the model.
    pub async fn load_categories(&self) -> Result<ViewState<CategoriesModel>, ClientError> {
        let ticket = self.orchestrator.issue(ViewId::Categories)?;
        let svc = Arc::clone(&self.service);
        let owner = ticket.identity.clone();
        let set = vec![Descriptor::new(
            "categories",
            async move { svc.categories(&owner, None).await },
            Vec::new(),
        )];
        let Some(joined) = self.orchestrator.join_with(ticket, set).await else {
            return Ok(ViewState::Loading);
        };
        let degradation = Degradation::of(&joined);
        let model = aggregate::categories_view(first_value(joined.slots));
        Ok(self.publish(&joined.ticket, model, degradation))
    }

    pub async fn create_transaction(
        &self,
        draft: &TransactionDraft,
    ) -> Result<Created, ClientError> {
        let body = draft.validate()?;
        let owner = self.session.require()?;
        let created = self.submitted(self.service.create_transaction(&owner, &body).await)?;
        self.drop_views(
            &owner,
            &[ViewId::Dashboard, ViewId::Transactions, ViewId::Analytics],
        );
        Ok(created)
    }

    pub async fn create_account(&self, draft: &AccountDraft) -> Result<Created, ClientError> {
        let body = draft.validate()?;
        let owner = self.session.require()?;
        let created = self.submitted(self.service.create_account(&owner, &body).await)?;
        self.drop_views(
            &owner,
            &[ViewId::Accounts, ViewId::Transactions, ViewId::Analytics],
        );
        Ok(created)
    }

    pub async fn create_category(&self, draft: &CategoryDraft) -> Result<Created, ClientError> {
        let body = draft.validate()?;
        let owner = self.session.require()?;
        let created = self.submitted(self.service.create_category(&owner, &body).await)?;
        self.drop_views(&owner, &[ViewId::Categories, ViewId::Transactions]);
        Ok(created)
    }

    pub async fn create_budget(&self, draft: &BudgetDraft) -> Result<Created, ClientError> {
        let body = draft.validate()?;
        let owner = self.session.require()?;
        let created = self.submitted(self.service.create_budget(&owner, &body).await)?;
        self.drop_views(&owner, &[ViewId::Analytics]);
        Ok(created)
    }

    /// Writes the model to the cache if `ticket` is still current.
    fn publish<M: Model>(
        &self,
        ticket: &Ticket,
        model: M,
        degradation: Option<Degradation>,
    ) -> ViewState<M> {
        let model = Arc::new(model);
        let snapshot = match &degradation {
            None => Snapshot::ready(M::wrap(Arc::clone(&model))),
            Some(d) => Snapshot::degraded(M::wrap(Arc::clone(&model)), d.clone()),
        };
        let committed = self.orchestrator.commit(ticket, |identity| {
            self.cache.put(M::VIEW, identity, snapshot);
        });
        if committed.is_none() {
            return ViewState::Loading;
        }
        if let Some(d) = &degradation {
            info!(view = %M::VIEW, degradation = %d, "view built from fallbacks");
            self.notices.push(NoticeLevel::Warning, format!("{}: {d}", M::VIEW));
        }
        ViewState::settled(model, degradation)
    }

    fn submitted<T>(&self, result: Result<T, ClientError>) -> Result<T, ClientError> {
        match &result {
            Err(e) if e.is_transient() => {
                self.notices.push(NoticeLevel::Error, e.to_string());
            }
            _ => {}
        }
        result
    }

    /// Evicts views a write made stale and cancels their in-flight loads.
    fn drop_views(&self, owner: &str, views: &[ViewId]) {
        for &view in views {
            self.orchestrator.abandon(view);
            self.cache.remove(view, owner);
        }
    }
}

fn first_value<T: Default>(slots: Vec<Slot<T>>) -> T {
    slots
        .into_iter()
        .next()
        .map(Slot::into_value)
        .unwrap_or_default()
}
