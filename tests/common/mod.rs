// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use finview::config::ClientConfig;
use finview::models::{
    Account, AccountType, BudgetRecord, Category, Created, DateRange, EntryType, NewAccount,
    NewBudget, NewCategory, NewTransaction, SpendingRecord, Transaction,
};
use finview::remote::RemoteService;
use finview::session::MemoryIdentityStore;
use finview::{App, ClientError};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tokio::sync::Semaphore;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

pub fn tx(id: i64, kind: EntryType, amount: &str, day: u32) -> Transaction {
    Transaction {
        id,
        date: date(2025, 3, day),
        amount: dec(amount),
        r#type: kind,
        category_id: Some(1),
        category: None,
        account_id: Some(1),
        description: format!("tx {id}"),
    }
}

/// Blocks stub calls until opened. Opening releases current and future callers.
#[derive(Clone)]
pub struct Gate(Arc<Semaphore>);

impl Gate {
    pub fn open(&self) {
        self.0.add_permits(1);
    }

    async fn pass(&self) {
        // the permit goes back on drop, so one open lets everyone through
        let _permit = self.0.acquire().await;
    }
}

/// Canned per-owner data served by [`StubService`].
#[derive(Debug, Clone, Default)]
pub struct Book {
    pub transactions: Vec<Transaction>,
    pub accounts: Vec<Account>,
    pub categories: Vec<Category>,
    pub spending: Vec<SpendingRecord>,
    pub budgets: Vec<BudgetRecord>,
    pub net_worth: Decimal,
}

impl Book {
    pub fn sample() -> Self {
        Self {
            transactions: vec![
                tx(3, EntryType::Expense, "40.00", 12),
                tx(2, EntryType::Expense, "60.00", 8),
                tx(1, EntryType::Income, "1000.00", 1),
            ],
            accounts: vec![Account {
                id: 1,
                name: "Checking".into(),
                r#type: AccountType::Checking,
                balance: dec("900.00"),
            }],
            categories: vec![
                Category {
                    id: 1,
                    name: "Food".into(),
                    r#type: EntryType::Expense,
                },
                Category {
                    id: 2,
                    name: "Salary".into(),
                    r#type: EntryType::Income,
                },
            ],
            spending: vec![SpendingRecord {
                category_id: Some(1),
                name: "Food".into(),
                r#type: EntryType::Expense,
                total_amount: dec("100.00"),
            }],
            budgets: vec![BudgetRecord {
                category_id: Some(1),
                category_name: "Food".into(),
                spent: dec("100.00"),
                budget_amount: dec("120.00"),
            }],
            net_worth: dec("1234.5"),
        }
    }
}

/// In-process `RemoteService` with failure injection, call counts and gates.
#[derive(Default)]
pub struct StubService {
    books: Mutex<HashMap<String, Book>>,
    failing: Mutex<HashSet<&'static str>>,
    gates: Mutex<HashMap<String, Gate>>,
    calls: Mutex<HashMap<&'static str, usize>>,
    created: AtomicUsize,
}

impl StubService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_book(owner: &str, book: Book) -> Self {
        let s = Self::new();
        s.set_book(owner, book);
        s
    }

    pub fn set_book(&self, owner: &str, book: Book) {
        self.books.lock().insert(owner.to_string(), book);
    }

    /// Makes every call to `endpoint` fail with a network error.
    pub fn fail(&self, endpoint: &'static str) {
        self.failing.lock().insert(endpoint);
    }

    pub fn heal(&self, endpoint: &'static str) {
        self.failing.lock().remove(endpoint);
    }

    /// Holds calls made for `owner` until the returned gate is opened.
    pub fn gate(&self, owner: &str) -> Gate {
        let g = Gate(Arc::new(Semaphore::new(0)));
        self.gates.lock().insert(owner.to_string(), g.clone());
        g
    }

    pub fn calls(&self, endpoint: &str) -> usize {
        self.calls.lock().get(endpoint).copied().unwrap_or(0)
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    async fn enter(&self, endpoint: &'static str, owner: &str) -> Result<Book, ClientError> {
        *self.calls.lock().entry(endpoint).or_insert(0) += 1;
        let gate = self.gates.lock().get(owner).cloned();
        if let Some(g) = gate {
            g.pass().await;
        }
        if self.failing.lock().contains(endpoint) {
            return Err(ClientError::Network(format!("{endpoint} unreachable")));
        }
        Ok(self.books.lock().get(owner).cloned().unwrap_or_default())
    }

    fn ack(&self, endpoint: &'static str) -> Result<Created, ClientError> {
        *self.calls.lock().entry(endpoint).or_insert(0) += 1;
        if self.failing.lock().contains(endpoint) {
            return Err(ClientError::Service {
                status: 500,
                message: "Internal Server Error".into(),
            });
        }
        let id = self.created.fetch_add(1, Ordering::SeqCst) as i64 + 100;
        Ok(Created {
            id,
            message: "created".into(),
        })
    }
}

#[async_trait]
impl RemoteService for StubService {
    async fn transactions(
        &self,
        owner: &str,
        range: Option<DateRange>,
    ) -> Result<Vec<Transaction>, ClientError> {
        let book = self.enter("transactions", owner).await?;
        Ok(book
            .transactions
            .into_iter()
            .filter(|t| range.is_none_or(|r| t.date >= r.start && t.date <= r.end))
            .collect())
    }

    async fn accounts(&self, owner: &str) -> Result<Vec<Account>, ClientError> {
        Ok(self.enter("accounts", owner).await?.accounts)
    }

    async fn categories(
        &self,
        owner: &str,
        kind: Option<EntryType>,
    ) -> Result<Vec<Category>, ClientError> {
        let book = self.enter("categories", owner).await?;
        Ok(book
            .categories
            .into_iter()
            .filter(|c| kind.is_none_or(|k| c.r#type == k))
            .collect())
    }

    async fn create_transaction(
        &self,
        _owner: &str,
        _tx: &NewTransaction,
    ) -> Result<Created, ClientError> {
        self.ack("create_transaction")
    }

    async fn create_account(
        &self,
        _owner: &str,
        _account: &NewAccount,
    ) -> Result<Created, ClientError> {
        self.ack("create_account")
    }

    async fn create_category(
        &self,
        _owner: &str,
        _category: &NewCategory,
    ) -> Result<Created, ClientError> {
        self.ack("create_category")
    }

    async fn create_budget(
        &self,
        _owner: &str,
        _budget: &NewBudget,
    ) -> Result<Created, ClientError> {
        self.ack("create_budget")
    }

    async fn spending(
        &self,
        owner: &str,
        _range: DateRange,
    ) -> Result<Vec<SpendingRecord>, ClientError> {
        Ok(self.enter("spending", owner).await?.spending)
    }

    async fn budget_progress(
        &self,
        owner: &str,
        _month: NaiveDate,
    ) -> Result<Vec<BudgetRecord>, ClientError> {
        Ok(self.enter("budgets", owner).await?.budgets)
    }

    async fn net_worth(&self, owner: &str) -> Result<Decimal, ClientError> {
        Ok(self.enter("net_worth", owner).await?.net_worth)
    }
}

/// An initialized app backed by `service`, optionally already signed in.
pub fn app_with(service: Arc<StubService>, signed_in: Option<&str>) -> App {
    let store = match signed_in {
        Some(id) => MemoryIdentityStore::with_identity(id),
        None => MemoryIdentityStore::default(),
    };
    let app = App::new(ClientConfig::default(), store, service);
    app.initialize();
    app
}
