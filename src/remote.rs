// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Contract with the remote finance service, and its HTTP implementation.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Response};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::errors::ClientError;
use crate::models::{
    Account, BudgetRecord, Category, Created, DateRange, EntryType, NewAccount, NewBudget,
    NewCategory, NewTransaction, SpendingRecord, Transaction,
};
use crate::utils::http_client;

/// Reads and creates against the service. Every call is scoped to an owner identity.
#[async_trait]
pub trait RemoteService: Send + Sync {
    async fn transactions(
        &self,
        owner: &str,
        range: Option<DateRange>,
    ) -> Result<Vec<Transaction>, ClientError>;

    async fn accounts(&self, owner: &str) -> Result<Vec<Account>, ClientError>;

    async fn categories(
        &self,
        owner: &str,
        kind: Option<EntryType>,
    ) -> Result<Vec<Category>, ClientError>;

    async fn create_transaction(
        &self,
        owner: &str,
        tx: &NewTransaction,
    ) -> Result<Created, ClientError>;

    async fn create_account(&self, owner: &str, account: &NewAccount)
    -> Result<Created, ClientError>;

    async fn create_category(
        &self,
        owner: &str,
        category: &NewCategory,
    ) -> Result<Created, ClientError>;

    async fn create_budget(&self, owner: &str, budget: &NewBudget) -> Result<Created, ClientError>;

    async fn spending(
        &self,
        owner: &str,
        range: DateRange,
    ) -> Result<Vec<SpendingRecord>, ClientError>;

    async fn budget_progress(
        &self,
        owner: &str,
        month: NaiveDate,
    ) -> Result<Vec<BudgetRecord>, ClientError>;

    async fn net_worth(&self, owner: &str) -> Result<Decimal, ClientError>;
}

// Response envelopes. Missing collections decode as empty.

#[derive(Debug, Deserialize)]
struct TransactionsEnvelope {
    #[serde(default)]
    transactions: Vec<Transaction>,
}

#[derive(Debug, Deserialize)]
struct AccountsEnvelope {
    #[serde(default)]
    accounts: Vec<Account>,
}

/// The service drops `type` from each row when the list was filtered by type.
#[derive(Debug, Deserialize)]
struct CategoryRow {
    #[serde(alias = "category_id")]
    id: i64,
    name: String,
    #[serde(default)]
    r#type: Option<EntryType>,
}

#[derive(Debug, Deserialize)]
struct CategoriesEnvelope {
    #[serde(default)]
    r#type: Option<EntryType>,
    #[serde(default)]
    categories: Vec<CategoryRow>,
}

impl CategoriesEnvelope {
    fn into_categories(self, requested: Option<EntryType>) -> Vec<Category> {
        let fallback = self.r#type.or(requested);
        self.categories
            .into_iter()
            .filter_map(|row| match row.r#type.or(fallback) {
                Some(kind) => Some(Category {
                    id: row.id,
                    name: row.name,
                    r#type: kind,
                }),
                None => {
                    warn!(category = row.id, "category without a type skipped");
                    None
                }
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct SpendingEnvelope {
    #[serde(default)]
    by_category: Vec<SpendingRecord>,
}

#[derive(Debug, Deserialize)]
struct BudgetsEnvelope {
    #[serde(default)]
    budgets: Vec<BudgetRecord>,
}

#[derive(Debug, Deserialize)]
struct NetWorthEnvelope {
    #[serde(default)]
    net_worth: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct Owned<'a, T: Serialize> {
    user_id: &'a str,
    #[serde(flatten)]
    body: &'a T,
}

pub struct HttpService {
    client: Client,
    base_url: String,
}

impl HttpService {
    pub fn new(config: &ClientConfig) -> anyhow::Result<Self> {
        Ok(Self {
            client: http_client(config.request_timeout)?,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let url = self.url(path);
        debug!(%url, "GET");
        let resp = self.client.get(&url).query(query).send().await?;
        decode(resp).await
    }

    async fn post<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Created, ClientError> {
        let url = self.url(path);
        debug!(%url, "POST");
        let resp = self.client.post(&url).json(body).send().await?;
        decode(resp).await
    }
}

/// Non-success → `Service` carrying the body's `detail`; bad JSON → `Service` too.
async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    let status = resp.status();
    let bytes = resp.bytes().await?;
    if !status.is_success() {
        let message = serde_json::from_slice::<ErrorBody>(&bytes)
            .ok()
            .and_then(|b| b.detail)
            .map(|d| match d {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .unwrap_or_else(|| "An error occurred".to_string());
        return Err(ClientError::Service {
            status: status.as_u16(),
            message,
        });
    }
    serde_json::from_slice(&bytes).map_err(|e| ClientError::Service {
        status: status.as_u16(),
        message: format!("malformed response: {e}"),
    })
}

fn range_query(range: DateRange) -> [(&'static str, String); 2] {
    [
        ("start_date", range.start.to_string()),
        ("end_date", range.end.to_string()),
    ]
}

#[async_trait]
impl RemoteService for HttpService {
    async fn transactions(
        &self,
        owner: &str,
        range: Option<DateRange>,
    ) -> Result<Vec<Transaction>, ClientError> {
        let mut query = vec![("user_id", owner.to_string())];
        if let Some(r) = range {
            query.extend(range_query(r));
        }
        let env: TransactionsEnvelope = self.get("/transactions", &query).await?;
        Ok(env.transactions)
    }

    async fn accounts(&self, owner: &str) -> Result<Vec<Account>, ClientError> {
        let env: AccountsEnvelope = self
            .get("/accounts", &[("user_id", owner.to_string())])
            .await?;
        Ok(env.accounts)
    }

    async fn categories(
        &self,
        owner: &str,
        kind: Option<EntryType>,
    ) -> Result<Vec<Category>, ClientError> {
        let mut query = vec![("user_id", owner.to_string())];
        if let Some(k) = kind {
            query.push(("type", k.as_str().to_string()));
        }
        let env: CategoriesEnvelope = self.get("/categories", &query).await?;
        Ok(env.into_categories(kind))
    }

    async fn create_transaction(
        &self,
        _owner: &str,
        tx: &NewTransaction,
    ) -> Result<Created, ClientError> {
        // ownership follows the account
        self.post("/transactions", tx).await
    }

    async fn create_account(
        &self,
        owner: &str,
        account: &NewAccount,
    ) -> Result<Created, ClientError> {
        self.post(
            "/accounts",
            &Owned {
                user_id: owner,
                body: account,
            },
        )
        .await
    }

    async fn create_category(
        &self,
        owner: &str,
        category: &NewCategory,
    ) -> Result<Created, ClientError> {
        self.post(
            "/categories",
            &Owned {
                user_id: owner,
                body: category,
            },
        )
        .await
    }

    async fn create_budget(&self, owner: &str, budget: &NewBudget) -> Result<Created, ClientError> {
        self.post(
            "/budgets",
            &Owned {
                user_id: owner,
                body: budget,
            },
        )
        .await
    }

    async fn spending(
        &self,
        owner: &str,
        range: DateRange,
    ) -> Result<Vec<SpendingRecord>, ClientError> {
        let path = format!("/analytics/users/{owner}/spending");
        let env: SpendingEnvelope = self.get(&path, &range_query(range)).await?;
        Ok(env.by_category)
    }

    async fn budget_progress(
        &self,
        owner: &str,
        month: NaiveDate,
    ) -> Result<Vec<BudgetRecord>, ClientError> {
        let path = format!("/analytics/users/{owner}/budgets/progress");
        let env: BudgetsEnvelope = self.get(&path, &[("month", month.to_string())]).await?;
        Ok(env.budgets)
    }

    async fn net_worth(&self, owner: &str) -> Result<Decimal, ClientError> {
        let path = format!("/analytics/users/{owner}/net-worth");
        let env: NetWorthEnvelope = self.get(&path, &[]).await?;
        Ok(env.net_worth.unwrap_or_default())
    }
}
