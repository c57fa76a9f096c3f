// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::ClientError;

/// Direction of money for transactions and categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Income,
    Expense,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryType {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(ClientError::validation(
                "type",
                format!("'{other}' is not one of: income, expense"),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Checking,
    Savings,
    CreditCard,
    Cash,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Checking => "checking",
            Self::Savings => "savings",
            Self::CreditCard => "credit_card",
            Self::Cash => "cash",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "checking" => Ok(Self::Checking),
            "savings" => Ok(Self::Savings),
            "credit_card" => Ok(Self::CreditCard),
            "cash" => Ok(Self::Cash),
            other => Err(ClientError::validation(
                "type",
                format!("'{other}' is not one of: checking, savings, credit_card, cash"),
            )),
        }
    }
}

/// Treats an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

/// Money the service reports as spent or moved; `null` reads as zero.
fn service_amount<'de, D>(d: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let v: Decimal = null_as_default(d)?;
    if v.is_sign_negative() && !v.is_zero() {
        return Err(serde::de::Error::custom(format!(
            "amount must not be negative, got {v}"
        )));
    }
    Ok(v)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(alias = "transaction_id")]
    pub id: i64,
    pub date: NaiveDate,
    #[serde(deserialize_with = "service_amount")]
    pub amount: Decimal,
    pub r#type: EntryType,
    #[serde(default)]
    pub category_id: Option<i64>,
    /// Category name as joined by the service, when it sends one.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub account_id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(alias = "category_id")]
    pub id: i64,
    pub name: String,
    pub r#type: EntryType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(alias = "account_id")]
    pub id: i64,
    pub name: String,
    pub r#type: AccountType,
    #[serde(default, deserialize_with = "null_as_default")]
    pub balance: Decimal,
}

/// One row of the service's spending-by-category report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingRecord {
    #[serde(default)]
    pub category_id: Option<i64>,
    pub name: String,
    pub r#type: EntryType,
    #[serde(default, deserialize_with = "service_amount")]
    pub total_amount: Decimal,
}

/// Raw budget progress as sent by the service. Any status or percent the service
/// precomputes is ignored; see [`crate::aggregate::classify`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetRecord {
    #[serde(default)]
    pub category_id: Option<i64>,
    pub category_name: String,
    #[serde(default, deserialize_with = "service_amount")]
    pub spent: Decimal,
    #[serde(default, deserialize_with = "null_as_default")]
    pub budget_amount: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ClientError> {
        if end < start {
            return Err(ClientError::validation(
                "end_date",
                format!("{end} is before {start}"),
            ));
        }
        Ok(Self { start, end })
    }
}

/// Acknowledgement returned by every create endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Created {
    #[serde(
        alias = "transaction_id",
        alias = "account_id",
        alias = "category_id",
        alias = "budget_id"
    )]
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
}

// Submission bodies. Only constructed through the drafts' `validate`.

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTransaction {
    pub account_id: i64,
    pub category_id: i64,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub description: String,
    pub r#type: EntryType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAccount {
    pub name: String,
    pub r#type: AccountType,
    pub balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCategory {
    pub name: String,
    pub r#type: EntryType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewBudget {
    pub category_id: i64,
    pub amount: Decimal,
    pub month: NaiveDate,
}

/// Form state for a new transaction, as entered.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub amount: Option<Decimal>,
    pub r#type: EntryType,
    pub date: NaiveDate,
    pub category_id: Option<i64>,
    pub account_id: Option<i64>,
    pub description: String,
}

impl TransactionDraft {
    pub fn validate(&self) -> Result<NewTransaction, ClientError> {
        let amount = self
            .amount
            .ok_or_else(|| ClientError::validation("amount", "is required"))?;
        non_negative("amount", amount)?;
        let account_id = self
            .account_id
            .ok_or_else(|| ClientError::validation("account_id", "choose an account"))?;
        let category_id = self
            .category_id
            .ok_or_else(|| ClientError::validation("category_id", "choose a category"))?;
        Ok(NewTransaction {
            account_id,
            category_id,
            amount,
            date: self.date,
            description: self.description.trim().to_string(),
            r#type: self.r#type,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccountDraft {
    pub name: String,
    pub r#type: AccountType,
    pub balance: Decimal,
}

impl AccountDraft {
    pub fn validate(&self) -> Result<NewAccount, ClientError> {
        Ok(NewAccount {
            name: required_name(&self.name)?,
            r#type: self.r#type,
            balance: self.balance,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryDraft {
    pub name: String,
    pub r#type: EntryType,
}

impl CategoryDraft {
    pub fn validate(&self) -> Result<NewCategory, ClientError> {
        Ok(NewCategory {
            name: required_name(&self.name)?,
            r#type: self.r#type,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BudgetDraft {
    pub category_id: Option<i64>,
    pub amount: Decimal,
    pub month: NaiveDate,
}

impl BudgetDraft {
    pub fn validate(&self) -> Result<NewBudget, ClientError> {
        let category_id = self
            .category_id
            .ok_or_else(|| ClientError::validation("category_id", "choose a category"))?;
        non_negative("amount", self.amount)?;
        if self.month.day() != 1 {
            return Err(ClientError::validation(
                "month",
                "budget month must be the first day of the month",
            ));
        }
        Ok(NewBudget {
            category_id,
            amount: self.amount,
            month: self.month,
        })
    }
}

fn required_name(name: &str) -> Result<String, ClientError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ClientError::validation("name", "must not be empty"));
    }
    Ok(name.to_string())
}

fn non_negative(field: &'static str, v: Decimal) -> Result<(), ClientError> {
    if v.is_sign_negative() && !v.is_zero() {
        return Err(ClientError::validation(field, "must not be negative"));
    }
    Ok(())
}
