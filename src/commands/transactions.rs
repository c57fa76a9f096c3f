// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::Local;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::aggregate::TransactionsModel;
use crate::app::App;
use crate::commands::{guard, output_flags, range_from, settled};
use crate::models::{Account, Category, EntryType, Transaction, TransactionDraft};
use crate::utils::{fmt_money, maybe_print_json, parse_date, parse_decimal, pretty_table};
use crate::views::ViewId;

pub async fn handle(app: &App, m: &clap::ArgMatches) -> Result<()> {
    if !guard(app, ViewId::Transactions) {
        return Ok(());
    }
    match m.subcommand() {
        Some(("add", sub)) => add(app, sub).await?,
        Some(("list", sub)) => list(app, sub).await?,
        _ => {}
    }
    Ok(())
}

async fn add(app: &App, sub: &clap::ArgMatches) -> Result<()> {
    let draft = draft_from(sub)?;
    let created = app.create_transaction(&draft).await?;
    println!(
        "Recorded {} {} on {} (id {})",
        draft.r#type,
        draft.amount.unwrap_or_default(),
        draft.date,
        created.id
    );
    Ok(())
}

/// Form values as typed; missing ids are left for validation to report.
pub fn draft_from(sub: &clap::ArgMatches) -> Result<TransactionDraft> {
    let amount = sub
        .get_one::<String>("amount")
        .map(|s| parse_decimal(s))
        .transpose()?;
    let r#type: EntryType = sub
        .get_one::<String>("type")
        .map(String::as_str)
        .unwrap_or("expense")
        .parse()?;
    let date = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?,
        None => Local::now().date_naive(),
    };
    Ok(TransactionDraft {
        amount,
        r#type,
        date,
        category_id: sub.get_one::<i64>("category-id").copied(),
        account_id: sub.get_one::<i64>("account-id").copied(),
        description: sub
            .get_one::<String>("description")
            .cloned()
            .unwrap_or_default(),
    })
}

async fn list(app: &App, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = output_flags(sub);
    let range = range_from(sub)?;
    let state = app.load_transactions(range).await?;
    let Some(model) = settled(&state) else {
        return Ok(());
    };
    let data = query_rows(&model, sub.get_one::<usize>("limit").copied());
    if maybe_print_json(json_flag, jsonl_flag, &data)? {
        return Ok(());
    }
    if data.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }
    let sym = &app.config.currency_symbol;
    let rows: Vec<Vec<String>> = data
        .iter()
        .map(|r| {
            vec![
                r.date.clone(),
                r.r#type.to_string(),
                r.account.clone(),
                r.category.clone(),
                r.description.clone(),
                fmt_money(&r.amount, sym),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Date", "Type", "Account", "Category", "Description", "Amount"],
            rows,
        )
    );
    let s = &model.summary;
    println!(
        "Income {}  Expense {}  Balance {}",
        fmt_money(&s.income, sym),
        fmt_money(&s.expense, sym),
        fmt_money(&s.balance, sym)
    );
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub date: String,
    pub r#type: EntryType,
    pub account: String,
    pub category: String,
    pub description: String,
    pub amount: Decimal,
}

pub fn query_rows(model: &TransactionsModel, limit: Option<usize>) -> Vec<TransactionRow> {
    let rows = rows_for(&model.transactions, &model.categories, &model.accounts);
    match limit {
        Some(n) => rows.into_iter().take(n).collect(),
        None => rows,
    }
}

/// Resolves category and account names from the lookup lists when the row lacks them.
pub fn rows_for(
    transactions: &[Transaction],
    categories: &[Category],
    accounts: &[Account],
) -> Vec<TransactionRow> {
    transactions
        .iter()
        .map(|t| {
            let category = t
                .category
                .clone()
                .or_else(|| {
                    t.category_id.and_then(|id| {
                        categories.iter().find(|c| c.id == id).map(|c| c.name.clone())
                    })
                })
                .unwrap_or_default();
            let account = t
                .account_id
                .and_then(|id| accounts.iter().find(|a| a.id == id).map(|a| a.name.clone()))
                .unwrap_or_default();
            TransactionRow {
                id: t.id,
                date: t.date.to_string(),
                r#type: t.r#type,
                account,
                category,
                description: t.description.clone(),
                amount: t.amount,
            }
        })
        .collect()
}
