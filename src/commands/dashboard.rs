// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::app::App;
use crate::commands::transactions::rows_for;
use crate::commands::{guard, output_flags, settled};
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use crate::views::ViewId;

pub async fn handle(app: &App, m: &clap::ArgMatches) -> Result<()> {
    if !guard(app, ViewId::Dashboard) {
        return Ok(());
    }
    let (json_flag, jsonl_flag) = output_flags(m);
    let state = app.load_dashboard().await?;
    let Some(model) = settled(&state) else {
        return Ok(());
    };
    if maybe_print_json(json_flag, jsonl_flag, &*model)? {
        return Ok(());
    }
    let sym = &app.config.currency_symbol;
    let s = &model.summary;
    println!(
        "{}",
        pretty_table(
            &["Income", "Expense", "Balance"],
            vec![vec![
                fmt_money(&s.income, sym),
                fmt_money(&s.expense, sym),
                fmt_money(&s.balance, sym),
            ]],
        )
    );
    if model.recent.is_empty() {
        println!("No transactions yet.");
        return Ok(());
    }
    println!(
        "Recent transactions ({} of {})",
        model.recent.len(),
        model.transaction_count
    );
    let rows = rows_for(&model.recent, &[], &[])
        .into_iter()
        .map(|r| {
            vec![
                r.date,
                r.r#type.to_string(),
                r.category,
                r.description,
                fmt_money(&r.amount, sym),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Date", "Type", "Category", "Description", "Amount"], rows)
    );
    Ok(())
}
