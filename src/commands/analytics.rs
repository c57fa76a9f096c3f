// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rust_decimal::Decimal;

use crate::aggregate::CategorySpending;
use crate::app::App;
use crate::commands::budgets::{month_from, print_progress};
use crate::commands::{guard, output_flags, settled};
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use crate::views::ViewId;

pub async fn handle(app: &App, m: &clap::ArgMatches) -> Result<()> {
    if !guard(app, ViewId::Analytics) {
        return Ok(());
    }
    let (json_flag, jsonl_flag) = output_flags(m);
    let state = app.load_analytics(month_from(m)?).await?;
    let Some(model) = settled(&state) else {
        return Ok(());
    };
    if maybe_print_json(json_flag, jsonl_flag, &*model)? {
        return Ok(());
    }
    let sym = &app.config.currency_symbol;
    println!("Analytics for {}", model.month.format("%B %Y"));
    println!("Net worth: {}", model.net_worth.display);

    if model.has_spending() {
        let rows = share_rows(&model.spending)
            .into_iter()
            .map(|(name, value, share)| {
                vec![name, fmt_money(&value, sym), format!("{}%", share.round_dp(1))]
            })
            .collect();
        println!("{}", pretty_table(&["Category", "Spent", "Share"], rows));
    } else {
        println!("No spending recorded for this month.");
    }
    print_progress(&model.budgets, sym);
    Ok(())
}

/// Each slice with its share of the total, as a chart would draw it.
pub fn share_rows(spending: &[CategorySpending]) -> Vec<(String, Decimal, Decimal)> {
    let total = spending
        .iter()
        .fold(Decimal::ZERO, |acc, s| acc.saturating_add(s.value));
    spending
        .iter()
        .map(|s| {
            let share = s
                .value
                .checked_div(total)
                .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
                .unwrap_or(Decimal::ZERO);
            (s.name.clone(), s.value, share)
        })
        .collect()
}
