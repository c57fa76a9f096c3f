// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::aggregate::{BudgetProgress, BudgetStatus};
use crate::app::App;
use crate::commands::{guard, output_flags, settled};
use crate::models::BudgetDraft;
use crate::utils::{
    current_month, fmt_money, maybe_print_json, parse_decimal, parse_month, pretty_table,
};
use crate::views::ViewId;

const BAR_WIDTH: u32 = 20;

pub async fn handle(app: &App, m: &clap::ArgMatches) -> Result<()> {
    if !guard(app, ViewId::Analytics) {
        return Ok(());
    }
    match m.subcommand() {
        Some(("set", sub)) => {
            let month = month_from(sub)?;
            let amount =
                parse_decimal(sub.get_one::<String>("amount").map_or("", String::as_str))?;
            let draft = BudgetDraft {
                category_id: sub.get_one::<i64>("category-id").copied(),
                amount,
                month,
            };
            let created = app.create_budget(&draft).await?;
            println!(
                "Budget of {} set for {} (id {})",
                fmt_money(&amount, &app.config.currency_symbol),
                month.format("%Y-%m"),
                created.id
            );
        }
        Some(("progress", sub)) => {
            let (json_flag, jsonl_flag) = output_flags(sub);
            let state = app.load_analytics(month_from(sub)?).await?;
            let Some(model) = settled(&state) else {
                return Ok(());
            };
            if !maybe_print_json(json_flag, jsonl_flag, &model.budgets)? {
                print_progress(&model.budgets, &app.config.currency_symbol);
            }
        }
        _ => {}
    }
    Ok(())
}

pub(crate) fn month_from(sub: &clap::ArgMatches) -> Result<NaiveDate> {
    match sub.get_one::<String>("month") {
        Some(m) => parse_month(m),
        None => Ok(current_month()),
    }
}

pub(crate) fn print_progress(budgets: &[BudgetProgress], sym: &str) {
    if budgets.is_empty() {
        println!("No budgets set for this month.");
        return;
    }
    let rows = budgets
        .iter()
        .map(|b| {
            vec![
                b.category_name.clone(),
                fmt_money(&b.budget_amount, sym),
                fmt_money(&b.spent, sym),
                fmt_money(&b.remaining, sym),
                format!(
                    "{} {}",
                    bar(b.display_percent),
                    b.percent
                        .map(|p| format!("{}%", p.round_dp(1)))
                        .unwrap_or_else(|| "n/a".into())
                ),
                label(b.status).to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Category", "Budget", "Spent", "Remaining", "Progress", "Status"],
            rows,
        )
    );
}

fn label(s: BudgetStatus) -> &'static str {
    match s {
        BudgetStatus::OnTrack => "On track",
        BudgetStatus::NearlyBudget => "Nearly at budget",
        BudgetStatus::OverBudget => "Over budget",
    }
}

/// Progress bar for a percent already clamped to 0..=100.
pub fn bar(display_percent: Decimal) -> String {
    let filled = (display_percent * Decimal::from(BAR_WIDTH) / Decimal::ONE_HUNDRED)
        .round()
        .to_u32()
        .unwrap_or(0)
        .min(BAR_WIDTH);
    format!(
        "[{}{}]",
        "#".repeat(filled as usize),
        "-".repeat((BAR_WIDTH - filled) as usize)
    )
}
