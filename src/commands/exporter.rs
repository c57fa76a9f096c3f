// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::aggregate::TransactionsModel;
use crate::app::App;
use crate::commands::transactions::query_rows;
use crate::commands::{guard, range_from, settled};
use crate::views::ViewId;

pub async fn handle(app: &App, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(app, sub).await,
        _ => Ok(()),
    }
}

async fn export_transactions(app: &App, sub: &clap::ArgMatches) -> Result<()> {
    if !guard(app, ViewId::Transactions) {
        return Ok(());
    }
    let fmt = sub
        .get_one::<String>("format")
        .map_or("csv", String::as_str)
        .to_lowercase();
    let out = sub.get_one::<String>("out").context("missing --out")?;
    check_format(&fmt)?;
    let state = app.load_transactions(range_from(sub)?).await?;
    let Some(model) = settled(&state) else {
        return Ok(());
    };
    let n = write_transactions(&model, &fmt, Path::new(out))?;
    println!("Exported {} transactions to {}", n, out);
    Ok(())
}

fn check_format(fmt: &str) -> Result<()> {
    match fmt {
        "csv" | "json" => Ok(()),
        other => bail!("Unknown format: {} (use csv|json)", other),
    }
}

/// Writes every row of the model; nothing is written for an unknown format.
pub fn write_transactions(model: &TransactionsModel, fmt: &str, out: &Path) -> Result<usize> {
    check_format(fmt)?;
    let rows = query_rows(model, None);
    match fmt {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)
                .with_context(|| format!("Create {}", out.display()))?;
            wtr.write_record([
                "id",
                "date",
                "type",
                "account",
                "category",
                "description",
                "amount",
            ])?;
            for r in &rows {
                wtr.write_record([
                    r.id.to_string(),
                    r.date.clone(),
                    r.r#type.to_string(),
                    r.account.clone(),
                    r.category.clone(),
                    r.description.clone(),
                    r.amount.to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        _ => {
            std::fs::write(out, serde_json::to_string_pretty(&rows)?)
                .with_context(|| format!("Write {}", out.display()))?;
        }
    }
    Ok(rows.len())
}
