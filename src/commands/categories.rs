// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};

use crate::aggregate::CategoriesModel;
use crate::app::App;
use crate::commands::{guard, output_flags, settled};
use crate::models::{Category, CategoryDraft, EntryType};
use crate::utils::{maybe_print_json, pretty_table};
use crate::views::ViewId;

pub async fn handle(app: &App, m: &clap::ArgMatches) -> Result<()> {
    if !guard(app, ViewId::Categories) {
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
    let name = sub.get_one::<String>("NAME").context("missing name")?;
    let r#type: EntryType = sub
        .get_one::<String>("type")
        .map(String::as_str)
        .unwrap_or("expense")
        .parse()?;
    let draft = CategoryDraft {
        name: name.clone(),
        r#type,
    };
    let created = app.create_category(&draft).await?;
    println!(
        "Category '{}' ({}) created (id {})",
        draft.name.trim(),
        draft.r#type,
        created.id
    );
    Ok(())
}

async fn list(app: &App, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = output_flags(sub);
    let kind = sub
        .get_one::<String>("type")
        .map(|s| s.parse::<EntryType>())
        .transpose()?;
    let state = app.load_categories().await?;
    let Some(model) = settled(&state) else {
        return Ok(());
    };
    let data = filtered(&model, kind);
    if maybe_print_json(json_flag, jsonl_flag, &data)? {
        return Ok(());
    }
    if data.is_empty() {
        println!("No categories yet.");
        return Ok(());
    }
    let rows = data
        .iter()
        .map(|c| vec![c.id.to_string(), c.name.clone(), c.r#type.to_string()])
        .collect();
    println!("{}", pretty_table(&["ID", "Name", "Type"], rows));
    Ok(())
}

/// Income first, then expense, optionally narrowed to one type.
pub fn filtered(model: &CategoriesModel, kind: Option<EntryType>) -> Vec<Category> {
    let income = model.income.iter();
    let expense = model.expense.iter();
    match kind {
        Some(EntryType::Income) => income.cloned().collect(),
        Some(EntryType::Expense) => expense.cloned().collect(),
        None => income.chain(expense).cloned().collect(),
    }
}
