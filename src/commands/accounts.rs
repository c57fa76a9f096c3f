// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};

use crate::app::App;
use crate::commands::{guard, output_flags, settled};
use crate::models::{AccountDraft, AccountType};
use crate::utils::{fmt_money, maybe_print_json, parse_decimal, pretty_table};
use crate::views::ViewId;

pub async fn handle(app: &App, m: &clap::ArgMatches) -> Result<()> {
    if !guard(app, ViewId::Accounts) {
        return Ok(());
    }
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("NAME").context("missing name")?;
            let r#type: AccountType = sub
                .get_one::<String>("type")
                .map(String::as_str)
                .unwrap_or("checking")
                .parse()?;
            let balance =
                parse_decimal(sub.get_one::<String>("balance").map_or("0", String::as_str))?;
            let draft = AccountDraft {
                name: name.clone(),
                r#type,
                balance,
            };
            let created = app.create_account(&draft).await?;
            println!("Account '{}' created (id {})", draft.name.trim(), created.id);
        }
        Some(("list", sub)) => {
            let (json_flag, jsonl_flag) = output_flags(sub);
            let state = app.load_accounts().await?;
            let Some(model) = settled(&state) else {
                return Ok(());
            };
            if !maybe_print_json(json_flag, jsonl_flag, &model.accounts)? {
                if model.accounts.is_empty() {
                    println!("No accounts yet.");
                    return Ok(());
                }
                let sym = &app.config.currency_symbol;
                let rows = model
                    .accounts
                    .iter()
                    .map(|a| {
                        vec![
                            a.id.to_string(),
                            a.name.clone(),
                            a.r#type.to_string(),
                            fmt_money(&a.balance, sym),
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["ID", "Name", "Type", "Balance"], rows));
            }
        }
        _ => {}
    }
    Ok(())
}
