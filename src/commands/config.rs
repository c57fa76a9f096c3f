// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use rusqlite::Connection;
use serde_json::json;

use crate::commands::output_flags;
use crate::config::ClientConfig;
use crate::utils::{maybe_print_json, pretty_table};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(conn, sub)?,
        Some(("set", sub)) => {
            let key = sub.get_one::<String>("KEY").context("missing key")?;
            let value = sub.get_one::<String>("VALUE").context("missing value")?;
            ClientConfig::set(conn, key, value)?;
            println!("{} = {}", key, value.trim());
        }
        _ => {}
    }
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = output_flags(sub);
    let cfg = ClientConfig::load(conn)?;
    let descriptor = cfg
        .descriptor_timeout
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|| "0".into());
    let entries = vec![
        ("api_base_url", cfg.api_base_url.clone()),
        ("request_timeout_secs", cfg.request_timeout.as_secs().to_string()),
        ("descriptor_timeout_secs", descriptor),
        ("recent_limit", cfg.recent_limit.to_string()),
        ("currency_symbol", cfg.currency_symbol.clone()),
    ];
    let as_json: Vec<_> = entries
        .iter()
        .map(|(k, v)| json!({ "key": k, "value": v }))
        .collect();
    if !maybe_print_json(json_flag, jsonl_flag, &as_json)? {
        let rows = entries
            .into_iter()
            .map(|(k, v)| vec![k.to_string(), v])
            .collect();
        println!("{}", pretty_table(&["Key", "Value"], rows));
    }
    Ok(())
}
