// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod accounts;
pub mod analytics;
pub mod budgets;
pub mod categories;
pub mod config;
pub mod dashboard;
pub mod exporter;
pub mod session;
pub mod transactions;

use std::sync::Arc;

use anyhow::{Result, bail};
use chrono::Local;

use crate::app::App;
use crate::models::DateRange;
use crate::session::Access;
use crate::utils::parse_date;
use crate::views::{NoticeLevel, ViewId, ViewState};

/// Prints the login hint and returns false when `view` may not render.
pub(crate) fn guard(app: &App, view: ViewId) -> bool {
    match app.session.access(view) {
        Access::Render => true,
        Access::RedirectToLogin => {
            eprintln!("Not signed in. Run `finview login <USER_ID>` first.");
            false
        }
        Access::Pending => false,
    }
}

/// The model of a settled view; `None` if it was superseded while loading.
pub(crate) fn settled<M>(state: &ViewState<M>) -> Option<Arc<M>> {
    let model = state.model().cloned();
    if model.is_none() {
        eprintln!("Still loading; try again.");
    }
    model
}

pub(crate) fn output_flags(m: &clap::ArgMatches) -> (bool, bool) {
    (m.get_flag("json"), m.get_flag("jsonl"))
}

/// `--from`/`--to` as a range. A lone `--from` runs through today.
pub fn range_from(m: &clap::ArgMatches) -> Result<Option<DateRange>> {
    let from = m.get_one::<String>("from").map(|s| parse_date(s)).transpose()?;
    let to = m.get_one::<String>("to").map(|s| parse_date(s)).transpose()?;
    match (from, to) {
        (None, None) => Ok(None),
        (Some(start), end) => {
            let end = end.unwrap_or_else(|| Local::now().date_naive());
            Ok(Some(DateRange::new(start, end)?))
        }
        (None, Some(_)) => bail!("--to requires --from"),
    }
}

/// Shows and clears pending notices on stderr.
pub fn flush_notices(app: &App) {
    for n in app.notices.drain() {
        let tag = match n.level {
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        eprintln!("{tag}: {}", n.message);
    }
}
