// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};

use crate::app::App;
use crate::session::SessionStatus;

pub fn login(app: &App, m: &clap::ArgMatches) -> Result<()> {
    let id = m
        .get_one::<String>("USER_ID")
        .context("missing user id")?
        .trim()
        .to_string();
    let current = app.session.snapshot();
    let previous = match current.status {
        SessionStatus::Authenticated => current.identity,
        _ => None,
    };
    if previous.as_deref() == Some(id.as_str()) {
        println!("Already signed in as {id}");
        return Ok(());
    }
    if previous.is_some() {
        app.logout()?;
    }
    app.login(&id)?;
    match previous {
        Some(prev) => println!("Switched from {prev} to {id}"),
        None => println!("Signed in as {id}"),
    }
    Ok(())
}

pub fn logout(app: &App) -> Result<()> {
    match app.session.current_identity() {
        Some(id) => {
            app.logout()?;
            println!("Signed out {id}");
        }
        None => println!("Not signed in"),
    }
    Ok(())
}

pub fn whoami(app: &App) -> Result<()> {
    let s = app.session.snapshot();
    match s.identity {
        Some(id) => println!("{} as {}", s.status, id),
        None => println!("{}", s.status),
    }
    Ok(())
}
