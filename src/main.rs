// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::Arc;

use anyhow::Result;

use finview::config::ClientConfig;
use finview::remote::{HttpService, RemoteService};
use finview::session::SqliteIdentityStore;
use finview::{App, cli, commands, db, utils};

#[tokio::main]
async fn main() -> Result<()> {
    utils::init_tracing();
    let matches = cli::build_cli().get_matches();

    let conn = db::open_or_init()?;
    if let Some(("config", sub)) = matches.subcommand() {
        return commands::config::handle(&conn, sub);
    }

    let config = ClientConfig::load(&conn)?;
    let service: Arc<dyn RemoteService> = Arc::new(HttpService::new(&config)?);
    let app = App::new(config, SqliteIdentityStore::new(conn)?, service);
    app.initialize();

    let result = match matches.subcommand() {
        Some(("login", sub)) => commands::session::login(&app, sub),
        Some(("logout", _)) => commands::session::logout(&app),
        Some(("whoami", _)) => commands::session::whoami(&app),
        Some(("dashboard", sub)) => commands::dashboard::handle(&app, sub).await,
        Some(("tx", sub)) => commands::transactions::handle(&app, sub).await,
        Some(("account", sub)) => commands::accounts::handle(&app, sub).await,
        Some(("category", sub)) => commands::categories::handle(&app, sub).await,
        Some(("budget", sub)) => commands::budgets::handle(&app, sub).await,
        Some(("analytics", sub)) => commands::analytics::handle(&app, sub).await,
        Some(("export", sub)) => commands::exporter::handle(&app, sub).await,
        _ => {
            cli::build_cli().print_help()?;
            println!();
            Ok(())
        }
    };
    commands::flush_notices(&app);
    result
}
