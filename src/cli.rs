// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, arg, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Pretty JSON output"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("One JSON object per line"),
    )
}

fn range_args(cmd: Command) -> Command {
    cmd.arg(arg!(--from <DATE> "Start date, YYYY-MM-DD").required(false))
        .arg(arg!(--to <DATE> "End date, YYYY-MM-DD").required(false))
}

fn month_arg(cmd: Command) -> Command {
    cmd.arg(arg!(--month <MONTH> "YYYY-MM (defaults to the current month)").required(false))
}

pub fn build_cli() -> Command {
    Command::new("finview")
        .about("Personal finance dashboard client")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand(
            Command::new("login")
                .about("Sign in with a user id")
                .arg(arg!(<USER_ID> "Identifier issued by the service")),
        )
        .subcommand(Command::new("logout").about("Forget the signed-in identity"))
        .subcommand(Command::new("whoami").about("Show the session state"))
        .subcommand(json_flags(
            Command::new("dashboard").about("Income, expense, balance and recent transactions"),
        ))
        .subcommand(
            Command::new("tx")
                .about("Transactions")
                .subcommand_required(true)
                .subcommand(json_flags(range_args(
                    Command::new("list").arg(
                        arg!(--limit <N> "Show at most N rows")
                            .required(false)
                            .value_parser(value_parser!(usize)),
                    ),
                )))
                .subcommand(
                    Command::new("add")
                        .arg(arg!(--amount <AMOUNT>).required(true))
                        .arg(
                            arg!(--"type" <TYPE> "income or expense")
                                .required(false)
                                .default_value("expense"),
                        )
                        .arg(arg!(--date <DATE> "Defaults to today").required(false))
                        .arg(
                            arg!(--"category-id" <ID>)
                                .required(false)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(
                            arg!(--"account-id" <ID>)
                                .required(false)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(arg!(--description <TEXT>).required(false)),
                ),
        )
        .subcommand(
            Command::new("account")
                .about("Accounts")
                .subcommand_required(true)
                .subcommand(json_flags(Command::new("list")))
                .subcommand(
                    Command::new("add")
                        .arg(arg!(<NAME>))
                        .arg(
                            arg!(--"type" <TYPE> "checking, savings, credit_card or cash")
                                .required(false)
                                .default_value("checking"),
                        )
                        .arg(
                            arg!(--balance <AMOUNT>)
                                .required(false)
                                .default_value("0"),
                        ),
                ),
        )
        .subcommand(
            Command::new("category")
                .about("Categories")
                .subcommand_required(true)
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(arg!(--"type" <TYPE> "income or expense").required(false)),
                ))
                .subcommand(
                    Command::new("add").arg(arg!(<NAME>)).arg(
                        arg!(--"type" <TYPE> "income or expense")
                            .required(false)
                            .default_value("expense"),
                    ),
                ),
        )
        .subcommand(
            Command::new("budget")
                .about("Monthly budgets")
                .subcommand_required(true)
                .subcommand(month_arg(
                    Command::new("set")
                        .arg(
                            arg!(--"category-id" <ID>)
                                .required(false)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(arg!(--amount <AMOUNT>).required(true)),
                ))
                .subcommand(json_flags(month_arg(Command::new("progress")))),
        )
        .subcommand(json_flags(month_arg(
            Command::new("analytics").about("Net worth, spending by category and budgets"),
        )))
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand_required(true)
                .subcommand(range_args(
                    Command::new("transactions")
                        .arg(
                            arg!(--format <FORMAT> "csv or json")
                                .required(false)
                                .default_value("csv"),
                        )
                        .arg(arg!(--out <PATH>).required(true)),
                )),
        )
        .subcommand(
            Command::new("config")
                .about("Client settings")
                .subcommand_required(true)
                .subcommand(json_flags(Command::new("show")))
                .subcommand(Command::new("set").arg(arg!(<KEY>)).arg(arg!(<VALUE>))),
        )
}
