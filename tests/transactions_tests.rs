// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{Book, date, dec};
use finview::aggregate::transactions_view;
use finview::commands::{range_from, transactions};
use finview::models::EntryType;
use finview::{ClientError, cli};

fn list_matches(args: &[&str]) -> clap::ArgMatches {
    let mut argv = vec!["finview", "tx", "list"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("tx", tx_m)) => match tx_m.subcommand() {
            Some(("list", list_m)) => list_m.clone(),
            _ => panic!("no list subcommand"),
        },
        _ => panic!("no tx subcommand"),
    }
}

fn add_matches(args: &[&str]) -> clap::ArgMatches {
    let mut argv = vec!["finview", "tx", "add"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("tx", tx_m)) => match tx_m.subcommand() {
            Some(("add", add_m)) => add_m.clone(),
            _ => panic!("no add subcommand"),
        },
        _ => panic!("no tx subcommand"),
    }
}

#[test]
fn list_limit_respected() {
    let book = Book::sample();
    let model = transactions_view(None, book.transactions, book.categories, book.accounts);
    let m = list_matches(&["--limit", "2"]);
    let rows = transactions::query_rows(&model, m.get_one::<usize>("limit").copied());
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].date, "2025-03-12");
    assert_eq!(rows[0].category, "Food");
    assert_eq!(rows[0].account, "Checking");
}

#[test]
fn range_defaults_and_validation() {
    assert_eq!(range_from(&list_matches(&[])).unwrap(), None);
    let r = range_from(&list_matches(&["--from", "2025-03-01", "--to", "2025-03-31"]))
        .unwrap()
        .unwrap();
    assert_eq!(r.start, date(2025, 3, 1));
    assert_eq!(r.end, date(2025, 3, 31));
    assert!(range_from(&list_matches(&["--to", "2025-03-31"])).is_err());
    assert!(range_from(&list_matches(&["--from", "2025-04-01", "--to", "2025-03-01"])).is_err());
}

#[test]
fn add_args_build_a_draft() {
    let m = add_matches(&[
        "--amount",
        " 19.99 ",
        "--type",
        "Income",
        "--date",
        "2025-03-02",
        "--category-id",
        "4",
        "--account-id",
        "2",
        "--description",
        "refund",
    ]);
    let d = transactions::draft_from(&m).unwrap();
    assert_eq!(d.amount, Some(dec("19.99")));
    assert_eq!(d.r#type, EntryType::Income);
    assert_eq!(d.date, date(2025, 3, 2));
    let body = d.validate().unwrap();
    assert_eq!(body.category_id, 4);
    assert_eq!(body.account_id, 2);
}

#[test]
fn add_without_account_fails_validation() {
    let m = add_matches(&["--amount", "5", "--category-id", "1"]);
    let d = transactions::draft_from(&m).unwrap();
    assert_eq!(d.r#type, EntryType::Expense);
    assert!(matches!(
        d.validate(),
        Err(ClientError::Validation {
            field: "account_id",
            ..
        })
    ));
}

#[test]
fn add_rejects_unknown_type() {
    let m = add_matches(&["--amount", "5", "--type", "transfer"]);
    assert!(transactions::draft_from(&m).is_err());
}
