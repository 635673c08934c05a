// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! End-to-end scenarios over the pure analytics operations.

use chrono::NaiveDate;
use finance_analytics_rs::csv_io::read_transactions;
use finance_analytics_rs::{
    CooccurrenceGraph, OwnerId, SortDirection, SortKey, Transaction, TransactionId,
    TransactionKind, budget, search, sort, top_k, trends, window,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::io::Cursor;

fn make_expense(id: &str, day: u32, category: &str, amount: Decimal) -> Transaction {
    Transaction::new(
        TransactionId::new(id),
        OwnerId::new("alice"),
        TransactionKind::Expense,
        amount,
        category,
        None,
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
    )
    .unwrap()
}

/// Groceries and Gas on January 1st, Groceries alone on January 2nd.
fn scenario() -> Vec<Transaction> {
    vec![
        make_expense("1", 1, "Groceries", dec!(50)),
        make_expense("2", 1, "Gas", dec!(30)),
        make_expense("3", 2, "Groceries", dec!(20)),
    ]
}

fn ids(records: &[Transaction]) -> Vec<&str> {
    records.iter().map(|t| t.id().as_str()).collect()
}

#[test]
fn scenario_graph() {
    let graph = CooccurrenceGraph::build(&scenario());
    assert_eq!(graph.neighbors("Groceries"), ["Gas".to_string()]);
    assert_eq!(graph.neighbors("Gas"), ["Groceries".to_string()]);
    assert_eq!(graph.edge_count(), 1);
    assert_eq!(graph.reachable_count("Groceries"), 1);
}

#[test]
fn scenario_window() {
    assert_eq!(window::max_spending_in_window(&scenario(), 1), dec!(80));
    assert_eq!(window::max_spending_in_window(&scenario(), 0), dec!(80));
    assert_eq!(window::max_spending_in_window(&scenario(), 2), dec!(100));
}

#[test]
fn scenario_budget() {
    let allocation = budget::allocate_budget(&scenario(), dec!(700));
    assert_eq!(allocation.len(), 2);
    assert_eq!(allocation["Groceries"], dec!(490));
    assert_eq!(allocation["Gas"], dec!(210));
}

#[test]
fn sort_then_range_search() {
    let records = vec![
        make_expense("a", 1, "X", dec!(12.50)),
        make_expense("b", 2, "X", dec!(3.00)),
        make_expense("c", 3, "X", dec!(12.00)),
        make_expense("d", 4, "X", dec!(40.00)),
        make_expense("e", 5, "X", dec!(11.75)),
    ];
    let sorted = sort::sort(&records, SortKey::Amount, SortDirection::Ascending);
    let found = search::by_amount_range(&sorted, dec!(12), dec!(0.5));
    assert_eq!(ids(&found), vec!["e", "c", "a"]);
}

#[test]
fn multi_key_sort_by_chaining() {
    let records = vec![
        make_expense("a", 2, "Food", dec!(5)),
        make_expense("b", 1, "Rent", dec!(5)),
        make_expense("c", 1, "Food", dec!(5)),
        make_expense("d", 2, "Rent", dec!(5)),
    ];
    // Secondary key first, primary key last.
    let by_date = sort::sort(&records, SortKey::Date, SortDirection::Descending);
    let by_category = sort::sort(&by_date, SortKey::Category, SortDirection::Ascending);
    assert_eq!(ids(&by_category), vec!["a", "c", "d", "b"]);
}

#[test]
fn top_expenses_from_csv_snapshot() {
    let csv = "id,owner,type,amount,category,note,date\n\
               t1,alice,expense,120,Shopping,new shoes,2025-02-01\n\
               t2,alice,income,3000,Salary,,2025-02-01\n\
               t3,alice,expense,45,Groceries,weekly groceries,2025-02-02\n\
               t4,alice,expense,800,Rent,,2025-02-03\n\
               t5,alice,expense,15,Transportation,bus pass,2025-02-04\n";
    let records = read_transactions(Cursor::new(csv)).unwrap();

    let top = top_k::top_k(&records, 2, true);
    assert_eq!(ids(&top), vec!["t2", "t4"]);

    let bottom = top_k::top_k(&records, 2, false);
    assert_eq!(ids(&bottom), vec!["t5", "t3"]);

    let groceries = search::in_notes(&records, "groceries");
    assert_eq!(ids(&groceries), vec!["t3"]);

    assert_eq!(ids(&search::by_category(&records, "rent")), vec!["t4"]);
}

#[test]
fn monthly_series_and_growth() {
    let csv = "id,owner,type,amount,category,note,date\n\
               t1,alice,income,1000,Salary,,2025-01-05\n\
               t2,alice,expense,500,Rent,,2025-01-06\n\
               t3,alice,income,1000,Salary,,2025-02-05\n\
               t4,alice,expense,750,Rent,,2025-02-06\n\
               t5,alice,income,1000,Salary,,2025-03-05\n";
    let records = read_transactions(Cursor::new(csv)).unwrap();

    let income = trends::monthly_totals(&records, TransactionKind::Income);
    assert_eq!(income.len(), 3);
    let expenses = trends::monthly_totals(&records, TransactionKind::Expense);
    assert_eq!(expenses.len(), 2);

    // Cumulative balances 500, 750, 1750.
    assert_eq!(trends::growth_rate(&records), Some(dec!(250)));
}
