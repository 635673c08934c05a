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

//! # Finance Analytics
//!
//! This library provides an in-memory analytics engine over snapshots of a
//! user's income and expense transactions.
//!
//! ## Core Components
//!
//! - [`Transaction`]: Validated, immutable income or expense record
//! - [`sort`]: Stable sorting by date, amount or category
//! - [`search`]: Category, amount-range and note substring search
//! - [`top_k`]: Bounded selection of the largest or smallest amounts
//! - [`CooccurrenceGraph`]: Categories linked by shared dates, with reachability
//! - [`window`]: Maximum expense total over a sliding date window
//! - [`budget`]: Proportional budget allocation and monthly limit tracking
//! - [`trends`]: Monthly series, balance growth and anomaly counts
//! - [`Engine`]: Per-owner facade with a memoized [`FinancialMetrics`] cache
//! - [`AnalyticsError`]: Error types for invalid records and configuration
//!
//! Every operation borrows its input and returns a freshly allocated result.
//!
//! ## Example
//!
//! ```
//! use finance_analytics_rs::{
//!     CooccurrenceGraph, OwnerId, Transaction, TransactionId, TransactionKind, budget, window,
//! };
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//!
//! let jan = |day| NaiveDate::from_ymd_opt(2025, 1, day).unwrap();
//! let expense = |id: &str, day, category: &str, amount| {
//!     Transaction::new(
//!         TransactionId::new(id),
//!         OwnerId::new("alice"),
//!         TransactionKind::Expense,
//!         amount,
//!         category,
//!         None,
//!         jan(day),
//!     )
//!     .unwrap()
//! };
//!
//! let records = vec![
//!     expense("1", 1, "Groceries", dec!(50)),
//!     expense("2", 1, "Gas", dec!(30)),
//!     expense("3", 2, "Groceries", dec!(20)),
//! ];
//!
//! let graph = CooccurrenceGraph::build(&records);
//! assert_eq!(graph.reachable_count("Groceries"), 1);
//! assert_eq!(window::max_spending_in_window(&records, 1), dec!(80));
//!
//! let allocation = budget::allocate_budget(&records, dec!(700));
//! assert_eq!(allocation["Groceries"], dec!(490));
//! assert_eq!(allocation["Gas"], dec!(210));
//! ```
//!
//! ## Thread Safety
//!
//! The analytics functions are pure. The engine's metrics cache is a
//! concurrent map, so an [`Engine`] over a `Sync` source can be shared.

mod base;
pub mod budget;
pub mod csv_io;
mod engine;
pub mod error;
mod graph;
pub mod metrics;
pub mod search;
pub mod sort;
pub mod top_k;
mod transaction;
pub mod trends;
pub mod window;

pub use base::{OwnerId, TransactionId};
pub use budget::{BudgetPlan, BudgetReport, BudgetStatus, BudgetUsage};
pub use engine::{Engine, InsightSettings, Insights, TransactionSource};
pub use error::AnalyticsError;
pub use graph::CooccurrenceGraph;
pub use metrics::{FinancialMetrics, MetricsCache};
pub use sort::{SortDirection, SortKey};
pub use transaction::{Transaction, TransactionKind};
pub use trends::MonthKey;
