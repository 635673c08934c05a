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

//! Analytics engine.
//!
//! The [`Engine`] ties the pure analytics operations to a
//! [`TransactionSource`], the collaborator that owns persisted records, and
//! memoizes per-owner [`FinancialMetrics`].
//!
//! # Cache Contract
//!
//! Metrics are computed on the first [`Engine::metrics`] call for an owner and
//! reused until [`Engine::invalidate_metrics`] or [`Engine::clear_metrics`].
//! The engine cannot observe writes to the source, so callers that mutate an
//! owner's transactions must invalidate that owner.
//!
//! # Thread Safety
//!
//! The metrics cache is a [`dashmap::DashMap`]; an engine whose source is
//! `Sync` can be shared across threads.

use crate::base::OwnerId;
use crate::budget::{BudgetPlan, BudgetReport};
use crate::graph::CooccurrenceGraph;
use crate::metrics::{FinancialMetrics, MetricsCache};
use crate::sort::{SortDirection, SortKey};
use crate::trends::MonthKey;
use crate::{Transaction, budget, sort, top_k, trends, window};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

/// Supplies snapshots of an owner's transactions.
///
/// Implemented by the persistence layer. Each call returns a fresh snapshot
/// in no particular order. Implementations may call back into the owning
/// [`Engine`]; metrics are computed outside the cache's locks.
pub trait TransactionSource {
    fn transactions(&self, owner: &OwnerId) -> Vec<Transaction>;
}

impl TransactionSource for Vec<Transaction> {
    fn transactions(&self, owner: &OwnerId) -> Vec<Transaction> {
        self.iter()
            .filter(|t| t.owner_id() == owner)
            .cloned()
            .collect()
    }
}

impl<T: TransactionSource + ?Sized> TransactionSource for &T {
    fn transactions(&self, owner: &OwnerId) -> Vec<Transaction> {
        (**self).transactions(owner)
    }
}

/// Parameters for [`Engine::insights`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsightSettings {
    /// Width of the spending window in days.
    pub window_days: u32,
    /// Budget split across categories.
    pub total_budget: Decimal,
    /// Number of largest expenses to report.
    pub top_expenses: usize,
}

impl Default for InsightSettings {
    fn default() -> Self {
        Self {
            window_days: 7,
            total_budget: dec!(5000),
            top_expenses: 5,
        }
    }
}

/// Dashboard summary for one owner.
#[derive(Debug, Clone, PartialEq)]
pub struct Insights {
    pub metrics: FinancialMetrics,
    pub top_expenses: Vec<Transaction>,
    pub max_window_spending: Decimal,
    pub budget: BTreeMap<String, Decimal>,
    pub connected_categories: usize,
    pub growth_rate: Option<Decimal>,
    pub anomalies: usize,
}

pub struct Engine<S> {
    source: S,
    metrics: MetricsCache,
}

impl<S: TransactionSource> Engine<S> {
    /// Creates an engine over `source` with an empty metrics cache.
    pub fn new(source: S) -> Self {
        Engine {
            source,
            metrics: MetricsCache::new(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fresh snapshot of `owner`'s transactions.
    pub fn transactions(&self, owner: &OwnerId) -> Vec<Transaction> {
        self.source.transactions(owner)
    }

    /// Returns the cached metrics for `owner`, computing them on first use.
    pub fn metrics(&self, owner: &OwnerId) -> FinancialMetrics {
        self.metrics.get_or_compute(owner, || {
            FinancialMetrics::from_transactions(&self.source.transactions(owner))
        })
    }

    /// Forgets the cached metrics for `owner`.
    pub fn invalidate_metrics(&self, owner: &OwnerId) {
        if self.metrics.invalidate(owner) {
            tracing::debug!(%owner, "invalidated metrics");
        }
    }

    /// Forgets the cached metrics for every owner.
    pub fn clear_metrics(&self) {
        tracing::debug!(entries = self.metrics.len(), "clearing metrics cache");
        self.metrics.clear();
    }

    pub fn sorted(&self, owner: &OwnerId, key: SortKey, direction: SortDirection) -> Vec<Transaction> {
        sort::sort(&self.transactions(owner), key, direction)
    }

    pub fn top_k(&self, owner: &OwnerId, k: usize, highest: bool) -> Vec<Transaction> {
        top_k::top_k(&self.transactions(owner), k, highest)
    }

    pub fn spending_graph(&self, owner: &OwnerId) -> CooccurrenceGraph {
        CooccurrenceGraph::build(&self.transactions(owner))
    }

    pub fn max_spending_in_window(&self, owner: &OwnerId, window_days: u32) -> Decimal {
        window::max_spending_in_window(&self.transactions(owner), window_days)
    }

    pub fn allocate_budget(&self, owner: &OwnerId, total_budget: Decimal) -> BTreeMap<String, Decimal> {
        budget::allocate_budget(&self.transactions(owner), total_budget)
    }

    /// Spending of `month` against the limits of `plan`.
    pub fn budget_usage(&self, owner: &OwnerId, plan: &BudgetPlan, month: MonthKey) -> BudgetReport {
        budget::budget_usage(&self.transactions(owner), plan, month)
    }

    /// Runs every dashboard analysis over a single snapshot.
    ///
    /// Top expenses consider expense transactions only.
    pub fn insights(&self, owner: &OwnerId, settings: &InsightSettings) -> Insights {
        let records = self.transactions(owner);
        let expenses: Vec<Transaction> = records.iter().filter(|t| t.is_expense()).cloned().collect();

        let insights = Insights {
            metrics: self.metrics(owner),
            top_expenses: top_k::top_k(&expenses, settings.top_expenses, true),
            max_window_spending: window::max_spending_in_window(&records, settings.window_days),
            budget: budget::allocate_budget(&records, settings.total_budget),
            connected_categories: CooccurrenceGraph::build(&records).len(),
            growth_rate: trends::growth_rate(&records),
            anomalies: trends::count_anomalies(&records),
        };

        tracing::debug!(%owner, records = records.len(), "computed insights");
        insights
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TransactionId, TransactionKind};
    use chrono::NaiveDate;
    use std::cell::Cell;

    struct CountingSource {
        records: Vec<Transaction>,
        calls: Cell<usize>,
    }

    impl TransactionSource for CountingSource {
        fn transactions(&self, owner: &OwnerId) -> Vec<Transaction> {
            self.calls.set(self.calls.get() + 1);
            self.records.transactions(owner)
        }
    }

    fn tx(owner: &str, kind: TransactionKind, amount: Decimal) -> Transaction {
        Transaction::new(
            TransactionId::generate(),
            OwnerId::new(owner),
            kind,
            amount,
            "Misc",
            None,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn vec_source_filters_by_owner() {
        let records = vec![
            tx("alice", TransactionKind::Income, dec!(1)),
            tx("bob", TransactionKind::Income, dec!(2)),
        ];
        let snapshot = records.transactions(&OwnerId::new("bob"));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].amount(), dec!(2));
    }

    #[test]
    fn metrics_are_read_from_source_once() {
        let source = CountingSource {
            records: vec![
                tx("alice", TransactionKind::Income, dec!(100)),
                tx("alice", TransactionKind::Expense, dec!(25)),
            ],
            calls: Cell::new(0),
        };
        let engine = Engine::new(source);
        let alice = OwnerId::new("alice");

        assert_eq!(engine.metrics(&alice).balance(), dec!(75));
        assert_eq!(engine.metrics(&alice).balance(), dec!(75));
        assert_eq!(engine.source().calls.get(), 1);

        engine.invalidate_metrics(&alice);
        engine.metrics(&alice);
        assert_eq!(engine.source().calls.get(), 2);

        engine.clear_metrics();
        engine.metrics(&alice);
        assert_eq!(engine.source().calls.get(), 3);
    }

    #[test]
    fn insights_defaults_match_dashboard() {
        let settings = InsightSettings::default();
        assert_eq!(settings.window_days, 7);
        assert_eq!(settings.total_budget, dec!(5000));
        assert_eq!(settings.top_expenses, 5);
    }

    #[test]
    fn budget_usage_is_scoped_to_owner() {
        let records = vec![
            tx("alice", TransactionKind::Expense, dec!(45)),
            tx("bob", TransactionKind::Expense, dec!(500)),
        ];
        let engine = Engine::new(records);
        let plan = BudgetPlan::new(dec!(100)).with_category("Misc", dec!(50));

        let report = engine.budget_usage(&OwnerId::new("alice"), &plan, MonthKey::new(2025, 1));
        assert_eq!(report.overall.spent, dec!(45));
        assert_eq!(report.categories["Misc"].ratio, dec!(0.9));
        assert_eq!(report.categories["Misc"].status, crate::budget::BudgetStatus::Critical);
    }
}
