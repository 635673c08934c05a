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

//! Aggregate financial summaries and their per-owner cache.
//!
//! # Example
//!
//! ```
//! use finance_analytics_rs::{FinancialMetrics, MetricsCache, OwnerId};
//! use rust_decimal_macros::dec;
//!
//! let cache = MetricsCache::new();
//! let owner = OwnerId::new("alice");
//! let metrics = cache.get_or_compute(&owner, || FinancialMetrics::new(dec!(100), dec!(40)));
//! assert_eq!(metrics.balance(), dec!(60));
//! assert!(cache.contains(&owner));
//! ```

use crate::Transaction;
use crate::base::OwnerId;
use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Income and expense totals with derived balance and savings rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinancialMetrics {
    total_income: Decimal,
    total_expenses: Decimal,
}

impl FinancialMetrics {
    const DECIMAL_PRECISION: u32 = 4;

    pub fn new(total_income: Decimal, total_expenses: Decimal) -> Self {
        Self {
            total_income,
            total_expenses,
        }
    }

    /// Sums income and expenses over a snapshot.
    pub fn from_transactions(records: &[Transaction]) -> Self {
        let (income, expenses) = records.iter().fold(
            (Decimal::ZERO, Decimal::ZERO),
            |(income, expenses), t| {
                if t.is_income() {
                    (income + t.amount(), expenses)
                } else {
                    (income, expenses + t.amount())
                }
            },
        );
        Self::new(income, expenses)
    }

    pub fn total_income(&self) -> Decimal {
        self.total_income
    }

    pub fn total_expenses(&self) -> Decimal {
        self.total_expenses
    }

    /// Returns `income - expenses`.
    pub fn balance(&self) -> Decimal {
        self.total_income - self.total_expenses
    }

    /// Returns `(income - expenses) / income`, or zero without income.
    pub fn savings_rate(&self) -> Decimal {
        if self.total_income.is_zero() {
            Decimal::ZERO
        } else {
            self.balance() / self.total_income
        }
    }
}

impl Serialize for FinancialMetrics {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("FinancialMetrics", 4)?;
        state.serialize_field(
            "total_income",
            &self.total_income.round_dp(Self::DECIMAL_PRECISION),
        )?;
        state.serialize_field(
            "total_expenses",
            &self.total_expenses.round_dp(Self::DECIMAL_PRECISION),
        )?;
        state.serialize_field("balance", &self.balance().round_dp(Self::DECIMAL_PRECISION))?;
        state.serialize_field(
            "savings_rate",
            &self.savings_rate().round_dp(Self::DECIMAL_PRECISION),
        )?;
        state.end()
    }
}

/// Memoized [`FinancialMetrics`] keyed by owner.
///
/// Entries are computed on first request and kept until [`invalidate`] or
/// [`clear`] is called. Nothing is evicted and nothing is invalidated
/// automatically: callers that change an owner's transactions must invalidate
/// that owner. Backed by a [`DashMap`], so it is safe to share across threads.
///
/// [`invalidate`]: MetricsCache::invalidate
/// [`clear`]: MetricsCache::clear
#[derive(Debug, Default)]
pub struct MetricsCache {
    entries: DashMap<OwnerId, FinancialMetrics>,
}

impl MetricsCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Returns the cached metrics for `owner`, computing them with `compute`
    /// on a miss.
    ///
    /// `compute` runs without any map lock held, so it may read from or
    /// invalidate this cache. Two threads missing on the same owner may both
    /// compute; the first value stored wins and is returned to both.
    pub fn get_or_compute<F>(&self, owner: &OwnerId, compute: F) -> FinancialMetrics
    where
        F: FnOnce() -> FinancialMetrics,
    {
        if let Some(cached) = self.get(owner) {
            return cached;
        }

        tracing::debug!(%owner, "metrics cache miss");
        let computed = compute();
        *self.entries.entry(owner.clone()).or_insert(computed)
    }

    pub fn get(&self, owner: &OwnerId) -> Option<FinancialMetrics> {
        self.entries.get(owner).map(|entry| *entry)
    }

    pub fn contains(&self, owner: &OwnerId) -> bool {
        self.entries.contains_key(owner)
    }

    /// Drops the cached metrics for one owner. Returns whether an entry existed.
    pub fn invalidate(&self, owner: &OwnerId) -> bool {
        self.entries.remove(owner).is_some()
    }

    /// Drops every cached entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TransactionId, TransactionKind};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::cell::Cell;

    fn tx(kind: TransactionKind, amount: Decimal) -> Transaction {
        Transaction::new(
            TransactionId::generate(),
            OwnerId::new("alice"),
            kind,
            amount,
            "Misc",
            None,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn metrics_from_transactions() {
        let metrics = FinancialMetrics::from_transactions(&[
            tx(TransactionKind::Income, dec!(1000)),
            tx(TransactionKind::Expense, dec!(250)),
            tx(TransactionKind::Expense, dec!(150)),
        ]);
        assert_eq!(metrics.total_income(), dec!(1000));
        assert_eq!(metrics.total_expenses(), dec!(400));
        assert_eq!(metrics.balance(), dec!(600));
        assert_eq!(metrics.savings_rate(), dec!(0.6));
    }

    #[test]
    fn savings_rate_is_zero_without_income() {
        let metrics = FinancialMetrics::new(Decimal::ZERO, dec!(50));
        assert_eq!(metrics.savings_rate(), Decimal::ZERO);
        assert_eq!(metrics.balance(), dec!(-50));
    }

    #[test]
    fn cache_computes_once_until_invalidated() {
        let cache = MetricsCache::new();
        let owner = OwnerId::new("alice");
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            FinancialMetrics::new(dec!(10), dec!(5))
        };

        cache.get_or_compute(&owner, compute);
        cache.get_or_compute(&owner, compute);
        assert_eq!(calls.get(), 1);

        assert!(cache.invalidate(&owner));
        assert!(!cache.invalidate(&owner));
        cache.get_or_compute(&owner, compute);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn compute_may_use_the_cache() {
        let cache = MetricsCache::new();
        let alice = OwnerId::new("alice");
        let bob = OwnerId::new("bob");

        let metrics = cache.get_or_compute(&alice, || {
            assert!(!cache.contains(&alice));
            let nested = cache.get_or_compute(&alice, || FinancialMetrics::new(dec!(7), dec!(2)));
            cache.get_or_compute(&bob, || FinancialMetrics::new(dec!(1), dec!(1)));
            FinancialMetrics::new(nested.total_income(), dec!(3))
        });

        // The nested call stored first, so its value is kept.
        assert_eq!(metrics, FinancialMetrics::new(dec!(7), dec!(2)));
        assert_eq!(cache.get(&alice), Some(metrics));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn clear_drops_every_owner() {
        let cache = MetricsCache::new();
        for name in ["a", "b", "c"] {
            cache.get_or_compute(&OwnerId::new(name), || FinancialMetrics::new(dec!(1), dec!(1)));
        }
        assert_eq!(cache.len(), 3);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get(&OwnerId::new("a")), None);
    }

    #[test]
    fn serializer_rounds_to_four_decimal_places() {
        let metrics = FinancialMetrics::new(dec!(3), dec!(1));
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.serialize(metrics).unwrap();
        let output = String::from_utf8(writer.into_inner().unwrap()).unwrap();

        assert_eq!(
            output,
            "total_income,total_expenses,balance,savings_rate\n3,1,2,0.6667\n"
        );
    }
}
