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

//! Monthly trend reports.

use crate::{AnalyticsError, Transaction, TransactionKind};
use chrono::{Datelike, Local, NaiveDate};
use rust_decimal::{Decimal, MathematicalOps};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A calendar month, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn of(transaction: &Transaction) -> Self {
        Self::of_date(transaction.date())
    }

    pub fn of_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The month containing today's local date.
    pub fn current() -> Self {
        Self::of_date(Local::now().date_naive())
    }
}

impl FromStr for MonthKey {
    type Err = AnalyticsError;

    /// Parses `YYYY-MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AnalyticsError::InvalidMonth(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&month) {
            return Err(invalid());
        }
        Ok(Self { year, month })
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Sum of amounts of the given kind per calendar month.
pub fn monthly_totals(records: &[Transaction], kind: TransactionKind) -> BTreeMap<MonthKey, Decimal> {
    let mut totals: BTreeMap<MonthKey, Decimal> = BTreeMap::new();
    for transaction in records.iter().filter(|t| t.kind() == kind) {
        *totals
            .entry(MonthKey::of(transaction))
            .or_insert(Decimal::ZERO) += transaction.amount();
    }
    totals
}

/// Percentage change of the cumulative balance between the first and the
/// last month that recorded income.
///
/// Returns `None` with fewer than two income months or when the first
/// cumulative balance is zero.
pub fn growth_rate(records: &[Transaction]) -> Option<Decimal> {
    let income = monthly_totals(records, TransactionKind::Income);
    if income.len() < 2 {
        return None;
    }
    let expenses = monthly_totals(records, TransactionKind::Expense);

    let mut running = Decimal::ZERO;
    let balances: Vec<Decimal> = income
        .iter()
        .map(|(month, earned)| {
            let spent = expenses.get(month).copied().unwrap_or(Decimal::ZERO);
            running += *earned - spent;
            running
        })
        .collect();

    let first = *balances.first()?;
    let last = *balances.last()?;
    if first.is_zero() {
        return None;
    }
    Some((last - first) / first.abs() * Decimal::ONE_HUNDRED)
}

/// Counts amounts lying more than two standard deviations from the mean.
///
/// Uses the population standard deviation over every record regardless of
/// kind. Fewer than three records never contain an anomaly. Deviations are
/// scaled by the largest one before squaring so that any accepted amount
/// stays within `Decimal` range.
pub fn count_anomalies(records: &[Transaction]) -> usize {
    if records.len() < 3 {
        return 0;
    }

    let count = Decimal::from(records.len());
    let mean: Decimal = records.iter().map(|t| t.amount() / count).sum();
    let deviations: Vec<Decimal> = records.iter().map(|t| t.amount() - mean).collect();
    let scale = deviations
        .iter()
        .map(|d| d.abs())
        .max()
        .unwrap_or(Decimal::ZERO);
    if scale.is_zero() {
        return 0;
    }

    // Scaled deviations lie in [-1, 1], so their squares sum to at most `count`.
    let variance = deviations
        .iter()
        .map(|d| {
            let scaled = *d / scale;
            scaled * scaled
        })
        .sum::<Decimal>()
        / count;
    let Some(std_dev) = variance.sqrt() else {
        return 0;
    };

    let threshold = std_dev * Decimal::TWO;
    deviations
        .iter()
        .filter(|d| d.abs() / scale > threshold)
        .count()
}
