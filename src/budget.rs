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

//! Historical spending, proportional budget allocation and monthly budget
//! tracking against fixed limits.

use crate::Transaction;
use crate::trends::MonthKey;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Usage ratio at which a budget line starts warning.
pub const WARNING_RATIO: Decimal = dec!(0.7);
/// Usage ratio at which a budget line is considered critical.
pub const CRITICAL_RATIO: Decimal = dec!(0.9);

/// Total expense amount per category (case-sensitive labels).
pub fn category_spending(records: &[Transaction]) -> BTreeMap<String, Decimal> {
    sum_by_category(records.iter().filter(|t| t.is_expense()))
}

/// Expense totals per category restricted to one calendar month.
pub fn category_spending_in_month(
    records: &[Transaction],
    month: MonthKey,
) -> BTreeMap<String, Decimal> {
    sum_by_category(
        records
            .iter()
            .filter(|t| t.is_expense() && MonthKey::of(t) == month),
    )
}

fn sum_by_category<'a>(records: impl Iterator<Item = &'a Transaction>) -> BTreeMap<String, Decimal> {
    let mut spending: BTreeMap<String, Decimal> = BTreeMap::new();
    for transaction in records {
        *spending
            .entry(transaction.category().to_string())
            .or_insert(Decimal::ZERO) += transaction.amount();
    }
    spending
}

/// Splits `total_budget` across categories in proportion to their historical
/// expenses.
///
/// Each category receives `total_budget * (spent / total_spent)`. The share is
/// taken first so the product never exceeds the budget. Without any expense
/// history the allocation is empty.
pub fn allocate_budget(records: &[Transaction], total_budget: Decimal) -> BTreeMap<String, Decimal> {
    let spending = category_spending(records);
    let Some(total_spent) = spending
        .values()
        .try_fold(Decimal::ZERO, |acc, spent| acc.checked_add(*spent))
    else {
        tracing::warn!(categories = spending.len(), "total spending overflows, no allocation");
        return BTreeMap::new();
    };
    if total_spent.is_zero() {
        return BTreeMap::new();
    }

    let allocation: BTreeMap<String, Decimal> = spending
        .into_iter()
        .map(|(category, spent)| (category, total_budget * (spent / total_spent)))
        .collect();

    tracing::debug!(
        categories = allocation.len(),
        %total_budget,
        "allocated budget"
    );
    allocation
}

/// Monthly spending limits: one overall cap and optional per-category caps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetPlan {
    overall: Decimal,
    categories: BTreeMap<String, Decimal>,
}

impl BudgetPlan {
    /// A plan with an overall limit and no category limits.
    pub fn new(overall: Decimal) -> Self {
        Self {
            overall,
            categories: BTreeMap::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>, limit: Decimal) -> Self {
        self.set_category(category, limit);
        self
    }

    /// Sets or replaces the limit of `category`.
    pub fn set_category(&mut self, category: impl Into<String>, limit: Decimal) {
        self.categories.insert(category.into(), limit);
    }

    pub fn set_overall(&mut self, overall: Decimal) {
        self.overall = overall;
    }

    pub fn overall(&self) -> Decimal {
        self.overall
    }

    /// Limit for `category`; zero when the plan has none.
    pub fn category_limit(&self, category: &str) -> Decimal {
        self.categories
            .get(category)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn categories(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.categories.iter().map(|(c, l)| (c.as_str(), *l))
    }
}

impl Default for BudgetPlan {
    fn default() -> Self {
        Self::new(dec!(3500))
            .with_category("Groceries", dec!(600))
            .with_category("Utilities", dec!(200))
            .with_category("Transportation", dec!(300))
            .with_category("Entertainment", dec!(250))
            .with_category("Healthcare", dec!(150))
            .with_category("Shopping", dec!(400))
    }
}

/// How close a budget line is to its limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    /// Below [`WARNING_RATIO`]
    OnTrack,
    /// At or above [`WARNING_RATIO`]
    Warning,
    /// At or above [`CRITICAL_RATIO`]
    Critical,
}

impl BudgetStatus {
    pub fn from_ratio(ratio: Decimal) -> Self {
        if ratio >= CRITICAL_RATIO {
            Self::Critical
        } else if ratio >= WARNING_RATIO {
            Self::Warning
        } else {
            Self::OnTrack
        }
    }
}

impl fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OnTrack => write!(f, "on_track"),
            Self::Warning => write!(f, "warning"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// Spending against one limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BudgetUsage {
    pub spent: Decimal,
    pub limit: Decimal,
    /// `spent / limit`, or zero when there is no positive limit.
    pub ratio: Decimal,
    pub status: BudgetStatus,
}

impl BudgetUsage {
    pub fn new(spent: Decimal, limit: Decimal) -> Self {
        let ratio = if limit > Decimal::ZERO {
            spent.checked_div(limit).unwrap_or(Decimal::MAX)
        } else {
            Decimal::ZERO
        };
        Self {
            spent,
            limit,
            ratio,
            status: BudgetStatus::from_ratio(ratio),
        }
    }

    /// Amount still available; negative once the limit is exceeded.
    pub fn remaining(&self) -> Decimal {
        self.limit - self.spent
    }

    /// Ratio clamped to `[0, 1]` for progress displays.
    pub fn progress(&self) -> Decimal {
        self.ratio.min(Decimal::ONE)
    }
}

/// Budget usage of one month, overall and per category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetReport {
    pub month: MonthKey,
    pub overall: BudgetUsage,
    pub categories: BTreeMap<String, BudgetUsage>,
}

/// Compares the expenses of `month` against `plan`.
///
/// Every category with a limit is reported, spent or not. Categories that
/// have spending but no limit are reported with a zero limit.
pub fn budget_usage(records: &[Transaction], plan: &BudgetPlan, month: MonthKey) -> BudgetReport {
    let spending = category_spending_in_month(records, month);
    let total_spent = spending
        .values()
        .try_fold(Decimal::ZERO, |acc, spent| acc.checked_add(*spent))
        .unwrap_or(Decimal::MAX);

    let mut categories: BTreeMap<String, BudgetUsage> = plan
        .categories()
        .map(|(category, limit)| {
            let spent = spending.get(category).copied().unwrap_or(Decimal::ZERO);
            (category.to_string(), BudgetUsage::new(spent, limit))
        })
        .collect();
    for (category, spent) in spending {
        categories
            .entry(category)
            .or_insert_with(|| BudgetUsage::new(spent, Decimal::ZERO));
    }

    let overall = BudgetUsage::new(total_spent, plan.overall());
    tracing::debug!(%month, %total_spent, status = ?overall.status, "computed budget usage");
    BudgetReport {
        month,
        overall,
        categories,
    }
}
