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

//! Stable multi-key sorting.
//!
//! Sorting never touches the caller's slice; a sorted copy is returned.
//! Equal keys keep their input order in both directions, so sorting by one key
//! and then another behaves like a multi-key sort.

use crate::{AnalyticsError, Transaction};
use std::cmp::Ordering;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Date,
    Amount,
    /// Ordinal, case-sensitive order of the category label.
    Category,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl FromStr for SortKey {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "date" => Ok(Self::Date),
            "amount" => Ok(Self::Amount),
            "category" => Ok(Self::Category),
            other => Err(AnalyticsError::UnknownSortKey(other.to_string())),
        }
    }
}

impl FromStr for SortDirection {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            other => Err(AnalyticsError::UnknownSortDirection(other.to_string())),
        }
    }
}

impl SortKey {
    fn compare(self, a: &Transaction, b: &Transaction) -> Ordering {
        match self {
            Self::Date => a.date().cmp(&b.date()),
            Self::Amount => a.amount().cmp(&b.amount()),
            Self::Category => a.category().cmp(b.category()),
        }
    }
}

/// Returns a copy of `records` ordered by `key` in the given direction.
///
/// Uses the standard library's stable merge sort, O(n log n). Descending
/// order flips the comparison rather than reversing the output, which keeps
/// ties in input order.
pub fn sort(records: &[Transaction], key: SortKey, direction: SortDirection) -> Vec<Transaction> {
    let mut sorted = records.to_vec();
    if sorted.len() < 2 {
        return sorted;
    }

    match direction {
        SortDirection::Ascending => sorted.sort_by(|a, b| key.compare(a, b)),
        SortDirection::Descending => sorted.sort_by(|a, b| key.compare(b, a)),
    }
    sorted
}
