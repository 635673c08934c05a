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

//! Error types for the analytics engine.

use thiserror::Error;

/// Analytics errors.
///
/// Data-shape edge cases (empty input, absent notes, negative tolerance) are
/// not errors; they produce defined degenerate results. These variants cover
/// malformed records at construction time and bad configuration values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    /// Amount is zero or negative
    #[error("invalid amount (must be positive)")]
    InvalidAmount,

    /// Category is empty or only whitespace
    #[error("category must not be empty")]
    EmptyCategory,

    /// Transaction kind is neither income nor expense
    #[error("unknown transaction kind: {0}")]
    UnknownTransactionKind(String),

    /// Sort key is not one of date, amount or category
    #[error("unknown sort key: {0}")]
    UnknownSortKey(String),

    /// Sort direction is not ascending or descending
    #[error("unknown sort direction: {0}")]
    UnknownSortDirection(String),

    /// Month is not written as `YYYY-MM`
    #[error("invalid month (expected YYYY-MM): {0}")]
    InvalidMonth(String),

    /// An owner-scoped operation was requested without an owner
    #[error("an owner is required for this operation")]
    MissingOwner,

    /// Reading or writing CSV failed
    #[error("csv error: {0}")]
    Csv(String),
}

impl From<csv::Error> for AnalyticsError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err.to_string())
    }
}
