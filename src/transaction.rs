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

//! Transaction record model.
//!
//! A [`Transaction`] is an immutable snapshot of a single income or expense
//! event. Records are validated once, at construction; every analytics
//! operation afterwards trusts the invariants below.
//!
//! # Invariants
//!
//! - `amount > 0`
//! - `category` is non-empty after trimming
//! - `date` is always present

use crate::AnalyticsError;
use crate::base::{OwnerId, TransactionId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl FromStr for TransactionKind {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(AnalyticsError::UnknownTransactionKind(other.to_string())),
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Income => write!(f, "INCOME"),
            Self::Expense => write!(f, "EXPENSE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    id: TransactionId,
    owner_id: OwnerId,
    kind: TransactionKind,
    amount: Decimal,
    category: String,
    note: Option<String>,
    date: NaiveDate,
}

impl Transaction {
    /// Creates a validated transaction.
    ///
    /// # Errors
    ///
    /// - [`AnalyticsError::InvalidAmount`] if `amount <= 0`.
    /// - [`AnalyticsError::EmptyCategory`] if `category` is blank.
    pub fn new(
        id: TransactionId,
        owner_id: OwnerId,
        kind: TransactionKind,
        amount: Decimal,
        category: impl Into<String>,
        note: Option<String>,
        date: NaiveDate,
    ) -> Result<Self, AnalyticsError> {
        if amount <= Decimal::ZERO {
            return Err(AnalyticsError::InvalidAmount);
        }
        let category = category.into();
        if category.trim().is_empty() {
            return Err(AnalyticsError::EmptyCategory);
        }

        Ok(Self {
            id,
            owner_id,
            kind,
            amount,
            category,
            note,
            date,
        })
    }

    pub fn id(&self) -> &TransactionId {
        &self.id
    }

    pub fn owner_id(&self) -> &OwnerId {
        &self.owner_id
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    /// Case-insensitive category comparison used for matching.
    pub fn category_matches(&self, category: &str) -> bool {
        self.category.to_lowercase() == category.to_lowercase()
    }
}
