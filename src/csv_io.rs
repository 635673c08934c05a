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

//! CSV import and export of transaction snapshots.
//!
//! # Input Format
//!
//! ```csv
//! id,owner,type,amount,category,note,date
//! t1,alice,expense,50.00,Groceries,weekly shop,2025-01-01
//! t2,alice,income,1200,Salary,,2025-01-02
//! ```
//!
//! An empty `note` is read as an absent note; an empty `id` gets a generated
//! one.
//!
//! # Output Format
//!
//! ```csv
//! Date,Type,Category,Amount,Notes
//! 2025-01-01,EXPENSE,Groceries,50.00,weekly shop
//! ```

use crate::base::{OwnerId, TransactionId};
use crate::{AnalyticsError, Transaction, TransactionKind};
use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim, Writer};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::{Read, Write};

/// Raw CSV record matching the input format.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(default)]
    id: String,
    owner: String,
    #[serde(rename = "type")]
    kind: String,
    amount: Decimal,
    category: String,
    #[serde(default)]
    note: Option<String>,
    date: NaiveDate,
}

impl CsvRecord {
    fn into_transaction(self) -> Result<Transaction, AnalyticsError> {
        let id = if self.id.is_empty() {
            TransactionId::generate()
        } else {
            TransactionId::new(self.id)
        };
        let note = self.note.filter(|note| !note.is_empty());

        Transaction::new(
            id,
            OwnerId::new(self.owner),
            self.kind.parse()?,
            self.amount,
            self.category,
            note,
            self.date,
        )
    }
}

/// Reads a transaction snapshot from CSV.
///
/// Rows that fail to parse or violate the record invariants are skipped and
/// logged; the remaining rows are returned in file order.
///
/// # Errors
///
/// Returns [`AnalyticsError::Csv`] if the header row cannot be read.
pub fn read_transactions<R: Read>(reader: R) -> Result<Vec<Transaction>, AnalyticsError> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);
    rdr.headers()?;

    let mut transactions = Vec::new();
    for (line, result) in rdr.deserialize::<CsvRecord>().enumerate() {
        match result.map_err(AnalyticsError::from).and_then(CsvRecord::into_transaction) {
            Ok(transaction) => transactions.push(transaction),
            Err(err) => tracing::warn!(row = line + 1, %err, "skipping transaction row"),
        }
    }

    tracing::debug!(count = transactions.len(), "loaded transactions");
    Ok(transactions)
}

/// Writes transactions in the export format.
///
/// Text fields are neutralized against spreadsheet formula injection.
///
/// # Errors
///
/// Returns [`AnalyticsError::Csv`] if writing fails.
pub fn write_transactions<W: Write>(
    records: &[Transaction],
    writer: W,
) -> Result<(), AnalyticsError> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(["Date", "Type", "Category", "Amount", "Notes"])?;

    for transaction in records {
        wtr.write_record([
            transaction.date().format("%Y-%m-%d").to_string(),
            transaction.kind().to_string(),
            sanitize(transaction.category()),
            format!("{:.2}", transaction.amount()),
            sanitize(transaction.note().unwrap_or_default()),
        ])?;
    }

    wtr.flush().map_err(|err| AnalyticsError::Csv(err.to_string()))?;
    Ok(())
}

/// Prefixes values a spreadsheet would evaluate as a formula with `'`.
fn sanitize(field: &str) -> String {
    match field.chars().next() {
        Some('=' | '+' | '-' | '@' | '\t' | '\r') => format!("'{field}"),
        _ => field.to_string(),
    }
}
