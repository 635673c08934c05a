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

//! Sliding-window expense aggregation.

use crate::Transaction;
use crate::sort::{SortDirection, SortKey, sort};
use rust_decimal::Decimal;

/// Maximum total expense that falls within any `window_days` consecutive
/// calendar days.
///
/// A window of `w` days starting on day `d` covers `d ..= d + w - 1`; a zero
/// width is treated as a single day, so `window_days = 0` yields the largest
/// single-date expense total. Income transactions stay inside the window but
/// contribute nothing. Empty input yields zero.
pub fn max_spending_in_window(records: &[Transaction], window_days: u32) -> Decimal {
    let span = i64::from(window_days.max(1));
    let ordered = sort(records, SortKey::Date, SortDirection::Ascending);

    let mut left = 0;
    let mut running = Decimal::ZERO;
    let mut best = Decimal::ZERO;
    for right in 0..ordered.len() {
        let newest = &ordered[right];
        if newest.is_expense() {
            running += newest.amount();
        }

        while (newest.date() - ordered[left].date()).num_days() >= span {
            if ordered[left].is_expense() {
                running -= ordered[left].amount();
            }
            left += 1;
        }

        best = best.max(running);
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{OwnerId, TransactionId, TransactionKind};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn tx(day: u32, amount: Decimal, kind: TransactionKind) -> Transaction {
        Transaction::new(
            TransactionId::generate(),
            OwnerId::new("alice"),
            kind,
            amount,
            "Misc",
            None,
            NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
        )
        .unwrap()
    }

    fn expense(day: u32, amount: Decimal) -> Transaction {
        tx(day, amount, TransactionKind::Expense)
    }

    #[test]
    fn empty_input_is_zero() {
        assert_eq!(max_spending_in_window(&[], 7), Decimal::ZERO);
    }

    #[test]
    fn zero_width_is_best_single_day() {
        let records = vec![
            expense(1, dec!(30)),
            expense(2, dec!(45)),
            expense(1, dec!(20)),
            expense(3, dec!(10)),
        ];
        assert_eq!(max_spending_in_window(&records, 0), dec!(50));
        assert_eq!(max_spending_in_window(&records, 1), dec!(50));
    }

    #[test]
    fn window_covers_consecutive_days() {
        let records = vec![
            expense(1, dec!(10)),
            expense(2, dec!(10)),
            expense(3, dec!(10)),
            expense(10, dec!(25)),
        ];
        assert_eq!(max_spending_in_window(&records, 2), dec!(25));
        assert_eq!(max_spending_in_window(&records, 3), dec!(30));
        assert_eq!(max_spending_in_window(&records, 10), dec!(55));
    }

    #[test]
    fn income_does_not_count_or_break_the_window() {
        let records = vec![
            expense(1, dec!(10)),
            tx(2, dec!(1000), TransactionKind::Income),
            expense(3, dec!(15)),
        ];
        assert_eq!(max_spending_in_window(&records, 7), dec!(25));
    }

    #[test]
    fn only_income_is_zero() {
        let records = vec![tx(1, dec!(500), TransactionKind::Income)];
        assert_eq!(max_spending_in_window(&records, 7), Decimal::ZERO);
    }

    #[test]
    fn order_of_input_does_not_matter() {
        let records = vec![expense(9, dec!(5)), expense(1, dec!(40)), expense(2, dec!(2))];
        assert_eq!(max_spending_in_window(&records, 2), dec!(42));
    }
}
