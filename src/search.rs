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

//! Exact, ranged and substring search over transaction snapshots.

use crate::Transaction;
use rust_decimal::Decimal;

/// Returns every transaction whose category equals `category`, ignoring case.
///
/// Linear scan; matches keep their input order.
pub fn by_category(records: &[Transaction], category: &str) -> Vec<Transaction> {
    let wanted = category.to_lowercase();
    records
        .iter()
        .filter(|t| t.category().to_lowercase() == wanted)
        .cloned()
        .collect()
}

/// Returns every transaction with `|amount - target| <= tolerance`.
///
/// `sorted` must already be ordered ascending by amount; on unsorted input the
/// result is unspecified. A binary search finds the anchor and the match is
/// grown outwards from it, so the cost is O(log n + k). Negative tolerance is
/// treated as zero.
pub fn by_amount_range(
    sorted: &[Transaction],
    target: Decimal,
    tolerance: Decimal,
) -> Vec<Transaction> {
    let tolerance = tolerance.max(Decimal::ZERO);
    let within = |t: &Transaction| (t.amount() - target).abs() <= tolerance;

    let anchor = sorted.partition_point(|t| t.amount() < target);

    let mut lo = anchor;
    while lo > 0 && within(&sorted[lo - 1]) {
        lo -= 1;
    }
    let mut hi = anchor;
    while hi < sorted.len() && within(&sorted[hi]) {
        hi += 1;
    }

    sorted[lo..hi].to_vec()
}

/// Returns every transaction whose note contains `pattern` (case-sensitive).
///
/// Transactions without a note never match. An empty pattern matches every
/// transaction that has a note.
pub fn in_notes(records: &[Transaction], pattern: &str) -> Vec<Transaction> {
    let matcher = Matcher::new(pattern);
    records
        .iter()
        .filter(|t| t.note().is_some_and(|note| matcher.is_match(note)))
        .cloned()
        .collect()
}

/// Knuth-Morris-Pratt matcher over bytes.
///
/// The failure table is built once, then each haystack is scanned in
/// O(len(haystack)). Matching on UTF-8 bytes is exact for whole-string
/// patterns since a valid pattern cannot match across a char boundary.
struct Matcher<'p> {
    pattern: &'p [u8],
    failure: Vec<usize>,
}

impl<'p> Matcher<'p> {
    fn new(pattern: &'p str) -> Self {
        let pattern = pattern.as_bytes();
        let mut failure = vec![0; pattern.len()];
        let mut k = 0;
        for i in 1..pattern.len() {
            while k > 0 && pattern[i] != pattern[k] {
                k = failure[k - 1];
            }
            if pattern[i] == pattern[k] {
                k += 1;
            }
            failure[i] = k;
        }
        Self { pattern, failure }
    }

    fn is_match(&self, haystack: &str) -> bool {
        if self.pattern.is_empty() {
            return true;
        }

        let mut k = 0;
        for &byte in haystack.as_bytes() {
            while k > 0 && byte != self.pattern[k] {
                k = self.failure[k - 1];
            }
            if byte == self.pattern[k] {
                k += 1;
            }
            if k == self.pattern.len() {
                return true;
            }
        }
        false
    }
}
