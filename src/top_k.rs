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

//! Bounded top-k selection by amount.

use crate::Transaction;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// A transaction ranked by how extreme its amount is for the current query.
///
/// `Greater` means "more extreme". Ties on amount favour the smaller
/// transaction id, then the earlier input position.
struct Ranked<'a> {
    transaction: &'a Transaction,
    position: usize,
    highest: bool,
}

impl Ord for Ranked<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        let by_amount = if self.highest {
            self.transaction.amount().cmp(&other.transaction.amount())
        } else {
            other.transaction.amount().cmp(&self.transaction.amount())
        };
        by_amount
            .then_with(|| other.transaction.id().cmp(self.transaction.id()))
            .then_with(|| other.position.cmp(&self.position))
    }
}

impl PartialOrd for Ranked<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Ranked<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked<'_> {}

/// Returns the `k` transactions with the largest (`highest`) or smallest
/// amounts, most extreme first.
///
/// Keeps a min-heap of at most `k` candidates, so the cost is O(n log k).
/// The result holds `min(k, records.len())` elements.
pub fn top_k(records: &[Transaction], k: usize, highest: bool) -> Vec<Transaction> {
    if k == 0 {
        return Vec::new();
    }

    let mut heap = BinaryHeap::with_capacity(k + 1);
    for (position, transaction) in records.iter().enumerate() {
        heap.push(Reverse(Ranked {
            transaction,
            position,
            highest,
        }));
        if heap.len() > k {
            heap.pop();
        }
    }

    // Ascending order of `Reverse<Ranked>` is most extreme first.
    heap.into_sorted_vec()
        .into_iter()
        .map(|Reverse(ranked)| ranked.transaction.clone())
        .collect()
}
