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

//! Category co-occurrence graph.
//!
//! Two categories are linked whenever transactions in those categories fall on
//! the same calendar date. The graph is undirected and keeps one edge per
//! co-occurring pair of transactions, so categories that meet on several days
//! appear several times in each other's adjacency lists. Reachability treats
//! the lists as sets.

use crate::Transaction;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CooccurrenceGraph {
    adjacency: HashMap<String, Vec<String>>,
}

impl CooccurrenceGraph {
    /// Builds the graph from a transaction snapshot.
    ///
    /// Same-category pairs on one date add nothing, so categories that never
    /// share a date with a different category are absent from the graph.
    pub fn build(records: &[Transaction]) -> Self {
        let mut by_date: BTreeMap<NaiveDate, Vec<&Transaction>> = BTreeMap::new();
        for transaction in records {
            by_date.entry(transaction.date()).or_default().push(transaction);
        }

        let mut graph = Self::default();
        for day in by_date.values() {
            for (i, first) in day.iter().enumerate() {
                for second in &day[i + 1..] {
                    if first.category() != second.category() {
                        graph.add_edge(first.category(), second.category());
                    }
                }
            }
        }

        tracing::debug!(
            categories = graph.len(),
            edges = graph.edge_count(),
            "built co-occurrence graph"
        );
        graph
    }

    fn add_edge(&mut self, a: &str, b: &str) {
        self.adjacency
            .entry(a.to_string())
            .or_default()
            .push(b.to_string());
        self.adjacency
            .entry(b.to_string())
            .or_default()
            .push(a.to_string());
    }

    /// Adjacent categories of `category`, duplicates included, in insertion order.
    pub fn neighbors(&self, category: &str) -> &[String] {
        self.adjacency
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every category that has at least one edge.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.adjacency.keys().map(String::as_str)
    }

    /// Number of connected categories.
    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Number of undirected edges, counting repeats.
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum::<usize>() / 2
    }

    /// Counts the distinct categories reachable from `start`, excluding `start`.
    ///
    /// Breadth-first, O(V + E). An unknown start yields 0.
    pub fn reachable_count(&self, start: &str) -> usize {
        if !self.adjacency.contains_key(start) {
            return 0;
        }

        let mut visited: HashSet<&str> = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for next in self.neighbors(current) {
                if visited.insert(next.as_str()) {
                    queue.push_back(next.as_str());
                }
            }
        }

        visited.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{OwnerId, TransactionId, TransactionKind};
    use rust_decimal_macros::dec;

    fn tx(id: &str, day: u32, category: &str) -> Transaction {
        Transaction::new(
            TransactionId::new(id),
            OwnerId::new("alice"),
            TransactionKind::Expense,
            dec!(10),
            category,
            None,
            NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn links_categories_sharing_a_date() {
        let graph = CooccurrenceGraph::build(&[
            tx("1", 1, "Groceries"),
            tx("2", 1, "Gas"),
            tx("3", 2, "Groceries"),
        ]);

        assert_eq!(graph.neighbors("Groceries"), ["Gas".to_string()]);
        assert_eq!(graph.neighbors("Gas"), ["Groceries".to_string()]);
        assert_eq!(graph.reachable_count("Groceries"), 1);
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn same_category_pairs_add_no_self_loops() {
        let graph = CooccurrenceGraph::build(&[tx("1", 1, "Food"), tx("2", 1, "Food")]);
        assert!(graph.is_empty());
        assert_eq!(graph.reachable_count("Food"), 0);
    }

    #[test]
    fn repeated_cooccurrence_keeps_multiplicity() {
        let graph = CooccurrenceGraph::build(&[
            tx("1", 1, "Food"),
            tx("2", 1, "Rent"),
            tx("3", 2, "Food"),
            tx("4", 2, "Rent"),
        ]);

        assert_eq!(graph.neighbors("Food").len(), 2);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.reachable_count("Food"), 1);
    }

    #[test]
    fn reachability_follows_transitive_links() {
        let graph = CooccurrenceGraph::build(&[
            tx("1", 1, "A"),
            tx("2", 1, "B"),
            tx("3", 2, "B"),
            tx("4", 2, "C"),
            tx("5", 3, "D"),
            tx("6", 3, "E"),
        ]);

        assert_eq!(graph.reachable_count("A"), 2);
        assert_eq!(graph.reachable_count("C"), 2);
        assert_eq!(graph.reachable_count("D"), 1);
        assert_eq!(graph.reachable_count("Z"), 0);
    }

    #[test]
    fn categories_are_case_sensitive_nodes() {
        let graph = CooccurrenceGraph::build(&[tx("1", 1, "food"), tx("2", 1, "Food")]);
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.reachable_count("food"), 1);
    }
}
