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

use clap::{Parser, Subcommand};
use csv::Writer;
use finance_analytics_rs::csv_io::{read_transactions, write_transactions};
use finance_analytics_rs::{
    AnalyticsError, BudgetPlan, BudgetUsage, CooccurrenceGraph, Engine, InsightSettings, MonthKey,
    OwnerId, SortDirection, SortKey, Transaction, budget, search, sort, top_k, window,
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

/// Finance Analytics - Analyze a transaction CSV snapshot
///
/// Reads transactions from a CSV file, runs one analysis and writes the
/// result as CSV to stdout.
#[derive(Parser, Debug)]
#[command(name = "finance-analytics")]
#[command(about = "Runs analytics over a transaction CSV snapshot", long_about = None)]
struct Args {
    /// Path to CSV file with transactions
    ///
    /// Expected format: id,owner,type,amount,category,note,date
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Only analyze transactions belonging to this owner
    #[arg(long, env = "FINANCE_ANALYTICS_OWNER")]
    owner: Option<String>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "FINANCE_ANALYTICS_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sort transactions by date, amount or category
    Sort {
        #[arg(long, default_value = "date")]
        key: SortKey,
        #[arg(long, default_value = "asc")]
        direction: SortDirection,
    },
    /// Transactions in a category (case-insensitive)
    Category { name: String },
    /// Transactions whose amount lies within a tolerance of a target
    Amount {
        target: Decimal,
        #[arg(long, default_value = "0")]
        tolerance: Decimal,
    },
    /// Transactions whose note contains a pattern (case-sensitive)
    Notes { pattern: String },
    /// Largest (or smallest) transactions by amount
    Top {
        #[arg(short, long, default_value_t = 5)]
        k: usize,
        #[arg(long)]
        lowest: bool,
    },
    /// Category co-occurrence graph and reachability
    Graph {
        /// Report the number of categories reachable from this one
        #[arg(long)]
        from: Option<String>,
    },
    /// Maximum expense total over a sliding window of days
    Window {
        #[arg(long, env = "FINANCE_ANALYTICS_WINDOW_DAYS", default_value_t = 7)]
        days: u32,
    },
    /// Split a budget proportionally to historical spending
    Budget {
        #[arg(long, env = "FINANCE_ANALYTICS_BUDGET", default_value = "5000")]
        total: Decimal,
    },
    /// Monthly spending against the default category limits
    Usage {
        /// Month as YYYY-MM; defaults to the current month
        #[arg(long)]
        month: Option<MonthKey>,
        /// Overall monthly limit
        #[arg(long, env = "FINANCE_ANALYTICS_MONTHLY_LIMIT", default_value = "3500")]
        limit: Decimal,
        /// Extra or replacement category limits as CATEGORY=AMOUNT
        #[arg(long = "category-limit", value_parser = parse_category_limit)]
        category_limits: Vec<(String, Decimal)>,
    },
    /// Income, expenses, balance and savings rate (requires --owner)
    Metrics,
    /// Dashboard summary of every analysis (requires --owner)
    Report {
        #[arg(long, env = "FINANCE_ANALYTICS_WINDOW_DAYS", default_value_t = 7)]
        days: u32,
        #[arg(long, env = "FINANCE_ANALYTICS_BUDGET", default_value = "5000")]
        budget: Decimal,
        #[arg(long, default_value_t = 5)]
        top: usize,
    },
    /// Export transactions in spreadsheet-safe CSV
    Export,
}

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let file = match File::open(&args.input) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error opening file '{}': {}", args.input.display(), e);
            process::exit(1);
        }
    };

    let records = match read_transactions(BufReader::new(file)) {
        Ok(records) => records,
        Err(e) => {
            eprintln!("Error reading transactions: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run(&args, records, std::io::stdout()) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Runs the selected analysis and writes its CSV output.
fn run<W: Write>(args: &Args, records: Vec<Transaction>, writer: W) -> Result<(), AnalyticsError> {
    let owner = args.owner.as_deref().map(OwnerId::new);
    let records = match &owner {
        Some(owner) => records.into_iter().filter(|t| t.owner_id() == owner).collect(),
        None => records,
    };

    match &args.command {
        Command::Sort { key, direction } => {
            write_transactions(&sort::sort(&records, *key, *direction), writer)
        }
        Command::Category { name } => write_transactions(&search::by_category(&records, name), writer),
        Command::Amount { target, tolerance } => {
            let sorted = sort::sort(&records, SortKey::Amount, SortDirection::Ascending);
            write_transactions(&search::by_amount_range(&sorted, *target, *tolerance), writer)
        }
        Command::Notes { pattern } => write_transactions(&search::in_notes(&records, pattern), writer),
        Command::Top { k, lowest } => write_transactions(&top_k::top_k(&records, *k, !lowest), writer),
        Command::Graph { from } => write_graph(&CooccurrenceGraph::build(&records), from.as_deref(), writer),
        Command::Window { days } => {
            let total = window::max_spending_in_window(&records, *days);
            write_pairs([("max_spending", format!("{total:.2}"))], writer)
        }
        Command::Budget { total } => {
            let allocation = budget::allocate_budget(&records, *total);
            write_allocation(&allocation, writer)
        }
        Command::Usage {
            month,
            limit,
            category_limits,
        } => {
            let mut plan = BudgetPlan::default();
            plan.set_overall(*limit);
            for (category, amount) in category_limits {
                plan.set_category(category.clone(), *amount);
            }
            let month = month.unwrap_or_else(MonthKey::current);
            let report = budget::budget_usage(&records, &plan, month);

            let mut wtr = Writer::from_writer(writer);
            wtr.write_record(["category", "spent", "limit", "usage", "status"])?;
            for (category, usage) in &report.categories {
                write_usage(&mut wtr, category, usage)?;
            }
            write_usage(&mut wtr, "TOTAL", &report.overall)?;
            wtr.flush().map_err(|e| AnalyticsError::Csv(e.to_string()))
        }
        Command::Metrics => {
            let owner = require_owner(owner)?;
            let engine = Engine::new(records);
            let mut wtr = Writer::from_writer(writer);
            wtr.serialize(engine.metrics(&owner))?;
            wtr.flush().map_err(|e| AnalyticsError::Csv(e.to_string()))
        }
        Command::Report { days, budget, top } => {
            let owner = require_owner(owner)?;
            let engine = Engine::new(records);
            let settings = InsightSettings {
                window_days: *days,
                total_budget: *budget,
                top_expenses: *top,
            };
            let insights = engine.insights(&owner, &settings);

            let top_categories: Vec<&str> = insights.top_expenses.iter().map(Transaction::category).collect();
            write_pairs(
                [
                    ("total_income", format!("{:.2}", insights.metrics.total_income())),
                    ("total_expenses", format!("{:.2}", insights.metrics.total_expenses())),
                    ("balance", format!("{:.2}", insights.metrics.balance())),
                    ("savings_rate", format!("{:.4}", insights.metrics.savings_rate())),
                    ("top_expenses", top_categories.join(";")),
                    ("max_window_spending", format!("{:.2}", insights.max_window_spending)),
                    ("budget_categories", insights.budget.len().to_string()),
                    ("connected_categories", insights.connected_categories.to_string()),
                    (
                        "growth_rate",
                        insights
                            .growth_rate
                            .map(|rate| format!("{rate:.1}"))
                            .unwrap_or_default(),
                    ),
                    ("anomalies", insights.anomalies.to_string()),
                ],
                writer,
            )
        }
        Command::Export => write_transactions(&records, writer),
    }
}

fn require_owner(owner: Option<OwnerId>) -> Result<OwnerId, AnalyticsError> {
    owner.ok_or(AnalyticsError::MissingOwner)
}

/// Writes `metric,value` rows.
fn write_pairs<W: Write, const N: usize>(
    pairs: [(&str, String); N],
    writer: W,
) -> Result<(), AnalyticsError> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(["metric", "value"])?;
    for (metric, value) in pairs {
        wtr.write_record([metric, value.as_str()])?;
    }
    wtr.flush().map_err(|e| AnalyticsError::Csv(e.to_string()))
}

fn write_usage<W: Write>(
    wtr: &mut Writer<W>,
    category: &str,
    usage: &BudgetUsage,
) -> Result<(), AnalyticsError> {
    let spent = format!("{:.2}", usage.spent);
    let limit = format!("{:.2}", usage.limit);
    let ratio = format!("{:.4}", usage.ratio);
    let status = usage.status.to_string();
    wtr.write_record([category, spent.as_str(), limit.as_str(), ratio.as_str(), status.as_str()])?;
    Ok(())
}

fn parse_category_limit(s: &str) -> Result<(String, Decimal), String> {
    let (category, amount) = s
        .split_once('=')
        .ok_or_else(|| format!("expected CATEGORY=AMOUNT, got '{s}'"))?;
    let amount: Decimal = amount.trim().parse().map_err(|e| format!("invalid amount '{amount}': {e}"))?;
    Ok((category.trim().to_string(), amount))
}

fn write_allocation<W: Write>(
    allocation: &BTreeMap<String, Decimal>,
    writer: W,
) -> Result<(), AnalyticsError> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(["category", "allocation"])?;
    for (category, amount) in allocation {
        let amount = format!("{amount:.2}");
        wtr.write_record([category.as_str(), amount.as_str()])?;
    }
    wtr.flush().map_err(|e| AnalyticsError::Csv(e.to_string()))
}

/// Writes one row per category with its distinct neighbours, or the
/// reachability count when a start category is given.
fn write_graph<W: Write>(
    graph: &CooccurrenceGraph,
    from: Option<&str>,
    writer: W,
) -> Result<(), AnalyticsError> {
    let mut wtr = Writer::from_writer(writer);
    match from {
        Some(start) => {
            wtr.write_record(["category", "reachable"])?;
            let reachable = graph.reachable_count(start).to_string();
            wtr.write_record([start, reachable.as_str()])?;
        }
        None => {
            wtr.write_record(["category", "edges", "neighbors"])?;
            let mut categories: Vec<&str> = graph.categories().collect();
            categories.sort_unstable();
            for category in categories {
                let mut neighbors: Vec<&str> = graph.neighbors(category).iter().map(String::as_str).collect();
                let edges = neighbors.len();
                neighbors.sort_unstable();
                neighbors.dedup();
                let edges = edges.to_string();
                let neighbors = neighbors.join(";");
                wtr.write_record([category, edges.as_str(), neighbors.as_str()])?;
            }
        }
    }
    wtr.flush().map_err(|e| AnalyticsError::Csv(e.to_string()))
}
