//! Dashboard figures derived from the transaction list.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::record::{Transaction, TransactionType};

/// Month-over-month change of a single figure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatChange {
    /// Display text such as `+12.5%`.
    pub text: String,
    /// Whether the change is good news (fewer expenses count as positive).
    pub is_positive: bool,
}

impl StatChange {
    fn flat() -> Self {
        Self {
            text: "0%".to_string(),
            is_positive: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_revenue: f64,
    pub total_expenses: f64,
    pub net_profit: f64,
    /// Average monthly expense over a year.
    pub burn_rate: f64,
    pub revenue_change: StatChange,
    pub expenses_change: StatChange,
    pub profit_change: StatChange,
}

#[derive(Default, Clone, Copy)]
struct Totals {
    revenue: f64,
    expenses: f64,
}

impl Totals {
    fn of<'a>(items: impl Iterator<Item = &'a Transaction>) -> Self {
        items.fold(Totals::default(), |mut acc, t| {
            match t.kind {
                TransactionType::Income => acc.revenue += t.amount,
                TransactionType::Expense => acc.expenses += t.amount,
            }
            acc
        })
    }

    fn profit(&self) -> f64 {
        self.revenue - self.expenses
    }
}

/// Returns (text, is_higher) for the change from `previous` to `current`.
fn change(current: f64, previous: f64) -> (String, bool) {
    if previous == 0.0 {
        let text = if current > 0.0 { "+100%" } else { "0%" };
        return (text.to_string(), current > 0.0);
    }

    let pct = (current - previous) / previous.abs() * 100.0;
    let sign = if pct >= 0.0 { "+" } else { "" };
    (format!("{}{:.1}%", sign, pct), pct > 0.0)
}

fn parse_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

/// Computes dashboard totals and month-over-month changes. The "current"
/// month is the month of the latest dated transaction; transactions with an
/// unparseable date count toward the totals but not toward either month.
pub fn dashboard_stats(transactions: &[Transaction]) -> DashboardStats {
    let totals = Totals::of(transactions.iter());

    let latest = transactions.iter().filter_map(|t| parse_date(&t.date)).max();

    let (revenue_change, expenses_change, profit_change) = match latest {
        Some(latest) => {
            let in_month = |year: i32, month: u32| {
                move |t: &&Transaction| {
                    parse_date(&t.date)
                        .map(|d| d.year() == year && d.month() == month)
                        .unwrap_or(false)
                }
            };

            let current =
                Totals::of(transactions.iter().filter(in_month(latest.year(), latest.month())));
            let (py, pm) = previous_month(latest.year(), latest.month());
            let previous = Totals::of(transactions.iter().filter(in_month(py, pm)));

            let (rev_text, rev_higher) = change(current.revenue, previous.revenue);
            let (exp_text, exp_higher) = change(current.expenses, previous.expenses);
            let (profit_text, profit_higher) = change(current.profit(), previous.profit());

            (
                StatChange {
                    text: rev_text,
                    is_positive: rev_higher,
                },
                StatChange {
                    text: exp_text,
                    is_positive: !exp_higher,
                },
                StatChange {
                    text: profit_text,
                    is_positive: profit_higher,
                },
            )
        }
        None => (StatChange::flat(), StatChange::flat(), StatChange::flat()),
    };

    DashboardStats {
        total_revenue: totals.revenue,
        total_expenses: totals.expenses,
        net_profit: totals.profit(),
        burn_rate: (totals.expenses / 12.0).round(),
        revenue_change,
        expenses_change,
        profit_change,
    }
}
