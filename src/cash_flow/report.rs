//! Assembles accumulated buckets into the final cash flow report.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    cash_flow::{
        accumulator::{Accumulation, Bucket, accumulate},
        index::{AggregateRow, index_aggregates},
        range::{DateRange, Granularity, resolve_date_range},
    },
};

/// A cash flow report over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowReport {
    /// The size of each bucket.
    pub granularity: Granularity,
    /// One bucket per date in the range, in ascending order.
    pub buckets: Vec<Bucket>,
    /// The sum of all transactions before the range.
    pub starting_balance: i64,
    /// The running balance of the last bucket.
    pub ending_balance: i64,
    /// The sum of bucket income.
    pub total_income: i64,
    /// The sum of bucket expenses.
    pub total_expenses: i64,
    /// The sum of bucket transfers.
    pub total_transfers: i64,
    /// The last bucket's balance minus the first bucket's balance.
    ///
    /// This is the change within the emitted series, so the first bucket's
    /// own change is not included.
    pub total_change: i64,
}

/// Everything the record store provides for one report.
///
/// All three inputs must be fully fetched before accumulating.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CashFlowInputs {
    /// The sum of all transactions before the start of the range.
    pub starting_balance: i64,
    /// Grouped sums of positive transactions.
    pub income: Vec<AggregateRow>,
    /// Grouped sums of negative transactions.
    pub expense: Vec<AggregateRow>,
}

/// Total income and expenses over a range, excluding transfers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleCashFlow {
    /// The sum of positive, non-transfer transactions.
    pub income: i64,
    /// The sum of negative, non-transfer transactions.
    pub expense: i64,
}

/// Packages accumulated buckets into a [CashFlowReport].
///
/// # Errors
/// Returns [Error::EmptyRange] if there are no buckets and
/// [Error::Overflow] if the total change overflows.
pub fn assemble_report(
    starting_balance: i64,
    accumulation: Accumulation,
    granularity: Granularity,
) -> Result<CashFlowReport, Error> {
    let Accumulation { buckets, totals } = accumulation;

    let (first, last) = match (buckets.first(), buckets.last()) {
        (Some(first), Some(last)) => (first.running_balance, last.running_balance),
        _ => return Err(Error::EmptyRange),
    };

    let total_change = last.checked_sub(first).ok_or(Error::Overflow)?;

    tracing::debug!(
        "assembled cash flow report with {} buckets, change {total_change}",
        buckets.len()
    );

    Ok(CashFlowReport {
        granularity,
        buckets,
        starting_balance,
        ending_balance: last,
        total_income: totals.income,
        total_expenses: totals.expenses,
        total_transfers: totals.transfers,
        total_change,
    })
}

/// Builds a cash flow report for the months `start_month` to `end_month`.
///
/// Resolves the range against `today`, indexes `inputs`, walks the buckets
/// and assembles the report.
///
/// # Errors
/// Returns any error from the range, index, accumulation or assembly steps.
pub fn cash_flow_by_date(
    inputs: &CashFlowInputs,
    start_month: &str,
    end_month: &str,
    granularity: Granularity,
    today: Date,
) -> Result<CashFlowReport, Error> {
    let range = resolve_date_range(start_month, end_month, granularity, today)?;

    build_report(inputs, range, granularity)
}

/// Builds a cash flow report for an already resolved `range`.
///
/// # Errors
/// Returns any error from the index, accumulation or assembly steps.
pub fn build_report(
    inputs: &CashFlowInputs,
    range: DateRange,
    granularity: Granularity,
) -> Result<CashFlowReport, Error> {
    let (incomes, expenses) = index_aggregates(&inputs.income, &inputs.expense)?;
    let accumulation = accumulate(
        inputs.starting_balance,
        &incomes,
        &expenses,
        range,
        granularity,
    )?;

    assemble_report(inputs.starting_balance, accumulation, granularity)
}
