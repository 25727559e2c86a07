//! Walks the dense bucket sequence and accumulates the running balance.

use serde::{Deserialize, Serialize};

use crate::{
    Error,
    cash_flow::{
        index::BucketIndex,
        range::{DateRange, Granularity, bucket_dates, bucket_key},
    },
};

/// The cash flow for one bucket of the report.
///
/// Income is never negative and expenses are never positive, so the change
/// for the bucket is `income + expense`. Transfers keep the sign of the group
/// they came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    /// The bucket key, `YYYY-MM-DD` or `YYYY-MM`.
    pub date: String,
    /// Money in, excluding transfers.
    pub income: i64,
    /// Money out, excluding transfers.
    pub expense: i64,
    /// Transfers into on-budget accounts.
    pub credit_transfers: i64,
    /// Transfers out of on-budget accounts.
    pub debit_transfers: i64,
    /// The balance after this bucket.
    pub running_balance: i64,
}

impl Bucket {
    /// Net transfers for the bucket.
    pub fn transfers(&self) -> i64 {
        self.credit_transfers + self.debit_transfers
    }

    /// Income plus expenses, ignoring transfers.
    pub fn change(&self) -> i64 {
        self.income + self.expense
    }
}

/// Totals over every bucket in the range.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeTotals {
    /// The sum of bucket income.
    pub income: i64,
    /// The sum of bucket expenses.
    pub expenses: i64,
    /// The sum of credit and debit transfers.
    pub transfers: i64,
}

/// The output of [accumulate].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accumulation {
    /// One bucket per date in the range, in ascending order.
    pub buckets: Vec<Bucket>,
    /// Totals over `buckets`.
    pub totals: RangeTotals,
}

/// Builds the dense bucket series for `range`, starting from `starting_balance`.
///
/// Every date in the range gets a bucket, dates missing from both indices
/// get zero amounts and carry the previous balance forward.
///
/// # Errors
/// Returns [Error::Overflow] if the balance or a total overflows.
pub fn accumulate(
    starting_balance: i64,
    income_index: &BucketIndex,
    expense_index: &BucketIndex,
    range: DateRange,
    granularity: Granularity,
) -> Result<Accumulation, Error> {
    let dates = bucket_dates(range, granularity);

    let mut balance = starting_balance;
    let mut totals = RangeTotals::default();
    let mut buckets = Vec::with_capacity(dates.len());

    for date in dates {
        let key = bucket_key(date, granularity);
        let incomes = income_index.get_or_zero(&key);
        let expenses = expense_index.get_or_zero(&key);

        let income = incomes.ordinary;
        let credit_transfers = incomes.transfer;
        let expense = expenses.ordinary;
        let debit_transfers = expenses.transfer;

        let transfers = checked_sum(&[credit_transfers, debit_transfers])?;
        let change = checked_sum(&[income, expense, transfers])?;

        balance = checked_sum(&[balance, change])?;
        totals.income = checked_sum(&[totals.income, income])?;
        totals.expenses = checked_sum(&[totals.expenses, expense])?;
        totals.transfers = checked_sum(&[totals.transfers, transfers])?;

        buckets.push(Bucket {
            date: key,
            income,
            expense,
            credit_transfers,
            debit_transfers,
            running_balance: balance,
        });
    }

    Ok(Accumulation { buckets, totals })
}

fn checked_sum(values: &[i64]) -> Result<i64, Error> {
    values
        .iter()
        .try_fold(0i64, |sum, value| sum.checked_add(*value))
        .ok_or(Error::Overflow)
}
