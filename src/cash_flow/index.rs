//! Indexes grouped transaction sums by bucket date and transfer status.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::Error;

/// A sum of transactions sharing a bucket date and transfer status.
///
/// Rows are produced by the record store, grouped by bucket date and by
/// whether the payee is linked to another account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateRow {
    /// The bucket key, `YYYY-MM-DD` or `YYYY-MM`.
    pub date: String,
    /// The account the payee transfers to, if any.
    pub is_transfer: Option<String>,
    /// The summed amount in cents, `None` if the store produced no number.
    pub amount: Option<i64>,
}

impl AggregateRow {
    /// Create a row with a known amount.
    pub fn new(date: &str, is_transfer: Option<&str>, amount: i64) -> Self {
        Self {
            date: date.to_owned(),
            is_transfer: is_transfer.map(str::to_owned),
            amount: Some(amount),
        }
    }
}

/// The amounts for one bucket date, split by transfer status.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FlowSplit {
    /// The sum of rows without a transfer account.
    pub ordinary: i64,
    /// The sum of rows with a transfer account.
    pub transfer: i64,
}

/// Bucket key to the amounts recorded for that bucket.
///
/// Keys that are absent had no transactions; callers read them as zero.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BucketIndex(HashMap<String, FlowSplit>);

impl BucketIndex {
    /// The amounts recorded for `key`, or zeroes if there are none.
    pub fn get_or_zero(&self, key: &str) -> FlowSplit {
        self.0.get(key).copied().unwrap_or_default()
    }

    /// The number of bucket keys with at least one row.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no rows were indexed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Builds a [BucketIndex] from grouped sums.
///
/// Any row with a transfer account counts towards the transfer branch,
/// whatever the account is. Rows repeating a key and branch are summed.
///
/// # Errors
/// Returns [Error::MalformedAggregate] if a row has no amount and
/// [Error::Overflow] if summing repeated rows overflows.
pub fn index_cash_flow(rows: &[AggregateRow]) -> Result<BucketIndex, Error> {
    let mut index: HashMap<String, FlowSplit> = HashMap::with_capacity(rows.len());

    for row in rows {
        let amount = row.amount.ok_or_else(|| Error::MalformedAggregate {
            date: row.date.clone(),
        })?;

        let split = index.entry(row.date.clone()).or_default();
        let branch = if row.is_transfer.is_some() {
            &mut split.transfer
        } else {
            &mut split.ordinary
        };

        *branch = branch.checked_add(amount).ok_or(Error::Overflow)?;
    }

    Ok(BucketIndex(index))
}

/// Indexes the positive-amount and negative-amount groups.
///
/// Returns the income-side index followed by the expense-side index.
///
/// # Errors
/// Returns the first error from [index_cash_flow].
pub fn index_aggregates(
    income: &[AggregateRow],
    expense: &[AggregateRow],
) -> Result<(BucketIndex, BucketIndex), Error> {
    Ok((index_cash_flow(income)?, index_cash_flow(expense)?))
}
