//! Display labels for report buckets.
//!
//! A label holds the text a chart tooltip shows for one bucket. How it is
//! rendered is up to the client; `change` is meant to be emphasised.

use std::sync::OnceLock;

use numfmt::{Formatter, Precision};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    cash_flow::{
        accumulator::Bucket,
        range::{Granularity, parse_bucket_key},
        report::CashFlowReport,
    },
};

/// The formatted content for one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketLabel {
    /// The bucket key this label describes.
    pub date: String,
    /// "March 2024" for monthly buckets, "March 1, 2024" for daily buckets.
    pub heading: String,
    /// Formatted income.
    pub income: String,
    /// Formatted expenses.
    pub expenses: String,
    /// Formatted income plus expenses.
    pub change: String,
    /// Formatted net transfers, only present when they are non-zero.
    pub transfers: Option<String>,
    /// Formatted running balance.
    pub balance: String,
}

impl BucketLabel {
    /// Create the label for `bucket`.
    ///
    /// # Errors
    /// Returns [Error::InvalidRange] if the bucket key does not match `granularity`.
    pub fn new(bucket: &Bucket, granularity: Granularity) -> Result<Self, Error> {
        let date = parse_bucket_key(&bucket.date, granularity)?;
        let transfers = bucket.transfers();

        Ok(Self {
            date: bucket.date.clone(),
            heading: format_heading(date, granularity),
            income: format_currency(bucket.income),
            expenses: format_currency(bucket.expense),
            change: format_currency(bucket.change()),
            transfers: (transfers != 0).then(|| format_currency(transfers)),
            balance: format_currency(bucket.running_balance),
        })
    }
}

/// Labels every bucket in `report`, in order.
///
/// # Errors
/// Returns the first error from [BucketLabel::new].
pub fn label_buckets(report: &CashFlowReport) -> Result<Vec<BucketLabel>, Error> {
    report
        .buckets
        .iter()
        .map(|bucket| BucketLabel::new(bucket, report.granularity))
        .collect()
}

/// Formats the bucket date as a heading, e.g. "March 2024" or "March 1, 2024".
pub fn format_heading(date: Date, granularity: Granularity) -> String {
    match granularity {
        Granularity::Monthly => format!("{} {}", date.month(), date.year()),
        Granularity::Daily => format!("{} {}, {}", date.month(), date.day(), date.year()),
    }
}

/// Converts an amount in cents to dollars.
pub fn integer_to_amount(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Above this many dollars numfmt switches to exponent notation.
const NUMFMT_DOLLAR_LIMIT: u64 = 1_000_000_000;

/// Formats an amount in cents as dollars, e.g. "$12.30" or "-$0.05".
///
/// The cents are formatted from the integer directly so that amounts are
/// never rounded.
pub fn format_currency(cents: i64) -> String {
    static POSITIVE_FMT: OnceLock<Formatter> = OnceLock::new();

    let positive_fmt = POSITIVE_FMT.get_or_init(|| {
        Formatter::currency("$")
            .expect("\"$\" is a valid currency prefix")
            .precision(Precision::Decimals(0))
    });

    static NEGATIVE_FMT: OnceLock<Formatter> = OnceLock::new();

    let negative_fmt = NEGATIVE_FMT.get_or_init(|| {
        Formatter::currency("-$")
            .expect("\"-$\" is a valid currency prefix")
            .precision(Precision::Decimals(0))
    });

    let magnitude = cents.unsigned_abs();
    let dollars = magnitude / 100;
    let remainder = magnitude % 100;

    let dollars_string = match (cents < 0, dollars) {
        // Zero is hardcoded as "0", so we must specify the formatted string for zero
        (false, 0) => "$0".to_owned(),
        (true, 0) => "-$0".to_owned(),
        (false, dollars) if dollars < NUMFMT_DOLLAR_LIMIT => {
            positive_fmt.fmt_string(dollars as f64)
        }
        (true, dollars) if dollars < NUMFMT_DOLLAR_LIMIT => {
            negative_fmt.fmt_string(dollars as f64)
        }
        (false, dollars) => format!("${}", group_thousands(dollars)),
        (true, dollars) => format!("-${}", group_thousands(dollars)),
    };

    format!("{dollars_string}.{remainder:02}")
}

fn group_thousands(number: u64) -> String {
    let digits = number.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    grouped
}
