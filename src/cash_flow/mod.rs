//! Cash flow report module
//!
//! Turns grouped transaction sums into a dense series of daily or monthly
//! buckets with a running balance, plus range totals.
//! The HTTP handlers fetch the sums from the database and serve the report.

mod accumulator;
mod chart;
mod handlers;
mod index;
mod label;
mod range;
mod report;

pub use accumulator::{Accumulation, Bucket, RangeTotals, accumulate};
pub use chart::cash_flow_chart;
pub use handlers::{
    CashFlowQuery, CashFlowResponse, CashFlowState, get_cash_flow, get_cash_flow_chart,
    get_cash_flow_summary,
};
pub use index::{AggregateRow, BucketIndex, FlowSplit, index_aggregates, index_cash_flow};
pub use label::{BucketLabel, format_currency, format_heading, integer_to_amount, label_buckets};
pub use range::{
    DateRange, Granularity, bucket_dates, bucket_key, parse_bucket_key, resolve_date_range,
};
pub use report::{
    CashFlowInputs, CashFlowReport, SimpleCashFlow, assemble_report, build_report,
    cash_flow_by_date,
};
