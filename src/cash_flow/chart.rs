//! ECharts configuration for the cash flow report.
//!
//! The chart shows income, expenses and transfers as bars with the running
//! balance drawn as a line over the top. Amounts are converted from cents to
//! dollars.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, Emphasis, EmphasisFocus, JsFunction,
        Tooltip, Trigger,
    },
    series::{Line, bar},
};

use crate::{
    Error,
    cash_flow::{
        accumulator::Bucket,
        label::{integer_to_amount, label_buckets},
        report::CashFlowReport,
    },
};

/// Builds the cash flow chart for `report`.
///
/// # Errors
/// Returns [Error::InvalidRange] if a bucket key does not match the report's granularity.
pub fn cash_flow_chart(report: &CashFlowReport) -> Result<Chart, Error> {
    let labels: Vec<String> = label_buckets(report)?
        .into_iter()
        .map(|label| label.heading)
        .collect();

    let series = |amount: fn(&Bucket) -> i64| -> Vec<f64> {
        report
            .buckets
            .iter()
            .map(|bucket| integer_to_amount(amount(bucket)))
            .collect()
    };

    let income = series(|bucket| bucket.income);
    let expenses = series(|bucket| bucket.expense);
    let transfers = series(|bucket| bucket.transfers());
    let balances = series(|bucket| bucket.running_balance);

    Ok(Chart::new()
        .title(Title::new().text("Cash Flow").subtext(format!(
            "{} to {}",
            labels.first().map(String::as_str).unwrap_or_default(),
            labels.last().map(String::as_str).unwrap_or_default()
        )))
        .tooltip(currency_tooltip())
        .legend(Legend::new().top("1%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .top(90)
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(
            bar::Bar::new()
                .name("Income")
                .stack("Flow")
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(income),
        )
        .series(
            bar::Bar::new()
                .name("Expenses")
                .stack("Flow")
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(expenses),
        )
        .series(
            bar::Bar::new()
                .name("Transfers")
                .stack("Flow")
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(transfers),
        )
        .series(Line::new().name("Balance").data(balances)))
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}

/// Creates a tooltip configuration for currency values
fn currency_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}
