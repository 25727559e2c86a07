//! The API endpoints URIs.

/// The route to request a cup of coffee (experimental).
pub const COFFEE: &str = "/api/coffee";
/// The route for the cash flow report and its bucket labels.
///
/// Takes the query parameters `start` and `end` as `YYYY-MM` months and an
/// optional `granularity` of `daily` or `monthly`.
pub const CASH_FLOW: &str = "/api/cash-flow";
/// The route for total income and expenses, excluding transfers.
pub const CASH_FLOW_SUMMARY: &str = "/api/cash-flow/summary";
/// The route for the ECharts options of the cash flow chart.
pub const CASH_FLOW_CHART: &str = "/api/cash-flow/chart";
