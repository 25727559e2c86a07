//! Cash flow HTTP handlers.
//!
//! Each handler resolves the requested months against today's date in the
//! local timezone, fetches every input from the database while holding the
//! lock, then builds the response without the lock.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State, rejection::QueryRejection},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    cash_flow::{
        chart::cash_flow_chart,
        label::{BucketLabel, label_buckets},
        range::{DateRange, Granularity, resolve_date_range},
        report::{CashFlowInputs, CashFlowReport, SimpleCashFlow, build_report},
    },
    db::{get_cash_flow_inputs, get_simple_cash_flow},
    timezone::get_local_today,
};

/// The state needed for the cash flow endpoints.
#[derive(Debug, Clone)]
pub struct CashFlowState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CashFlowState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query string for the cash flow endpoints.
#[derive(Debug, Deserialize)]
pub struct CashFlowQuery {
    /// The first month to include, `YYYY-MM`.
    pub start: String,
    /// The last month to include, `YYYY-MM`.
    pub end: String,
    /// The bucket size, monthly if not given.
    pub granularity: Option<Granularity>,
}

/// The body returned by [get_cash_flow].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowResponse {
    /// The report.
    pub report: CashFlowReport,
    /// One display label per bucket, in the same order as the report's buckets.
    pub labels: Vec<BucketLabel>,
}

/// Get the cash flow report and bucket labels for the requested months.
pub async fn get_cash_flow(
    State(state): State<CashFlowState>,
    query: Result<Query<CashFlowQuery>, QueryRejection>,
) -> Result<Json<CashFlowResponse>, Error> {
    let query = parse_query(query)?;
    let report = fetch_report(&state, &query)?;
    let labels = label_buckets(&report)?;

    Ok(Json(CashFlowResponse { report, labels }))
}

/// Get the ECharts options for the cash flow chart.
pub async fn get_cash_flow_chart(
    State(state): State<CashFlowState>,
    query: Result<Query<CashFlowQuery>, QueryRejection>,
) -> Result<Response, Error> {
    let query = parse_query(query)?;
    let report = fetch_report(&state, &query)?;
    let chart = cash_flow_chart(&report)?;

    Ok(([(CONTENT_TYPE, "application/json")], chart.to_string()).into_response())
}

/// Get total income and expenses, excluding transfers, for the requested months.
pub async fn get_cash_flow_summary(
    State(state): State<CashFlowState>,
    query: Result<Query<CashFlowQuery>, QueryRejection>,
) -> Result<Json<SimpleCashFlow>, Error> {
    let query = parse_query(query)?;
    let range = resolve_query_range(&state, &query)?;

    let connection = lock_connection(&state)?;
    let summary = get_simple_cash_flow(range, &connection)
        .inspect_err(|error| tracing::error!("could not get cash flow summary: {error}"))?;

    Ok(Json(summary))
}

fn parse_query(
    query: Result<Query<CashFlowQuery>, QueryRejection>,
) -> Result<CashFlowQuery, Error> {
    query
        .map(|Query(query)| query)
        .map_err(|rejection| Error::InvalidQuery(rejection.body_text()))
}

fn fetch_report(state: &CashFlowState, query: &CashFlowQuery) -> Result<CashFlowReport, Error> {
    let granularity = query.granularity.unwrap_or_default();
    let range = resolve_query_range(state, query)?;

    let inputs: CashFlowInputs = {
        let connection = lock_connection(state)?;
        get_cash_flow_inputs(range, granularity, &connection)
            .inspect_err(|error| tracing::error!("could not get cash flow inputs: {error}"))?
    };

    tracing::debug!(
        "building {} cash flow report from {} to {}",
        granularity.as_query_value(),
        range.start,
        range.end
    );

    build_report(&inputs, range, granularity)
}

fn resolve_query_range(state: &CashFlowState, query: &CashFlowQuery) -> Result<DateRange, Error> {
    let today = get_local_today(&state.local_timezone)?;

    resolve_date_range(
        &query.start,
        &query.end,
        query.granularity.unwrap_or_default(),
        today,
    )
}

fn lock_connection(
    state: &CashFlowState,
) -> Result<std::sync::MutexGuard<'_, Connection>, Error> {
    state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, http::StatusCode, routing::get};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        cash_flow::{Granularity, SimpleCashFlow},
        db::{NewTransaction, create_account, create_payee, create_transaction, initialize},
        endpoints,
    };

    use super::{
        CashFlowResponse, CashFlowState, get_cash_flow, get_cash_flow_chart,
        get_cash_flow_summary,
    };

    fn get_test_state() -> CashFlowState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        let checking = create_account("Checking", false, &connection).unwrap();
        let savings = create_account("Savings", false, &connection).unwrap();
        let to_savings = create_payee("Savings", Some(savings), &connection).unwrap();

        for (payee_id, date, amount) in [
            (None, date!(2024 - 02 - 15), 1000),
            (None, date!(2024 - 03 - 01), 500),
            (Some(to_savings), date!(2024 - 03 - 01), -200),
            (None, date!(2024 - 04 - 10), -150),
        ] {
            create_transaction(
                &NewTransaction {
                    account_id: checking,
                    payee_id,
                    date,
                    amount,
                },
                &connection,
            )
            .unwrap();
        }

        CashFlowState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Pacific/Auckland".to_owned(),
        }
    }

    fn get_test_server() -> TestServer {
        let app = Router::new()
            .route(endpoints::CASH_FLOW, get(get_cash_flow))
            .route(endpoints::CASH_FLOW_CHART, get(get_cash_flow_chart))
            .route(endpoints::CASH_FLOW_SUMMARY, get(get_cash_flow_summary))
            .with_state(get_test_state());

        TestServer::new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn returns_monthly_report() {
        let server = get_test_server();

        let response = server
            .get(endpoints::CASH_FLOW)
            .add_query_param("start", "2024-03")
            .add_query_param("end", "2024-04")
            .await;

        response.assert_status_ok();
        let body: CashFlowResponse = response.json();
        let report = body.report;
        assert_eq!(report.granularity, Granularity::Monthly);
        assert_eq!(report.starting_balance, 1000);
        assert_eq!(report.buckets.len(), 2);
        assert_eq!(report.buckets[0].running_balance, 1300);
        assert_eq!(report.buckets[1].running_balance, 1150);
        assert_eq!(report.total_income, 500);
        assert_eq!(report.total_expenses, -150);
        assert_eq!(report.total_transfers, -200);
        assert_eq!(report.total_change, -150);
        assert_eq!(body.labels.len(), 2);
        assert_eq!(body.labels[0].heading, "March 2024");
        assert_eq!(body.labels[0].transfers.as_deref(), Some("-$2.00"));
    }

    #[tokio::test]
    async fn returns_daily_report() {
        let server = get_test_server();

        let response = server
            .get(endpoints::CASH_FLOW)
            .add_query_param("start", "2024-03")
            .add_query_param("end", "2024-03")
            .add_query_param("granularity", "daily")
            .await;

        response.assert_status_ok();
        let body: CashFlowResponse = response.json();
        assert_eq!(body.report.buckets.len(), 31);
        assert_eq!(body.report.buckets[0].date, "2024-03-01");
        assert_eq!(body.labels[0].heading, "March 1, 2024");
    }

    #[tokio::test]
    async fn rejects_invalid_range() {
        let server = get_test_server();

        let response = server
            .get(endpoints::CASH_FLOW)
            .add_query_param("start", "2024-05")
            .add_query_param("end", "2024-04")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rejects_unparseable_month() {
        let server = get_test_server();

        let response = server
            .get(endpoints::CASH_FLOW)
            .add_query_param("start", "last year")
            .add_query_param("end", "2024-04")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn returns_summary_without_transfers() {
        let server = get_test_server();

        let response = server
            .get(endpoints::CASH_FLOW_SUMMARY)
            .add_query_param("start", "2024-03")
            .add_query_param("end", "2024-04")
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<SimpleCashFlow>(),
            SimpleCashFlow {
                income: 500,
                expense: -150
            }
        );
    }

    #[tokio::test]
    async fn returns_chart_options() {
        let server = get_test_server();

        let response = server
            .get(endpoints::CASH_FLOW_CHART)
            .add_query_param("start", "2024-03")
            .add_query_param("end", "2024-04")
            .await;

        response.assert_status_ok();
        let options = response.text();
        assert!(options.contains("April 2024"), "{options}");
    }

    #[tokio::test]
    async fn invalid_timezone_is_server_error() {
        let mut state = get_test_state();
        state.local_timezone = "Not/A_Timezone".to_owned();
        let app = Router::new()
            .route(endpoints::CASH_FLOW, get(get_cash_flow))
            .with_state(state);
        let server = TestServer::new(app).expect("Could not create test server.");

        let response = server
            .get(endpoints::CASH_FLOW)
            .add_query_param("start", "2024-03")
            .add_query_param("end", "2024-04")
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn non_integer_amount_is_unprocessable() {
        let state = get_test_state();
        state
            .db_connection
            .lock()
            .unwrap()
            .execute(
                "INSERT INTO \"transaction\" (account_id, date, amount) VALUES (1, '2024-03-20', '12.5')",
                [],
            )
            .unwrap();
        let app = Router::new()
            .route(endpoints::CASH_FLOW, get(get_cash_flow))
            .with_state(state);
        let server = TestServer::new(app).expect("Could not create test server.");

        let response = server
            .get(endpoints::CASH_FLOW)
            .add_query_param("start", "2024-03")
            .add_query_param("end", "2024-04")
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        response.assert_json(&serde_json::json!({
            "error": "the aggregate row for 2024-03 has a missing or non-numeric amount"
        }));
    }

    #[tokio::test]
    async fn unknown_granularity_is_json_bad_request() {
        let server = get_test_server();

        let response = server
            .get(endpoints::CASH_FLOW)
            .add_query_param("start", "2024-03")
            .add_query_param("end", "2024-04")
            .add_query_param("granularity", "weekly")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        let message = body["error"].as_str().unwrap_or_default();
        assert!(message.starts_with("invalid query"), "{body}");
        assert!(message.contains("weekly"), "{body}");
    }
}
