//! Application router configuration.

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;

use crate::{
    AppState,
    cash_flow::{get_cash_flow, get_cash_flow_chart, get_cash_flow_summary},
    endpoints,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::COFFEE, get(get_coffee))
        .route(endpoints::CASH_FLOW, get(get_cash_flow))
        .route(endpoints::CASH_FLOW_SUMMARY, get(get_cash_flow_summary))
        .route(endpoints::CASH_FLOW_CHART, get(get_cash_flow_chart))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (StatusCode::IM_A_TEAPOT, "I'm a teapot").into_response()
}

async fn get_404_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "the requested resource could not be found" })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{AppState, endpoints};

    use super::build_router;

    fn get_test_server() -> TestServer {
        let state = AppState::new(Connection::open_in_memory().unwrap(), "Pacific/Auckland")
            .expect("Could not create app state");

        TestServer::new(build_router(state)).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn coffee_is_a_teapot() {
        let server = get_test_server();

        server
            .get(endpoints::COFFEE)
            .await
            .assert_status(StatusCode::IM_A_TEAPOT);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = get_test_server();

        let response = server.get("/api/nope").await;

        response.assert_status_not_found();
        response.assert_json(&serde_json::json!({
            "error": "the requested resource could not be found"
        }));
    }

    #[tokio::test]
    async fn cash_flow_routes_are_mounted() {
        let server = get_test_server();

        for route in [
            endpoints::CASH_FLOW,
            endpoints::CASH_FLOW_SUMMARY,
            endpoints::CASH_FLOW_CHART,
        ] {
            server
                .get(route)
                .add_query_param("start", "2024-01")
                .add_query_param("end", "2024-02")
                .await
                .assert_status_ok();
        }
    }

    #[tokio::test]
    async fn missing_query_is_bad_request() {
        let server = get_test_server();

        server
            .get(endpoints::CASH_FLOW)
            .await
            .assert_status_bad_request();
    }
}
