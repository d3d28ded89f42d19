//! Assertions over dispatch outcomes
//!
//! Each assertion panics with the outcome's debug form on mismatch and
//! returns the matched piece for further checks.

use http::StatusCode;
use serde_json::Value;
use switchyard_router::{DispatchOutcome, HttpMethod, MiddlewareError, ResponseBody, RouteResponse};

pub trait OutcomeAssertions {
    /// Assert the route ran to completion and return its response
    fn assert_completed(&self) -> &RouteResponse;

    fn assert_completed_by(&self, route: &str) -> &RouteResponse;

    fn assert_status(&self, status: StatusCode) -> &RouteResponse;

    fn assert_json(&self, expected: &Value);

    fn assert_text(&self, expected: &str);

    fn assert_not_found(&self);

    fn assert_method_not_allowed(&self, expected: &[HttpMethod]);

    fn assert_failed(&self, kind: &str) -> &MiddlewareError;

    fn assert_passthrough(&self);
}

impl OutcomeAssertions for DispatchOutcome {
    #[track_caller]
    fn assert_completed(&self) -> &RouteResponse {
        match self {
            DispatchOutcome::Completed { response, .. } => response,
            other => panic!("expected completed dispatch, got {:?}", other),
        }
    }

    #[track_caller]
    fn assert_completed_by(&self, route: &str) -> &RouteResponse {
        match self {
            DispatchOutcome::Completed { route: ran, response } if ran == route => response,
            other => panic!("expected route '{}' to complete, got {:?}", route, other),
        }
    }

    #[track_caller]
    fn assert_status(&self, status: StatusCode) -> &RouteResponse {
        let response = self.assert_completed();
        assert_eq!(response.status_code(), status, "unexpected response status");
        response
    }

    #[track_caller]
    fn assert_json(&self, expected: &Value) {
        match self.assert_completed().body() {
            ResponseBody::Json(actual) => assert_eq!(
                actual,
                expected,
                "JSON body mismatch:\nExpected: {}\nActual: {}",
                serde_json::to_string_pretty(expected).unwrap_or_default(),
                serde_json::to_string_pretty(actual).unwrap_or_default()
            ),
            other => panic!("expected JSON body, got {:?}", other),
        }
    }

    #[track_caller]
    fn assert_text(&self, expected: &str) {
        match self.assert_completed().body() {
            ResponseBody::Text(actual) => assert_eq!(actual, expected),
            other => panic!("expected text body, got {:?}", other),
        }
    }

    #[track_caller]
    fn assert_not_found(&self) {
        assert!(self.is_not_found(), "expected not found, got {:?}", self);
    }

    #[track_caller]
    fn assert_method_not_allowed(&self, expected: &[HttpMethod]) {
        match self {
            DispatchOutcome::MethodNotAllowed { allowed } => {
                assert_eq!(allowed.as_slice(), expected, "unexpected allowed methods")
            }
            other => panic!("expected method not allowed, got {:?}", other),
        }
    }

    #[track_caller]
    fn assert_failed(&self, kind: &str) -> &MiddlewareError {
        match self {
            DispatchOutcome::Failed { error, .. } if error.kind == kind => error,
            other => panic!("expected failure of kind '{}', got {:?}", kind, other),
        }
    }

    #[track_caller]
    fn assert_passthrough(&self) {
        assert!(self.is_passthrough(), "expected passthrough, got {:?}", self);
    }
}
