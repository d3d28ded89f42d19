use crate::errors::MiddlewareError;
use crate::response::RouteResponse;
use crate::routing::HttpMethod;
use http::StatusCode;

/// Dispatch lifecycle states.
///
/// `Init → Resolving → {Matched, NotFound, MethodNotAllowed, Passthrough}`,
/// then `Matched → Dispatching → {Completed, Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchState {
    Init,
    Resolving,
    Matched,
    NotFound,
    MethodNotAllowed,
    Passthrough,
    Dispatching,
    Completed,
    Failed,
}

impl DispatchState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DispatchState::NotFound
                | DispatchState::MethodNotAllowed
                | DispatchState::Passthrough
                | DispatchState::Completed
                | DispatchState::Failed
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchState::Init => "init",
            DispatchState::Resolving => "resolving",
            DispatchState::Matched => "matched",
            DispatchState::NotFound => "not_found",
            DispatchState::MethodNotAllowed => "method_not_allowed",
            DispatchState::Passthrough => "passthrough",
            DispatchState::Dispatching => "dispatching",
            DispatchState::Completed => "completed",
            DispatchState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for DispatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal result of dispatching one request.
///
/// `route` is the route's handle: its name, else its full path.
#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    Completed {
        route: String,
        response: RouteResponse,
    },
    NotFound,
    MethodNotAllowed {
        allowed: Vec<HttpMethod>,
    },
    Failed {
        route: String,
        error: MiddlewareError,
    },
    /// The request is not addressed to this engine
    Passthrough,
}

impl DispatchOutcome {
    pub fn state(&self) -> DispatchState {
        match self {
            DispatchOutcome::Completed { .. } => DispatchState::Completed,
            DispatchOutcome::NotFound => DispatchState::NotFound,
            DispatchOutcome::MethodNotAllowed { .. } => DispatchState::MethodNotAllowed,
            DispatchOutcome::Failed { .. } => DispatchState::Failed,
            DispatchOutcome::Passthrough => DispatchState::Passthrough,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, DispatchOutcome::Completed { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DispatchOutcome::NotFound)
    }

    pub fn is_method_not_allowed(&self) -> bool {
        matches!(self, DispatchOutcome::MethodNotAllowed { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, DispatchOutcome::Failed { .. })
    }

    pub fn is_passthrough(&self) -> bool {
        matches!(self, DispatchOutcome::Passthrough)
    }

    /// Handle of the route that ran, if one did
    pub fn route(&self) -> Option<&str> {
        match self {
            DispatchOutcome::Completed { route, .. } | DispatchOutcome::Failed { route, .. } => {
                Some(route)
            }
            _ => None,
        }
    }

    pub fn response(&self) -> Option<&RouteResponse> {
        match self {
            DispatchOutcome::Completed { response, .. } => Some(response),
            _ => None,
        }
    }

    /// Get error code for consistent reporting
    pub fn error_code(&self) -> Option<&'static str> {
        match self {
            DispatchOutcome::NotFound => Some("ROUTE_NOT_FOUND"),
            DispatchOutcome::MethodNotAllowed { .. } => Some("METHOD_NOT_ALLOWED"),
            DispatchOutcome::Failed { error, .. } => Some(error.error_code()),
            _ => None,
        }
    }

    /// Response the host should emit.
    ///
    /// Failures become a 500 JSON error, misses the host's `404` template,
    /// and disallowed methods a 405 carrying `Allow`. Passthrough has no
    /// response.
    pub fn into_response(self) -> Option<RouteResponse> {
        match self {
            DispatchOutcome::Completed { response, .. } => Some(response),
            DispatchOutcome::Failed { error, .. } => Some(RouteResponse::error(
                error.kind,
                error.message,
                StatusCode::INTERNAL_SERVER_ERROR,
            )),
            DispatchOutcome::NotFound => {
                Some(RouteResponse::host_template("404", StatusCode::NOT_FOUND))
            }
            DispatchOutcome::MethodNotAllowed { allowed } => {
                let allow = allowed
                    .iter()
                    .map(HttpMethod::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                Some(
                    RouteResponse::error(
                        "METHOD_NOT_ALLOWED",
                        "Method not allowed for this route",
                        StatusCode::METHOD_NOT_ALLOWED,
                    )
                    .with_header("allow", allow),
                )
            }
            DispatchOutcome::Passthrough => None,
        }
    }
}
