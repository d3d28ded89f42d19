//! Request dispatch for both flavors

use http::StatusCode;
use serde_json::json;
use switchyard_router::{Dispatcher, RouteTable, RouterConfig};
use switchyard_testing::prelude::*;

fn compile(routes: &RouteRegistry) -> RouteTable {
    routes.compile(&MiddlewareRegistry::new()).unwrap()
}

fn users(flavor: Flavor) -> (Dispatcher, CountingHandler) {
    let handler = CountingHandler::new();
    let mut routes = RouteRegistry::new(flavor, RouterConfig::default());
    routes.get("users/{id}", handler.clone()).unwrap().name("user.show");
    (Dispatcher::new(compile(&routes)), handler)
}

#[tokio::test]
async fn test_direct_dispatch_extracts_params() {
    let (dispatcher, handler) = users(Flavor::Rest);

    let outcome = dispatcher.dispatch(TestRequest::get("/users/42").build()).await;
    outcome.assert_completed_by("user.show");
    outcome.assert_json(&json!({"id": "42"}));
    assert_eq!(handler.count(), 1);
    assert_eq!(handler.last_params(), vec![("id".to_string(), "42".to_string())]);
}

#[tokio::test]
async fn test_direct_dispatch_misses() {
    let (dispatcher, handler) = users(Flavor::Rest);

    dispatcher
        .dispatch(TestRequest::post("users/42").build())
        .await
        .assert_method_not_allowed(&[HttpMethod::GET]);
    dispatcher
        .dispatch(TestRequest::get("nowhere").build())
        .await
        .assert_not_found();
    assert_eq!(handler.count(), 0);
}

#[tokio::test]
async fn test_direct_dispatch_accepts_namespaced_path() {
    let (dispatcher, _handler) = users(Flavor::Rest);

    dispatcher
        .dispatch(TestRequest::get("mtwp/v1/users/9").build())
        .await
        .assert_json(&json!({"id": "9"}));
    dispatcher
        .dispatch(TestRequest::get("users/9").namespace("other/v2").build())
        .await
        .assert_not_found();
}

#[tokio::test]
async fn test_namespaced_path_matches_with_explicit_namespace() {
    let mut routes = RouteRegistry::new(Flavor::Rest, RouterConfig::default());
    routes.namespace("shop/v1").group(|r| {
        r.get("items/{id}", CountingHandler::new()).unwrap().name("items.show");
    });
    let dispatcher = Dispatcher::new(compile(&routes));

    for request in [
        TestRequest::get("shop/v1/items/3").build(),
        TestRequest::get("shop/v1/items/3").namespace("shop/v1").build(),
        TestRequest::get("items/3").namespace("shop/v1").build(),
    ] {
        dispatcher
            .dispatch(request)
            .await
            .assert_json(&json!({"id": "3"}));
    }
}

#[tokio::test]
async fn test_earliest_declared_route_wins() {
    let mut routes = RouteRegistry::new(Flavor::Rest, RouterConfig::default());
    routes.get("items/{slug}", CountingHandler::new()).unwrap().name("items.slug");
    routes.get("items/new", CountingHandler::new()).unwrap().name("items.new");

    let dispatcher = Dispatcher::new(compile(&routes));
    dispatcher
        .dispatch(TestRequest::get("items/new").build())
        .await
        .assert_completed_by("items.slug");
}

#[tokio::test]
async fn test_rewrite_dispatch_reads_route_vars() {
    let (dispatcher, handler) = users(Flavor::Rewrite);

    let outcome = dispatcher
        .dispatch(TestRequest::rewrite("GET", "users/{id}").var("id", "42").build())
        .await;
    outcome.assert_completed_by("user.show");
    assert_eq!(handler.last_params(), vec![("id".to_string(), "42".to_string())]);

    let encoded = TestRequest::get("users/7")
        .var("mtwp_route", "users%2F%7Bid%7D")
        .var("id", "7")
        .build();
    dispatcher.dispatch(encoded).await.assert_json(&json!({"id": "7"}));
}

#[tokio::test]
async fn test_rewrite_dispatch_passthrough_and_misses() {
    let (dispatcher, handler) = users(Flavor::Rewrite);

    dispatcher
        .dispatch(TestRequest::get("about").build())
        .await
        .assert_passthrough();
    dispatcher
        .dispatch(TestRequest::get("about").var("mtwp_route", "").build())
        .await
        .assert_passthrough();
    dispatcher
        .dispatch(TestRequest::rewrite("GET", "posts/{slug}").build())
        .await
        .assert_not_found();
    dispatcher
        .dispatch(TestRequest::rewrite("DELETE", "users/{id}").var("id", "1").build())
        .await
        .assert_method_not_allowed(&[HttpMethod::GET]);
    assert_eq!(handler.count(), 0);
}

#[tokio::test]
async fn test_short_circuit_skips_rest_of_chain() {
    let auth = ShortCircuitMiddleware::unauthorized("authCheck");
    let logger = CountingMiddleware::new("logger");
    let handler = CountingHandler::new();

    let mut middleware = MiddlewareRegistry::new();
    middleware
        .register_unit("authCheck", auth.unit())
        .register_unit("logger", logger.unit());

    let mut routes = RouteRegistry::new(Flavor::Rest, RouterConfig::default());
    routes.middleware("authCheck").middleware("logger").group(|r| {
        r.get("account", handler.clone());
    });
    let dispatcher = Dispatcher::new(routes.compile(&middleware).unwrap());

    dispatcher
        .dispatch(TestRequest::get("account").build())
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(auth.count(), 1);
    assert_eq!(logger.count(), 0);
    assert_eq!(handler.count(), 0);
}

#[tokio::test]
async fn test_failures_become_500() {
    let mut middleware = MiddlewareRegistry::new();
    middleware.register_unit("guard", FailingMiddleware::new("auth.denied", "token expired").unit());

    let mut routes = RouteRegistry::new(Flavor::Rest, RouterConfig::default());
    routes.middleware("guard").group(|r| {
        r.get("secret", |_req: RouteRequest| async { Ok::<_, MiddlewareError>(RouteResponse::ok()) });
    });
    routes.get("broken", |_req: RouteRequest| async {
        Err::<RouteResponse, _>(MiddlewareError::handler("database unavailable"))
    });
    let dispatcher = Dispatcher::new(routes.compile(&middleware).unwrap());

    let outcome = dispatcher.dispatch(TestRequest::get("secret").build()).await;
    assert_eq!(outcome.assert_failed("auth.denied").message, "token expired");
    let response = outcome.into_response().unwrap();
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

    dispatcher
        .dispatch(TestRequest::get("broken").build())
        .await
        .assert_failed("handler");
}

#[tokio::test]
async fn test_dispatch_by_endpoint_handle() {
    let handler = CountingHandler::new();
    let mut routes = RouteRegistry::new(Flavor::Rest, RouterConfig::default());
    routes.get("orders/{order}", handler.clone()).unwrap().name("orders.show");
    routes.get("health", handler.clone());
    let dispatcher = Dispatcher::new(compile(&routes));

    dispatcher
        .dispatch_handle("orders.show", TestRequest::get("orders/5").build())
        .await
        .assert_json(&json!({"order": "5"}));
    dispatcher
        .dispatch_handle("orders.show", TestRequest::get("wp-json/orders").param("order", "6").build())
        .await
        .assert_json(&json!({"order": "6"}));
    dispatcher
        .dispatch_handle("health", TestRequest::get("health").build())
        .await
        .assert_completed_by("health");
    dispatcher
        .dispatch_handle("missing", TestRequest::get("x").build())
        .await
        .assert_not_found();
    assert_eq!(handler.count(), 3);
}

#[tokio::test]
async fn test_published_table_replaces_snapshot() {
    let (dispatcher, _handler) = users(Flavor::Rest);
    let before = dispatcher.table();

    let mut routes = RouteRegistry::new(Flavor::Rest, RouterConfig::default());
    routes.get("accounts/{id}", CountingHandler::new());
    dispatcher.publish(compile(&routes));

    dispatcher
        .dispatch(TestRequest::get("users/1").build())
        .await
        .assert_not_found();
    dispatcher
        .dispatch(TestRequest::get("accounts/1").build())
        .await
        .assert_completed_by("accounts/{id}");
    assert_eq!(before.len(), 1);
    assert_ne!(before.fingerprint(), dispatcher.table().fingerprint());
}
