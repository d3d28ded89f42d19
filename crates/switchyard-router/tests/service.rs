//! End-to-end service lifecycle: define, register, serve, reload

use http::StatusCode;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use switchyard_router::{
    HostFacilities, RouteSet, RouterConfig, Responder, TemplateRenderer, ViewRenderer,
};
use switchyard_testing::prelude::*;

async fn show_user(request: RouteRequest) -> MiddlewareResult {
    let id = request.param("id").unwrap_or_default().to_string();
    Ok(RouteResponse::view("user", json!({ "id": id })))
}

async fn list_items(_request: RouteRequest) -> MiddlewareResult {
    Ok(RouteResponse::json(json!([{"id": 1}])))
}

struct ShopRoutes {
    runs: Arc<AtomicUsize>,
    item_path: Arc<Mutex<String>>,
}

impl RouteDefinitions for ShopRoutes {
    fn name(&self) -> &str {
        "shop"
    }

    fn define(&self, routes: &mut RouteSet) {
        self.runs.fetch_add(1, Ordering::SeqCst);
        routes.rewrite.get("users/{id}", show_user).unwrap().name("user.show");
        let item_path = self.item_path.lock().clone();
        routes.rest.namespace("shop/v1").public(true).group(|r| {
            r.get(&item_path, list_items).unwrap().name("items.index").expose(true);
        });
    }
}

struct Views;

impl ViewRenderer for Views {
    fn render(&self, template: &str, data: &Value) -> Result<String, String> {
        Ok(format!("<{}>{}</{}>", template, data["id"].as_str().unwrap_or_default(), template))
    }
}

struct Theme;

impl TemplateRenderer for Theme {
    fn render_template(&self, template: &str) -> Option<String> {
        Some(format!("theme:{}", template))
    }
}

struct Fixture {
    service: RouteService,
    facility: Arc<RecordingRewriteFacility>,
    publisher: Arc<RecordingEndpointPublisher>,
    runs: Arc<AtomicUsize>,
    item_path: Arc<Mutex<String>>,
}

fn fixture() -> Fixture {
    let facility = Arc::new(RecordingRewriteFacility::new());
    let publisher = Arc::new(RecordingEndpointPublisher::new());
    let runs = Arc::new(AtomicUsize::new(0));
    let item_path = Arc::new(Mutex::new("items".to_string()));

    let host = HostFacilities::new()
        .with_rewrite(facility.clone())
        .with_publisher(publisher.clone());
    let config = RouterConfig::default()
        .with_home_url("http://testsite.local")
        .with_rest_url("http://testsite.local/wp-json");

    let service = RouteService::new(config, host)
        .unwrap()
        .with_responder(
            Responder::new()
                .with_views(Arc::new(Views))
                .with_templates(Arc::new(Theme)),
        )
        .with_definitions(ShopRoutes {
            runs: Arc::clone(&runs),
            item_path: Arc::clone(&item_path),
        });

    Fixture {
        service,
        facility,
        publisher,
        runs,
        item_path,
    }
}

#[tokio::test]
async fn test_register_and_serve() {
    let fx = fixture();
    let report = fx.service.register().unwrap();

    assert_eq!(report.rewrite_routes, 1);
    assert_eq!(report.rest_routes, 1);
    assert!(report.flushed);
    assert_eq!(report.fingerprint.len(), 64);
    assert_eq!(fx.publisher.handles(), ["items.index"]);

    let outcome = fx
        .service
        .handle_rewrite(TestRequest::rewrite("GET", "users/{id}").var("id", "42").build())
        .await;
    let rendered = fx.service.respond(outcome).unwrap().unwrap();
    assert_eq!(rendered.status, 200);
    assert_eq!(rendered.body, "<user>42</user>");

    let outcome = fx.service.handle_rest(TestRequest::get("shop/v1/items").build()).await;
    outcome.assert_json(&json!([{"id": 1}]));

    let outcome = fx
        .service
        .handle_endpoint("items.index", TestRequest::get("items").build())
        .await;
    outcome.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_misses_render_through_host() {
    let fx = fixture();
    fx.service.register().unwrap();

    let passthrough = fx.service.handle_rewrite(TestRequest::get("about").build()).await;
    assert_eq!(fx.service.respond(passthrough).unwrap(), None);

    let missing = fx
        .service
        .handle_rewrite(TestRequest::rewrite("GET", "gone").build())
        .await;
    let rendered = fx.service.respond(missing).unwrap().unwrap();
    assert_eq!(rendered.status, 404);
    assert_eq!(rendered.body, "theme:404");

    let wrong_method = fx.service.handle_rest(TestRequest::delete("shop/v1/items").build()).await;
    let rendered = fx.service.respond(wrong_method).unwrap().unwrap();
    assert_eq!(rendered.status, 405);
    assert_eq!(rendered.header("allow"), Some("GET"));
}

#[test]
fn test_definitions_run_once() {
    let fx = fixture();
    fx.service.register().unwrap();
    fx.service.register().unwrap();

    assert_eq!(fx.runs.load(Ordering::SeqCst), 1);
    assert_eq!(fx.facility.flush_count(), 1);
}

#[tokio::test]
async fn test_reload_swaps_tables() {
    let fx = fixture();
    fx.service.register().unwrap();
    let dispatcher = Arc::clone(fx.service.dispatcher(Flavor::Rest));

    *fx.item_path.lock() = "products".to_string();
    let report = fx.service.reload().unwrap();

    assert_eq!(fx.runs.load(Ordering::SeqCst), 2);
    assert_eq!(report.rest_routes, 1);
    assert!(!report.flushed);
    assert_eq!(fx.facility.flush_count(), 1);

    dispatcher
        .dispatch(TestRequest::get("shop/v1/items").build())
        .await
        .assert_not_found();
    dispatcher
        .dispatch(TestRequest::get("shop/v1/products").build())
        .await
        .assert_completed_by("items.index");
    assert_eq!(
        fx.service.url("items.index", Vec::<(&str, &str)>::new()).as_deref(),
        Some("http://testsite.local/wp-json/shop/v1/products")
    );
}

#[test]
fn test_declare_urls_and_exposure() {
    let fx = fixture();
    fx.service.declare(|routes| {
        routes.rewrite.prefix("blog").group(|r| {
            r.get("{slug}", list_items).unwrap().name("post.show");
        });
    });
    let report = fx.service.register().unwrap();
    assert_eq!(report.rewrite_routes, 2);

    assert_eq!(
        fx.service.url("post.show", [("slug", "hello")]).as_deref(),
        Some("http://testsite.local/blog/hello")
    );
    assert_eq!(
        fx.service.url("user.show", [("id", "5")]).as_deref(),
        Some("http://testsite.local/users/5")
    );
    assert_eq!(
        fx.service.expose_script(),
        r#"<script>var mtwpRestRoutes = {"items.index":"http://testsite.local/wp-json/shop/v1/items"};</script>"#
    );
}

#[tokio::test]
async fn test_missing_publisher_leaves_host_untouched() {
    let facility = Arc::new(RecordingRewriteFacility::new());
    let host = HostFacilities::new().with_rewrite(facility.clone());
    let service = RouteService::new(RouterConfig::default(), host).unwrap();
    service.declare(|routes| {
        routes.rewrite.get("a", list_items);
        routes.rest.get("b", list_items);
    });

    let err = service.register().unwrap_err();
    assert_eq!(err.error_code(), "MISSING_COLLABORATOR");
    assert_eq!(facility.flush_count(), 0);
    assert!(facility.rules().is_empty());
    assert!(facility.query_vars().is_empty());
    assert_eq!(facility.persisted(), None);
    assert!(service.dispatcher(Flavor::Rewrite).table().is_empty());

    service
        .handle_rewrite(TestRequest::rewrite("GET", "a").build())
        .await
        .assert_not_found();
}
