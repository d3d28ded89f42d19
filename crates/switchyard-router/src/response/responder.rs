use super::{ResponseBody, RouteResponse};
use crate::dispatch::DispatchOutcome;
use crate::errors::{RoutingError, RoutingResult};
use serde_json::Value;
use std::sync::Arc;

const JSON_CONTENT_TYPE: &str = "application/json";
const HTML_CONTENT_TYPE: &str = "text/html; charset=UTF-8";

/// Host view library
pub trait ViewRenderer: Send + Sync {
    fn render(&self, template: &str, data: &Value) -> Result<String, String>;
}

/// Host's own templates, such as its 404 page
pub trait TemplateRenderer: Send + Sync {
    /// `None` when the host has no such template
    fn render_template(&self, template: &str) -> Option<String>;
}

/// Final status, headers and body handed back to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RenderedResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Turns route responses into output the host can emit
#[derive(Clone, Default)]
pub struct Responder {
    views: Option<Arc<dyn ViewRenderer>>,
    templates: Option<Arc<dyn TemplateRenderer>>,
}

impl Responder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_views(mut self, views: Arc<dyn ViewRenderer>) -> Self {
        self.views = Some(views);
        self
    }

    pub fn with_templates(mut self, templates: Arc<dyn TemplateRenderer>) -> Self {
        self.templates = Some(templates);
        self
    }

    /// Render a response body to a string.
    ///
    /// JSON and markup bodies get a content type unless the handler set one.
    pub fn render(&self, response: RouteResponse) -> RoutingResult<RenderedResponse> {
        let (status, headers, body) = response.into_parts();

        let mut rendered_headers: Vec<(String, String)> = headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();

        let (content_type, body) = match body {
            ResponseBody::Empty => (None, String::new()),
            ResponseBody::Text(text) => (Some(HTML_CONTENT_TYPE), text),
            ResponseBody::Json(value) => (Some(JSON_CONTENT_TYPE), value.to_string()),
            ResponseBody::View { template, data } => {
                let views = self
                    .views
                    .as_ref()
                    .ok_or_else(|| RoutingError::missing_collaborator("view renderer"))?;
                let html = views.render(&template, &data).map_err(|message| {
                    tracing::error!(
                        target: "switchyard::response",
                        template = %template,
                        error = %message,
                        "View rendering failed"
                    );
                    RoutingError::render(format!("{}: {}", template, message))
                })?;
                (Some(HTML_CONTENT_TYPE), html)
            }
            ResponseBody::HostTemplate(template) => {
                let html = self
                    .templates
                    .as_ref()
                    .and_then(|templates| templates.render_template(&template))
                    .unwrap_or_else(|| {
                        tracing::debug!(
                            target: "switchyard::response",
                            template = %template,
                            "Host template unavailable, using status reason"
                        );
                        status.canonical_reason().unwrap_or_default().to_string()
                    });
                (Some(HTML_CONTENT_TYPE), html)
            }
        };

        if let Some(content_type) = content_type {
            let has_content_type = rendered_headers
                .iter()
                .any(|(key, _)| key.eq_ignore_ascii_case("content-type"));
            if !has_content_type {
                rendered_headers.push(("content-type".to_string(), content_type.to_string()));
            }
        }

        Ok(RenderedResponse {
            status: status.as_u16(),
            headers: rendered_headers,
            body,
        })
    }

    /// Render whatever a dispatch produced; passthrough yields `None`
    pub fn respond(&self, outcome: DispatchOutcome) -> RoutingResult<Option<RenderedResponse>> {
        match outcome.into_response() {
            Some(response) => self.render(response).map(Some),
            None => Ok(None),
        }
    }
}

impl std::fmt::Debug for Responder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Responder")
            .field("views", &self.views.is_some())
            .field("templates", &self.templates.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use serde_json::json;

    struct Upper;

    impl ViewRenderer for Upper {
        fn render(&self, template: &str, data: &Value) -> Result<String, String> {
            match data.get("title").and_then(Value::as_str) {
                Some(title) => Ok(format!("<{}>{}</{}>", template, title.to_uppercase(), template)),
                None => Err("missing title".to_string()),
            }
        }
    }

    struct NotFoundPage;

    impl TemplateRenderer for NotFoundPage {
        fn render_template(&self, template: &str) -> Option<String> {
            (template == "404").then(|| "<h1>Nothing here</h1>".to_string())
        }
    }

    #[test]
    fn test_json_body_gets_content_type() {
        let rendered = Responder::new()
            .render(RouteResponse::json(json!({"id": 42})))
            .unwrap();
        assert_eq!(rendered.status, 200);
        assert_eq!(rendered.body, r#"{"id":42}"#);
        assert_eq!(rendered.header("Content-Type"), Some(JSON_CONTENT_TYPE));
    }

    #[test]
    fn test_handler_content_type_kept() {
        let response = RouteResponse::text("a,b", StatusCode::OK).with_header("content-type", "text/csv");
        let rendered = Responder::new().render(response).unwrap();
        assert_eq!(rendered.header("content-type"), Some("text/csv"));
        assert_eq!(rendered.headers.len(), 1);
    }

    #[test]
    fn test_view_rendering() {
        let responder = Responder::new().with_views(Arc::new(Upper));
        let rendered = responder
            .render(RouteResponse::view("h1", json!({"title": "hi"})))
            .unwrap();
        assert_eq!(rendered.body, "<h1>HI</h1>");

        let err = responder
            .render(RouteResponse::view("h1", json!({})))
            .unwrap_err();
        assert_eq!(err.error_code(), "RENDER_FAILED");
    }

    #[test]
    fn test_view_without_renderer_is_an_error() {
        let err = Responder::new()
            .render(RouteResponse::view("home", json!({})))
            .unwrap_err();
        assert!(matches!(err, RoutingError::MissingCollaborator { .. }));
    }

    #[test]
    fn test_host_template_fallback() {
        let response = RouteResponse::host_template("404", StatusCode::NOT_FOUND);
        let bare = Responder::new().render(response.clone()).unwrap();
        assert_eq!(bare.body, "Not Found");

        let themed = Responder::new()
            .with_templates(Arc::new(NotFoundPage))
            .render(response)
            .unwrap();
        assert_eq!(themed.status, 404);
        assert_eq!(themed.body, "<h1>Nothing here</h1>");
    }

    #[test]
    fn test_respond_passthrough() {
        let responder = Responder::new();
        assert_eq!(responder.respond(DispatchOutcome::Passthrough).unwrap(), None);
        let rendered = responder.respond(DispatchOutcome::NotFound).unwrap().unwrap();
        assert_eq!(rendered.status, 404);
    }
}
