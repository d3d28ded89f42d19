//! Default configuration values

pub struct RouterDefaults;

impl RouterDefaults {
    pub const ALLOWED_METHODS: &'static [&'static str] =
        &["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"];
    pub const ROUTE_QUERY_VAR: &'static str = "mtwp_route";
    pub const PARAM_CAPTURE: &'static str = "([^/]+)";
    pub const REWRITE_TARGET: &'static str = "index.php";
    pub const DEFAULT_POSITION: &'static str = "top";
    pub const GLOBAL_NAMESPACE: &'static str = "mtwp/v1";
    pub const EXPOSE_VAR: &'static str = "mtwpRestRoutes";
    pub const HOME_URL: &'static str = "http://localhost";
    pub const REST_URL: &'static str = "http://localhost/wp-json";
    pub const STRICT_METHODS: bool = false;
    pub const STRICT_MIDDLEWARE: bool = false;
}
