use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;

use anyhow::{Context, Result};
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use hyper::{Method, Request, Response, StatusCode};
use tracing::debug;

use crate::AppState;
use crate::handlers::http::{admin, auth, files, utils::*};

// ---------------------------------------------------------------------------
// Handler type alias
// ---------------------------------------------------------------------------
//
// Routes carry no auth tier: the gate screens every request before the
// router runs, and each protected handler re-checks the admin role itself.

type RouteHandler = Box<
    dyn Fn(
            Request<hyper::body::Incoming>,
            AppState,
        )
            -> Pin<Box<dyn Future<Output = Result<Response<BoxBody<Bytes, Infallible>>>> + Send>>
        + Send
        + Sync,
>;

struct Route {
    method: Method,
    path: String,
    handler: RouteHandler,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub struct Router {
    routes: Vec<Route>,
    web_dir: Option<String>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes_count", &self.routes.len())
            .field("web_dir", &self.web_dir)
            .finish()
    }
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            web_dir: None,
        }
    }

    pub fn with_web_dir(mut self, web_dir: String) -> Self {
        self.web_dir = Some(web_dir);
        self
    }

    pub fn get<F, Fut>(mut self, path: &str, handler: F) -> Self
    where
        F: Fn(Request<hyper::body::Incoming>, AppState) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response<BoxBody<Bytes, Infallible>>>> + Send + 'static,
    {
        self.routes.push(Route {
            method: Method::GET,
            path: path.to_string(),
            handler: Box::new(move |req, state| Box::pin(handler(req, state))),
        });
        self
    }

    pub fn post<F, Fut>(mut self, path: &str, handler: F) -> Self
    where
        F: Fn(Request<hyper::body::Incoming>, AppState) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response<BoxBody<Bytes, Infallible>>>> + Send + 'static,
    {
        self.routes.push(Route {
            method: Method::POST,
            path: path.to_string(),
            handler: Box::new(move |req, state| Box::pin(handler(req, state))),
        });
        self
    }

    // ── Dispatch ──────────────────────────────────────────────────────────────

    pub async fn route(
        &self,
        req: Request<hyper::body::Incoming>,
        state: AppState,
    ) -> Result<Response<BoxBody<Bytes, Infallible>>> {
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        debug!("Routing {} {}", method, path);

        for route in &self.routes {
            if route.method == method && Self::path_matches(&route.path, &path) {
                return (route.handler)(req, state).await;
            }
        }

        // No registered route matched — page fallback for GET.
        if method == Method::GET {
            if let Some(page_response) = self.try_serve_page(&path)? {
                return Ok(page_response);
            }
        }

        deliver_error_json("Not found", StatusCode::NOT_FOUND)
            .context("Failed to deliver 404 response")
    }

    // ── Path matching ─────────────────────────────────────────────────────────

    pub fn path_matches(route_path: &str, request_path: &str) -> bool {
        // Strip query string from the incoming path before comparing.
        let clean = request_path.split('?').next().unwrap_or(request_path);
        route_path == clean
    }

    // ── Page fallback ─────────────────────────────────────────────────────────
    //
    // The panel ships two HTML shells; the gate has already decided who may
    // see them by the time this runs.

    fn try_serve_page(
        &self,
        path: &str,
    ) -> Result<Option<Response<BoxBody<Bytes, Infallible>>>> {
        let Some(web_dir) = self.web_dir.as_ref() else {
            return Ok(None);
        };
        let web_dir = web_dir.trim_end_matches('/');

        // Delivered paths must stay inside web_dir.
        if path.contains("..") {
            return Ok(None);
        }

        match path {
            "/" => Ok(Some(
                deliver_redirect("/login").context("Failed to deliver root redirect")?,
            )),

            "/login" => Ok(Some(
                deliver_html_page(format!("{}/login.html", web_dir))
                    .context("Failed to deliver login page")?,
            )),

            path if path == "/dashboard" || path.starts_with("/dashboard/") => Ok(Some(
                deliver_html_page(format!("{}/dashboard.html", web_dir))
                    .context("Failed to deliver dashboard page")?,
            )),

            path if path.starts_with("/static/") => Ok(Some(
                deliver_html_page(format!("{}{}", web_dir, path))
                    .context("Failed to deliver static file")?,
            )),

            _ => Ok(None),
        }
    }
}

// ---------------------------------------------------------------------------
// Route table
//
// Auth is layered: the gate screens every request first, and every
// protected handler still calls require_admin itself. Only /api/auth/login
// and /health are intentionally reachable without a session.
// ---------------------------------------------------------------------------

pub fn build_router(web_dir: Option<String>) -> Router {
    let mut router = Router::new();
    if let Some(dir) = web_dir {
        router = router.with_web_dir(dir);
    }

    router
        // ── Auth ─────────────────────────────────────────────────────────────
        .post("/api/auth/login", |req, state| async move {
            auth::handle_login(req, state).await.context("Login failed")
        })
        .post("/api/auth/logout", |req, state| async move {
            auth::handle_logout(req, state)
                .await
                .context("Logout failed")
        })
        // ── Admin data ───────────────────────────────────────────────────────
        .get("/api/users", |req, state| async move {
            admin::handle_list_users(req, state)
                .await
                .context("User list failed")
        })
        .get("/api/tickets", |req, state| async move {
            admin::handle_list_tickets(req, state)
                .await
                .context("Ticket list failed")
        })
        .post("/api/tickets", |req, state| async move {
            admin::handle_create_ticket(req, state)
                .await
                .context("Ticket creation failed")
        })
        // ── Files ────────────────────────────────────────────────────────────
        .get("/api/file", |req, state| async move {
            files::handle_file_proxy(req, state)
                .await
                .context("File proxy failed")
        })
        .post("/api/upload", |req, state| async move {
            files::handle_upload(req, state)
                .await
                .context("Upload failed")
        })
        // ── Liveness ─────────────────────────────────────────────────────────
        .get("/health", |_req, _state| async move {
            Ok(Response::builder()
                .status(StatusCode::OK)
                .header("content-type", "application/json")
                .body(full(Bytes::from(
                    r#"{"status":"success","health":"ok"}"#,
                )))
                .context("Failed to build health response")?)
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_path_matches() {
        assert!(Router::path_matches("/api/users", "/api/users"));
    }

    #[test]
    fn different_paths_do_not_match() {
        assert!(!Router::path_matches("/api/users", "/api/tickets"));
    }

    #[test]
    fn trailing_slash_does_not_match_without_slash() {
        assert!(!Router::path_matches("/api/users", "/api/users/"));
    }

    #[test]
    fn root_path_matches_self() {
        assert!(Router::path_matches("/", "/"));
    }

    #[test]
    fn query_string_stripped_before_match() {
        assert!(Router::path_matches(
            "/api/file",
            "/api/file?key=123-report.pdf"
        ));
    }

    #[test]
    fn router_new_has_no_routes() {
        let r = Router::new();
        assert!(r.routes.is_empty());
    }

    #[test]
    fn router_with_web_dir_sets_field() {
        let r = Router::new().with_web_dir("/var/www".to_string());
        assert_eq!(r.web_dir.as_deref(), Some("/var/www"));
    }

    #[test]
    fn router_registers_get_and_post() {
        let r = Router::new()
            .get("/ping", |_req, _state| async move {
                Ok(Response::builder()
                    .status(StatusCode::OK)
                    .body(full(Bytes::from("pong")))
                    .unwrap())
            })
            .post("/ping", |_req, _state| async move {
                Ok(Response::builder()
                    .status(StatusCode::OK)
                    .body(full(Bytes::from("pong")))
                    .unwrap())
            });
        assert_eq!(r.routes.len(), 2);
        assert_eq!(r.routes[0].method, Method::GET);
        assert_eq!(r.routes[1].method, Method::POST);
        assert_eq!(r.routes[0].path, "/ping");
    }

    #[test]
    fn build_router_covers_the_api_surface() {
        let r = build_router(None);
        let registered: Vec<(&Method, &str)> = r
            .routes
            .iter()
            .map(|route| (&route.method, route.path.as_str()))
            .collect();

        for expected in [
            (&Method::POST, "/api/auth/login"),
            (&Method::POST, "/api/auth/logout"),
            (&Method::GET, "/api/users"),
            (&Method::GET, "/api/tickets"),
            (&Method::POST, "/api/tickets"),
            (&Method::GET, "/api/file"),
            (&Method::POST, "/api/upload"),
            (&Method::GET, "/health"),
        ] {
            assert!(
                registered.contains(&expected),
                "missing route: {} {}",
                expected.0,
                expected.1
            );
        }
    }

    #[test]
    fn page_fallback_requires_a_web_dir() {
        let r = Router::new();
        assert!(r.try_serve_page("/login").unwrap().is_none());
    }

    #[test]
    fn unknown_paths_fall_through_page_delivery() {
        let r = Router::new().with_web_dir("/nonexistent".to_string());
        assert!(r.try_serve_page("/no-such-page").unwrap().is_none());
    }

    #[test]
    fn parent_traversal_is_not_served() {
        let r = Router::new().with_web_dir("/var/www".to_string());
        assert!(
            r.try_serve_page("/static/../../etc/passwd")
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn root_redirects_to_login() {
        let r = Router::new().with_web_dir("/nonexistent".to_string());
        let response = r.try_serve_page("/").unwrap().unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()["location"].to_str().unwrap(), "/login");
    }
}
