use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::{TokioIo, TokioTimer};
use tokio::net::TcpListener;

// Error tracing
use anyhow::{Context, Result};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use server::AppState;
use server::handlers::http::routes::{Router, build_router};
use server::handlers::http::utils::deliver_error_json;
use server::session::{Screen, screen};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path =
        std::env::var("ADMIN_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let config = shared::config::load_config(&config_path)?;

    let addr: SocketAddr = config
        .server
        .addr()
        .parse()
        .context(format!("Invalid bind address {}", config.server.addr()))?;

    let router = Arc::new(build_router(Some(config.paths.web_dir.clone())));
    let state = AppState::from_config(config);

    info!("Admin panel listening on http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind to {}", addr))?;

    loop {
        let (stream, _) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("Failed to accept connection: {}", e);
                continue;
            }
        };

        let io = TokioIo::new(stream);
        let state = state.clone();
        let router = router.clone();

        tokio::task::spawn(async move {
            let service = service_fn(move |req| {
                let state = state.clone();
                let router = router.clone();
                async move { handle_request(req, state, router).await }
            });

            // Handle the connection using HTTP1 and pass every request on
            // it through the gate, then the router.
            if let Err(err) = http1::Builder::new()
                .timer(TokioTimer::new())
                .serve_connection(io, service)
                .await
            {
                warn!("Error serving connection: {:?}", err);
            }
        });
    }
}

/// Per-request pipeline: gate first, then the route table.
///
/// Handler errors that escape this far are genuine backend failures —
/// they are logged in full and answered with a generic 500. Token
/// verification never errors out of the gate; it only yields "no
/// session".
async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: AppState,
    router: Arc<Router>,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    match screen(&req, &state)? {
        Screen::Respond(response) => Ok(response),
        Screen::Continue => match router.route(req, state).await {
            Ok(response) => Ok(response),
            Err(err) => {
                error!("Handler error: {:#}", err);
                deliver_error_json("Internal server error", StatusCode::INTERNAL_SERVER_ERROR)
            }
        },
    }
}
