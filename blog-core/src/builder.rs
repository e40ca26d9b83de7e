use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tracing::info;

/// Builder for assembling the application router.
///
/// Collects the state, route groups and cross-cutting layers, then produces
/// an `axum::Router` (or starts serving directly) with everything wired
/// together. Layers are applied in a fixed order regardless of call order:
/// tracing outermost, then CORS, then panic recovery.
pub struct AppBuilder<S: Clone + Send + Sync + 'static> {
    state: S,
    routes: Vec<Router<S>>,
    health: bool,
    normalize_path: bool,
    cors: Option<CorsLayer>,
    trace: bool,
    catch_panic: bool,
}

impl<S: Clone + Send + Sync + 'static> AppBuilder<S> {
    pub fn new(state: S) -> Self {
        Self {
            state,
            routes: Vec::new(),
            health: false,
            normalize_path: false,
            cors: None,
            trace: false,
            catch_panic: false,
        }
    }

    /// Merge a group of routes into the application.
    pub fn routes(mut self, routes: Router<S>) -> Self {
        self.routes.push(routes);
        self
    }

    /// Serve `GET /health` with `{ "status": "UP" }`.
    pub fn with_health(mut self) -> Self {
        self.health = true;
        self
    }

    pub fn with_cors(mut self, layer: CorsLayer) -> Self {
        self.cors = Some(layer);
        self
    }

    /// Log every request and response through `tower_http`'s `TraceLayer`.
    pub fn with_tracing(mut self) -> Self {
        self.trace = true;
        self
    }

    /// Convert handler panics into JSON 500 responses.
    pub fn with_error_handling(mut self) -> Self {
        self.catch_panic = true;
        self
    }

    /// Accept trailing slashes: `/articles/` is dispatched as `/articles`.
    pub fn normalize_path(mut self) -> Self {
        self.normalize_path = true;
        self
    }

    /// Assemble the final `axum::Router`.
    pub fn build(self) -> Router {
        let mut router = Router::new();
        for r in self.routes {
            router = router.merge(r);
        }
        if self.health {
            router = router.route("/health", get(health_handler));
        }

        let mut app = router.with_state(self.state);

        // When no route matches and the path has a trailing slash, strip it
        // and re-dispatch to the same router.
        if self.normalize_path {
            let inner = app.clone();
            app = app.fallback(move |req: Request| {
                let inner = inner.clone();
                async move {
                    let path = req.uri().path();
                    if path.len() <= 1 || !path.ends_with('/') {
                        return StatusCode::NOT_FOUND.into_response();
                    }
                    let trimmed = path.trim_end_matches('/');
                    let trimmed = if trimmed.is_empty() { "/" } else { trimmed };
                    let new_uri = match req.uri().query() {
                        Some(q) => format!("{trimmed}?{q}"),
                        None => trimmed.to_string(),
                    };
                    let (mut parts, body) = req.into_parts();
                    parts.uri = new_uri.parse().unwrap_or(parts.uri);
                    match tower::ServiceExt::oneshot(inner, Request::from_parts(parts, body)).await {
                        Ok(resp) => resp,
                        Err(infallible) => match infallible {},
                    }
                }
            });
        }

        if self.catch_panic {
            app = app.layer(crate::layers::catch_panic_layer());
        }
        if let Some(cors) = self.cors {
            app = app.layer(cors);
        }
        if self.trace {
            app = app.layer(crate::layers::default_trace());
        }
        app
    }

    /// Build the application and serve it on `addr` until Ctrl-C or SIGTERM.
    pub async fn serve(self, addr: &str) -> Result<(), std::io::Error> {
        let app = self.build();
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(%addr, "blog server listening");
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        info!("blog server stopped");
        Ok(())
    }
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "UP" }))
}

/// Wait for a shutdown signal (Ctrl-C or SIGTERM on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
