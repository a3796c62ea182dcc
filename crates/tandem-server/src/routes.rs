//! HTTP routes for the tandem server.

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tandem_core::Pipeline;
use tower_http::cors::CorsLayer;

use crate::error::ServerResult;

/// Application state shared across handlers.
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

/// Body of `POST /api/compile`.
#[derive(Debug, Deserialize)]
pub struct CompileBody {
    pub source: String,
}

/// Create the router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/api/compile", post(compile_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Editor page: a source box and a button that downloads the result.
async fn index_handler() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Tandem</title>
    <style>
        body { font-family: system-ui, sans-serif; margin: 2rem; }
        textarea { width: 100%; height: 20rem; font-family: monospace; }
        pre { background: #f3f4f6; padding: 1rem; border-radius: 0.5rem; }
        .error { color: #b91c1c; }
    </style>
</head>
<body>
    <h1>Tandem</h1>
    <textarea id="source">public class Hello {
    public static void main(String[] args) {
        System.out.println("Hello, world!");
    }
}</textarea>
    <p><button id="compile">Compile</button> <a id="download" hidden>Download</a></p>
    <pre id="log"></pre>
    <script>
        const log = document.getElementById('log');
        const link = document.getElementById('download');
        document.getElementById('compile').onclick = async () => {
            log.textContent = 'Compiling...';
            link.hidden = true;
            const response = await fetch('/api/compile', {
                method: 'POST',
                headers: { 'Content-Type': 'application/json' },
                body: JSON.stringify({ source: document.getElementById('source').value }),
            });
            if (response.ok) {
                const name = /filename="([^"]+)"/.exec(response.headers.get('Content-Disposition'));
                link.href = URL.createObjectURL(await response.blob());
                link.download = name ? name[1] : 'classes.js';
                link.hidden = false;
                log.textContent = 'Done.';
                return;
            }
            const body = await response.json();
            log.innerHTML = '';
            for (const d of body.diagnostics) {
                const line = document.createElement('div');
                line.className = d.severity;
                const at = d.location ? ` (${d.location.file}:${d.location.line})` : '';
                line.textContent = `${d.severity}[${d.origin}]: ${d.message}${at}`;
                log.appendChild(line);
            }
        };
    </script>
</body>
</html>"#,
    )
}

/// Health check handler.
async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Run the pipeline on the submitted source.
///
/// Success answers with the artifact as an attachment. A compile or
/// transpile failure answers 422 with the merged diagnostics. A run already
/// in progress answers 409.
async fn compile_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CompileBody>,
) -> ServerResult<Response> {
    let result = state.pipeline.try_run(&body.source).await?;

    if !result.success {
        tracing::debug!(
            "Compile request failed with {} diagnostics",
            result.diagnostics.len()
        );
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, Json(result)).into_response());
    }

    let artifact = result.into_artifact()?;
    let headers = [
        (header::CONTENT_TYPE, "application/octet-stream".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", artifact.file_name),
        ),
    ];
    Ok((headers, artifact.bytes).into_response())
}
