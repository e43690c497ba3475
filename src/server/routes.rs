//! Route handlers.

use axum::extract::State;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE, HOST};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Response};
use quick_xml::escape::escape;

use super::AppState;
use crate::pipeline::{self, PipelineError};

/// `GET /alerts.txt`: a freshly generated placefile.
pub async fn alerts(State(state): State<AppState>) -> Result<Response, PipelineError> {
    let body = pipeline::generate(&state.fetcher).await?;
    let cache_control = format!("public, max-age={}", state.cache_max_age_secs);

    Ok((
        [
            (CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (CACHE_CONTROL, cache_control),
        ],
        body,
    )
        .into_response())
}

/// `GET /`: instructions for adding the placefile to a radar viewer.
pub async fn index(headers: HeaderMap) -> Html<String> {
    let host = headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .filter(|proto| *proto == "https")
        .unwrap_or("http");

    Html(instructions_page(&format!("{scheme}://{host}/alerts.txt")))
}

fn instructions_page(placefile_url: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Weather Alerts Placefile</title>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 20px; background: #f0f0f0; }}
        .container {{ max-width: 800px; margin: 0 auto; background: white; padding: 20px; border-radius: 8px; }}
        h1 {{ color: #d32f2f; }}
        .alert {{ padding: 10px; background: #ffebee; border-left: 4px solid #d32f2f; margin: 10px 0; }}
        code {{ background: #f5f5f5; padding: 2px 6px; border-radius: 4px; }}
    </style>
</head>
<body>
    <div class="container">
        <h1>NWS Weather Alerts Placefile</h1>
        <div class="alert">
            <h3>Placefile URL:</h3>
            <code>{url}</code>
        </div>
        <h3>Instructions:</h3>
        <ol>
            <li>Open your radar viewer</li>
            <li>Go to Views &gt; Overlays</li>
            <li>Click Add</li>
            <li>Enter the URL above</li>
            <li>Click OK</li>
        </ol>
        <h3>Features:</h3>
        <ul>
            <li>Active NWS weather alerts</li>
            <li>Refreshes every 2 minutes</li>
            <li>Warning polygons with labelled centers</li>
            <li>Alert icons at point locations</li>
        </ul>
    </div>
</body>
</html>
"#,
        url = escape(placefile_url)
    )
}
