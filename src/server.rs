//! Web server for the cyclone-impact UI.
//!
//! Serves a single form page using:
//! - Axum for HTTP server
//! - HTMX for field updates and result swaps without hand-written JavaScript
//!
//! All form state lives server-side in one [`FormController`]. The page
//! posts each field edit as it happens and swaps the results fragment in
//! after a prediction completes.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    Form, Router,
    extract::State,
    http::StatusCode,
    response::Html,
    routing::{get, post},
};
use serde::Deserialize;

use crate::client::PredictClient;
use crate::form::{ErrorPolicy, FormController, SubmitOutcome};
use crate::table::{escape_html, render_html};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub error_policy: ErrorPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            error_policy: ErrorPolicy::Visible,
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Form fields and current results
    form: Arc<Mutex<FormController>>,
    /// Prediction service client
    client: PredictClient,
}

impl AppState {
    #[must_use]
    pub fn new(client: PredictClient, config: &ServerConfig) -> Self {
        Self {
            form: Arc::new(Mutex::new(FormController::new(config.error_policy))),
            client,
        }
    }

    /// Lock the form. Never hold the guard across an `.await`.
    fn form(&self) -> MutexGuard<'_, FormController> {
        self.form.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Form-encoded body of a single field update.
#[derive(Debug, Deserialize)]
struct FieldUpdate {
    #[serde(default)]
    value: String,
}

/// Create the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/form/latitude", post(latitude_handler))
        .route("/form/longitude", post(longitude_handler))
        .route("/predict", post(predict_handler))
        .route("/results", get(results_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Start the web server.
pub async fn run_server(config: ServerConfig, client: PredictClient) -> anyhow::Result<()> {
    tracing::info!("forwarding predictions to {}", client.endpoint());
    let state = AppState::new(client, &config);
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("🌀 cyclone-impact UI starting at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Render the results slot: an optional error banner, a last-updated
/// note, and the table. Renders nothing when there is nothing to show.
fn render_results(form: &FormController) -> String {
    let mut html = String::new();

    if let Some(reason) = form.last_error() {
        html.push_str(&format!(
            "<div class=\"error\" role=\"alert\">Prediction failed: {}. Showing previous results.</div>\n",
            escape_html(reason)
        ));
    }

    let table = render_html(form.results());
    if !table.is_empty() {
        if let Some(updated) = form.last_updated() {
            html.push_str(&format!(
                "<p class=\"updated\">Updated {} UTC</p>\n",
                updated.format("%Y-%m-%d %H:%M:%S")
            ));
        }
        html.push_str(&table);
    }

    html
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Main page handler, pre-filled with the current form state.
async fn index_handler(State(state): State<AppState>) -> Html<String> {
    let form = state.form();
    Html(
        INDEX_HTML
            .replace("__LATITUDE__", &escape_html(form.latitude()))
            .replace("__LONGITUDE__", &escape_html(form.longitude()))
            .replace("__RESULTS__", &render_results(&form)),
    )
}

async fn latitude_handler(
    State(state): State<AppState>,
    Form(update): Form<FieldUpdate>,
) -> StatusCode {
    state.form().set_latitude(update.value);
    StatusCode::NO_CONTENT
}

async fn longitude_handler(
    State(state): State<AppState>,
    Form(update): Form<FieldUpdate>,
) -> StatusCode {
    state.form().set_longitude(update.value);
    StatusCode::NO_CONTENT
}

/// Run one prediction and return the refreshed results fragment.
async fn predict_handler(State(state): State<AppState>) -> Html<String> {
    let submission = state.form().begin_submit();

    let response = state.client.predict(&submission.request).await;

    let mut form = state.form();
    if form.complete(submission.id, response) == SubmitOutcome::Stale {
        tracing::debug!("a newer prediction superseded this one");
    }
    Html(render_results(&form))
}

async fn results_handler(State(state): State<AppState>) -> Html<String> {
    Html(render_results(&state.form()))
}

/// Health check endpoint.
async fn health_handler() -> &'static str {
    "OK"
}

// ============================================================================
// HTML Template (embedded for single-binary deployment)
// ============================================================================

const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Vizag Cyclone Impact Predictor</title>

    <!-- HTMX -->
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>

    <style>
        body { font-family: system-ui, sans-serif; padding: 2rem; }
        input { display: block; margin-bottom: 0.5rem; }
        .locality-table { margin-top: 1rem; width: 100%; border-collapse: collapse; }
        .locality-table th, .locality-table td { border: 1px solid #999; padding: 0.25rem 0.5rem; text-align: left; }
        .locality-table td.impact { font-variant-numeric: tabular-nums; }
        .error { margin-top: 1rem; padding: 0.5rem; background: #fdecea; color: #8a1c1c; }
        .updated { color: #666; font-size: 0.85rem; }
        .htmx-request .spinner { display: inline; }
        .spinner { display: none; }
    </style>
</head>
<body>
    <h2>Vizag Cyclone Impact Predictor</h2>

    <div id="predict-form">
        <input type="number" step="0.0001" name="value" placeholder="Cyclone Lat"
               value="__LATITUDE__"
               hx-post="/form/latitude" hx-trigger="input" hx-swap="none"
               hx-sync="#predict-form:queue all">
        <input type="number" step="0.0001" name="value" placeholder="Cyclone Lon"
               value="__LONGITUDE__"
               hx-post="/form/longitude" hx-trigger="input" hx-swap="none"
               hx-sync="#predict-form:queue all">
        <button hx-post="/predict" hx-target="#results" hx-swap="innerHTML"
                hx-sync="#predict-form:queue all">
            Predict <span class="spinner">…</span>
        </button>
    </div>

    <div id="results">
__RESULTS__
    </div>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientConfig;
    use crate::stub::{StubReply, StubService};

    const GAJUWAKA_BODY: &str =
        r#"[{"name":"Gajuwaka","impact":7.891},{"name":"MVP Colony","impact":3.2}]"#;

    /// Start the UI against `stub`; returns its base URL.
    async fn start_ui(stub: &StubService, error_policy: ErrorPolicy) -> String {
        let client = PredictClient::new(&ClientConfig {
            endpoint: stub.endpoint(),
            ..ClientConfig::default()
        })
        .unwrap();
        let config = ServerConfig {
            error_policy,
            ..ServerConfig::default()
        };
        let app = create_router(AppState::new(client, &config));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{addr}")
    }

    async fn set_field(http: &reqwest::Client, base: &str, field: &str, value: &str) {
        let status = http
            .post(format!("{base}/form/{field}"))
            .form(&[("value", value)])
            .send()
            .await
            .unwrap()
            .status();
        assert_eq!(status, reqwest::StatusCode::NO_CONTENT);
    }

    async fn predict(http: &reqwest::Client, base: &str) -> String {
        http.post(format!("{base}/predict"))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_predict_renders_rows_from_form_fields() {
        let stub = StubService::start(StubReply::Json(GAJUWAKA_BODY.into())).await;
        let base = start_ui(&stub, ErrorPolicy::Visible).await;
        let http = reqwest::Client::new();

        set_field(&http, &base, "latitude", "17.6868").await;
        set_field(&http, &base, "longitude", "83.2185").await;
        let fragment = predict(&http, &base).await;

        assert_eq!(
            stub.received(),
            vec![serde_json::json!({ "lat": "17.6868", "lon": "83.2185" })]
        );
        assert!(fragment.contains("<tr><td>Gajuwaka</td><td class=\"impact\">7.89</td></tr>"));
        assert!(fragment.contains("<tr><td>MVP Colony</td><td class=\"impact\">3.20</td></tr>"));
    }

    #[tokio::test]
    async fn test_empty_results_render_nothing() {
        let stub = StubService::start(StubReply::Json("[]".into())).await;
        let base = start_ui(&stub, ErrorPolicy::Visible).await;
        let http = reqwest::Client::new();

        let fragment = predict(&http, &base).await;
        assert_eq!(fragment, "");
    }

    #[tokio::test]
    async fn test_visible_failure_keeps_previous_rows() {
        let stub = StubService::start(StubReply::Json(GAJUWAKA_BODY.into())).await;
        let base = start_ui(&stub, ErrorPolicy::Visible).await;
        let http = reqwest::Client::new();
        predict(&http, &base).await;

        stub.set_reply(StubReply::Status(500, "boom".into()));
        let fragment = predict(&http, &base).await;

        assert!(fragment.contains("role=\"alert\""));
        assert!(fragment.contains("HTTP 500"));
        assert!(fragment.contains("Gajuwaka"));
    }

    #[tokio::test]
    async fn test_silent_failure_shows_no_error() {
        let stub = StubService::start(StubReply::Json(GAJUWAKA_BODY.into())).await;
        let base = start_ui(&stub, ErrorPolicy::Silent).await;
        let http = reqwest::Client::new();
        let before = predict(&http, &base).await;

        stub.set_reply(StubReply::Status(500, "boom".into()));
        let after = predict(&http, &base).await;

        assert!(!after.contains("role=\"alert\""));
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_index_prefills_fields() {
        let stub = StubService::start(StubReply::Json("[]".into())).await;
        let base = start_ui(&stub, ErrorPolicy::Visible).await;
        let http = reqwest::Client::new();

        set_field(&http, &base, "latitude", "17.6868").await;
        let page = http.get(&base).send().await.unwrap().text().await.unwrap();

        assert!(page.contains(r#"value="17.6868""#));
        assert!(page.contains(r#"value="""#));
        assert!(!page.contains("__RESULTS__"));
    }

    #[tokio::test]
    async fn test_health() {
        let stub = StubService::start(StubReply::Json("[]".into())).await;
        let base = start_ui(&stub, ErrorPolicy::Visible).await;
        let body = reqwest::get(format!("{base}/health"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "OK");
    }
}
