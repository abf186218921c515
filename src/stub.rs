//! In-process stand-in for the prediction service, used by tests.

use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};

/// What the stub answers to every request.
#[derive(Debug, Clone)]
pub enum StubReply {
    /// 200 with this raw JSON body
    Json(String),
    /// Given status with a plain-text body
    Status(u16, String),
}

#[derive(Clone)]
struct StubState {
    reply: Arc<Mutex<StubReply>>,
    received: Arc<Mutex<Vec<serde_json::Value>>>,
}

/// A running stub bound to an ephemeral localhost port.
pub struct StubService {
    addr: std::net::SocketAddr,
    state: StubState,
}

impl StubService {
    pub async fn start(reply: StubReply) -> Self {
        let state = StubState {
            reply: Arc::new(Mutex::new(reply)),
            received: Arc::new(Mutex::new(Vec::new())),
        };

        let app = Router::new()
            .route("/api/predict", post(predict_handler))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state }
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}/api/predict", self.addr)
    }

    /// Swap the reply used for subsequent requests.
    pub fn set_reply(&self, reply: StubReply) {
        *self.state.reply.lock().unwrap() = reply;
    }

    /// JSON bodies received so far, in arrival order.
    pub fn received(&self) -> Vec<serde_json::Value> {
        self.state.received.lock().unwrap().clone()
    }
}

async fn predict_handler(
    State(state): State<StubState>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    state.received.lock().unwrap().push(body);
    let reply = state.reply.lock().unwrap().clone();

    match reply {
        StubReply::Json(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        StubReply::Status(code, body) => {
            let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, body).into_response()
        }
    }
}
