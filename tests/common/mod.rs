#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    Router,
};
use serde_json::Value;
use unicorn_telegram_rs::{constants::INIT_DATA_HEADER, data_backend::ApiClient};

/// one request as the backend saw it
#[derive(Debug, Clone)]
pub struct Hit {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub init_data: Option<String>,
    pub body: Option<Value>,
}

#[derive(Clone, Default)]
struct Backend {
    routes: Arc<HashMap<(Method, String), (StatusCode, Value)>>,
    hits: Arc<Mutex<Vec<Hit>>>,
}

/// Canned JSON backend on an ephemeral port. Unknown routes answer 404.
pub struct MockBackend {
    pub base_url: String,
    hits: Arc<Mutex<Vec<Hit>>>,
}

impl MockBackend {
    pub async fn start(routes: Vec<(Method, &str, StatusCode, Value)>) -> MockBackend {
        let backend = Backend {
            routes: Arc::new(
                routes
                    .into_iter()
                    .map(|(method, path, status, body)| ((method, path.to_string()), (status, body)))
                    .collect(),
            ),
            hits: Arc::default(),
        };
        let hits = backend.hits.clone();

        let app = Router::new().fallback(answer).with_state(backend);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockBackend {
            base_url: format!("http://{}", addr),
            hits,
        }
    }

    pub fn client(&self, init_data: &str) -> ApiClient {
        ApiClient::new(&self.base_url, init_data)
    }

    pub fn hits(&self) -> Vec<Hit> {
        self.hits.lock().unwrap().clone()
    }

    pub fn hits_on(&self, method: Method, path: &str) -> usize {
        self.hits()
            .iter()
            .filter(|hit| hit.method == method && hit.path == path)
            .count()
    }
}

async fn answer(
    State(backend): State<Backend>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    backend.hits.lock().unwrap().push(Hit {
        method: method.clone(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        init_data: headers
            .get(INIT_DATA_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_slice(&body).ok(),
    });

    match backend.routes.get(&(method, uri.path().to_string())) {
        Some((status, Value::Null)) => (*status, String::new()),
        Some((status, body)) => (*status, body.to_string()),
        None => (StatusCode::NOT_FOUND, r#"{"detail":"Not Found"}"#.to_string()),
    }
}
