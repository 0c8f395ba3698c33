pub mod booking_api;
pub mod menu_api;
pub mod order_api;
pub mod profile_api;

use reqwest::{header::CONTENT_TYPE, Client, Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::time::Instant;

use crate::{constants::INIT_DATA_HEADER, errors::ApiError};

pub const NO_PARAMS: &[(&str, &str)] = &[];

/// Thin JSON client for the restaurant backend. Every request carries the
/// WebApp init payload so the backend can identify the user.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    init_data: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, init_data: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url, init_data)
    }

    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        init_data: impl Into<String>,
    ) -> Self {
        ApiClient {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            init_data: init_data.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn init_data(&self) -> &str {
        &self.init_data
    }

    pub fn set_init_data(&mut self, init_data: impl Into<String>) {
        self.init_data = init_data.into();
    }

    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        self.client
            .request(method, self.url(endpoint))
            .header(CONTENT_TYPE, "application/json")
            .header(INIT_DATA_HEADER, self.init_data.as_str())
    }

    pub async fn get<Q>(&self, endpoint: &str, params: &Q) -> Result<Value, ApiError>
    where
        Q: Serialize + ?Sized,
    {
        self.send(endpoint, self.request(Method::GET, endpoint).query(params))
            .await
    }

    pub async fn post<B>(&self, endpoint: &str, body: &B) -> Result<Value, ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.send(endpoint, self.request(Method::POST, endpoint).json(body))
            .await
    }

    pub async fn put<B>(&self, endpoint: &str, body: &B) -> Result<Value, ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.send(endpoint, self.request(Method::PUT, endpoint).json(body))
            .await
    }

    /// The body is only attached when there is something in it.
    pub async fn delete(&self, endpoint: &str, body: Option<&Value>) -> Result<Value, ApiError> {
        let mut req = self.request(Method::DELETE, endpoint);
        if let Some(body) = body.filter(|b| !is_empty_body(b)) {
            req = req.json(body);
        }
        self.send(endpoint, req).await
    }

    async fn send(&self, endpoint: &str, req: RequestBuilder) -> Result<Value, ApiError> {
        let now = Instant::now();
        let resp = req.send().await.inspect_err(|e| {
            log::error!("{} unreachable: {}", endpoint, e);
        })?;
        let status = resp.status();
        let bytes = resp.bytes().await?;
        log::debug!("{} -> {}: {:.2?}", endpoint, status.as_u16(), now.elapsed());

        into_result(status, &bytes)
    }
}

fn is_empty_body(body: &Value) -> bool {
    match body {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Maps a raw response onto the JSON value or an `ApiError::Http` carrying the
/// server's message (`message`, or a string `detail`).
pub(crate) fn into_result(status: StatusCode, body: &[u8]) -> Result<Value, ApiError> {
    if !status.is_success() {
        let message = serde_json::from_slice::<Value>(body)
            .ok()
            .as_ref()
            .and_then(server_message)
            .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));

        return Err(ApiError::Http {
            status: status.as_u16(),
            message,
        });
    }

    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }

    Ok(serde_json::from_slice(body)?)
}

fn server_message(body: &Value) -> Option<String> {
    ["message", "detail"].into_iter().find_map(|key| {
        body.get(key)?
            .as_str()
            .filter(|msg| !msg.is_empty())
            .map(str::to_string)
    })
}

/// List endpoints are expected to answer with a bare array. Anything else is
/// treated as "nothing there" instead of an error.
pub fn list_or_empty<T: DeserializeOwned>(endpoint: &str, value: Value) -> Result<Vec<T>, ApiError> {
    match value {
        Value::Array(_) => Ok(serde_json::from_value(value)?),
        other => {
            log::warn!(
                "{} did not return a list ({}), using empty list",
                endpoint,
                json_kind(&other)
            );
            Ok(Vec::new())
        }
    }
}

/// for write endpoints whose answer is informational only
pub(crate) fn decode_or_default<T>(endpoint: &str, value: Value) -> T
where
    T: DeserializeOwned + Default,
{
    if value.is_null() {
        return T::default();
    }
    serde_json::from_value(value).unwrap_or_else(|e| {
        log::warn!("{} returned an unexpected body: {}", endpoint, e);
        T::default()
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
