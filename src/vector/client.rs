use crate::vector::config::ConnectionConfig;
use crate::vector::schema::ApiError;
use crate::vector::{VectorizeError, VectorizeResult};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("vectorize-rs/", env!("CARGO_PKG_VERSION"));

/// Issues authenticated requests against the Vectorize v2 API.
///
/// Holds nothing but the HTTP transport. Credentials travel with every call, and
/// timeouts or retries are whatever the supplied `reqwest::Client` does.
#[derive(Debug, Clone)]
pub struct VectorizeClient {
    http: Client,
}

/// Service reply in its documented envelope form.
#[derive(Debug, Default)]
struct Envelope {
    success: bool,
    // `Some(Value::Null)` for an explicit `"result": null`, `None` when the field is absent.
    result: Option<Value>,
    detail: FailureDetail,
}

/// A parsed body is the envelope when it carries a boolean `success`, the bare payload otherwise.
#[derive(Debug)]
enum ResponseBody {
    Envelope(Envelope),
    Raw(Value),
}

/// Whatever a body says about a failure: `errors`, then `message`/`error`, then `messages`.
#[derive(Debug, Default)]
struct FailureDetail {
    errors: Vec<ApiError>,
    message: Option<String>,
    messages: Vec<String>,
}

impl ResponseBody {
    fn parse(text: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(text).ok()?;
        let success = value.get("success").and_then(Value::as_bool);
        match (success, value) {
            (Some(success), Value::Object(mut map)) => Some(ResponseBody::Envelope(Envelope {
                success,
                result: map.remove("result"),
                detail: FailureDetail::from_map(&map),
            })),
            (_, value) => Some(ResponseBody::Raw(value)),
        }
    }
}

impl FailureDetail {
    fn from_map(map: &Map<String, Value>) -> Self {
        let errors = match map.get("errors") {
            Some(Value::Array(entries)) => entries.iter().map(api_error).collect(),
            _ => Vec::new(),
        };
        let message = ["message", "error"]
            .iter()
            .filter_map(|key| map.get(*key).and_then(Value::as_str))
            .map(str::trim)
            .find(|m| !m.is_empty())
            .map(String::from);
        let messages = match map.get("messages") {
            Some(Value::Array(entries)) => entries.iter().filter_map(message_text).collect(),
            Some(other) => message_text(other).into_iter().collect(),
            None => Vec::new(),
        };
        Self {
            errors,
            message,
            messages,
        }
    }

    fn describe(&self) -> Option<String> {
        if !self.errors.is_empty() {
            return Some(join_error_messages(&self.errors));
        }
        if let Some(message) = &self.message {
            return Some(message.clone());
        }
        if !self.messages.is_empty() {
            return Some(self.messages.join("; "));
        }
        None
    }
}

// Error entries are usually `{code, message}` objects but some gateways send plain strings.
fn api_error(entry: &Value) -> ApiError {
    match entry {
        Value::String(message) => ApiError {
            code: 0,
            message: message.clone(),
            details: None,
        },
        other => serde_json::from_value(other.clone()).unwrap_or_else(|_| ApiError {
            code: 0,
            message: other.to_string(),
            details: None,
        }),
    }
}

fn message_text(entry: &Value) -> Option<String> {
    match entry {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .map(String::from)
            .or_else(|| Some(entry.to_string())),
        other => Some(other.to_string()),
    }
}

impl VectorizeClient {
    /// Builds a client over a default `reqwest::Client` (no request timeout).
    pub fn new() -> VectorizeResult<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| VectorizeError::Transport {
                endpoint: String::new(),
                status: None,
                message: format!("Failed to create HTTP client: {}", e),
                source: Some(e),
            })?;
        Ok(Self { http })
    }

    pub fn with_http_client(http: Client) -> Self {
        Self { http }
    }

    /// Sends one request to `{api_endpoint}/accounts/{account_id}/vectorize/v2/{endpoint}`
    /// and maps the reply into `T` or a `VectorizeError`.
    pub async fn execute<T>(
        &self,
        config: &ConnectionConfig,
        endpoint: &str,
        method: Method,
        body: Option<Value>,
    ) -> VectorizeResult<T>
    where
        T: DeserializeOwned,
    {
        config.validate()?;
        let url = config.endpoint_url(endpoint);

        debug!(method = method.as_str(), endpoint = endpoint, "Sending Vectorize request");

        let mut request = self
            .http
            .request(method, url)
            .header(AUTHORIZATION, config.bearer())
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body.as_ref() {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            let message = describe_transport_failure(&e);
            warn!(endpoint = endpoint, error = %message, "Vectorize request failed");
            VectorizeError::Transport {
                endpoint: endpoint.to_string(),
                status: e.status().map(|s| s.as_u16()),
                message,
                source: Some(e),
            }
        })?;

        let status = response.status();
        debug!(endpoint = endpoint, status = status.as_u16(), "Vectorize response received");

        let text = response.text().await.map_err(|e| VectorizeError::Transport {
            endpoint: endpoint.to_string(),
            status: Some(status.as_u16()),
            message: format!("Failed to read response body: {}", e),
            source: Some(e),
        })?;

        let outcome = if status.is_success() {
            success_payload(endpoint, status, &text)
        } else {
            Err(failure_from_body(endpoint, status, &text))
        };

        let payload = outcome.map_err(|err| {
            warn!(endpoint = endpoint, error = %err, "Vectorize request rejected");
            err
        })?;

        serde_json::from_value(payload).map_err(|e| VectorizeError::Transport {
            endpoint: endpoint.to_string(),
            status: Some(status.as_u16()),
            message: format!("Unexpected response shape: {}", e),
            source: None,
        })
    }
}

pub(crate) fn to_body<B: Serialize + ?Sized>(body: &B) -> VectorizeResult<Value> {
    serde_json::to_value(body).map_err(|e| {
        VectorizeError::invalid(format!("Request body cannot be encoded as JSON: {}", e))
    })
}

fn success_payload(endpoint: &str, status: StatusCode, text: &str) -> VectorizeResult<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }

    match ResponseBody::parse(text) {
        Some(ResponseBody::Envelope(envelope)) if !envelope.success => {
            let message = envelope
                .detail
                .describe()
                .unwrap_or_else(|| "Request was not successful".to_string());
            Err(VectorizeError::RemoteApi {
                endpoint: endpoint.to_string(),
                status: Some(status.as_u16()),
                message,
                errors: envelope.detail.errors,
            })
        }
        Some(ResponseBody::Envelope(envelope)) => match envelope.result {
            Some(result) => Ok(result),
            None => serde_json::from_str(text).map_err(|e| VectorizeError::Transport {
                endpoint: endpoint.to_string(),
                status: Some(status.as_u16()),
                message: format!("Unreadable response body: {}", e),
                source: None,
            }),
        },
        Some(ResponseBody::Raw(value)) => Ok(value),
        None => Ok(Value::String(text.to_string())),
    }
}

fn failure_from_body(endpoint: &str, status: StatusCode, text: &str) -> VectorizeError {
    let detail = match ResponseBody::parse(text) {
        Some(ResponseBody::Envelope(envelope)) => envelope.detail,
        Some(ResponseBody::Raw(Value::Object(map))) => FailureDetail::from_map(&map),
        _ => FailureDetail::default(),
    };

    match detail.describe() {
        Some(message) => VectorizeError::RemoteApi {
            endpoint: endpoint.to_string(),
            status: Some(status.as_u16()),
            message,
            errors: detail.errors,
        },
        None => VectorizeError::Transport {
            endpoint: endpoint.to_string(),
            status: Some(status.as_u16()),
            message: format!("HTTP {} with no readable error body", status),
            source: None,
        },
    }
}

fn join_error_messages(errors: &[ApiError]) -> String {
    errors
        .iter()
        .map(|e| {
            if e.code != 0 {
                format!("{} (code {})", e.message, e.code)
            } else {
                e.message.clone()
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn describe_transport_failure(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timeout - the API took too long to respond".to_string()
    } else if e.is_connect() {
        format!("Connection error - unable to reach the API: {}", e)
    } else {
        format!("Network error: {}", e)
    }
}
