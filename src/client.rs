use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use serde::Deserialize;
use std::env;
use std::time::{Duration, Instant};
use url::Url;

use crate::error::{Error, Result};
use crate::observability::{CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS};
use crate::provider::GeminiChat;
use crate::types::{GenerateContentRequest, GenerateContentResponse, Model};

const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Environment variables consulted for the API key, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Client for the Gemini `generateContent` API.
#[derive(Debug, Clone)]
pub struct Gemini {
    api_key: String,
    client: ReqwestClient,
    base_url: Url,
    timeout: Duration,
}

impl Gemini {
    /// Create a new Gemini client.
    ///
    /// The API key can be provided directly or read from the `GEMINI_API_KEY`
    /// (preferred) or `API_KEY` environment variable.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_options(api_key, None, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(
        api_key: Option<String>,
        base_url: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let api_key = resolve_api_key(api_key)?;
        let base_url = parse_base_url(base_url.as_deref().unwrap_or(DEFAULT_API_URL))?;

        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            api_key,
            client,
            base_url,
            timeout,
        })
    }

    /// The base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Start a multi-turn conversation with a fixed system instruction.
    ///
    /// No request is made until the first message is sent.
    pub fn chat(&self, model: Model, system_instruction: impl Into<String>) -> GeminiChat {
        GeminiChat::new(self.clone(), model, system_instruction.into())
    }

    /// Create and return default headers for API requests.
    fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        let key = HeaderValue::from_str(&self.api_key)
            .map_err(|_| Error::authentication("API key contains invalid header characters"))?;
        headers.insert("x-goog-api-key", key);
        Ok(headers)
    }

    fn endpoint(&self, model: &Model) -> Result<Url> {
        Ok(self
            .base_url
            .join(&format!("models/{}:generateContent", model))?)
    }

    /// Generate one reply for the given conversation.
    pub async fn generate_content(
        &self,
        model: &Model,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        CLIENT_REQUESTS.click();
        let start = Instant::now();
        let result = self.generate_content_once(model, request).await;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());
        if let Err(err) = &result {
            CLIENT_REQUEST_ERRORS.click();
            log::debug!("generateContent on {model} failed: {err}");
        }
        result
    }

    async fn generate_content_once(
        &self,
        model: &Model,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let url = self.endpoint(model)?;
        log::debug!(
            "POST {} with {} turn(s)",
            url.path(),
            request.contents.len()
        );

        let response = self
            .client
            .post(url)
            .headers(self.default_headers()?)
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| {
                Error::serialization(
                    format!("Failed to parse response: {}", e),
                    Some(Box::new(e)),
                )
            })
    }
}

fn resolve_api_key(api_key: Option<String>) -> Result<String> {
    resolve_api_key_from(api_key, |var| env::var(var).ok())
}

// Blank variables are skipped so an empty GEMINI_API_KEY still falls back to API_KEY.
fn resolve_api_key_from(
    api_key: Option<String>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String> {
    let api_key = match api_key {
        Some(key) => Some(key),
        None => API_KEY_ENV_VARS
            .iter()
            .find_map(|var| lookup(var).filter(|key| !key.trim().is_empty())),
    };
    api_key
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| {
            Error::authentication(
                "API key not provided and neither GEMINI_API_KEY nor API_KEY is set",
            )
        })
}

fn parse_base_url(base_url: &str) -> Result<Url> {
    // Url::join drops the last path segment unless it ends in a slash.
    if base_url.ends_with('/') {
        Ok(Url::parse(base_url)?)
    } else {
        Ok(Url::parse(&format!("{base_url}/"))?)
    }
}

/// Map a reqwest failure that produced no response.
pub(crate) fn transport_error(e: reqwest::Error, timeout: Duration) -> Error {
    if e.is_timeout() {
        Error::timeout(
            format!("Request timed out: {}", e),
            Some(timeout.as_secs_f64()),
        )
    } else if e.is_connect() {
        Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
    } else {
        Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
    }
}

/// Convert a non-success response into our Error type.
pub(crate) async fn error_from_response(response: Response) -> Error {
    let status_code = response.status().as_u16();
    let retry_after = response
        .headers()
        .get("retry-after")
        .and_then(|val| val.to_str().ok())
        .and_then(|val| val.parse::<u64>().ok());

    match response.text().await {
        Ok(body) => error_from_status(status_code, retry_after, &body),
        Err(e) => Error::http_client(
            format!("Failed to read error response: {}", e),
            Some(Box::new(e)),
        ),
    }
}

/// Map a non-success status and its body to an [`Error`].
pub(crate) fn error_from_status(status_code: u16, retry_after: Option<u64>, body: &str) -> Error {
    #[derive(Deserialize)]
    struct ErrorResponse {
        error: Option<ErrorDetail>,
    }

    #[derive(Deserialize)]
    struct ErrorDetail {
        message: Option<String>,
        status: Option<String>,
        #[serde(default)]
        details: Vec<ErrorInfo>,
    }

    #[derive(Deserialize)]
    struct ErrorInfo {
        reason: Option<String>,
    }

    let parsed = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|e| e.error);
    let message = parsed
        .as_ref()
        .and_then(|e| e.message.clone())
        .unwrap_or_else(|| body.to_string());
    let status = parsed.as_ref().and_then(|e| e.status.clone());
    let invalid_key = parsed.as_ref().is_some_and(|e| {
        e.details
            .iter()
            .any(|d| d.reason.as_deref() == Some("API_KEY_INVALID"))
    }) || status.as_deref() == Some("UNAUTHENTICATED");

    match status_code {
        400 if invalid_key => Error::authentication(message),
        400 => Error::bad_request(message),
        401 => Error::authentication(message),
        403 => Error::permission(message),
        404 => Error::not_found(message),
        408 => Error::timeout(message, None),
        429 => Error::rate_limit(message, retry_after),
        500 => Error::internal_server(message),
        502..=504 => Error::service_unavailable(message, retry_after),
        _ => Error::api(status_code, status, message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::FakeServer;
    use crate::types::{Content, KnownModel};
    use std::env;

    #[test]
    fn client_creation() {
        let client = Gemini::new(Some("test-key".to_string())).unwrap();
        assert_eq!(client.api_key, "test-key");
        assert_eq!(client.base_url.as_str(), DEFAULT_API_URL);
        assert_eq!(client.timeout, DEFAULT_TIMEOUT);

        let client = Gemini::with_options(
            Some("test-key".to_string()),
            Some("https://proxy.example.com/gemini".to_string()),
            Some(Duration::from_secs(30)),
        )
        .unwrap();
        assert_eq!(client.base_url.as_str(), "https://proxy.example.com/gemini/");
        assert_eq!(client.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn blank_key_is_rejected() {
        let err = Gemini::new(Some("   ".to_string())).unwrap_err();
        assert!(err.is_authentication());
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = Gemini::with_options(Some("k".to_string()), Some("not a url".to_string()), None)
            .unwrap_err();
        assert!(matches!(err, Error::Url { .. }));
    }

    #[test]
    fn endpoint_includes_model() {
        let client = Gemini::new(Some("test-key".to_string())).unwrap();
        let url = client
            .endpoint(&Model::Known(KnownModel::Gemini25Flash))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn headers_carry_key() {
        let client = Gemini::new(Some("secret".to_string())).unwrap();
        let headers = client.default_headers().unwrap();
        assert_eq!(headers.get("x-goog-api-key").unwrap(), "secret");

        let client = Gemini::new(Some("bad\nkey".to_string())).unwrap();
        assert!(client.default_headers().unwrap_err().is_authentication());
    }

    #[test]
    fn invalid_key_maps_to_authentication() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid. Please pass a valid API key.", "status": "INVALID_ARGUMENT", "details": [{"@type": "type.googleapis.com/google.rpc.ErrorInfo", "reason": "API_KEY_INVALID"}]}}"#;
        let err = error_from_status(400, None, body);
        assert!(err.is_authentication());
        assert_eq!(
            err.to_string(),
            "Authentication error: API key not valid. Please pass a valid API key."
        );
    }

    #[test]
    fn status_mapping() {
        let body = r#"{"error": {"code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED"}}"#;
        let err = error_from_status(429, Some(12), body);
        assert!(matches!(
            err,
            Error::RateLimit {
                retry_after: Some(12),
                ..
            }
        ));

        assert!(error_from_status(400, None, r#"{"error": {"message": "bad"}}"#).is_bad_request());
        assert!(error_from_status(403, None, "").is_permission());
        assert!(error_from_status(404, None, "").is_not_found());
        assert!(error_from_status(503, None, "overloaded").is_server_error());

        let err = error_from_status(
            409,
            None,
            r#"{"error": {"message": "conflict", "status": "ABORTED"}}"#,
        );
        assert_eq!(err.status_code(), Some(409));
        assert_eq!(err.to_string(), "ABORTED (409): conflict");
    }

    #[test]
    fn non_json_body_is_the_message() {
        let err = error_from_status(500, None, "upstream exploded");
        assert_eq!(err.to_string(), "Internal server error: upstream exploded");
    }

    #[test]
    fn blank_primary_var_falls_back_to_api_key() {
        let lookup = |var: &str| match var {
            "GEMINI_API_KEY" => Some("".to_string()),
            "API_KEY" => Some("real-key".to_string()),
            _ => None,
        };
        assert_eq!(resolve_api_key_from(None, lookup).unwrap(), "real-key");

        let lookup = |var: &str| (var == "GEMINI_API_KEY").then(|| "primary".to_string());
        assert_eq!(resolve_api_key_from(None, lookup).unwrap(), "primary");

        let err = resolve_api_key_from(None, |_| Some("  ".to_string())).unwrap_err();
        assert!(err.is_authentication());
    }

    #[test]
    fn explicit_key_wins_over_environment() {
        let lookup = |_: &str| Some("from-env".to_string());
        assert_eq!(
            resolve_api_key_from(Some("explicit".to_string()), lookup).unwrap(),
            "explicit"
        );
        assert!(resolve_api_key_from(Some("".to_string()), lookup).is_err());
    }

    #[tokio::test]
    async fn generate_content_posts_to_model_endpoint() {
        let body = r#"{"candidates": [{"content": {"role": "model", "parts": [{"text": "hello"}]}, "finishReason": "STOP"}], "usageMetadata": {"promptTokenCount": 3, "candidatesTokenCount": 1, "totalTokenCount": 4}}"#;
        let server = FakeServer::start(vec![(200, body.to_string())]).await;
        let client = Gemini::with_options(
            Some("test-key".to_string()),
            Some(server.url("/v1beta/")),
            Some(Duration::from_secs(5)),
        )
        .unwrap();

        let request = GenerateContentRequest::new(vec![Content::user("Hi")])
            .with_system_instruction("Be brief.");
        let response = client
            .generate_content(&Model::Known(KnownModel::Gemini25Flash), &request)
            .await
            .unwrap();
        assert_eq!(response.text(), "hello");
        assert_eq!(response.usage_metadata.unwrap().total_token_count, 4);

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].lines().next(),
            Some("POST /v1beta/models/gemini-2.5-flash:generateContent HTTP/1.1")
        );
        assert!(requests[0].to_lowercase().contains("x-goog-api-key: test-key"));
        assert!(requests[0].contains(r#""systemInstruction""#));
    }

    #[tokio::test]
    async fn generate_content_maps_error_status() {
        let body = r#"{"error": {"code": 503, "message": "The model is overloaded.", "status": "UNAVAILABLE"}}"#;
        let server = FakeServer::start(vec![(503, body.to_string())]).await;
        let client =
            Gemini::with_options(Some("test-key".to_string()), Some(server.url("/")), None)
                .unwrap();

        let err = client
            .generate_content(
                &Model::default(),
                &GenerateContentRequest::new(vec![Content::user("Hi")]),
            )
            .await
            .unwrap_err();
        assert!(err.is_server_error());
        assert!(err.is_retryable());
    }

    #[tokio::test]
    #[ignore] // Ignore by default as this requires a real API key
    async fn live_generate_content() {
        let api_key = env::var("GEMINI_API_KEY").ok();
        if api_key.is_none() {
            println!("Skipping live_generate_content: GEMINI_API_KEY not set");
            return;
        }

        let client = Gemini::new(api_key).unwrap();
        let request = GenerateContentRequest::new(vec![Content::user(
            "Reply with a short greeting.",
        )]);
        let response = client
            .generate_content(&Model::default(), &request)
            .await
            .unwrap();
        assert!(!response.text().is_empty());
    }
}
