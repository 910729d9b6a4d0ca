use std::env;
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::Stream;
use futures::stream::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use serde::Deserialize;
use url::Url;

use crate::client_logger::ClientLogger;
use crate::error::{Error, Result};
use crate::ndjson::process_ndjson;
use crate::observability::{CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS};
use crate::types::{
    GenerateOptions, GenerateRequest, GenerateResponse, Generation, GenerationEvent,
};

const DEFAULT_BASE_URL: &str = "http://localhost:11434/";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);
const HOST_ENV_VAR: &str = "OLLAMA_HOST";
const GENERIC_FAILURE: &str = "Failed to generate response";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "deepseek-r1:8b";

/// A stream of generation events; see [`process_ndjson`](crate::ndjson::process_ndjson).
pub type GenerationStream = Pin<Box<dyn Stream<Item = Result<GenerationEvent>> + Send>>;

/// Something that turns a prompt into generated text.
///
/// [`Ollama`] is the production implementation.  The chat session only talks
/// to this trait, so tests can drive it with scripted responses.
#[async_trait::async_trait]
pub trait Generator: Send + Sync {
    /// Perform one non-streaming generation.
    async fn generate(&self, request: GenerateRequest) -> Result<Generation>;

    /// Perform one streaming generation.
    ///
    /// The returned stream yields deltas in arrival order and ends with
    /// [`GenerationEvent::Done`], or with an error if the transport closed
    /// early.
    async fn generate_stream(&self, request: GenerateRequest) -> Result<GenerationStream>;
}

/// Client for a local Ollama server.
#[derive(Clone)]
pub struct Ollama {
    client: ReqwestClient,
    base_url: Url,
    timeout: Duration,
    defaults: GenerateOptions,
    logger: Option<Arc<dyn ClientLogger>>,
}

impl fmt::Debug for Ollama {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ollama")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field("defaults", &self.defaults)
            .field("logger", &self.logger.is_some())
            .finish()
    }
}

impl Ollama {
    /// Create a new Ollama client.
    ///
    /// The base URL can be provided directly or read from the OLLAMA_HOST
    /// environment variable; otherwise `http://localhost:11434/` is used.
    pub fn new(base_url: Option<String>) -> Result<Self> {
        Self::with_options(base_url, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(base_url: Option<String>, timeout: Option<Duration>) -> Result<Self> {
        let base_url = match base_url {
            Some(url) => url,
            None => env::var(HOST_ENV_VAR).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
        };
        let base_url = parse_base_url(&base_url)?;

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
            client,
            base_url,
            timeout,
            defaults: GenerateOptions::client_defaults(),
            logger: None,
        })
    }

    /// Replace the sampling options applied underneath every request.
    pub fn with_default_options(mut self, defaults: GenerateOptions) -> Self {
        self.defaults = defaults;
        self
    }

    /// Install a logger that observes every request and response.
    pub fn with_logger(mut self, logger: Arc<dyn ClientLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// The server's base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Create and return default headers for API requests.
    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Fill unset sampling options from the client defaults.
    ///
    /// A client built with empty defaults sends the request's options as
    /// they are, so an unset value reaches the server as unset.
    pub(crate) fn prepare(&self, mut request: GenerateRequest, stream: bool) -> GenerateRequest {
        request.stream = stream;
        request.options = request.options.or(self.defaults);
        request
    }

    fn map_send_error(&self, e: reqwest::Error) -> Error {
        CLIENT_REQUEST_ERRORS.click();
        if e.is_timeout() {
            Error::timeout(
                format!("Request timed out: {}", e),
                Some(self.timeout.as_secs_f64()),
            )
        } else if e.is_connect() {
            Error::connection(
                format!("Could not reach the Ollama server: {}", e),
                Some(Box::new(e)),
            )
        } else {
            Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
        }
    }

    /// Process API response errors and convert to our Error type
    async fn process_error_response(response: Response) -> Error {
        CLIENT_REQUEST_ERRORS.click();
        let status_code = response.status().as_u16();
        let error_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {}", e),
                    Some(Box::new(e)),
                );
            }
        };
        error_from_status(status_code, &error_body)
    }

    async fn post(&self, request: &GenerateRequest, accept: &'static str) -> Result<Response> {
        if let Some(logger) = &self.logger {
            logger.log_request(request);
        }
        CLIENT_REQUESTS.click();

        let mut headers = self.default_headers();
        headers.insert(header::ACCEPT, HeaderValue::from_static(accept));

        let response = self
            .client
            .post(self.endpoint("api/generate")?)
            .headers(headers)
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }
        Ok(response)
    }

    /// Generate a complete response.  Sets `stream = false` on the request.
    pub async fn generate(&self, request: GenerateRequest) -> Result<Generation> {
        let request = self.prepare(request, false);
        let start = Instant::now();
        let response = self.post(&request, "application/json").await?;

        let bytes = response.bytes().await.map_err(|e| self.map_send_error(e))?;
        let body = decode_generate_body(&bytes).inspect_err(|_| CLIENT_REQUEST_ERRORS.click())?;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());

        if let Some(logger) = &self.logger {
            logger.log_response(&body);
        }
        finish_generation(body)
    }

    /// Generate a response as a stream of events.  Sets `stream = true` on the request.
    pub async fn generate_stream(&self, request: GenerateRequest) -> Result<GenerationStream> {
        let request = self.prepare(request, true);
        let response = self.post(&request, "application/x-ndjson").await?;

        let events = process_ndjson(response.bytes_stream());
        let stream: GenerationStream = match self.logger.clone() {
            Some(logger) => Box::pin(events.inspect(move |event| {
                if let Ok(event) = event {
                    logger.log_stream_event(event);
                }
            })),
            None => Box::pin(events),
        };
        Ok(stream)
    }

    /// Check that the server answers at its base URL.
    pub async fn health_check(&self) -> Result<()> {
        let response = self
            .client
            .get(self.base_url.clone())
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }
        Ok(())
    }

    /// List the names of the models installed on the server.
    pub async fn list_models(&self) -> Result<Vec<String>> {
        #[derive(Deserialize)]
        struct ModelEntry {
            name: String,
        }

        #[derive(Deserialize)]
        struct ModelsResponse {
            #[serde(default)]
            models: Vec<ModelEntry>,
        }

        let response = self
            .client
            .get(self.endpoint("api/tags")?)
            .headers(self.default_headers())
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }

        let models = response.json::<ModelsResponse>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse model list: {}", e),
                Some(Box::new(e)),
            )
        })?;
        Ok(models.models.into_iter().map(|model| model.name).collect())
    }
}

#[async_trait::async_trait]
impl Generator for Ollama {
    async fn generate(&self, request: GenerateRequest) -> Result<Generation> {
        Ollama::generate(self, request).await
    }

    async fn generate_stream(&self, request: GenerateRequest) -> Result<GenerationStream> {
        Ollama::generate_stream(self, request).await
    }
}

/// Accepts `host:port`, `http://host:port`, with or without a trailing slash.
fn parse_base_url(base_url: &str) -> Result<Url> {
    let base_url = base_url.trim();
    let mut base_url = if base_url.contains("://") {
        base_url.to_string()
    } else {
        format!("http://{base_url}")
    };
    if !base_url.ends_with('/') {
        base_url.push('/');
    }
    Ok(Url::parse(&base_url)?)
}

/// Decode the body of a successful non-streaming call.
///
/// A 200 whose body is not a generate response (a proxy's HTML page, a
/// truncated object) is a generation failure, not a local decoding bug.
fn decode_generate_body(body: &[u8]) -> Result<GenerateResponse> {
    serde_json::from_slice(body).map_err(|e| {
        Error::encoding(
            format!("Failed to parse response: {}", e),
            Some(Box::new(e)),
        )
    })
}

/// Accept a decoded body only if it is a complete, error-free response.
fn finish_generation(body: GenerateResponse) -> Result<Generation> {
    if let Some(message) = body.error {
        return Err(Error::api(200, message));
    }
    if !body.done {
        return Err(Error::streaming("response not complete", None));
    }
    Ok(Generation::from(body))
}

/// Map an error status and body to an error.
///
/// The server reports failures as `{"error": "..."}`; that message is
/// surfaced when present, otherwise the raw body, otherwise a generic message.
fn error_from_status(status_code: u16, body: &str) -> Error {
    #[derive(Deserialize)]
    struct ErrorResponse {
        error: Option<String>,
    }

    let message = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|e| e.error)
        .or_else(|| {
            let body = body.trim();
            (!body.is_empty()).then(|| body.to_string())
        })
        .unwrap_or_else(|| GENERIC_FAILURE.to_string());

    match status_code {
        400 => Error::bad_request(message),
        404 => Error::not_found(message),
        408 => Error::timeout(message, None),
        500 => Error::internal_server(message),
        502..=504 => Error::service_unavailable(message),
        _ => Error::api(status_code, message),
    }
}
