//! HTTP storage handler (load only).
//!
//! Fetches a `model.json` manifest, then fetches every shard it lists
//! concurrently and stitches the bodies together in manifest order. Shard
//! URLs are the manifest URL's directory prefix plus the shard path.

use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, COOKIE};
use reqwest::Method;
use tracing::Instrument;

use super::error::IoError;
use super::file_system::warn_on_size_mismatch;
use super::handler::IoHandler;
use super::types::{ModelArtifacts, ModelJson, ModelTopology, SaveResult};
use super::weights;
use crate::config::HttpClientConfig;
use crate::environment::{Environment, ProcessEnvironment};
use crate::telemetry::{IoSpan, SpanExt};

/// URL prefixes claimed by the default HTTP router.
pub const URL_SCHEMES: &[&str] = &["http://", "https://"];

/// Whether credentials travel with requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Credentials {
    /// Strip `Authorization` and `Cookie` headers.
    Omit,
    #[default]
    SameOrigin,
    Include,
}

/// Caller-supplied request options applied to the manifest and every shard
/// request.
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Defaults to GET.
    pub method: Option<Method>,
    pub headers: Vec<(String, String)>,
    pub credentials: Option<Credentials>,
    /// Must be `None`; the handler issues bodyless requests.
    pub body: Option<Vec<u8>>,
    pub timeout: Option<Duration>,
    /// Replaces the prefix derived from the manifest URL.
    pub weight_path_prefix: Option<String>,
}

/// Process-level inputs shared by every HTTP handler a router creates.
#[derive(Clone)]
pub struct HttpContext {
    pub environment: Arc<dyn Environment>,
    pub client: HttpClientConfig,
}

impl Default for HttpContext {
    fn default() -> Self {
        Self {
            environment: ProcessEnvironment::default().shared(),
            client: HttpClientConfig::default(),
        }
    }
}

/// Loads model artifacts from an HTTP(S) endpoint.
pub struct HttpHandler {
    url: String,
    method: Method,
    headers: HeaderMap,
    timeout: Option<Duration>,
    weight_path_prefix: Option<String>,
    client: reqwest::Client,
}

impl HttpHandler {
    pub fn new(url: impl Into<String>, config: Option<RequestConfig>) -> Result<Self, IoError> {
        Self::with_context(url, config, &HttpContext::default())
    }

    /// Construct against an explicit environment and client settings.
    pub fn with_context(
        url: impl Into<String>,
        config: Option<RequestConfig>,
        context: &HttpContext,
    ) -> Result<Self, IoError> {
        if !context.environment.is_server_runtime() {
            return Err(IoError::UnsupportedEnvironment(
                "HTTP handler requires a server-side runtime".into(),
            ));
        }
        Self::with_client(url, config, build_client(&context.client)?)
    }

    /// Construct around an existing client; connections are pooled across
    /// every handler sharing it.
    pub fn with_client(
        url: impl Into<String>,
        config: Option<RequestConfig>,
        client: reqwest::Client,
    ) -> Result<Self, IoError> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(IoError::InvalidConfig("URL for HTTP handler must not be empty".into()));
        }

        let config = config.unwrap_or_default();
        if config.body.is_some() {
            return Err(IoError::ConfigConflict(
                "request config already has a body; the HTTP handler manages request bodies".into(),
            ));
        }

        let headers = build_headers(&config.headers, config.credentials.unwrap_or_default())?;

        Ok(Self {
            url,
            method: config.method.unwrap_or(Method::GET),
            headers,
            timeout: config.timeout,
            weight_path_prefix: config.weight_path_prefix,
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Prefix prepended to every shard path.
    pub fn shard_prefix(&self) -> String {
        match &self.weight_path_prefix {
            Some(prefix) => prefix.clone(),
            None => path_prefix(&self.url),
        }
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, IoError> {
        let transport = |reason: String| IoError::Transport {
            url: url.to_string(),
            reason,
        };

        let mut request = self
            .client
            .request(self.method.clone(), url)
            .headers(self.headers.clone());
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(transport(format!("HTTP status {}", status)));
        }
        let body = response.bytes().await.map_err(|e| transport(e.to_string()))?;
        Ok(body.to_vec())
    }

    async fn load_artifacts(&self) -> Result<ModelArtifacts, IoError> {
        let body = self.fetch(&self.url).await?;
        let manifest = ModelJson::from_slice_non_empty(&body, &self.url)?;

        let (weight_specs, weight_data) = match &manifest.weights_manifest {
            Some(groups) => {
                let specs = weights::flatten_weight_specs(groups);
                weights::check_unique_names(&specs, &self.url)?;

                let prefix = self.shard_prefix();
                let urls: Vec<String> = weights::shard_paths(groups)
                    .into_iter()
                    .map(|path| format!("{}{}", prefix, path))
                    .collect();
                tracing::debug!(shards = urls.len(), prefix = %prefix, "fetching weight shards");

                // All requests are in flight together; results come back in
                // input order regardless of completion order.
                let buffers = try_join_all(urls.iter().map(|url| self.fetch(url))).await?;
                let data = weights::concatenate_buffers(&buffers);
                warn_on_size_mismatch(&specs, data.len(), &self.url);
                weights::loaded_weights(specs, data)
            }
            None => (None, None),
        };

        let weight_bytes = weight_data.as_ref().map_or(0, Vec::len);
        tracing::info!(url = %self.url, weight_bytes, "loaded model artifacts");
        tracing::Span::current().record("bytes", weight_bytes);

        Ok(ModelArtifacts {
            model_topology: manifest.model_topology.map(ModelTopology::Json),
            weight_specs,
            weight_data,
            format: manifest.format,
            generated_by: manifest.generated_by,
            converted_by: manifest.converted_by,
        })
    }
}

#[async_trait::async_trait]
impl IoHandler for HttpHandler {
    fn kind(&self) -> &'static str {
        "http"
    }

    fn location(&self) -> &str {
        &self.url
    }

    async fn save(&self, _artifacts: &ModelArtifacts) -> Result<SaveResult, IoError> {
        Err(IoError::NotImplemented(format!(
            "saving over HTTP is not supported ({})",
            self.url
        )))
    }

    async fn load(&self) -> Result<ModelArtifacts, IoError> {
        let span = IoSpan::new("load", self.kind(), &self.url);
        let result = self.load_artifacts().instrument(span.clone()).await;
        span.record_result(&result);
        result
    }
}

/// Build the shared client from process-level settings.
///
/// Fails with `InvalidConfig` when the user agent is not a valid header
/// value.
pub fn build_client(config: &HttpClientConfig) -> Result<reqwest::Client, IoError> {
    let user_agent = HeaderValue::from_str(&config.user_agent).map_err(|_| {
        IoError::InvalidConfig(format!("invalid user agent '{}'", config.user_agent.escape_debug()))
    })?;
    let mut builder = reqwest::Client::builder().user_agent(user_agent);
    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| IoError::InvalidConfig(format!("failed to build HTTP client: {}", e)))
}

fn build_headers(pairs: &[(String, String)], credentials: Credentials) -> Result<HeaderMap, IoError> {
    let mut headers = HeaderMap::with_capacity(pairs.len());
    for (name, value) in pairs {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| IoError::InvalidConfig(format!("invalid header name '{}'", name)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| IoError::InvalidConfig(format!("invalid value for header '{}'", name.as_str())))?;
        headers.append(name, value);
    }
    if credentials == Credentials::Omit {
        headers.remove(AUTHORIZATION);
        headers.remove(COOKIE);
    }
    Ok(headers)
}

/// Everything up to the last `/` of `url`, always ending in `/`.
pub fn path_prefix(url: &str) -> String {
    let mut prefix = match url.rfind('/') {
        Some(idx) => url[..idx].to_string(),
        None => String::new(),
    };
    if !prefix.ends_with('/') {
        prefix.push('/');
    }
    prefix
}

/// Router for a configurable set of URL scheme prefixes.
///
/// Owns one `reqwest::Client`; every handler it produces shares that
/// client's connection pool.
#[derive(Clone)]
pub struct HttpRouter {
    schemes: Vec<String>,
    environment: Arc<dyn Environment>,
    client: reqwest::Client,
}

impl HttpRouter {
    /// Router for `http://` and `https://`.
    ///
    /// Client settings are validated here, so a bad user agent surfaces at
    /// registration rather than as an unmatched location later.
    pub fn new(context: HttpContext) -> Result<Self, IoError> {
        Ok(Self {
            schemes: URL_SCHEMES.iter().map(|s| s.to_string()).collect(),
            client: build_client(&context.client)?,
            environment: context.environment,
        })
    }

    /// Claim an additional scheme prefix (e.g. a proxy scheme).
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.schemes.push(scheme.into());
        self
    }

    pub fn schemes(&self) -> &[String] {
        &self.schemes
    }

    /// Match `location` against the scheme list. Performs no network I/O.
    pub fn route(&self, location: &str) -> Option<Box<dyn IoHandler>> {
        if !self.environment.is_server_runtime() {
            return None;
        }
        if !self.schemes.iter().any(|scheme| location.starts_with(scheme.as_str())) {
            return None;
        }
        tracing::debug!(location, "http router matched");
        Some(Box::new(HttpHandler {
            url: location.to_string(),
            method: Method::GET,
            headers: HeaderMap::new(),
            timeout: None,
            weight_path_prefix: None,
            client: self.client.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_prefix() {
        assert_eq!(path_prefix("http://localhost:5001/model.json"), "http://localhost:5001/");
        assert_eq!(path_prefix("https://cdn.example.com/m/v2/model.json"), "https://cdn.example.com/m/v2/");
        assert_eq!(path_prefix("model.json"), "/");
    }

    #[test]
    fn test_body_in_config_rejected() {
        let config = RequestConfig {
            body: Some(b"payload".to_vec()),
            ..Default::default()
        };
        let result = HttpHandler::new("http://localhost/model.json", Some(config));
        assert!(matches!(result, Err(IoError::ConfigConflict(_))));
    }

    #[test]
    fn test_unsupported_environment_rejected() {
        let context = HttpContext {
            environment: ProcessEnvironment::new(false).shared(),
            client: HttpClientConfig::default(),
        };
        let result = HttpHandler::with_context("http://localhost/model.json", None, &context);
        assert!(matches!(result, Err(IoError::UnsupportedEnvironment(_))));
    }

    #[test]
    fn test_empty_url_rejected() {
        assert!(matches!(HttpHandler::new("", None), Err(IoError::InvalidConfig(_))));
    }

    #[test]
    fn test_weight_path_prefix_override() {
        let config = RequestConfig {
            weight_path_prefix: Some("https://weights.example.com/shards/".into()),
            ..Default::default()
        };
        let handler = HttpHandler::new("https://example.com/model.json", Some(config)).unwrap();
        assert_eq!(handler.shard_prefix(), "https://weights.example.com/shards/");
    }

    #[test]
    fn test_omit_credentials_strips_auth_headers() {
        let pairs = vec![
            ("Authorization".to_string(), "Bearer abc".to_string()),
            ("X-Model-Tag".to_string(), "v2".to_string()),
        ];
        let headers = build_headers(&pairs, Credentials::Omit).unwrap();
        assert!(headers.get(AUTHORIZATION).is_none());
        assert_eq!(headers.get("x-model-tag").unwrap(), "v2");

        let headers = build_headers(&pairs, Credentials::Include).unwrap();
        assert!(headers.get(AUTHORIZATION).is_some());
    }

    #[test]
    fn test_invalid_header_rejected() {
        let pairs = vec![("bad header".to_string(), "x".to_string())];
        assert!(matches!(
            build_headers(&pairs, Credentials::SameOrigin),
            Err(IoError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_router_scheme_matching() {
        let router = HttpRouter::new(HttpContext::default()).unwrap();
        assert!(router.route("http://localhost/model.json").is_some());
        assert!(router.route("https://localhost/model.json").is_some());
        assert!(router.route("file:///tmp/model.json").is_none());
        assert!(router.route("models/model.json").is_none());

        let extended = HttpRouter::new(HttpContext::default())
            .unwrap()
            .with_scheme("gs-proxy://");
        assert!(extended.route("gs-proxy://bucket/model.json").is_some());
    }

    #[test]
    fn test_router_no_match_outside_server_runtime() {
        let context = HttpContext {
            environment: ProcessEnvironment::new(false).shared(),
            client: HttpClientConfig::default(),
        };
        let router = HttpRouter::new(context).unwrap();
        assert!(router.route("http://localhost/model.json").is_none());
    }

    #[test]
    fn test_invalid_user_agent_rejected_when_router_is_built() {
        let context = HttpContext {
            environment: ProcessEnvironment::default().shared(),
            client: HttpClientConfig {
                timeout: None,
                user_agent: "bad\u{1}agent".into(),
            },
        };
        assert!(matches!(HttpRouter::new(context.clone()), Err(IoError::InvalidConfig(_))));
        assert!(matches!(
            HttpHandler::with_context("http://localhost/model.json", None, &context),
            Err(IoError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_routed_handlers_use_defaults() {
        let router = HttpRouter::new(HttpContext::default()).unwrap();
        let handler = router.route("https://cdn.example.com/m/model.json").unwrap();
        assert_eq!(handler.kind(), "http");
        assert_eq!(handler.location(), "https://cdn.example.com/m/model.json");
    }

    #[tokio::test]
    async fn test_save_not_implemented() {
        let handler = HttpHandler::new("http://localhost/model.json", None).unwrap();
        let result = handler.save(&ModelArtifacts::default()).await;
        assert!(matches!(result, Err(IoError::NotImplemented(_))));
    }
}
