pub mod token;

use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use token::PageLocation;

pub const DELETE_PATH: &str = "/history_ia/delete";
pub const SEARCH_PATH: &str = "/history_ia/busca_amostras";

// form body for the delete endpoint
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MutationRequest {
    pub token: String,
    pub layout: String,
    #[serde(rename = "campo")]
    pub field: String,
    #[serde(rename = "valor")]
    pub value: String,
    #[serde(rename = "acao")]
    pub action: String,
}

// form body for the sample search endpoint
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    pub token: String,
    pub layout: String,
    #[serde(rename = "campo")]
    pub field: String,
    #[serde(rename = "termo")]
    pub term: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct MutationResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, rename = "mensagem")]
    pub message: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default, rename = "amostras")]
    samples: Option<Vec<String>>,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unreadable response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    #[error("invalid service endpoint: {url}")]
    InvalidEndpoint { url: String },
}

#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("invalid base URL: {url}")]
    InvalidBaseUrl { url: String },

    #[error("failed to setup proxy: {proxy}: {source}")]
    ProxySetup {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },
}

/// The two remote operations behind the curation workflow.
///
/// Implementations hold no state between calls; every request carries the
/// token it was issued with.
pub trait SampleService {
    fn search(&self, req: SearchRequest) -> BoxFuture<'_, Result<Vec<String>, ServiceError>>;

    fn mutate(&self, req: MutationRequest)
        -> BoxFuture<'_, Result<MutationResponse, ServiceError>>;
}

#[derive(Clone, Debug)]
pub struct ClientOptions {
    pub base_url: String,
    pub timeout_seconds: Option<u64>,
    pub proxy: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            timeout_seconds: None,
            proxy: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct HttpSampleService {
    client: reqwest::Client,
    base_url: reqwest::Url,
}

impl HttpSampleService {
    pub fn new(options: &ClientOptions) -> Result<Self, ClientBuildError> {
        let base_url = reqwest::Url::parse(options.base_url.trim()).map_err(|_| {
            ClientBuildError::InvalidBaseUrl {
                url: options.base_url.clone(),
            }
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ClientBuildError::InvalidBaseUrl {
                url: options.base_url.clone(),
            });
        }
        let client = build_client(options.proxy.as_deref(), options.timeout_seconds)?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &reqwest::Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<reqwest::Url, ServiceError> {
        let mut url = self.base_url.clone();
        let prefix = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{prefix}{path}"));
        url.set_query(None);
        if url.cannot_be_a_base() {
            return Err(ServiceError::InvalidEndpoint {
                url: url.to_string(),
            });
        }
        Ok(url)
    }

    async fn post_form<B, T>(&self, path: &str, body: &B) -> Result<T, ServiceError>
    where
        B: Serialize + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let endpoint = url.to_string();
        tracing::debug!(%endpoint, "posting form");
        let resp = self
            .client
            .post(url)
            .form(body)
            .send()
            .await
            .map_err(|source| ServiceError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;
        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|source| ServiceError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;
        tracing::debug!(%endpoint, status = status.as_u16(), len = bytes.len(), "response received");
        serde_json::from_slice::<T>(&bytes).map_err(|e| ServiceError::Decode {
            endpoint,
            message: format!("status {}: {e}", status.as_u16()),
        })
    }
}

impl SampleService for HttpSampleService {
    fn search(&self, req: SearchRequest) -> BoxFuture<'_, Result<Vec<String>, ServiceError>> {
        async move {
            let resp: SearchResponse = self.post_form(SEARCH_PATH, &req).await?;
            Ok(resp.samples.unwrap_or_default())
        }
        .boxed()
    }

    fn mutate(
        &self,
        req: MutationRequest,
    ) -> BoxFuture<'_, Result<MutationResponse, ServiceError>> {
        async move { self.post_form(DELETE_PATH, &req).await }.boxed()
    }
}

fn build_client(
    proxy: Option<&str>,
    timeout_seconds: Option<u64>,
) -> Result<reqwest::Client, ClientBuildError> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::ACCEPT,
        reqwest::header::HeaderValue::from_static("application/json"),
    );
    headers.insert(
        reqwest::header::USER_AGENT,
        reqwest::header::HeaderValue::from_static(concat!(
            "samplekeeper/",
            env!("CARGO_PKG_VERSION")
        )),
    );

    let mut builder = reqwest::Client::builder().default_headers(headers);
    // no timeout unless configured: a hung request stays pending
    if let Some(secs) = timeout_seconds.filter(|s| *s > 0) {
        builder = builder.timeout(Duration::from_secs(secs));
    }

    if let Some(proxy) = proxy.filter(|p| !p.trim().is_empty()) {
        let proxy = reqwest::Proxy::all(proxy).map_err(|e| ClientBuildError::ProxySetup {
            proxy: proxy.to_string(),
            source: e,
        })?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| ClientBuildError::HttpClientBuild { source: e })
}
