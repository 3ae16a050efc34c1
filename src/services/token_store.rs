use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::catalog::RemoteConfig;
use crate::error::AppError;

const AI_TOKEN_PATH: [&str; 2] = ["api", "ai_token"];
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Reply to `POST /api/ai_token`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SaveResponse {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default, alias = "msg")]
    pub message: Option<String>,
}

impl SaveResponse {
    pub fn ok() -> Self {
        Self {
            code: Some(200),
            message: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(200)
    }

    pub fn describe(&self) -> String {
        match (&self.code, &self.message) {
            (Some(code), Some(msg)) => format!("server answered code {code}: {msg}"),
            (Some(code), None) => format!("server answered code {code}"),
            (None, Some(msg)) => format!("server answered without a code: {msg}"),
            (None, None) => "server answered without a code".to_string(),
        }
    }
}

/// Remote home of the AI token settings.
pub trait TokenStore {
    fn fetch(&self) -> Result<RemoteConfig, AppError>;
    fn save(&self, body: &RemoteConfig) -> Result<SaveResponse, AppError>;
}

impl<T: TokenStore + ?Sized> TokenStore for Box<T> {
    fn fetch(&self) -> Result<RemoteConfig, AppError> {
        (**self).fetch()
    }

    fn save(&self, body: &RemoteConfig) -> Result<SaveResponse, AppError> {
        (**self).save(body)
    }
}

/// `TokenStore` over the settings server's REST endpoint.
#[derive(Debug, Clone)]
pub struct HttpTokenStore {
    endpoint: String,
    session_key: Option<String>,
    timeout: Duration,
}

impl HttpTokenStore {
    pub fn new(
        server_url: &str,
        session_key: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, AppError> {
        Ok(Self {
            endpoint: build_endpoint_url(server_url)?,
            session_key: session_key.filter(|k| !k.trim().is_empty()),
            timeout: Duration::from_secs(timeout_secs.max(1)),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn is_authenticated(&self) -> bool {
        self.session_key.is_some()
    }

    fn authorization(&self) -> Option<String> {
        self.session_key.as_ref().map(|key| format!("Key {key}"))
    }

    fn build_http_client(&self) -> Result<Client, AppError> {
        Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| AppError::Message(format!("failed to create HTTP client: {e}")))
    }
}

impl TokenStore for HttpTokenStore {
    fn fetch(&self) -> Result<RemoteConfig, AppError> {
        let client = self
            .build_http_client()
            .map_err(|e| AppError::FetchFailed(e.to_string()))?;
        let url = self.endpoint.clone();
        let auth = self.authorization();
        log::debug!("GET {url}");

        let value = run_http(async move {
            let mut req = client.get(&url);
            if let Some(auth) = auth {
                req = req.header(reqwest::header::AUTHORIZATION, auth);
            }
            let resp = req
                .send()
                .await
                .map_err(|e| AppError::FetchFailed(format!("GET {url}: {e}")))?;
            if !resp.status().is_success() {
                return Err(AppError::FetchFailed(status_message("GET", resp.status(), &url)));
            }
            resp.json::<Value>()
                .await
                .map_err(|e| AppError::FetchFailed(format!("invalid JSON from {url}: {e}")))
        })
        .map_err(|e| match e {
            AppError::FetchFailed(_) => e,
            other => AppError::FetchFailed(other.to_string()),
        })?;

        RemoteConfig::from_value(value)
    }

    fn save(&self, body: &RemoteConfig) -> Result<SaveResponse, AppError> {
        let client = self
            .build_http_client()
            .map_err(|e| AppError::SubmitFailed(e.to_string()))?;
        let url = self.endpoint.clone();
        let auth = self.authorization();
        let payload = body.to_value();
        log::debug!("POST {url} (in_use = {:?})", body.in_use);

        run_http(async move {
            let mut req = client.post(&url).json(&payload);
            if let Some(auth) = auth {
                req = req.header(reqwest::header::AUTHORIZATION, auth);
            }
            let resp = req
                .send()
                .await
                .map_err(|e| AppError::SubmitFailed(format!("POST {url}: {e}")))?;
            if !resp.status().is_success() {
                return Err(AppError::SubmitFailed(status_message("POST", resp.status(), &url)));
            }
            resp.json::<SaveResponse>()
                .await
                .map_err(|e| AppError::SubmitFailed(format!("invalid JSON from {url}: {e}")))
        })
        .map_err(|e| match e {
            AppError::SubmitFailed(_) => e,
            other => AppError::SubmitFailed(other.to_string()),
        })
    }
}

fn status_message(operation: &str, status: StatusCode, url: &str) -> String {
    let mut message = format!("{operation} {url} returned {status}");
    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        message.push_str("; check the session key");
    }
    message
}

/// `{server}/api/ai_token`, keeping any path prefix of the server URL.
pub fn build_endpoint_url(server_url: &str) -> Result<String, AppError> {
    let mut url = Url::parse(server_url.trim())
        .map_err(|e| AppError::InvalidInput(format!("server URL is not valid: {e}")))?;
    {
        let mut path_builder = url
            .path_segments_mut()
            .map_err(|_| AppError::InvalidInput("server URL must be an http(s) URL".to_string()))?;
        path_builder.pop_if_empty();
        for segment in AI_TOKEN_PATH {
            path_builder.push(segment);
        }
    }
    Ok(url.to_string())
}

pub(crate) fn run_http<F, T>(future: F) -> Result<T, AppError>
where
    F: std::future::Future<Output = Result<T, AppError>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| AppError::Message(format!("failed to create async runtime: {e}")))?;
    runtime.block_on(future)
}
