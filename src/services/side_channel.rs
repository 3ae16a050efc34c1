use std::time::Duration;

use tokio::net::TcpStream;
use tokio::runtime::Runtime;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use url::Url;

use crate::error::AppError;
use crate::services::token_store::DEFAULT_TIMEOUT_SECS;

/// Auxiliary connection opened after a load and closed after a save.
/// Opening an open channel and closing a closed one do nothing.
pub trait SideChannel {
    fn open(&mut self) -> Result<(), AppError>;
    fn close(&mut self);
    fn is_open(&self) -> bool;
}

impl<T: SideChannel + ?Sized> SideChannel for Box<T> {
    fn open(&mut self) -> Result<(), AppError> {
        (**self).open()
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }
}

/// Channel that only tracks its open/closed state.
#[derive(Debug, Default)]
pub struct NoopSideChannel {
    open: bool,
}

impl SideChannel for NoopSideChannel {
    fn open(&mut self) -> Result<(), AppError> {
        self.open = true;
        Ok(())
    }

    fn close(&mut self) {
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket side channel. The socket lives on a runtime owned by the
/// channel so it survives between `open` and `close`. Connecting, including
/// the upgrade handshake, is bounded by `timeout`.
pub struct WebSocketSideChannel {
    url: String,
    timeout: Duration,
    runtime: Option<Runtime>,
    stream: Option<WsStream>,
}

impl std::fmt::Debug for WebSocketSideChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSocketSideChannel")
            .field("url", &self.url)
            .field("timeout", &self.timeout)
            .field("open", &self.stream.is_some())
            .finish()
    }
}

impl WebSocketSideChannel {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            runtime: None,
            stream: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout.max(Duration::from_millis(1));
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn runtime(&mut self) -> Result<&Runtime, AppError> {
        if self.runtime.is_none() {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| AppError::SideChannel(format!("failed to create async runtime: {e}")))?;
            self.runtime = Some(rt);
        }
        self.runtime
            .as_ref()
            .ok_or_else(|| AppError::SideChannel("async runtime unavailable".to_string()))
    }
}

impl SideChannel for WebSocketSideChannel {
    fn open(&mut self) -> Result<(), AppError> {
        if self.stream.is_some() {
            return Ok(());
        }
        let url = self.url.clone();
        let timeout = self.timeout;
        let stream = self
            .runtime()?
            .block_on(async { tokio::time::timeout(timeout, connect_async(url.as_str())).await })
            .map_err(|_| {
                AppError::SideChannel(format!("connect {url}: no handshake within {timeout:?}"))
            })?
            .map(|(stream, _response)| stream)
            .map_err(|e| AppError::SideChannel(format!("connect {url}: {e}")))?;
        log::debug!("side channel connected to {url}");
        self.stream = Some(stream);
        Ok(())
    }

    fn close(&mut self) {
        let Some(mut stream) = self.stream.take() else {
            return;
        };
        let url = self.url.clone();
        match self.runtime() {
            Ok(rt) => {
                if let Err(e) = rt.block_on(async { stream.close(None).await }) {
                    log::debug!("side channel close handshake with {url} failed: {e}");
                }
            }
            Err(e) => log::debug!("dropping side channel to {url}: {e}"),
        }
        log::debug!("side channel to {url} closed");
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }
}

/// `ws(s)://host[:port]/ws` for an `http(s)` server URL.
pub fn derive_side_channel_url(server_url: &str) -> Option<String> {
    let mut url = Url::parse(server_url.trim()).ok()?;
    let scheme = match url.scheme() {
        "http" => "ws",
        "https" => "wss",
        _ => return None,
    };
    url.set_scheme(scheme).ok()?;
    url.set_path("/ws");
    url.set_query(None);
    url.set_fragment(None);
    Some(url.to_string())
}
