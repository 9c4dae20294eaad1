//! Physical WebSocket transport.
//!
//! The session engine never talks to `tokio-tungstenite` directly. It asks
//! a [`Transport`] for a connected sink/stream pair, which lets tests swap
//! in an in-memory transport while production uses [`TungsteniteTransport`].

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures::{Sink, Stream};
use futures_util::StreamExt;
use http::HeaderValue;
use http::header::{AUTHORIZATION, HeaderMap};
use tokio_tungstenite::tungstenite::{self, Message, client::IntoClientRequest};
use url::Url;

use super::base::{WebsocketError, WebsocketResult};
use crate::utils::user_agent::apply_user_agent_headers;

/// Write half of a connected socket.
pub type FrameSink = Pin<Box<dyn Sink<Message, Error = tungstenite::Error> + Send>>;

/// Read half of a connected socket.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<Message, tungstenite::Error>> + Send>>;

/// Everything a transport needs to open one connection.
#[derive(Debug, Clone)]
pub struct ConnectRequest {
    pub url: Url,
    pub headers: HeaderMap,
    pub connect_timeout: Duration,
}

impl ConnectRequest {
    pub fn new(url: Url, connect_timeout: Duration) -> Self {
        Self {
            url,
            headers: HeaderMap::new(),
            connect_timeout,
        }
    }

    /// Attach `Authorization: Bearer <token>`.
    pub fn with_bearer_token(mut self, token: &str) -> WebsocketResult<Self> {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| WebsocketError::config("API token contains invalid header characters"))?;
        value.set_sensitive(true);
        self.headers.insert(AUTHORIZATION, value);
        Ok(self)
    }

    /// Attach the client identification headers.
    pub fn with_user_agent(mut self, suffix: Option<&str>) -> Self {
        apply_user_agent_headers(&mut self.headers, suffix);
        self
    }
}

/// Opens duplex connections for sessions.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Complete the handshake and hand back both halves of the socket.
    ///
    /// Must fail with [`WebsocketError::ConnectionError`] if the handshake
    /// does not complete within `request.connect_timeout`.
    async fn connect(&self, request: ConnectRequest) -> WebsocketResult<(FrameSink, FrameStream)>;
}

/// Production transport over `tokio-tungstenite` with rustls.
#[derive(Debug, Clone, Copy, Default)]
pub struct TungsteniteTransport;

impl TungsteniteTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for TungsteniteTransport {
    async fn connect(&self, request: ConnectRequest) -> WebsocketResult<(FrameSink, FrameStream)> {
        let mut ws_request = request
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| WebsocketError::connection(e.to_string()))?;
        ws_request.headers_mut().extend(request.headers);

        let connect = tokio_tungstenite::connect_async(ws_request);
        let (ws_stream, response) = tokio::time::timeout(request.connect_timeout, connect)
            .await
            .map_err(|_| {
                WebsocketError::connection(format!(
                    "handshake with {} timed out after {}ms",
                    request.url,
                    request.connect_timeout.as_millis()
                ))
            })?
            .map_err(|e| WebsocketError::connection(e.to_string()))?;

        tracing::debug!(
            url = %request.url,
            status = %response.status(),
            "WebSocket handshake completed"
        );

        let (ws_sink, ws_stream) = ws_stream.split();
        Ok((Box::pin(ws_sink), Box::pin(ws_stream)))
    }
}
