//! Entry point that opens realtime sessions for one configured account.

use std::fmt;
use std::sync::Arc;

use tracing::debug;
use url::Url;

use crate::config::ClientConfig;
use crate::core::audio::speech::{SpeechCallbackHandler, SpeechProtocol};
use crate::core::audio::transcriptions::{TranscriptionsCallbackHandler, TranscriptionsProtocol};
use crate::core::chat::{ChatCallbackHandler, ChatCreateRequest, ChatProtocol};
use crate::core::websocket::{
    ConnectRequest, Protocol, Transport, TungsteniteTransport, WebsocketClient, WebsocketError,
    WebsocketResult,
};
use crate::utils::url_validation::{build_endpoint_url, validate_ws_base_url};

/// Opens speech, transcription and chat sessions.
///
/// Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct CozeWebsockets {
    config: ClientConfig,
    base_url: Url,
    transport: Arc<dyn Transport>,
}

impl CozeWebsockets {
    /// Validate `config` and use the production transport.
    pub fn new(config: ClientConfig) -> WebsocketResult<Self> {
        Self::with_transport(config, Arc::new(TungsteniteTransport::new()))
    }

    /// Validate `config` and open sessions through `transport`.
    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> WebsocketResult<Self> {
        config.validate().map_err(WebsocketError::InvalidConfiguration)?;
        let base_url = validate_ws_base_url(&config.ws_base_url)
            .map_err(|e| WebsocketError::config(e.to_string()))?;

        Ok(Self {
            config,
            base_url,
            transport,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Open a speech synthesis session.
    pub async fn speech(
        &self,
        handler: Arc<dyn SpeechCallbackHandler>,
    ) -> WebsocketResult<WebsocketClient<SpeechProtocol>> {
        self.open::<SpeechProtocol>(&[], handler).await
    }

    /// Open a transcription session.
    pub async fn transcriptions(
        &self,
        handler: Arc<dyn TranscriptionsCallbackHandler>,
    ) -> WebsocketResult<WebsocketClient<TranscriptionsProtocol>> {
        self.open::<TranscriptionsProtocol>(&[], handler).await
    }

    /// Open a chat session against `request.bot_id`.
    pub async fn chat(
        &self,
        request: ChatCreateRequest,
        handler: Arc<dyn ChatCallbackHandler>,
    ) -> WebsocketResult<WebsocketClient<ChatProtocol>> {
        let query = request.query_pairs()?;
        self.open::<ChatProtocol>(&query, handler).await
    }

    async fn open<P: Protocol>(
        &self,
        query: &[(&str, &str)],
        handler: Arc<P::Handler>,
    ) -> WebsocketResult<WebsocketClient<P>> {
        let url = build_endpoint_url(&self.base_url, P::PATH, query);
        debug!(protocol = P::NAME, url = %url, "Building connect request");

        let request = ConnectRequest::new(url, self.config.connect_timeout())
            .with_bearer_token(&self.config.api_token)?
            .with_user_agent(self.config.user_agent_suffix.as_deref());

        WebsocketClient::<P>::open(
            self.transport.as_ref(),
            request,
            handler,
            self.config.dispatch_queue_capacity,
        )
        .await
    }
}

impl fmt::Debug for CozeWebsockets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CozeWebsockets")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
