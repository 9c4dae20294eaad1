//! Sub-protocol binding and the lifecycle half of every callback handler.

use async_trait::async_trait;

use super::base::WebsocketError;
use super::catalog::EventCatalog;
use super::session::WebsocketClient;

/// Binds the generic session engine to one realtime sub-protocol.
///
/// A protocol names its endpoint path, owns the catalog of downstream
/// events it understands, and routes each decoded event to the matching
/// method of its handler trait.
#[async_trait]
pub trait Protocol: Sized + Send + Sync + 'static {
    /// Tagged union of every downstream event in the catalog.
    type Event: Send + 'static;

    /// Callback surface supplied by the caller.
    type Handler: ?Sized + BaseCallbackHandler<Self> + 'static;

    /// Short name used in logs.
    const NAME: &'static str;

    /// Endpoint path appended to the configured WebSocket host.
    const PATH: &'static str;

    fn catalog() -> &'static EventCatalog<Self::Event>;

    /// Invoke the handler method matching `event`.
    async fn dispatch(client: &WebsocketClient<Self>, handler: &Self::Handler, event: Self::Event);
}

/// Lifecycle callbacks shared by every sub-protocol handler.
///
/// All methods have logging defaults, so implementors only override what
/// they care about. Methods are only ever invoked from the session's
/// dispatch worker, one at a time.
#[async_trait]
pub trait BaseCallbackHandler<P: Protocol>: Send + Sync {
    /// A frame could not be decoded, or a callback panicked. The session
    /// stays open.
    async fn on_client_exception(&self, client: &WebsocketClient<P>, error: WebsocketError) {
        tracing::warn!(
            protocol = P::NAME,
            url = %client.url(),
            error = %error,
            "Client exception"
        );
    }

    /// The session started closing, either locally or because the peer
    /// sent a close frame.
    async fn on_closing(&self, client: &WebsocketClient<P>, code: u16, reason: &str) {
        tracing::debug!(protocol = P::NAME, url = %client.url(), code, reason, "Session closing");
    }

    /// The session is closed. Terminal.
    async fn on_closed(&self, client: &WebsocketClient<P>, code: u16, reason: &str) {
        tracing::info!(protocol = P::NAME, url = %client.url(), code, reason, "Session closed");
    }

    /// The transport failed. Terminal.
    async fn on_failure(&self, client: &WebsocketClient<P>, error: WebsocketError) {
        tracing::error!(
            protocol = P::NAME,
            url = %client.url(),
            error = %error,
            "Session failed"
        );
    }
}
