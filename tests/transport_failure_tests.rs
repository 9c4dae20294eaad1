//! Transport failures: exactly one `on_failure`, frames received before
//! the failure still dispatched, and no sends afterwards.

mod mock_transport;

use std::sync::Arc;
use std::time::Duration;

use mock_transport::{MockTransport, Recorder, open_speech, test_config};
use serde_json::json;
use tokio_test::{assert_err, assert_ok};

use coze_ws::core::websocket::ConnectRequest;
use coze_ws::{
    CozeWebsockets, SessionState, SpeechCallbackHandler, SpeechProtocol, WebsocketClient,
    WebsocketError,
};

#[tokio::test]
async fn test_socket_error_fails_session_once() {
    let recorder = Recorder::new();
    let (client, peer) = open_speech(recorder.clone()).await;

    for delta in ["AAAA", "AAEC", "AQID"] {
        peer.send_json(json!({"type": "speech.audio.update", "data": {"delta": delta}}));
    }
    peer.fail("connection reset by peer");
    client.join().await;

    let entries = recorder.entries();
    assert_eq!(entries.len(), 4, "{entries:?}");
    assert_eq!(entries[0], "speech.audio.update:AAAA");
    assert_eq!(entries[1], "speech.audio.update:AAEC");
    assert_eq!(entries[2], "speech.audio.update:AQID");
    assert!(entries[3].starts_with("on_failure:TransportFailure"));
    assert!(entries[3].contains("connection reset by peer"));
    assert_eq!(client.state(), SessionState::Failed);

    let err = assert_err!(client.input_text_buffer_append("after failure").await);
    assert!(matches!(err, WebsocketError::SendError(_)));

    // Closing a failed session does nothing
    assert_ok!(client.close().await);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(recorder.entries().len(), 4);
}

#[tokio::test]
async fn test_drop_without_close_frame_is_abnormal() {
    let recorder = Recorder::new();
    let (client, peer) = open_speech(recorder.clone()).await;

    peer.drop_connection();
    client.join().await;

    let failures = recorder.matching("on_failure");
    assert_eq!(failures.len(), 1);
    assert!(failures[0].contains("1006"), "{failures:?}");
    assert!(recorder.matching("on_closed").is_empty());
    assert_eq!(client.state(), SessionState::Failed);
}

#[tokio::test]
async fn test_broken_pipe_on_send_fails_session() {
    let recorder = Recorder::new();
    let (client, mut peer) = open_speech(recorder.clone()).await;

    peer.stop_reading();

    let err = assert_err!(client.input_text_buffer_append("hello").await);
    assert!(matches!(err, WebsocketError::SendError(_)));

    client.join().await;
    assert_eq!(recorder.matching("on_failure").len(), 1);
    assert_eq!(client.state(), SessionState::Failed);

    let err = assert_err!(client.input_text_buffer_complete().await);
    assert!(matches!(err, WebsocketError::SendError(_)));
    assert_eq!(recorder.matching("on_failure").len(), 1);
}

#[tokio::test]
async fn test_handshake_failure_is_connection_error() {
    let recorder = Recorder::new();
    let coze = CozeWebsockets::with_transport(test_config(), MockTransport::refusing()).unwrap();

    let err = assert_err!(coze.speech(recorder.clone()).await);
    assert!(matches!(err, WebsocketError::ConnectionError(_)));
    assert!(recorder.entries().is_empty());
}

#[tokio::test]
async fn test_invalid_configuration_rejected() {
    let mut config = test_config();
    config.ws_base_url = "https://ws.test.local".to_string();
    let (transport, _peers) = MockTransport::new();

    let err = assert_err!(CozeWebsockets::with_transport(config, transport));
    assert!(matches!(err, WebsocketError::InvalidConfiguration(_)));
}

#[tokio::test]
async fn test_zero_queue_capacity_rejected() {
    let (transport, _peers) = MockTransport::new();
    let handler: Arc<dyn SpeechCallbackHandler> = Recorder::new();
    let request = ConnectRequest::new(
        "wss://ws.test.local/v1/audio/speech".parse().unwrap(),
        Duration::from_secs(1),
    );

    let err = assert_err!(
        WebsocketClient::<SpeechProtocol>::open(transport.as_ref(), request, handler, 0).await
    );
    assert!(matches!(err, WebsocketError::InvalidConfiguration(_)));
}
