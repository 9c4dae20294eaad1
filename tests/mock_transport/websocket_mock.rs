//! Real WebSocket server for end-to-end session tests
//!
//! Speaks just enough of the speech sub-protocol to drive a session over
//! a real TCP socket: it announces `speech.created`, answers
//! `input_text_buffer.complete` with a burst of audio chunks, and records
//! what the client sent.

use std::net::SocketAddr;
use std::sync::Arc;

use base64::prelude::*;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};

/// How the server behaves after the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerScript {
    /// Answer a committed text buffer with `chunks` audio updates
    Speech { chunks: usize },
    /// Send `speech.created`, then drop the TCP connection without a close frame
    DropAfterCreated,
}

/// What the server observed on one connection.
#[derive(Debug, Default, Clone)]
pub struct ServerLog {
    pub path_and_query: String,
    pub headers: Vec<(String, String)>,
    /// `type` of every text frame the client sent
    pub received: Vec<String>,
    /// Close code sent by the client, if it closed
    pub close_code: Option<u16>,
}

impl ServerLog {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

pub struct WebSocketMockServer {
    pub addr: SocketAddr,
    pub log: Arc<Mutex<ServerLog>>,
    handle: JoinHandle<()>,
}

impl WebSocketMockServer {
    /// Bind to an ephemeral localhost port and serve one connection.
    pub async fn start(script: ServerScript) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let log = Arc::new(Mutex::new(ServerLog::default()));

        let conn_log = log.clone();
        let handle = tokio::spawn(async move {
            if let Ok((stream, _)) = listener.accept().await {
                if let Err(e) = handle_connection(stream, script, conn_log).await {
                    eprintln!("mock server connection ended with error: {e}");
                }
            }
        });

        Self { addr, log, handle }
    }

    pub fn base_url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    pub fn log(&self) -> ServerLog {
        self.log.lock().clone()
    }

    /// Wait for the connection handler to finish.
    pub async fn finished(self) -> ServerLog {
        let _ = tokio::time::timeout(super::WAIT, self.handle).await;
        self.log.lock().clone()
    }
}

/// A listener that accepts TCP connections but never completes a handshake.
pub async fn start_silent_listener() -> (SocketAddr, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });
    (addr, handle)
}

async fn handle_connection(
    stream: TcpStream,
    script: ServerScript,
    log: Arc<Mutex<ServerLog>>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let handshake_log = log.clone();
    let ws_stream = accept_hdr_async(stream, move |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
        let mut log = handshake_log.lock();
        log.path_and_query = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_default();
        log.headers = req
            .headers()
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();
        Ok(resp)
    })
    .await?;
    let (mut write, mut read) = ws_stream.split();

    write
        .send(Message::Text(event("speech.created", None).into()))
        .await?;

    if script == ServerScript::DropAfterCreated {
        // Dropping both halves closes the TCP stream without a close frame
        return Ok(());
    }

    let ServerScript::Speech { chunks } = script else {
        return Ok(());
    };

    while let Some(msg) = read.next().await {
        match msg? {
            Message::Text(text) => {
                let value: Value = serde_json::from_str(text.as_str())?;
                let event_type = value["type"].as_str().unwrap_or_default().to_string();
                log.lock().received.push(event_type.clone());

                if event_type == "input_text_buffer.complete" {
                    write
                        .send(Message::Text(event("input_text_buffer.completed", None).into()))
                        .await?;
                    for i in 0..chunks {
                        let pcm = [(i % 256) as u8, 0u8];
                        let delta = BASE64_STANDARD.encode(pcm);
                        write
                            .send(Message::Text(
                                event("speech.audio.update", Some(json!({"delta": delta}))).into(),
                            ))
                            .await?;
                    }
                    write
                        .send(Message::Text(event("speech.audio.completed", None).into()))
                        .await?;
                }
            }
            Message::Close(frame) => {
                log.lock().close_code = frame.map(|f| u16::from(f.code));
                break;
            }
            Message::Ping(data) => write.send(Message::Pong(data)).await?,
            _ => {}
        }
    }

    Ok(())
}

fn event(event_type: &str, data: Option<Value>) -> String {
    let mut frame = json!({
        "id": format!("srv-{event_type}"),
        "type": event_type,
        "detail": {"logid": "mock-logid"}
    });
    if let Some(data) = data {
        frame["data"] = data;
    }
    frame.to_string()
}
