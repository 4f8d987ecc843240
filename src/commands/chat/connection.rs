//! Chat server connection: HTTP login, websocket session, reader task.
//!
//! Login is a plain GET against the server's `/login` endpoint. The
//! websocket session is split: the sink lives behind an async mutex for
//! sending, while a spawned reader task prints every incoming message
//! through the screen engine. When the socket closes — either side — the
//! reader announces it and cancels any pending prompt so the chat
//! program's blocked read unblocks.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures::stream::{SplitSink, StreamExt};
use futures::SinkExt;
use log::{debug, info, warn};
use serde::Deserialize;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::commands::chat::message::{ClientPacket, ServerFrame, display_line};
use crate::core::shell::CommandError;
use crate::screen::Screen;

/// Errors from talking to the chat server.
#[derive(Debug)]
pub enum ChatError {
    /// The login endpoint answered with a non-success status.
    Http { status: u16, message: String },
    /// Network-level failure (DNS, refused connection, broken socket).
    Network(String),
    /// The server sent something we could not make sense of.
    Protocol(String),
    /// The connection is already gone.
    Closed,
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatError::Http { status, message } => {
                write!(f, "Failed to login (HTTP {status}): {message}")
            }
            ChatError::Network(msg) => write!(f, "network error: {msg}"),
            ChatError::Protocol(msg) => write!(f, "protocol error: {msg}"),
            ChatError::Closed => write!(f, "connection closed"),
        }
    }
}

impl std::error::Error for ChatError {}

impl From<ChatError> for CommandError {
    fn from(err: ChatError) -> Self {
        CommandError::new(err.to_string())
    }
}

/// Successful login response. The server may rename anonymous users.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginInfo {
    pub username: String,
    pub token: String,
}

/// Log in with a username. `auth_base` is the `https://host` part; the
/// `/login` path is appended here.
pub async fn login(
    client: &reqwest::Client,
    auth_base: &str,
    username: &str,
) -> Result<LoginInfo, ChatError> {
    let response = client
        .get(format!("{auth_base}/login"))
        .query(&[("username", username)])
        .send()
        .await
        .map_err(|err| ChatError::Network(err.to_string()))?;

    if response.status().is_success() {
        response
            .json()
            .await
            .map_err(|err| ChatError::Protocol(err.to_string()))
    } else {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_default()
            .trim()
            .to_string();
        Err(ChatError::Http { status, message })
    }
}

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// A live chat session.
pub struct ChatConnection {
    sink: Mutex<WsSink>,
    closed: Arc<AtomicBool>,
    print_server_messages: Arc<AtomicBool>,
    reader: JoinHandle<()>,
}

/// Connect to `{ws_url}?token=…` and spawn the reader task.
///
/// `print_server_messages` is the reader's initial mute state; the chat
/// program connects muted so backlog does not interleave with its own
/// connect progress output, then unmutes.
pub async fn connect(
    ws_url: &str,
    token: &str,
    screen: Screen,
    print_server_messages: bool,
) -> Result<ChatConnection, ChatError> {
    let url = format!("{ws_url}?token={token}");
    let (stream, _response) = connect_async(url.as_str())
        .await
        .map_err(|err| ChatError::Network(err.to_string()))?;
    info!("Connected to chat server");

    let (sink, mut source) = stream.split();
    let closed = Arc::new(AtomicBool::new(false));
    let print_server_messages = Arc::new(AtomicBool::new(print_server_messages));

    let reader = tokio::spawn({
        let closed = Arc::clone(&closed);
        let allow_print = Arc::clone(&print_server_messages);
        async move {
            while let Some(next) = source.next().await {
                match next {
                    Ok(Message::Text(raw)) => {
                        match serde_json::from_str::<ServerFrame>(raw.as_str()) {
                            Ok(frame) => {
                                if allow_print.load(Ordering::Relaxed) {
                                    for message in &frame.messages {
                                        screen.print(&display_line(message)).await;
                                    }
                                }
                            }
                            Err(err) => warn!("Ignoring malformed server frame: {err}"),
                        }
                    }
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(err) => {
                        warn!("Chat socket error: {err}");
                        break;
                    }
                }
            }
            closed.store(true, Ordering::Relaxed);
            screen.print("Connection closed.\n").await;
            // Unblock whatever prompt the chat program is waiting on.
            screen.cancel_prompt(None);
        }
    });

    Ok(ChatConnection {
        sink: Mutex::new(sink),
        closed,
        print_server_messages,
        reader,
    })
}

impl ChatConnection {
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Relaxed)
    }

    pub fn set_print_server_messages(&self, allow: bool) {
        self.print_server_messages.store(allow, Ordering::Relaxed);
    }

    /// Send one packet as a JSON text frame.
    pub async fn send(&self, packet: &ClientPacket) -> Result<(), ChatError> {
        if self.is_closed() {
            return Err(ChatError::Closed);
        }
        let raw =
            serde_json::to_string(packet).map_err(|err| ChatError::Protocol(err.to_string()))?;
        self.sink
            .lock()
            .await
            .send(Message::text(raw))
            .await
            .map_err(|err| {
                self.closed.store(true, Ordering::Relaxed);
                ChatError::Network(err.to_string())
            })
    }

    /// Close the session: send a close frame, then wait for the reader to
    /// drain (it prints the closing notice). A reader that never sees the
    /// server's side of the handshake is aborted after a grace period.
    pub async fn close(self) {
        let frame = CloseFrame {
            code: CloseCode::Normal,
            reason: "User closing connection.".into(),
        };
        if let Err(err) = self.sink.lock().await.send(Message::Close(Some(frame))).await {
            debug!("Close frame not sent: {err}");
        }
        let abort = self.reader.abort_handle();
        if tokio::time::timeout(Duration::from_secs(5), self.reader)
            .await
            .is_err()
        {
            warn!("Chat reader did not shut down in time");
            abort.abort();
        }
    }
}
