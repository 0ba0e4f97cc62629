//! WebSocket push channel.
//!
//! `run_event_stream` keeps one connection to `/ws` alive for the lifetime of
//! the session: every close, error or failed connect is reported as
//! `StreamEvent::Disconnected` and retried after exactly `RECONNECT_DELAY`,
//! with no backoff and no attempt cap.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc::UnboundedSender;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};
use url::Url;

use crate::types::errors::TransportError;
use crate::types::events::{InboundFrame, StreamEvent};

pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Derives the WebSocket endpoint from the HTTP base: `http -> ws`,
/// `https -> wss`, path `/ws`.
pub fn ws_url_for(base: &Url) -> Result<Url, TransportError> {
    let scheme = match base.scheme() {
        "https" => "wss",
        "http" => "ws",
        other => {
            return Err(TransportError::Network(format!(
                "unsupported scheme `{}` for event stream",
                other
            )))
        }
    };
    let mut ws = base.clone();
    ws.set_scheme(scheme)
        .map_err(|_| TransportError::Network(format!("cannot derive {} url", scheme)))?;
    ws.set_path("/ws");
    ws.set_query(None);
    ws.set_fragment(None);
    Ok(ws)
}

/// An open connection yielding text frames.
#[async_trait]
pub trait FrameSource: Send {
    /// The next text frame, or `None` once the peer closed the connection.
    async fn next_text(&mut self) -> Option<Result<String, TransportError>>;
}

/// Opens connections for the reconnect loop.
#[async_trait]
pub trait FrameConnector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn FrameSource>, TransportError>;
}

/// tokio-tungstenite connector used by the binary.
#[derive(Debug, Clone)]
pub struct TungsteniteConnector {
    url: Url,
}

impl TungsteniteConnector {
    pub fn new(url: Url) -> Self {
        Self { url }
    }
}

struct TungsteniteSource {
    inner: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl FrameSource for TungsteniteSource {
    async fn next_text(&mut self) -> Option<Result<String, TransportError>> {
        while let Some(msg) = self.inner.next().await {
            match msg {
                Ok(Message::Text(text)) => return Some(Ok(text.to_string())),
                Ok(Message::Close(_)) => return None,
                // ping/pong are answered by tungstenite; binary frames are not part of the protocol
                Ok(_) => continue,
                Err(e) => return Some(Err(TransportError::Network(e.to_string()))),
            }
        }
        None
    }
}

#[async_trait]
impl FrameConnector for TungsteniteConnector {
    async fn connect(&self) -> Result<Box<dyn FrameSource>, TransportError> {
        let (inner, _resp) = tokio_tungstenite::connect_async(self.url.as_str())
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(Box::new(TungsteniteSource { inner }))
    }
}

/// Runs the connect / read / reconnect loop until the receiver goes away.
pub async fn run_event_stream<C: FrameConnector>(connector: C, tx: UnboundedSender<StreamEvent>) {
    loop {
        match connector.connect().await {
            Ok(mut source) => {
                info!("event stream connected");
                if tx.send(StreamEvent::Connected).is_err() {
                    return;
                }
                while let Some(frame) = source.next_text().await {
                    let text = match frame {
                        Ok(text) => text,
                        Err(e) => {
                            warn!(error = %e, "event stream read failed");
                            break;
                        }
                    };
                    match InboundFrame::parse(&text) {
                        Ok(InboundFrame::Progress(event)) => {
                            if tx.send(StreamEvent::Progress(event)).is_err() {
                                return;
                            }
                        }
                        Ok(InboundFrame::Other) => debug!("ignoring non-progress frame"),
                        Err(e) => warn!(error = %e, "ignoring malformed frame"),
                    }
                }
                info!("event stream closed");
            }
            Err(e) => warn!(error = %e, "event stream connect failed"),
        }

        if tx.send(StreamEvent::Disconnected).is_err() {
            return;
        }
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}
