//! RTM websocket stream.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use super::ClientError;
use crate::objects::rtm::{RtmFrame, RtmPing};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// An open RTM socket yielding decoded frames.
///
/// Transport pings are answered by tungstenite; application keepalives are
/// sent with [`ping`](Self::ping).
pub struct RtmStream {
    socket: WsStream,
    next_ping_id: u64,
}

impl RtmStream {
    /// Connect to the websocket URL returned by `rtm.connect`.
    pub async fn connect(url: &str) -> Result<Self, ClientError> {
        let (socket, _response) = connect_async(url).await?;
        Ok(Self {
            socket,
            next_ping_id: 1,
        })
    }

    /// Wait for the next frame.
    ///
    /// Returns `None` when the server closes the connection. A frame that
    /// fails to decode yields `Some(Err(ClientError::Decode(_)))`; the
    /// stream remains usable afterwards.
    ///
    /// Cancel-safe: nothing is written here. Transport pings are queued for
    /// a pong by tungstenite and flushed on the next read or write.
    pub async fn next_frame(&mut self) -> Option<Result<RtmFrame, ClientError>> {
        loop {
            let message = match self.socket.next().await? {
                Ok(message) => message,
                Err(e) => return Some(Err(e.into())),
            };
            match message {
                WsMessage::Text(text) => {
                    return Some(RtmFrame::decode(&text).map_err(ClientError::from));
                }
                WsMessage::Close(_) => return None,
                // Ping, Pong, Binary, Frame
                _ => {}
            }
        }
    }

    /// Send an RTM keepalive `ping`.
    pub async fn ping(&mut self) -> Result<(), ClientError> {
        let ping = RtmPing::new(self.next_ping_id);
        self.next_ping_id += 1;
        let text = serde_json::to_string(&ping)?;
        self.socket.send(WsMessage::Text(text)).await?;
        Ok(())
    }

    /// Close the socket politely.
    pub async fn close(mut self) -> Result<(), ClientError> {
        self.socket.close(None).await?;
        Ok(())
    }
}
