//! StreamRelay processor.
//!
//! The StreamRelay is responsible for:
//! - Opening an RTM connection (`rtm.connect` + websocket)
//! - Feeding the connection-established event and every workspace event to
//!   the `Dispatcher`, one at a time in arrival order
//! - Publishing whatever the dispatcher renders, logging and dropping
//!   failures
//! - Reconnecting with exponential backoff (1s doubling to 30s), clearing the
//!   session domain until the next connection re-learns it
//! - Stopping for good when the credentials are rejected

use crate::processors::{Dispatcher, NotificationSink};
use kanau::processor::Processor;
use notico_sdk::client::{ClientError, RtmStream, SlackClient};
use notico_sdk::objects::{Connected, RtmFrame, SlackEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Initial backoff delay for reconnection.
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Maximum backoff delay cap for reconnection.
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Interval between RTM keepalive pings.
const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// Why [`StreamRelay::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayExit {
    /// The shutdown signal fired.
    Shutdown,
    /// Slack rejected the token; reconnecting would not help.
    InvalidCredentials,
}

/// Reason a single connection ended.
enum ConnectionExit {
    Shutdown,
    Disconnect,
}

/// Relays RTM events to the notification channel.
pub struct StreamRelay {
    client: SlackClient,
    dispatcher: Dispatcher,
    sink: Arc<dyn NotificationSink>,
}

impl StreamRelay {
    pub fn new(client: SlackClient, dispatcher: Dispatcher, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            client,
            dispatcher,
            sink,
        }
    }

    /// Run until shutdown is signaled or the credentials are rejected.
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>) -> RelayExit {
        info!("StreamRelay started");
        let mut backoff = Backoff::new();

        loop {
            if *shutdown_rx.borrow() {
                info!("StreamRelay received shutdown signal");
                return RelayExit::Shutdown;
            }

            let delay = match self.connect_and_run(&mut shutdown_rx).await {
                Ok(ConnectionExit::Shutdown) => {
                    info!("StreamRelay received shutdown signal");
                    return RelayExit::Shutdown;
                }
                Ok(ConnectionExit::Disconnect) => {
                    info!("Disconnected, reconnecting after backoff");
                    backoff.after_disconnect()
                }
                Err(e) if e.is_auth_failure() => {
                    error!(error = %e, "Invalid credentials");
                    return RelayExit::InvalidCredentials;
                }
                Err(e) => {
                    let delay = backoff.after_error();
                    warn!(
                        error = %e,
                        backoff_secs = delay.as_secs(),
                        "Connection error, reconnecting after backoff"
                    );
                    delay
                }
            };

            self.dispatcher.session().reset().await;

            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("Shutdown during backoff");
                        return RelayExit::Shutdown;
                    }
                }
            }
        }
    }

    /// Connect once and relay frames until the connection ends.
    async fn connect_and_run(
        &self,
        shutdown_rx: &mut watch::Receiver<bool>,
    ) -> Result<ConnectionExit, ClientError> {
        let connection = self.client.rtm_connect().await?;
        let mut stream = RtmStream::connect(&connection.url).await?;
        info!(
            team = %connection.team.name,
            team_domain = %connection.team.domain,
            "RTM connected"
        );

        self.relay(SlackEvent::Connected(Connected {
            team_domain: connection.team.domain,
        }))
        .await;

        let mut keepalive = tokio::time::interval(KEEPALIVE_INTERVAL);
        keepalive.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately.
        keepalive.tick().await;

        let exit = loop {
            tokio::select! {
                frame = stream.next_frame() => match frame {
                    None => {
                        info!("RTM stream ended");
                        break ConnectionExit::Disconnect;
                    }
                    Some(Ok(RtmFrame::Event(event))) => self.relay(event).await,
                    Some(Ok(RtmFrame::Hello)) => debug!("RTM hello"),
                    Some(Ok(RtmFrame::Goodbye)) => {
                        info!("RTM goodbye received");
                        break ConnectionExit::Disconnect;
                    }
                    Some(Ok(RtmFrame::Error { code, msg })) => {
                        warn!(code, msg = %msg, "RTM error frame");
                    }
                    Some(Ok(RtmFrame::Pong { .. } | RtmFrame::Reply { .. })) => {}
                    Some(Err(ClientError::Decode(e))) => {
                        warn!(error = %e, "Failed to decode RTM frame");
                    }
                    Some(Err(e)) => return Err(e),
                },
                _ = keepalive.tick() => stream.ping().await?,
                changed = shutdown_rx.changed() => {
                    // A dropped sender counts as shutdown.
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break ConnectionExit::Shutdown;
                    }
                }
            }
        };

        if let Err(e) = stream.close().await {
            debug!(error = %e, "Failed to close RTM stream");
        }
        Ok(exit)
    }

    /// Dispatch one event and publish its notification, if any.
    async fn relay(&self, event: SlackEvent) {
        let outcome = self.dispatcher.process(event).await;
        let Some(notification) = outcome.unwrap_or_default() else {
            return;
        };
        if let Err(e) = self.sink.publish(&notification).await {
            error!(error = %e, text = %notification.text, "Failed to publish notification");
        }
    }
}

/// Reconnect delays: errors double the wait up to [`MAX_BACKOFF`], a clean
/// disconnect starts over at [`INITIAL_BACKOFF`].
#[derive(Debug)]
struct Backoff {
    next: Duration,
}

impl Backoff {
    fn new() -> Self {
        Self {
            next: INITIAL_BACKOFF,
        }
    }

    fn after_disconnect(&mut self) -> Duration {
        self.next = INITIAL_BACKOFF;
        INITIAL_BACKOFF
    }

    fn after_error(&mut self) -> Duration {
        let delay = self.next;
        self.next = (delay * 2).min(MAX_BACKOFF);
        delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionState;
    use crate::testing::RecordingSink;
    use futures_util::{SinkExt, StreamExt};
    use notico_sdk::objects::{Bot, BotAdded, MessageEvent};
    use tokio::net::{TcpListener, TcpStream};
    use tokio_tungstenite::tungstenite::Message as WsMessage;
    use tokio_tungstenite::{WebSocketStream, accept_async};
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn relay_with(sink: RecordingSink, base: &str) -> StreamRelay {
        StreamRelay::new(
            SlackClient::new(Url::parse(base).unwrap(), "xoxb-test"),
            Dispatcher::new("C0NOTIFY", SessionState::new()),
            Arc::new(sink),
        )
    }

    fn ping_message(text: &str) -> SlackEvent {
        SlackEvent::Message(MessageEvent {
            channel: "C1".into(),
            text: text.into(),
            ..Default::default()
        })
    }

    fn secs(delays: impl IntoIterator<Item = Duration>) -> Vec<u64> {
        delays.into_iter().map(|d| d.as_secs()).collect()
    }

    #[test]
    fn test_backoff_doubles_on_errors() {
        let mut backoff = Backoff::new();
        let delays: Vec<Duration> = (0..7).map(|_| backoff.after_error()).collect();
        assert_eq!(secs(delays), vec![1, 2, 4, 8, 16, 30, 30]);
    }

    #[test]
    fn test_backoff_stays_flat_across_disconnects() {
        let mut backoff = Backoff::new();
        let delays = [
            backoff.after_disconnect(),
            backoff.after_disconnect(),
            backoff.after_disconnect(),
        ];
        assert_eq!(secs(delays), vec![1, 1, 1]);
    }

    #[test]
    fn test_disconnect_restarts_error_backoff() {
        let mut backoff = Backoff::new();
        let delays = [
            backoff.after_error(),
            backoff.after_error(),
            backoff.after_error(),
            backoff.after_disconnect(),
            backoff.after_error(),
            backoff.after_error(),
        ];
        assert_eq!(secs(delays), vec![1, 2, 4, 1, 1, 2]);
    }

    #[tokio::test]
    async fn test_relay_publishes_rendered_events_in_order() {
        let sink = RecordingSink::new();
        let relay = relay_with(sink.clone(), "http://127.0.0.1:9/");

        relay.relay(ping_message("notico:ping")).await;
        relay.relay(ping_message("just chatting")).await;
        relay
            .relay(SlackEvent::Connected(Connected {
                team_domain: "acme".into(),
            }))
            .await;
        relay
            .relay(SlackEvent::BotAdded(BotAdded {
                bot: Bot {
                    id: "B1".into(),
                    name: "deploybot".into(),
                },
            }))
            .await;

        let texts: Vec<String> = sink.published().into_iter().map(|n| n.text).collect();
        assert_eq!(
            texts,
            vec![
                "pong".to_string(),
                "bot deploybot was added https://acme.slack.com/services/B1".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_relay_drops_publish_failures() {
        let sink = RecordingSink::failing("boom");
        let relay = relay_with(sink.clone(), "http://127.0.0.1:9/");
        relay.relay(ping_message("notico:ping")).await;
        relay.relay(ping_message("notico:ping again")).await;
        assert_eq!(sink.calls(), 2);
    }

    #[tokio::test]
    async fn test_run_stops_on_invalid_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rtm.connect"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"ok": false, "error": "invalid_auth"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let sink = RecordingSink::new();
        let relay = relay_with(sink.clone(), &server.uri());
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        let exit = relay.run(shutdown_rx).await;
        assert_eq!(exit, RelayExit::InvalidCredentials);
        assert_eq!(sink.calls(), 0);
    }

    #[tokio::test]
    async fn test_run_exits_when_already_shut_down() {
        let relay = relay_with(RecordingSink::new(), "http://127.0.0.1:9/");
        let (_shutdown_tx, shutdown_rx) = watch::channel(true);
        assert_eq!(relay.run(shutdown_rx).await, RelayExit::Shutdown);
    }

    #[tokio::test]
    async fn test_shutdown_during_backoff() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rtm.connect"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"ok": false, "error": "ratelimited"})),
            )
            .mount(&server)
            .await;

        let relay = relay_with(RecordingSink::new(), &server.uri());
        relay.dispatcher.session().set_team_domain("stale").await;
        let session = relay.dispatcher.session().clone();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(relay.run(shutdown_rx));
        tokio::time::sleep(Duration::from_millis(200)).await;
        shutdown_tx.send(true).unwrap();

        assert_eq!(handle.await.unwrap(), RelayExit::Shutdown);
        assert_eq!(session.team_domain().await, "");
    }

    /// How a scripted RTM connection ends after its frames are sent.
    enum Ending {
        /// Wait for the client to hang up.
        Hold,
        /// Send a close frame.
        Close,
    }

    async fn drain(ws: &mut WebSocketStream<TcpStream>) {
        while let Some(Ok(_)) = ws.next().await {}
    }

    /// Accept one websocket connection per script, in order.
    async fn serve_rtm(listener: TcpListener, scripts: Vec<(Vec<&'static str>, Ending)>) {
        for (frames, ending) in scripts {
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(tcp).await.unwrap();
            for frame in frames {
                ws.send(WsMessage::Text(frame.to_string())).await.unwrap();
            }
            if let Ending::Close = ending {
                let _ = ws.close(None).await;
            }
            drain(&mut ws).await;
        }
    }

    fn rtm_connect_body(ws_url: &str, domain: &str) -> serde_json::Value {
        serde_json::json!({
            "ok": true,
            "url": ws_url,
            "team": {"id": "T1", "name": "Acme", "domain": domain}
        })
    }

    #[tokio::test]
    async fn test_run_relays_live_socket_across_reconnects() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let ws_url = format!("ws://{}", listener.local_addr().unwrap());

        let server = MockServer::start().await;
        for (priority, domain) in [(1, "acme"), (2, "acme-two")] {
            Mock::given(method("POST"))
                .and(path("/rtm.connect"))
                .respond_with(
                    ResponseTemplate::new(200).set_body_json(rtm_connect_body(&ws_url, domain)),
                )
                .up_to_n_times(1)
                .with_priority(priority)
                .mount(&server)
                .await;
        }
        Mock::given(method("POST"))
            .and(path("/rtm.connect"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(rtm_connect_body(&ws_url, "acme-three")),
            )
            .with_priority(3)
            .mount(&server)
            .await;

        let scripts = vec![
            (
                vec![
                    r#"{"type":"hello"}"#,
                    r#"{"type":"bot_added","bot":{"id":"B1","name":"deploybot"}}"#,
                    "definitely not json",
                    r#"{"type":"message","channel":"C1","user":"U1","text":"notico:ping"}"#,
                    r#"{"type":"goodbye"}"#,
                ],
                Ending::Hold,
            ),
            (
                vec![
                    r#"{"type":"hello"}"#,
                    r#"{"type":"bot_added","bot":{"id":"B2","name":"second"}}"#,
                ],
                Ending::Close,
            ),
            (
                vec![
                    r#"{"type":"hello"}"#,
                    r#"{"type":"bot_added","bot":{"id":"B3","name":"third"}}"#,
                ],
                Ending::Hold,
            ),
        ];
        let socket_server = tokio::spawn(serve_rtm(listener, scripts));

        let sink = RecordingSink::new();
        let relay = relay_with(sink.clone(), &server.uri());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(relay.run(shutdown_rx));

        // Two reconnects, each after the 1s initial delay.
        for _ in 0..200 {
            if sink.calls() >= 4 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        shutdown_tx.send(true).unwrap();
        assert_eq!(handle.await.unwrap(), RelayExit::Shutdown);
        socket_server.await.unwrap();

        let texts: Vec<String> = sink.published().into_iter().map(|n| n.text).collect();
        assert_eq!(
            texts,
            vec![
                "bot deploybot was added https://acme.slack.com/services/B1".to_string(),
                "pong".to_string(),
                "bot second was added https://acme-two.slack.com/services/B2".to_string(),
                "bot third was added https://acme-three.slack.com/services/B3".to_string(),
            ]
        );
    }
}
