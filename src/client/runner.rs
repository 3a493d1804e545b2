//! Display client runner
//!
//! Drives a [`ClientSubscriber`] over real connections: snapshots over REST
//! with `reqwest`, notifications over the WebSocket channel with
//! `tokio-tungstenite`. Reconnects after a fixed delay, forever.

use std::time::Duration;

use futures::{Sink, SinkExt, StreamExt};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use super::subscriber::{ClientSubscriber, Command};
use crate::api::websocket::events::{CalledTicket, ServerMessage};
use crate::config::ClientConfig;
use crate::error::{QueueError, QueueResult};
use crate::types::DisplayItem;

const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// What the view should show next
#[derive(Debug)]
pub enum ClientEvent<'a> {
    /// Channel is down, show a connecting indicator
    Connecting,
    /// A fresh snapshot arrived
    Snapshot(&'a [DisplayItem]),
    /// A number was called
    Called(&'a CalledTicket),
}

/// Network side of a display or counter view
pub struct DisplayClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl DisplayClient {
    pub fn new(config: ClientConfig) -> QueueResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| QueueError::Config(format!("HTTP client: {}", e)))?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// GET the full display snapshot
    pub async fn fetch_snapshot(&self) -> Result<Vec<DisplayItem>, reqwest::Error> {
        self.http
            .get(self.config.display_url())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    /// Connect, subscribe and refresh until the process stops
    pub async fn run<F>(&self, mut on_event: F)
    where
        F: FnMut(ClientEvent<'_>),
    {
        let mut subscriber = ClientSubscriber::new(self.config.topic);
        let ws_url = self.config.ws_url();

        loop {
            on_event(ClientEvent::Connecting);

            match connect_async(ws_url.as_str()).await {
                Ok((socket, _)) => {
                    tracing::info!(url = %ws_url, topic = %self.config.topic, "Channel connected");
                    let (mut sink, mut stream) = socket.split();

                    let commands = subscriber.on_connected();
                    let mut alive = self
                        .execute(commands, &mut subscriber, &mut sink, &mut on_event)
                        .await;

                    while alive {
                        match stream.next().await {
                            Some(Ok(Message::Text(text))) => {
                                match serde_json::from_str::<ServerMessage>(&text) {
                                    Ok(message) => {
                                        let commands = subscriber.on_message(&message);
                                        alive = self
                                            .execute(commands, &mut subscriber, &mut sink, &mut on_event)
                                            .await;
                                    }
                                    Err(e) => tracing::debug!(error = %e, "Ignoring unknown frame"),
                                }
                            }
                            Some(Ok(Message::Close(_))) | None => alive = false,
                            Some(Ok(_)) => {}
                            Some(Err(e)) => {
                                tracing::warn!(error = %e, "Channel error");
                                alive = false;
                            }
                        }
                    }

                    subscriber.on_disconnected();
                    tracing::warn!("Channel disconnected");
                }
                Err(e) => {
                    tracing::warn!(url = %ws_url, error = %e, "Channel connect failed");
                }
            }

            tokio::time::sleep(self.config.reconnect_delay).await;
            subscriber.on_reconnecting();
        }
    }

    /// Carry out subscriber commands. Returns false if the channel broke.
    async fn execute<S, F>(
        &self,
        commands: Vec<Command>,
        subscriber: &mut ClientSubscriber,
        sink: &mut S,
        on_event: &mut F,
    ) -> bool
    where
        S: Sink<Message> + Unpin,
        S::Error: std::fmt::Display,
        F: FnMut(ClientEvent<'_>),
    {
        for command in commands {
            match command {
                Command::Fetch => {
                    let result = self.fetch_snapshot().await;
                    if subscriber.apply_fetch(result) {
                        on_event(ClientEvent::Snapshot(subscriber.snapshot()));
                    }
                }
                Command::Send(message) => {
                    let json = match serde_json::to_string(&message) {
                        Ok(json) => json,
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to encode client message");
                            continue;
                        }
                    };
                    if let Err(e) = sink.send(Message::Text(json)).await {
                        tracing::warn!(error = %e, "Channel send failed");
                        return false;
                    }
                }
                Command::Announce(called) => on_event(ClientEvent::Called(&called)),
            }
        }
        true
    }
}
