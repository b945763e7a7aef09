//! Object server loop
//!
//! Consumes transport events from a channel and publishes one response per
//! inbound message. Commands run one at a time, in arrival order.
//!
//! # Example
//!
//! ```rust,ignore
//! use tivo_proxy::{MessageDispatcher, ObjectServer, TransportEvent};
//! use tokio::sync::mpsc;
//!
//! let (event_tx, event_rx) = mpsc::channel(64);
//! let (publish_tx, mut publish_rx) = mpsc::channel(64);
//!
//! let server = ObjectServer::new("PNObjectServer", MessageDispatcher::serve(proxy));
//! tokio::spawn(server.run(event_rx, publish_tx));
//! ```

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::dispatch::MessageDispatcher;
use crate::state::{ConnectionState, StatusEvent};

/// Something delivered by the transport
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// Connection status change
    Status(StatusEvent),
    /// An inbound message, already decoded from JSON
    Message(Value),
    /// Presence notification (ignored)
    Presence(Value),
    /// Stop serving
    Shutdown,
}

/// Serves one object over a transport
#[derive(Debug)]
pub struct ObjectServer<S> {
    name: String,
    dispatcher: MessageDispatcher<S>,
    connection: ConnectionState,
}

impl<S> ObjectServer<S> {
    /// Create a server named `name` around `dispatcher`
    pub fn new(name: impl Into<String>, dispatcher: MessageDispatcher<S>) -> Self {
        Self {
            name: name.into(),
            dispatcher,
            connection: ConnectionState::new(),
        }
    }

    /// Server name, used as the channel identity
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handle on the connection flag; clones observe the server's updates
    pub fn connection(&self) -> ConnectionState {
        self.connection.clone()
    }

    /// Process one event, returning the response to publish, if any
    pub fn handle_event(&self, event: TransportEvent) -> Option<Value> {
        match event {
            TransportEvent::Status(status) => {
                debug!("Status {:?}", status);
                self.connection.apply(&status);
                None
            }
            TransportEvent::Message(message) => {
                Some(self.dispatcher.dispatch(&message).to_value())
            }
            TransportEvent::Presence(_) | TransportEvent::Shutdown => None,
        }
    }

    /// Run until a `Shutdown` event arrives, the event channel closes or the
    /// publish sink goes away
    pub async fn run(self, mut events: mpsc::Receiver<TransportEvent>, publish: mpsc::Sender<Value>) {
        info!("Object server {} started", self.name);

        while let Some(event) = events.recv().await {
            if event == TransportEvent::Shutdown {
                info!("Shutdown requested");
                break;
            }
            let Some(response) = self.handle_event(event) else {
                continue;
            };
            if publish.send(response).await.is_err() {
                warn!("Publish sink closed; stopping");
                break;
            }
        }

        info!("Object server {} stopped", self.name);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use tivo_protocol::{Channel, KeyEvent, RemoteKey};
    use tivo_sim::SimulatedDevice;

    use super::*;
    use crate::index::ChannelIndex;
    use crate::proxy::TivoProxy;
    use crate::scorer::Scorer;

    fn server(device: &Arc<SimulatedDevice>) -> ObjectServer<TivoProxy> {
        let index = ChannelIndex::with_channels(true, Scorer::Ratio, device.lineup());
        let proxy = TivoProxy::new(device.clone(), index, false);
        ObjectServer::new("PNObjectServer", MessageDispatcher::serve(proxy))
    }

    fn device() -> Arc<SimulatedDevice> {
        Arc::new(SimulatedDevice::new(vec![Channel::new(
            "ESPN", "206", "sports", true, 1,
        )]))
    }

    #[test]
    fn test_status_and_presence_publish_nothing() {
        let server = server(&device());
        let connection = server.connection();

        assert_eq!(server.handle_event(TransportEvent::Status(StatusEvent::connected())), None);
        assert!(connection.is_set());
        assert_eq!(server.handle_event(TransportEvent::Presence(json!({"uuid": "x"}))), None);
        assert_eq!(server.handle_event(TransportEvent::Status(StatusEvent::disconnected())), None);
        assert!(!connection.is_set());
    }

    #[tokio::test]
    async fn test_run_publishes_in_order() {
        let device = device();
        let server = server(&device);
        let connection = server.connection();

        let (event_tx, event_rx) = mpsc::channel(16);
        let (publish_tx, mut publish_rx) = mpsc::channel(16);
        let handle = tokio::spawn(server.run(event_rx, publish_tx));

        event_tx
            .send(TransportEvent::Status(StatusEvent::connected()))
            .await
            .unwrap();
        event_tx
            .send(TransportEvent::Message(json!({"type": "request", "cmd": "pause", "params": {}})))
            .await
            .unwrap();
        event_tx
            .send(TransportEvent::Message(json!({"type": "request", "cmd": "rewind"})))
            .await
            .unwrap();

        let first = publish_rx.recv().await.unwrap();
        assert_eq!(first["cmd"], "pause");
        assert_eq!(first["result"]["status"], "success");

        let second = publish_rx.recv().await.unwrap();
        assert_eq!(second["error"], "Command (rewind) is not a valid directive.");
        assert!(connection.is_set());

        event_tx
            .send(TransportEvent::Status(StatusEvent::disconnected()))
            .await
            .unwrap();
        event_tx.send(TransportEvent::Shutdown).await.unwrap();
        handle.await.unwrap();

        assert!(!connection.is_set());
        assert_eq!(device.keys_sent(), vec![KeyEvent::Key(RemoteKey::Pause)]);
    }

    #[tokio::test]
    async fn test_run_stops_when_events_close() {
        let server = server(&device());
        let (event_tx, event_rx) = mpsc::channel(4);
        let (publish_tx, _publish_rx) = mpsc::channel(4);

        drop(event_tx);
        server.run(event_rx, publish_tx).await;
    }

    #[tokio::test]
    async fn test_shutdown_leaves_connection_to_status_events() {
        let server = server(&device());
        let connection = server.connection();
        let (event_tx, event_rx) = mpsc::channel(4);
        let (publish_tx, _publish_rx) = mpsc::channel(4);

        event_tx
            .send(TransportEvent::Status(StatusEvent::connected()))
            .await
            .unwrap();
        event_tx.send(TransportEvent::Shutdown).await.unwrap();
        server.run(event_rx, publish_tx).await;

        assert!(connection.is_set());
    }
}
