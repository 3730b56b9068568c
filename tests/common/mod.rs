//! Shared test harness: a scripted push transport.
//!
//! Connection instances are recorded as they are created so tests can fire
//! open/message/error events on any instance, including detached ones, and
//! assert how many instances exist and which are still live.

#![allow(dead_code)] // Not every test binary exercises every helper.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use uuid::Uuid;

use jobwatch::{ConnectionEvent, EventStream, PushConnection, PushTransport};

/// One scripted connection instance
pub struct MockConnection {
    id: Uuid,
    closed: AtomicBool,
    sender: mpsc::UnboundedSender<ConnectionEvent>,
}

impl MockConnection {
    /// Inject an event into this instance's stream
    ///
    /// Sends to a detached instance are dropped silently, matching a real
    /// transport firing callbacks on a connection nobody listens to anymore.
    pub fn fire(&self, event: ConnectionEvent) {
        let _ = self.sender.send(event);
    }

    pub fn fire_open(&self) {
        self.fire(ConnectionEvent::Opened);
    }

    pub fn fire_message<S: Into<String>>(&self, payload: S) {
        self.fire(ConnectionEvent::Message(payload.into()));
    }

    pub fn fire_error(&self) {
        self.fire(ConnectionEvent::Failed);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl PushConnection for MockConnection {
    fn id(&self) -> Uuid {
        self.id
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Transport that records every connection it hands out
#[derive(Default)]
pub struct MockTransport {
    connections: Mutex<Vec<Arc<MockConnection>>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Total connection instances created so far
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Instances that have not been platform-closed
    pub fn live_count(&self) -> usize {
        self.connections
            .lock()
            .iter()
            .filter(|c| !c.is_closed())
            .count()
    }

    /// The most recently created instance
    pub fn latest(&self) -> Arc<MockConnection> {
        self.connections
            .lock()
            .last()
            .cloned()
            .expect("no connection has been created")
    }
}

impl PushTransport for MockTransport {
    fn connect(&self, _url: &str) -> (Arc<dyn PushConnection>, EventStream) {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let connection = Arc::new(MockConnection {
            id: Uuid::new_v4(),
            closed: AtomicBool::new(false),
            sender,
        });
        self.connections.lock().push(connection.clone());

        let stream: EventStream =
            Box::pin(futures::stream::poll_fn(move |cx| receiver.poll_recv(cx)));
        let handle: Arc<dyn PushConnection> = connection;
        (handle, stream)
    }
}

/// Install a fmt subscriber honoring `RUST_LOG`, once per test binary
pub fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Let spawned driver tasks process everything already queued
///
/// Under the paused test clock a one-millisecond sleep only advances time
/// after all ready tasks have run, which is exactly the synchronization the
/// tests need.
pub async fn settle() {
    tokio::time::sleep(std::time::Duration::from_millis(1)).await;
}
