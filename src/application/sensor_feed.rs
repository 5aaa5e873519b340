// Sensor feed contract - platform capabilities and their subscriptions
use crate::domain::observed::FeedUpdate;
use async_trait::async_trait;
use std::fmt;
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedKind {
    Battery,
    Geolocation,
    Network,
    Visibility,
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FeedKind::Battery => "battery",
            FeedKind::Geolocation => "geolocation",
            FeedKind::Network => "network",
            FeedKind::Visibility => "visibility",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid {what}: {value}")]
    Parse { what: &'static str, value: String },
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("timeout expired after {0} ms")]
    Timeout(u64),
}

/// Publishing end of the dashboard's event queue, handed to each feed.
/// Clones share one open flag; `scoped` starts a new one.
#[derive(Debug, Clone)]
pub struct FeedSink {
    tx: mpsc::UnboundedSender<FeedUpdate>,
    open: Arc<RwLock<bool>>,
}

impl FeedSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<FeedUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = Self {
            tx,
            open: Arc::new(RwLock::new(true)),
        };
        (sink, rx)
    }

    /// Sink for a single subscription, closable without affecting the others.
    pub fn scoped(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            open: Arc::new(RwLock::new(true)),
        }
    }

    /// Returns false once the sink is closed or the consumer is gone; feeds
    /// should stop then.
    pub fn publish(&self, update: FeedUpdate) -> bool {
        // The read guard is held across the send so `close` waits for it.
        let open = self.open.read().unwrap_or_else(|e| e.into_inner());
        *open && self.tx.send(update).is_ok()
    }

    /// No publish through this sink or its clones succeeds after this returns.
    pub fn close(&self) {
        *self.open.write().unwrap_or_else(|e| e.into_inner()) = false;
    }
}

/// Cancelable handle for an active subscription. Released on `cancel` or drop.
pub struct Subscription {
    kind: FeedKind,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(kind: FeedKind, release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            kind,
            release: Some(Box::new(release)),
        }
    }

    /// Subscription backed by a watch task publishing into `sink`.
    /// Releasing closes the sink, then aborts the task.
    pub fn from_task(kind: FeedKind, sink: FeedSink, handle: JoinHandle<()>) -> Self {
        Self::new(kind, move || {
            sink.close();
            handle.abort();
        })
    }

    pub fn kind(&self) -> FeedKind {
        self.kind
    }

    pub fn cancel(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            tracing::debug!(feed = %self.kind, "releasing subscription");
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("kind", &self.kind)
            .field("active", &self.release.is_some())
            .finish()
    }
}

#[async_trait]
pub trait SensorCapability: Send + Sync {
    fn kind(&self) -> FeedKind;

    /// Start delivering updates into `sink`.
    /// `Ok(None)` means the platform does not provide this capability.
    async fn subscribe(&self, sink: FeedSink) -> Result<Option<Subscription>, SensorError>;
}
