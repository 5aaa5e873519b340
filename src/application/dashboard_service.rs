// Dashboard service - Owns observed state, recomputes recommendations, publishes versions
use crate::application::sensor_feed::{FeedKind, FeedSink, SensorCapability, Subscription};
use crate::domain::location::GEOLOCATION_NOT_SUPPORTED;
use crate::domain::observed::{FeedUpdate, ObservedState};
use crate::domain::panel::{UiAction, UiState};
use crate::domain::recommendation::Advisory;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

/// One complete, consistent state version.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardSnapshot {
    pub version: u64,
    pub observed: ObservedState,
    pub recommendations: Vec<Advisory>,
    pub ui: UiState,
}

/// State owned by the service loop. Every mutation recomputes the
/// recommendation list before a new version becomes visible.
#[derive(Debug, Default)]
pub struct DashboardState {
    current: DashboardSnapshot,
}

impl DashboardState {
    pub fn snapshot(&self) -> &DashboardSnapshot {
        &self.current
    }

    pub fn apply_feed(&mut self, update: FeedUpdate) -> bool {
        if !self.current.observed.apply(update) {
            return false;
        }
        let recommendations = self.current.observed.recommendations();
        if recommendations != self.current.recommendations {
            tracing::debug!(count = recommendations.len(), "recommendations changed");
        }
        self.current.recommendations = recommendations;
        self.current.version += 1;
        true
    }

    pub fn apply_ui(&mut self, action: UiAction) -> bool {
        if !self.current.ui.apply(action) {
            return false;
        }
        self.current.version += 1;
        true
    }
}

enum Command {
    Ui {
        action: UiAction,
        reply: oneshot::Sender<Arc<DashboardSnapshot>>,
    },
}

/// Cheap handle used by the HTTP layer to read and mutate the dashboard.
#[derive(Clone)]
pub struct DashboardHandle {
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<Arc<DashboardSnapshot>>,
}

impl DashboardHandle {
    pub fn current(&self) -> Arc<DashboardSnapshot> {
        self.state.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<Arc<DashboardSnapshot>> {
        self.state.clone()
    }

    /// Apply a navigation/toggle action and return the resulting version.
    /// Returns `None` when the dashboard has been torn down.
    pub async fn dispatch(&self, action: UiAction) -> Option<Arc<DashboardSnapshot>> {
        let (reply, response) = oneshot::channel();
        self.commands.send(Command::Ui { action, reply }).await.ok()?;
        response.await.ok()
    }
}

/// A started dashboard: the service loop plus every live feed subscription.
pub struct DashboardRuntime {
    handle: DashboardHandle,
    subscriptions: Vec<Subscription>,
    worker: JoinHandle<()>,
}

impl DashboardRuntime {
    pub fn handle(&self) -> DashboardHandle {
        self.handle.clone()
    }

    pub fn active_feeds(&self) -> Vec<FeedKind> {
        self.subscriptions.iter().map(|s| s.kind()).collect()
    }

    /// Release every subscription, then stop the loop. Updates still queued
    /// are discarded, and no version is published once this returns.
    pub async fn shutdown(self) {
        let DashboardRuntime {
            subscriptions,
            worker,
            ..
        } = self;
        for subscription in subscriptions {
            subscription.cancel();
        }
        worker.abort();
        if let Err(e) = worker.await
            && !e.is_cancelled()
        {
            tracing::error!(error = %e, "dashboard loop failed");
        }
        tracing::info!("dashboard torn down");
    }
}

#[derive(Clone)]
pub struct DashboardService {
    capabilities: Vec<Arc<dyn SensorCapability>>,
}

impl DashboardService {
    pub fn new(capabilities: Vec<Arc<dyn SensorCapability>>) -> Self {
        Self { capabilities }
    }

    pub async fn start(&self) -> DashboardRuntime {
        let (sink, feeds) = FeedSink::channel();
        let (commands_tx, commands_rx) = mpsc::channel(32);
        let (state_tx, state_rx) = watch::channel(Arc::new(DashboardSnapshot::default()));

        let worker = tokio::spawn(run_loop(feeds, commands_rx, state_tx));

        let mut subscriptions = Vec::new();
        for capability in &self.capabilities {
            let kind = capability.kind();
            match capability.subscribe(sink.scoped()).await {
                Ok(Some(subscription)) => {
                    tracing::info!(feed = %kind, "feed subscribed");
                    subscriptions.push(subscription);
                }
                Ok(None) => {
                    tracing::warn!(feed = %kind, "capability unavailable");
                    if kind == FeedKind::Geolocation {
                        sink.publish(FeedUpdate::LocationError(
                            GEOLOCATION_NOT_SUPPORTED.to_string(),
                        ));
                    }
                }
                Err(e) => {
                    tracing::warn!(feed = %kind, error = %e, "failed to subscribe, treating as unavailable");
                    if kind == FeedKind::Geolocation {
                        sink.publish(FeedUpdate::LocationError(e.to_string()));
                    }
                }
            }
        }

        DashboardRuntime {
            handle: DashboardHandle {
                commands: commands_tx,
                state: state_rx,
            },
            subscriptions,
            worker,
        }
    }
}

async fn run_loop(
    mut feeds: mpsc::UnboundedReceiver<FeedUpdate>,
    mut commands: mpsc::Receiver<Command>,
    publisher: watch::Sender<Arc<DashboardSnapshot>>,
) {
    let mut state = DashboardState::default();

    loop {
        tokio::select! {
            Some(update) = feeds.recv() => {
                if state.apply_feed(update) {
                    publisher.send_replace(Arc::new(state.snapshot().clone()));
                }
            }
            command = commands.recv() => match command {
                Some(Command::Ui { action, reply }) => {
                    if state.apply_ui(action) {
                        publisher.send_replace(Arc::new(state.snapshot().clone()));
                    }
                    let _ = reply.send(publisher.borrow().clone());
                }
                None => break,
            },
        }
    }

    tracing::debug!("dashboard loop stopped");
}
