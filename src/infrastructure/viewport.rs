// Visibility capability fed by intersection reports from the viewer
use crate::application::sensor_feed::{FeedKind, FeedSink, SensorCapability, SensorError, Subscription};
use crate::domain::observed::FeedUpdate;
use async_trait::async_trait;
use tokio::sync::broadcast;

/// Watches the dashboard's root element through the viewer's reported
/// intersection ratio and emits on every crossing of `threshold`.
#[derive(Debug)]
pub struct ViewportObserver {
    threshold: f64,
    reports: broadcast::Sender<f64>,
}

impl ViewportObserver {
    pub fn new(threshold: f64) -> Self {
        let (reports, _) = broadcast::channel(16);
        Self {
            threshold: threshold.clamp(0.0, 1.0),
            reports,
        }
    }

    /// Record an intersection ratio. Returns false when nobody is observing.
    pub fn report(&self, ratio: f64) -> bool {
        let ratio = if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { 0.0 };
        self.reports.send(ratio).is_ok()
    }
}

#[async_trait]
impl SensorCapability for ViewportObserver {
    fn kind(&self) -> FeedKind {
        FeedKind::Visibility
    }

    async fn subscribe(&self, sink: FeedSink) -> Result<Option<Subscription>, SensorError> {
        let mut reports = self.reports.subscribe();
        let threshold = self.threshold;

        let closer = sink.clone();
        let handle = tokio::spawn(async move {
            let mut last: Option<bool> = None;
            loop {
                let ratio = match reports.recv().await {
                    Ok(ratio) => ratio,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "visibility reports lagged");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };

                let visible = ratio >= threshold;
                if last == Some(visible) {
                    continue;
                }
                last = Some(visible);
                tracing::debug!(visible, ratio, "visibility crossed threshold");
                if !sink.publish(FeedUpdate::Visibility(visible)) {
                    break;
                }
            }
        });

        Ok(Some(Subscription::from_task(FeedKind::Visibility, closer, handle)))
    }
}
