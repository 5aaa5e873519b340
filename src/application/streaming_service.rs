// Streaming dashboard service - Push a rendered view for every state version
use crate::application::dashboard_service::DashboardHandle;
use crate::domain::dashboard::DashboardView;
use crate::presentation::render::render;
use serde::Serialize;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio_stream::wrappers::WatchStream;
use tokio_stream::StreamExt;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StreamMessage {
    /// First message: the full view at subscription time.
    Snapshot { view: DashboardView },
    Update { view: DashboardView },
    /// Sent when the dashboard is torn down.
    Complete {
        #[serde(rename = "versionsSent")]
        versions_sent: u64,
        #[serde(rename = "durationMs")]
        duration_ms: i64,
    },
}

#[derive(Clone)]
pub struct StreamingDashboardService {
    dashboard: DashboardHandle,
    buffer: usize,
}

impl StreamingDashboardService {
    pub fn new(dashboard: DashboardHandle, buffer: usize) -> Self {
        Self {
            dashboard,
            buffer: buffer.max(1),
        }
    }

    pub fn stream_dashboard(&self) -> mpsc::Receiver<StreamMessage> {
        let (tx, rx) = mpsc::channel(self.buffer);
        let mut versions = WatchStream::new(self.dashboard.watch());
        let start_time = Instant::now();

        tokio::spawn(async move {
            let mut versions_sent = 0;
            let mut last_version = None;

            // watch coalesces rapid versions; only the latest is rendered
            while let Some(snapshot) = versions.next().await {
                if last_version == Some(snapshot.version) {
                    continue;
                }
                let view = render(&snapshot);
                let msg = match last_version {
                    None => StreamMessage::Snapshot { view },
                    Some(_) => StreamMessage::Update { view },
                };
                last_version = Some(snapshot.version);

                if tx.send(msg).await.is_err() {
                    tracing::debug!("stream client disconnected");
                    return;
                }
                versions_sent += 1;
            }

            let duration_ms = start_time.elapsed().as_millis() as i64;
            let _ = tx
                .send(StreamMessage::Complete {
                    versions_sent,
                    duration_ms,
                })
                .await;
        });

        rx
    }
}
