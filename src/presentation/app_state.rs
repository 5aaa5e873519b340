// Application state for HTTP handlers
use crate::application::dashboard_service::DashboardHandle;
use crate::application::streaming_service::StreamingDashboardService;
use crate::infrastructure::viewport::ViewportObserver;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub dashboard: DashboardHandle,
    pub streaming_service: StreamingDashboardService,
    pub viewport: Arc<ViewportObserver>,
}
