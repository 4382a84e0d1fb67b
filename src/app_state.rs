//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use tokio::task::AbortHandle;

use crate::{
    config::DashboardConfig,
    scheduler::TokioScheduler,
    snapshot::DashboardSnapshot,
    surface::HtmlSurface,
    view::{DashboardView, run_timer_events},
};

/// The dashboard view shared between request handlers and the timer event loop.
pub type SharedDashboard = Arc<Mutex<DashboardView<HtmlSurface, TokioScheduler>>>;

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The dashboard view.
    pub dashboard: SharedDashboard,

    timer_loop: AbortHandle,
}

impl AppState {
    /// Create the dashboard view for `snapshot`, initialize it and start
    /// applying its timer events.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(snapshot: DashboardSnapshot, config: DashboardConfig, rng: StdRng) -> Self {
        let (scheduler, receiver) = TokioScheduler::new();
        let mut view = DashboardView::new(snapshot, HtmlSurface::new(), scheduler, config, rng);
        view.initialize();

        let dashboard = Arc::new(Mutex::new(view));
        let timer_loop = tokio::spawn(run_timer_events(dashboard.clone(), receiver)).abort_handle();

        Self {
            dashboard,
            timer_loop,
        }
    }

    /// Cancel the dashboard's timers and stop the timer event loop.
    pub fn shutdown(&self) {
        match self.dashboard.lock() {
            Ok(mut view) => view.teardown(),
            Err(error) => tracing::error!("could not acquire dashboard lock: {error}"),
        }

        self.timer_loop.abort();
    }
}
