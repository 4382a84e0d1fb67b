//! A sales dashboard that serves server-rendered HTML pages.
//!
//! The dashboard state lives in a single [DashboardView] that owns a
//! [DashboardSnapshot] of display data, renders it to a [RenderSurface], and
//! reacts to user events (filter changes, refresh requests) and timer events
//! (simulated real-time transactions, re-enabling the refresh control).
//!
//! The web layer built by [build_router] renders the [HtmlSurface] with maud
//! and ECharts and forwards htmx requests to the view.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod chart;
mod config;
mod dashboard;
mod endpoints;
mod filter;
mod html;
mod internal_server_error;
mod kpi;
mod logging;
mod not_found;
mod routing;
mod scheduler;
mod snapshot;
mod surface;
#[cfg(test)]
mod test_utils;
mod transaction_log;
mod view;

pub use app_state::{AppState, SharedDashboard};
pub use chart::{ChartId, ChartSpec};
pub use config::{
    DEFAULT_REFRESH_DELAY, DEFAULT_TICK_INTERVAL, DEFAULT_TRANSACTION_LOG_CAPACITY, DashboardConfig,
};
pub use filter::FilterDimension;
pub use kpi::{ChangeIndicator, Kpis, average_order_value};
pub use logging::logging_middleware;
pub use routing::build_router;
pub use scheduler::{
    FiredTimer, ManualScheduler, Repeat, Scheduler, TaskId, TimerEvent, TokioScheduler,
};
pub use snapshot::{
    CategorySlice, DashboardSnapshot, JsonSeedFile, MetricSummary, SampleSeed, SeedSource,
    parse_seed,
};
pub use surface::{ChartWidget, HtmlSurface, RenderSurface, RenderedText, TextField, TextStyle};
pub use transaction_log::{SimulatedTransaction, TransactionLog};
pub use view::{DashboardView, run_timer_events};

use crate::{alert::Alert, internal_server_error::InternalServerError};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The seed file could not be read.
    #[error("could not read the seed file {0}")]
    SeedRead(String),

    /// The seed file is not valid JSON or does not describe a valid snapshot.
    #[error("could not parse the seed: {0}")]
    SeedParse(String),

    /// A metric was given an empty trend series.
    ///
    /// Trend series are fixed-length recent histories, so there must be at
    /// least one point to draw.
    #[error("the {0} trend must have at least one point")]
    EmptyTrend(String),

    /// A metric total was negative, infinite or not a number.
    #[error("the {metric} total {total} must be a non-negative number")]
    InvalidTotal {
        /// The name of the metric, e.g. "sales".
        metric: String,
        /// The offending total.
        total: f64,
    },

    /// A category slice was given a negative value.
    #[error("the slice \"{name}\" has the value {value}, but values cannot be negative")]
    NegativeSliceValue {
        /// The name of the slice.
        name: String,
        /// The offending value.
        value: f64,
    },

    /// A category slice was given a colour that charts cannot display.
    #[error("the slice \"{name}\" has the invalid colour \"{color}\"")]
    InvalidColor {
        /// The name of the slice.
        name: String,
        /// The offending colour token.
        color: String,
    },

    /// A breakdown (products or regions) has no slices.
    #[error("the {0} breakdown has no slices")]
    EmptyBreakdown(&'static str),

    /// The number of trend labels does not match the number of trend points.
    #[error("got {labels} trend labels for {points} trend points")]
    TrendLabelMismatch {
        /// The number of labels given.
        labels: usize,
        /// The number of points in the sales trend.
        points: usize,
    },

    /// Could not acquire the dashboard lock.
    #[error("could not acquire the dashboard lock")]
    DashboardLockError,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::DashboardLockError => InternalServerError {
                description: "Dashboard Unavailable",
                fix: "The dashboard state could not be read. Restart the server and try again.",
            }
            .into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        match self {
            Error::DashboardLockError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::error(
                    "Dashboard unavailable",
                    "The dashboard state could not be read. Restart the server and try again.",
                )
                .into_html(),
            )
                .into_response(),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::error(
                        "Something went wrong",
                        "An unexpected error occurred, check the server logs for more details.",
                    )
                    .into_html(),
                )
                    .into_response()
            }
        }
    }
}
