//! Dashboard HTTP handlers.
//!
//! The handlers forward user events to the shared [DashboardView] and render
//! what the view wrote to its surface.

use std::sync::MutexGuard;

use axum::{
    Form,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_htmx::HxRequest;
use maud::html;
use serde::Deserialize;

use crate::{
    AppState, Error,
    app_state::SharedDashboard,
    dashboard::views::{
        DashboardContext, dashboard_content, dashboard_page, kpi_cards, refresh_control,
        transaction_list,
    },
    filter::FilterDimension,
    scheduler::TokioScheduler,
    surface::HtmlSurface,
    view::DashboardView,
};

type LockedDashboard<'a> = MutexGuard<'a, DashboardView<HtmlSurface, TokioScheduler>>;

/// The state needed for displaying and updating the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The dashboard view shared with the timer event loop.
    pub dashboard: SharedDashboard,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            dashboard: state.dashboard.clone(),
        }
    }
}

impl DashboardState {
    fn lock(&self) -> Result<LockedDashboard<'_>, Error> {
        self.dashboard
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire dashboard lock: {error}"))
            .map_err(|_| Error::DashboardLockError)
    }
}

/// Form data sent by a filter control.
#[derive(Debug, Deserialize)]
pub struct FilterForm {
    /// The filter that changed.
    pub dimension: FilterDimension,
    /// The newly selected value.
    pub value: String,
}

fn context<'a>(view: &'a LockedDashboard<'_>) -> DashboardContext<'a> {
    DashboardContext {
        surface: view.surface(),
        regions: view.snapshot().regions(),
        tick_interval: view.config().tick_interval,
        refresh_delay: view.config().refresh_delay,
    }
}

/// Display the dashboard page.
///
/// htmx requests get the page content without the page shell.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    HxRequest(is_htmx_request): HxRequest,
) -> Result<Response, Error> {
    let view = state.lock()?;
    let context = context(&view);

    let markup = if is_htmx_request {
        dashboard_content(&context, true)
    } else {
        dashboard_page(&context)
    };

    Ok(markup.into_response())
}

/// Get the KPI cards.
pub async fn get_kpis(State(state): State<DashboardState>) -> Result<Response, Error> {
    let view = state.lock()?;

    Ok(kpi_cards(view.surface()).into_response())
}

/// Get the transaction log.
pub async fn get_transactions(State(state): State<DashboardState>) -> Result<Response, Error> {
    let view = state.lock()?;

    Ok(transaction_list(view.surface().transactions(), view.config().tick_interval).into_response())
}

/// Get the refresh control in its current state.
pub async fn get_refresh_button(State(state): State<DashboardState>) -> Result<Response, Error> {
    let view = state.lock()?;

    Ok(refresh_control(view.refresh_enabled(), view.config().refresh_delay, false).into_response())
}

/// Apply a filter change and return the recomputed KPI cards.
pub async fn post_filter(
    State(state): State<DashboardState>,
    Form(form): Form<FilterForm>,
) -> Response {
    let mut view = match state.lock() {
        Ok(view) => view,
        Err(error) => return error.into_alert_response(),
    };

    view.on_filter_changed(form.dimension, &form.value);

    kpi_cards(view.surface()).into_response()
}

/// Start a refresh and return the recomputed KPI cards along with the
/// disabled refresh control.
///
/// A request made while a refresh is in progress changes nothing.
pub async fn post_refresh(State(state): State<DashboardState>) -> Response {
    let mut view = match state.lock() {
        Ok(view) => view,
        Err(error) => return error.into_alert_response(),
    };

    view.on_refresh_requested();

    html!(
        (kpi_cards(view.surface()))
        (refresh_control(view.refresh_enabled(), view.config().refresh_delay, true))
    )
    .into_response()
}
