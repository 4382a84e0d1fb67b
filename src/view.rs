//! The dashboard view model.
//!
//! [DashboardView] owns the current [DashboardSnapshot], renders it to a
//! [RenderSurface] and reacts to user events (filters, refresh) and timer
//! events (simulated transactions, re-enabling the refresh control). Timers
//! are owned by the view and cancelled by [DashboardView::teardown].

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use rand::{Rng, rngs::StdRng};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::{
    chart::{ChartId, chart_spec},
    config::DashboardConfig,
    filter::FilterDimension,
    kpi::{ChangeIndicator, Kpis},
    scheduler::{FiredTimer, ManualScheduler, Repeat, Scheduler, TaskId, TimerEvent},
    snapshot::DashboardSnapshot,
    surface::{RenderSurface, TextField, TextStyle},
    transaction_log::{SimulatedTransaction, TransactionLog},
};

/// Simulated recomputes draw the sales change from `[-MAX_SIMULATED_CHANGE, MAX_SIMULATED_CHANGE]`.
const MAX_SIMULATED_CHANGE: f64 = 5.0;

/// The dashboard state and its reactions to events.
#[derive(Debug)]
pub struct DashboardView<S, C> {
    snapshot: DashboardSnapshot,
    surface: S,
    scheduler: C,
    config: DashboardConfig,
    rng: StdRng,
    transactions: TransactionLog,
    tick_task: Option<TaskId>,
    refresh_task: Option<TaskId>,
    refresh_enabled: bool,
    active: bool,
}

impl<S, C> DashboardView<S, C>
where
    S: RenderSurface,
    C: Scheduler,
{
    /// Create a view over `snapshot`.
    ///
    /// Nothing is rendered and no timers run until [DashboardView::initialize]
    /// is called.
    pub fn new(
        snapshot: DashboardSnapshot,
        surface: S,
        scheduler: C,
        config: DashboardConfig,
        rng: StdRng,
    ) -> Self {
        Self {
            snapshot,
            surface,
            scheduler,
            transactions: TransactionLog::new(config.transaction_log_capacity),
            config,
            rng,
            tick_task: None,
            refresh_task: None,
            refresh_enabled: false,
            active: false,
        }
    }

    /// Render the charts, KPIs and controls, and start the real-time updates.
    ///
    /// Calling this on a view that is already running does nothing.
    pub fn initialize(&mut self) {
        if self.active {
            tracing::warn!("dashboard is already initialized");
            return;
        }

        self.active = true;
        self.render_charts();
        self.render_kpis();

        for dimension in FilterDimension::ALL {
            self.surface
                .set_filter_value(dimension, dimension.default_value());
        }

        self.set_refresh_enabled(true);
        self.surface.show_transactions(&self.transactions.entries());

        self.tick_task = Some(self.scheduler.schedule(
            TimerEvent::Tick,
            self.config.tick_interval,
            Repeat::Every,
        ));

        tracing::info!(
            "dashboard initialized, adding a transaction every {:?}",
            self.config.tick_interval
        );
    }

    /// Cancel every timer owned by the view.
    ///
    /// Timer events that were already in flight are ignored afterwards, even
    /// if the view is initialized again. User events are ignored until the
    /// view is initialized again. Calling this more than once does nothing.
    pub fn teardown(&mut self) {
        if let Some(task) = self.tick_task.take() {
            self.scheduler.cancel(task);
        }

        if let Some(task) = self.refresh_task.take() {
            self.scheduler.cancel(task);
        }

        if self.active {
            tracing::info!("dashboard torn down");
        }

        self.active = false;
    }

    /// Write the KPI text fields and change indicators.
    pub fn render_kpis(&mut self) {
        let kpis = Kpis::from_snapshot(&self.snapshot);

        self.surface
            .set_text(TextField::TotalSales, &kpis.total_sales, TextStyle::Plain);
        self.surface
            .set_text(TextField::TotalOrders, &kpis.total_orders, TextStyle::Plain);
        self.surface
            .set_text(TextField::AvgOrder, &kpis.avg_order, TextStyle::Plain);
        self.render_change_indicator(TextField::SalesChange, &kpis.sales_change);
        self.render_change_indicator(TextField::OrdersChange, &kpis.orders_change);
    }

    fn render_change_indicator(&mut self, field: TextField, indicator: &ChangeIndicator) {
        self.surface.set_text(field, &indicator.text, indicator.style);
    }

    /// Draw the sales trend, product distribution and region sales charts.
    pub fn render_charts(&mut self) {
        for chart in ChartId::ALL {
            self.surface
                .render_chart(chart, chart_spec(chart, &self.snapshot));
        }
    }

    /// React to a filter control changing to `value`.
    ///
    /// The value is shown by the control but does not filter any data; the
    /// change triggers a simulated recompute.
    pub fn on_filter_changed(&mut self, dimension: FilterDimension, value: &str) {
        if !self.active {
            tracing::debug!("ignoring filter change, the dashboard is not running");
            return;
        }

        tracing::info!("filter {dimension:?} changed to {value:?}");

        self.surface.set_filter_value(dimension, value);
        self.simulate_recompute();
    }

    /// React to the refresh control being activated.
    ///
    /// Disables the control, recomputes and re-enables the control once the
    /// refresh delay has elapsed. Returns `false` without doing anything if
    /// the control is disabled or the dashboard is not running.
    pub fn on_refresh_requested(&mut self) -> bool {
        if !self.active {
            tracing::debug!("ignoring refresh request, the dashboard is not running");
            return false;
        }

        if !self.refresh_enabled {
            tracing::debug!("ignoring refresh request, a refresh is in progress");
            return false;
        }

        self.set_refresh_enabled(false);
        self.simulate_recompute();
        self.refresh_task = Some(self.scheduler.schedule(
            TimerEvent::RefreshCompleted,
            self.config.refresh_delay,
            Repeat::Once,
        ));

        true
    }

    /// Apply a fired timer event.
    ///
    /// Events from tasks the view no longer owns, e.g. ones that were queued
    /// before a teardown, are ignored.
    pub fn on_timer(&mut self, fired: FiredTimer) {
        let FiredTimer { task, event } = fired;

        if !self.active {
            tracing::debug!("ignoring {event:?}, the dashboard is not running");
            return;
        }

        match event {
            TimerEvent::Tick if self.tick_task == Some(task) => {
                self.tick();
            }
            TimerEvent::RefreshCompleted if self.refresh_task == Some(task) => {
                self.refresh_task = None;
                self.set_refresh_enabled(true);
            }
            _ => tracing::debug!("ignoring {event:?} from stale task {task:?}"),
        }
    }

    /// Add a simulated transaction to the front of the transaction log.
    ///
    /// Returns the new transaction.
    pub fn tick(&mut self) -> Option<SimulatedTransaction> {
        let transaction = SimulatedTransaction::generate(
            &mut self.rng,
            self.snapshot.products(),
            self.snapshot.regions(),
        )?;

        tracing::debug!("simulated transaction: {transaction:?}");
        self.transactions.push(transaction.clone());
        self.surface.show_transactions(&self.transactions.entries());

        Some(transaction)
    }

    /// Replace the sales change with a random value in `[-5, 5]`, rounded to
    /// one decimal place, and re-render the KPIs.
    ///
    /// The charts are not re-rendered.
    pub fn simulate_recompute(&mut self) {
        let change = self
            .rng
            .gen_range(-MAX_SIMULATED_CHANGE..MAX_SIMULATED_CHANGE);
        let change = round_to_one_decimal(change);

        tracing::debug!("simulated sales change: {change}%");
        self.snapshot.sales.change_percent = change;
        self.render_kpis();
    }

    fn set_refresh_enabled(&mut self, enabled: bool) {
        self.refresh_enabled = enabled;
        self.surface.set_refresh_enabled(enabled);
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> &DashboardSnapshot {
        &self.snapshot
    }

    /// The surface the view renders to.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The scheduler that owns the view's timers.
    pub fn scheduler(&self) -> &C {
        &self.scheduler
    }

    /// The timing and capacity settings.
    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// The transaction log, newest first.
    pub fn transactions(&self) -> &TransactionLog {
        &self.transactions
    }

    /// Whether the refresh control accepts requests.
    pub fn refresh_enabled(&self) -> bool {
        self.refresh_enabled
    }

    /// Whether the view has been initialized and not torn down.
    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl<S: RenderSurface> DashboardView<S, ManualScheduler> {
    /// Move the fake clock forward by `by`, applying each timer event as it
    /// comes due.
    ///
    /// Timers scheduled while handling an event fire in the same call if they
    /// come due within `by`.
    pub fn advance_clock(&mut self, by: Duration) {
        let deadline = self.scheduler.now() + by;

        while let Some(fired) = self.scheduler.pop_due(deadline) {
            self.on_timer(fired);
        }

        self.scheduler.advance_to(deadline);
    }
}

fn round_to_one_decimal(value: f64) -> f64 {
    let rounded = (value * 10.0).round() / 10.0;

    // Avoid "-0" when small negative values round to zero.
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Apply timer events to the shared dashboard until the channel closes or
/// the lock is poisoned.
///
/// Each event is handled to completion while holding the lock, so timer
/// events never interleave with user events.
pub async fn run_timer_events<S, C>(
    dashboard: Arc<Mutex<DashboardView<S, C>>>,
    mut receiver: UnboundedReceiver<FiredTimer>,
) where
    S: RenderSurface,
    C: Scheduler,
{
    while let Some(fired) = receiver.recv().await {
        match dashboard.lock() {
            Ok(mut view) => view.on_timer(fired),
            Err(error) => {
                tracing::error!("could not acquire dashboard lock: {error}");
                break;
            }
        }
    }

    tracing::debug!("timer event loop stopped");
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };

    use rand::{SeedableRng, rngs::StdRng};

    use crate::{
        chart::ChartId,
        config::DashboardConfig,
        filter::FilterDimension,
        scheduler::{FiredTimer, ManualScheduler, Scheduler, TimerEvent, TokioScheduler},
        snapshot::{CategorySlice, DashboardSnapshot, MetricSummary},
        surface::{HtmlSurface, TextField, TextStyle},
    };

    use super::{DashboardView, round_to_one_decimal, run_timer_events};

    const TICK: Duration = Duration::from_millis(5000);
    const REFRESH_DELAY: Duration = Duration::from_millis(1000);

    fn new_view(snapshot: DashboardSnapshot) -> DashboardView<HtmlSurface, ManualScheduler> {
        let mut view = DashboardView::new(
            snapshot,
            HtmlSurface::new(),
            ManualScheduler::new(),
            DashboardConfig::default(),
            StdRng::seed_from_u64(7),
        );
        view.initialize();
        view
    }

    fn snapshot_with_totals(sales: f64, orders: f64) -> DashboardSnapshot {
        let slices = vec![CategorySlice::new("A", 1.0, "#fff").unwrap()];

        DashboardSnapshot::new(
            MetricSummary::new("sales", sales, -2.5, vec![1.0, 2.0]).unwrap(),
            MetricSummary::new("orders", orders, 0.0, vec![1.0, 2.0]).unwrap(),
            slices.clone(),
            slices,
            vec![],
        )
        .unwrap()
    }

    fn is_one_decimal(value: f64) -> bool {
        ((value * 10.0).round() - value * 10.0).abs() < 1e-9
    }

    #[test]
    fn initialize_renders_kpis_and_charts() {
        let view = new_view(DashboardSnapshot::sample());
        let surface = view.surface();

        assert_eq!(surface.text(TextField::TotalSales).text, "¥125,430");
        assert_eq!(surface.text(TextField::TotalOrders).text, "1,234");
        assert_eq!(surface.text(TextField::AvgOrder).text, "¥102");
        assert_eq!(surface.text(TextField::SalesChange).text, "+12.5%");
        assert_eq!(
            surface.text(TextField::OrdersChange).style,
            TextStyle::Positive
        );
        for chart in ChartId::ALL {
            assert!(surface.chart(chart).is_some(), "{chart:?} not rendered");
        }
        assert!(surface.refresh_enabled());
        assert_eq!(view.scheduler().pending(), 1);
    }

    #[test]
    fn initialize_twice_starts_one_timer() {
        let mut view = new_view(DashboardSnapshot::sample());

        view.initialize();

        assert_eq!(view.scheduler().pending(), 1);
    }

    #[test]
    fn average_order_is_zero_without_orders() {
        let view = new_view(snapshot_with_totals(500.0, 0.0));

        assert_eq!(view.surface().text(TextField::AvgOrder).text, "¥0");
    }

    #[test]
    fn negative_change_is_styled_negative() {
        let view = new_view(snapshot_with_totals(500.0, 5.0));

        let got = view.surface().text(TextField::SalesChange);

        assert_eq!(got.text, "-2.5%");
        assert_eq!(got.style, TextStyle::Negative);
    }

    #[test]
    fn fifteen_ticks_keep_the_ten_most_recent() {
        let mut view = new_view(DashboardSnapshot::sample());

        let generated: Vec<_> = (0..15).map(|_| view.tick().unwrap()).collect();

        let want: Vec<_> = generated.iter().rev().take(10).cloned().collect();
        assert_eq!(view.transactions().entries(), want);
        assert_eq!(view.surface().transactions(), want.as_slice());
    }

    #[test]
    fn tick_timer_adds_a_transaction_every_interval() {
        let mut view = new_view(DashboardSnapshot::sample());

        view.advance_clock(TICK * 3 - Duration::from_millis(1));
        assert_eq!(view.transactions().len(), 2);

        view.advance_clock(TICK * 20);
        assert_eq!(view.transactions().len(), 10);
    }

    #[test]
    fn recompute_stays_in_range_and_leaves_data_alone() {
        let mut view = new_view(DashboardSnapshot::sample());
        let before = view.snapshot().clone();
        let charts_before: Vec<_> = ChartId::ALL
            .iter()
            .map(|&chart| view.surface().chart(chart).unwrap().clone())
            .collect();

        for _ in 0..1000 {
            view.simulate_recompute();

            let change = view.snapshot().sales.change_percent;
            assert!((-5.0..=5.0).contains(&change), "{change} out of range");
            assert!(is_one_decimal(change), "{change} not rounded");
        }

        let after = view.snapshot();
        assert_eq!(after.sales.total, before.sales.total);
        assert_eq!(after.sales.trend(), before.sales.trend());
        assert_eq!(after.orders, before.orders);
        assert_eq!(after.products(), before.products());
        assert_eq!(after.regions(), before.regions());
        for (chart, before) in ChartId::ALL.into_iter().zip(charts_before) {
            assert_eq!(view.surface().chart(chart), Some(&before));
        }
    }

    #[test]
    fn recompute_updates_the_sales_indicator() {
        let mut view = new_view(DashboardSnapshot::sample());

        view.simulate_recompute();

        let change = view.snapshot().sales.change_percent;
        let got = view.surface().text(TextField::SalesChange);
        let want_style = if change >= 0.0 {
            TextStyle::Positive
        } else {
            TextStyle::Negative
        };
        assert_eq!(got.style, want_style);
        assert!(got.text.ends_with('%'));
        assert_eq!(view.surface().text(TextField::OrdersChange).text, "+8.3%");
    }

    #[test]
    fn filter_change_records_value_and_recomputes() {
        let mut view = new_view(DashboardSnapshot::sample());

        view.on_filter_changed(FilterDimension::Region, "North");

        assert_eq!(view.surface().filter_value(FilterDimension::Region), "North");
        assert_ne!(view.snapshot().sales.change_percent, 12.5);
        assert_eq!(view.snapshot().sales.trend(), DashboardSnapshot::sample().sales.trend());
    }

    #[test]
    fn refresh_disables_control_until_delay_elapses() {
        let mut view = new_view(DashboardSnapshot::sample());

        assert!(view.on_refresh_requested());
        assert!(!view.surface().refresh_enabled());

        view.advance_clock(REFRESH_DELAY - Duration::from_millis(1));
        assert!(!view.surface().refresh_enabled());

        view.advance_clock(Duration::from_millis(1));
        assert!(view.surface().refresh_enabled());
        assert!(view.refresh_enabled());
    }

    #[test]
    fn refresh_is_ignored_while_in_progress() {
        let mut view = new_view(DashboardSnapshot::sample());
        view.on_refresh_requested();
        let change = view.snapshot().sales.change_percent;

        assert!(!view.on_refresh_requested());

        assert_eq!(view.snapshot().sales.change_percent, change);
        assert_eq!(view.scheduler().pending(), 2);
    }

    #[test]
    fn teardown_cancels_both_timers() {
        let mut view = new_view(DashboardSnapshot::sample());
        view.on_refresh_requested();
        assert_eq!(view.scheduler().pending(), 2);

        view.teardown();
        view.teardown();

        assert_eq!(view.scheduler().pending(), 0);
        view.advance_clock(TICK * 2);
        assert!(view.transactions().is_empty());
        assert!(!view.is_active());
    }

    #[test]
    fn torn_down_view_ignores_user_events() {
        let mut view = new_view(DashboardSnapshot::sample());
        view.teardown();
        let change = view.snapshot().sales.change_percent;

        assert!(!view.on_refresh_requested());
        view.on_filter_changed(FilterDimension::TimeRange, "year");

        assert_eq!(view.scheduler().pending(), 0);
        assert_eq!(view.snapshot().sales.change_percent, change);
        assert_eq!(
            view.surface().filter_value(FilterDimension::TimeRange),
            "week"
        );

        view.initialize();
        assert!(view.on_refresh_requested());
        view.advance_clock(REFRESH_DELAY);
        assert!(view.refresh_enabled());
    }

    #[test]
    fn events_from_cancelled_tasks_are_ignored_after_reinitialize() {
        let mut view = new_view(DashboardSnapshot::sample());
        view.on_refresh_requested();
        let stale_tick = FiredTimer {
            task: view.tick_task.unwrap(),
            event: TimerEvent::Tick,
        };
        let stale_refresh = FiredTimer {
            task: view.refresh_task.unwrap(),
            event: TimerEvent::RefreshCompleted,
        };

        view.teardown();
        view.initialize();
        assert!(view.on_refresh_requested());
        view.on_timer(stale_tick);
        view.on_timer(stale_refresh);

        assert!(view.transactions().is_empty());
        assert!(!view.refresh_enabled());

        view.advance_clock(REFRESH_DELAY);
        assert!(view.refresh_enabled());
    }

    #[test]
    fn rounds_to_one_decimal() {
        assert_eq!(round_to_one_decimal(1.234), 1.2);
        assert_eq!(round_to_one_decimal(-4.96), -5.0);
        assert_eq!(round_to_one_decimal(-0.04).to_string(), "0");
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_timers_drive_the_shared_view() {
        let (scheduler, receiver) = TokioScheduler::new();
        let view = Arc::new(Mutex::new(DashboardView::new(
            DashboardSnapshot::sample(),
            HtmlSurface::new(),
            scheduler,
            DashboardConfig::default(),
            StdRng::seed_from_u64(7),
        )));
        view.lock().unwrap().initialize();
        let event_loop = tokio::spawn(run_timer_events(view.clone(), receiver));

        assert!(view.lock().unwrap().on_refresh_requested());
        tokio::time::sleep(REFRESH_DELAY + Duration::from_millis(100)).await;
        assert!(view.lock().unwrap().surface().refresh_enabled());

        tokio::time::sleep(TICK * 2).await;
        assert_eq!(view.lock().unwrap().transactions().len(), 2);

        view.lock().unwrap().teardown();
        tokio::time::sleep(TICK * 2).await;
        assert_eq!(view.lock().unwrap().transactions().len(), 2);

        event_loop.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_queued_before_teardown_do_not_reach_the_next_run() {
        let (scheduler, mut receiver) = TokioScheduler::new();
        let mut view = DashboardView::new(
            DashboardSnapshot::sample(),
            HtmlSurface::new(),
            scheduler,
            DashboardConfig::default(),
            StdRng::seed_from_u64(7),
        );
        view.initialize();
        tokio::time::sleep(TICK + Duration::from_millis(100)).await;

        view.teardown();
        view.initialize();
        while let Ok(fired) = receiver.try_recv() {
            view.on_timer(fired);
        }

        assert!(view.transactions().is_empty());

        tokio::time::sleep(TICK).await;
        tokio::task::yield_now().await;
        while let Ok(fired) = receiver.try_recv() {
            view.on_timer(fired);
        }
        assert_eq!(view.transactions().len(), 1);
    }
}
