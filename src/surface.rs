//! The outputs the dashboard view writes to.
//!
//! [RenderSurface] is the only way the view produces side effects. The
//! [HtmlSurface] retains everything written to it so that the web layer can
//! render the current state of the page at any time.

use std::collections::{BTreeMap, HashMap};

use crate::{
    chart::{ChartId, ChartSpec},
    filter::FilterDimension,
    transaction_log::SimulatedTransaction,
};

/// The named text outputs on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    /// Total sales as currency.
    TotalSales,
    /// Total orders as a count.
    TotalOrders,
    /// Average order value as currency.
    AvgOrder,
    /// The sales change indicator.
    SalesChange,
    /// The orders change indicator.
    OrdersChange,
}

impl TextField {
    /// The HTML element ID of the field.
    pub fn id(self) -> &'static str {
        match self {
            TextField::TotalSales => "total-sales",
            TextField::TotalOrders => "total-orders",
            TextField::AvgOrder => "avg-order",
            TextField::SalesChange => "sales-change",
            TextField::OrdersChange => "orders-change",
        }
    }
}

/// How a text output is styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextStyle {
    /// No emphasis.
    #[default]
    Plain,
    /// A change of zero or more.
    Positive,
    /// A change below zero.
    Negative,
}

impl TextStyle {
    /// The CSS class for the style, empty for [TextStyle::Plain].
    pub fn class(self) -> &'static str {
        match self {
            TextStyle::Plain => "",
            TextStyle::Positive => "positive",
            TextStyle::Negative => "negative",
        }
    }
}

/// A capability for displaying the dashboard.
pub trait RenderSurface {
    /// Draw `spec` in the chart widget named `chart`.
    ///
    /// The first call for a chart creates its widget; later calls replace the
    /// widget's data in place.
    fn render_chart(&mut self, chart: ChartId, spec: ChartSpec);

    /// Write `text` to `field` with `style`.
    fn set_text(&mut self, field: TextField, text: &str, style: TextStyle);

    /// Enable or disable the refresh control.
    fn set_refresh_enabled(&mut self, enabled: bool);

    /// Show the selected value of a filter control.
    fn set_filter_value(&mut self, dimension: FilterDimension, value: &str);

    /// Replace the transaction log with `transactions`, most recent first.
    fn show_transactions(&mut self, transactions: &[SimulatedTransaction]);
}

/// A chart widget and the spec it currently draws.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartWidget {
    instance: u64,
    revision: u64,
    spec: ChartSpec,
}

impl ChartWidget {
    /// Identifies the widget; stays the same across re-renders.
    pub fn instance(&self) -> u64 {
        self.instance
    }

    /// How many times the widget has been re-rendered since it was created.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The spec the widget currently draws.
    pub fn spec(&self) -> &ChartSpec {
        &self.spec
    }

    /// The widget's ECharts options as JSON.
    pub fn options(&self) -> String {
        self.spec.to_echarts().to_string()
    }
}

/// The current content of a text field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderedText {
    /// The displayed text.
    pub text: String,
    /// The display style.
    pub style: TextStyle,
}

/// A surface that keeps the latest output so it can be rendered as HTML.
#[derive(Debug, Clone, Default)]
pub struct HtmlSurface {
    charts: BTreeMap<ChartId, ChartWidget>,
    next_instance: u64,
    fields: HashMap<TextField, RenderedText>,
    refresh_enabled: bool,
    filters: HashMap<FilterDimension, String>,
    transactions: Vec<SimulatedTransaction>,
}

impl HtmlSurface {
    /// Create an empty surface with a disabled refresh control.
    pub fn new() -> Self {
        Self::default()
    }

    /// The widget for `chart`, if it has been rendered.
    pub fn chart(&self, chart: ChartId) -> Option<&ChartWidget> {
        self.charts.get(&chart)
    }

    /// The content of `field`; empty if nothing has been written yet.
    pub fn text(&self, field: TextField) -> RenderedText {
        self.fields.get(&field).cloned().unwrap_or_default()
    }

    /// Whether the refresh control accepts clicks.
    pub fn refresh_enabled(&self) -> bool {
        self.refresh_enabled
    }

    /// The value shown by the filter control for `dimension`.
    pub fn filter_value(&self, dimension: FilterDimension) -> &str {
        self.filters
            .get(&dimension)
            .map(String::as_str)
            .unwrap_or_else(|| dimension.default_value())
    }

    /// The transactions in the log, most recent first.
    pub fn transactions(&self) -> &[SimulatedTransaction] {
        &self.transactions
    }
}

impl RenderSurface for HtmlSurface {
    fn render_chart(&mut self, chart: ChartId, spec: ChartSpec) {
        match self.charts.get_mut(&chart) {
            Some(widget) => {
                widget.spec = spec;
                widget.revision += 1;
            }
            None => {
                self.next_instance += 1;
                self.charts.insert(
                    chart,
                    ChartWidget {
                        instance: self.next_instance,
                        revision: 0,
                        spec,
                    },
                );
            }
        }
    }

    fn set_text(&mut self, field: TextField, text: &str, style: TextStyle) {
        self.fields.insert(
            field,
            RenderedText {
                text: text.to_owned(),
                style,
            },
        );
    }

    fn set_refresh_enabled(&mut self, enabled: bool) {
        self.refresh_enabled = enabled;
    }

    fn set_filter_value(&mut self, dimension: FilterDimension, value: &str) {
        self.filters.insert(dimension, value.to_owned());
    }

    fn show_transactions(&mut self, transactions: &[SimulatedTransaction]) {
        self.transactions = transactions.to_vec();
    }
}
