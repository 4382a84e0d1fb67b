//! HTML rendering for the dashboard page and its partials.
//!
//! Every view reads from the [HtmlSurface] the dashboard renders to, so a
//! partial always shows the same state the full page would.

use std::time::Duration;

use maud::{Markup, PreEscaped, html};

use crate::{
    chart::ChartId,
    endpoints,
    filter::{ALL_REGIONS, FilterDimension, TIME_RANGE_OPTIONS},
    html::{
        BUTTON_PRIMARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE, FORM_SELECT_STYLE, HeadElement,
        PAGE_CONTAINER_STYLE, base, format_currency,
    },
    snapshot::CategorySlice,
    surface::{HtmlSurface, TextField},
    transaction_log::SimulatedTransaction,
};

/// What the dashboard views need to know besides the surface.
pub(super) struct DashboardContext<'a> {
    pub surface: &'a HtmlSurface,
    pub regions: &'a [CategorySlice],
    pub tick_interval: Duration,
    pub refresh_delay: Duration,
}

/// The full dashboard page, including the chart scripts.
pub(super) fn dashboard_page(context: &DashboardContext) -> Markup {
    let content = dashboard_content(context, false);

    let head_elements = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        HeadElement::ScriptSource(PreEscaped(format!(
            "document.addEventListener('DOMContentLoaded', function() {{\n{}\n}});",
            charts_script(context.surface)
        ))),
    ];

    base("Dashboard", &head_elements, &content)
}

/// The dashboard content without the page shell.
///
/// If `inline_script` is set, the chart initialization script is included in
/// the content so that the charts are drawn when htmx swaps it in.
pub(super) fn dashboard_content(context: &DashboardContext, inline_script: bool) -> Markup {
    html!(
        div id="dashboard-content" class=(PAGE_CONTAINER_STYLE)
        {
            div class="flex flex-wrap items-end justify-between gap-4 w-full mb-4"
            {
                h2 class="text-2xl font-bold" { "Sales Dashboard" }

                div class="flex flex-wrap items-end gap-4"
                {
                    (filter_controls(context.surface, context.regions))
                    (refresh_control(context.surface.refresh_enabled(), context.refresh_delay, false))
                }
            }

            (kpi_cards(context.surface))
            (charts_view(context.surface))

            section class={ (CARD_STYLE) " w-full" }
            {
                h3 class="text-xl font-semibold mb-4" { "Recent Transactions" }

                (transaction_list(context.surface.transactions(), context.tick_interval))
            }

            @if inline_script {
                script { (PreEscaped(charts_script(context.surface))) }
            }
        }
    )
}

/// The KPI cards: total sales, total orders and average order value.
pub(super) fn kpi_cards(surface: &HtmlSurface) -> Markup {
    html!(
        section
            id="kpi-cards"
            class="grid grid-cols-1 md:grid-cols-3 gap-4 w-full mb-4"
        {
            (kpi_card(surface, "Total Sales", TextField::TotalSales, Some(TextField::SalesChange)))
            (kpi_card(surface, "Total Orders", TextField::TotalOrders, Some(TextField::OrdersChange)))
            (kpi_card(surface, "Average Order Value", TextField::AvgOrder, None))
        }
    )
}

fn kpi_card(
    surface: &HtmlSurface,
    title: &str,
    value_field: TextField,
    change_field: Option<TextField>,
) -> Markup {
    let value = surface.text(value_field);

    html!(
        div class=(CARD_STYLE)
        {
            h3 class="text-sm font-medium text-gray-500 dark:text-gray-400" { (title) }

            p id=(value_field.id()) class="text-3xl font-bold" { (value.text) }

            @if let Some(change_field) = change_field {
                @let change = surface.text(change_field);

                span
                    id=(change_field.id())
                    class={ "kpi-change " (change.style.class()) }
                {
                    (change.text)
                }
            }
        }
    )
}

/// The time range and region filter controls.
pub(super) fn filter_controls(surface: &HtmlSurface, regions: &[CategorySlice]) -> Markup {
    let time_range = FilterDimension::TimeRange;
    let region = FilterDimension::Region;

    let time_range_value = surface.filter_value(time_range);
    let region_value = surface.filter_value(region);

    html!(
        div class="flex gap-4"
        {
            div
            {
                label for=(time_range.id()) class=(FORM_LABEL_STYLE) { "Time range" }

                select
                    id=(time_range.id())
                    name="value"
                    hx-post=(endpoints::DASHBOARD_FILTER)
                    hx-vals=(filter_vals(time_range))
                    hx-trigger="change"
                    hx-target="#kpi-cards"
                    hx-swap="outerHTML"
                    hx-target-error="#alert-container"
                    class=(FORM_SELECT_STYLE)
                {
                    @for (value, label) in TIME_RANGE_OPTIONS {
                        option value=(value) selected[value == time_range_value] { (label) }
                    }
                }
            }

            div
            {
                label for=(region.id()) class=(FORM_LABEL_STYLE) { "Region" }

                select
                    id=(region.id())
                    name="value"
                    hx-post=(endpoints::DASHBOARD_FILTER)
                    hx-vals=(filter_vals(region))
                    hx-trigger="change"
                    hx-target="#kpi-cards"
                    hx-swap="outerHTML"
                    hx-target-error="#alert-container"
                    class=(FORM_SELECT_STYLE)
                {
                    option value=(ALL_REGIONS) selected[region_value == ALL_REGIONS] { "All regions" }

                    @for slice in regions {
                        option value=(slice.name()) selected[slice.name() == region_value] { (slice.name()) }
                    }
                }
            }
        }
    )
}

fn filter_vals(dimension: FilterDimension) -> String {
    format!(r#"{{"dimension": "{}"}}"#, dimension.name())
}

/// The refresh button.
///
/// While a refresh is in progress the button is disabled and the control
/// fetches its enabled state again once `refresh_delay` has passed. Set
/// `out_of_band` to swap the control in alongside another response.
pub(super) fn refresh_control(enabled: bool, refresh_delay: Duration, out_of_band: bool) -> Markup {
    let oob = out_of_band.then_some("true");

    if enabled {
        html!(
            span id="refresh-control" hx-swap-oob=[oob]
            {
                button
                    id="refresh-btn"
                    type="button"
                    hx-post=(endpoints::DASHBOARD_REFRESH)
                    hx-target="#kpi-cards"
                    hx-swap="outerHTML"
                    hx-target-error="#alert-container"
                    class=(BUTTON_PRIMARY_STYLE)
                {
                    "Refresh"
                }
            }
        )
    } else {
        let trigger = format!("load delay:{}ms", refresh_delay.as_millis());

        html!(
            span
                id="refresh-control"
                hx-swap-oob=[oob]
                hx-get=(endpoints::DASHBOARD_REFRESH_BUTTON)
                hx-trigger=(trigger)
                hx-swap="outerHTML"
            {
                button
                    id="refresh-btn"
                    type="button"
                    disabled
                    class={ (BUTTON_PRIMARY_STYLE) " opacity-50 cursor-not-allowed" }
                {
                    "Refreshing..."
                }
            }
        )
    }
}

/// The chart containers.
fn charts_view(surface: &HtmlSurface) -> Markup {
    html!(
        section id="charts" class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
            {
                @for chart in ChartId::ALL {
                    @if let Some(widget) = surface.chart(chart) {
                        div
                            id=(chart.id())
                            data-chart-instance=(widget.instance())
                            data-chart-revision=(widget.revision())
                            class="min-h-[380px] rounded dark:bg-gray-100"
                        {}
                    }
                }
            }
        }
    )
}

/// JavaScript that draws every rendered chart.
///
/// An existing ECharts instance is reused so that re-rendering a chart
/// replaces its data instead of stacking a second chart on the container.
fn charts_script(surface: &HtmlSurface) -> String {
    ChartId::ALL
        .iter()
        .filter_map(|&chart| surface.chart(chart).map(|widget| (chart, widget)))
        .map(|(chart, widget)| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    if (!chartDom) {{
                        return;
                    }}
                    const chart = echarts.getInstanceByDom(chartDom) || echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option, true);

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        const isDarkMode = darkModeMediaQuery.matches;
                        chart.setTheme(isDarkMode ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id(),
                escape_script(&widget.options())
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Make JSON safe to embed in a `<script>` element.
///
/// A `</` would let text such as a slice name close the element early.
fn escape_script(json: &str) -> String {
    json.replace("</", "<\\/")
}

/// The log of simulated transactions, most recent first.
///
/// The list polls for new entries every `tick_interval`.
pub(super) fn transaction_list(
    transactions: &[SimulatedTransaction],
    tick_interval: Duration,
) -> Markup {
    let trigger = format!("every {}ms", tick_interval.as_millis());

    html!(
        ul
            id="transaction-list"
            class="transaction-list divide-y divide-gray-200 dark:divide-gray-700"
            hx-get=(endpoints::DASHBOARD_TRANSACTIONS)
            hx-trigger=(trigger)
            hx-swap="outerHTML"
        {
            @for transaction in transactions {
                li class="transaction-item flex justify-between py-2"
                {
                    span class="font-medium" { (transaction.product) }
                    span { (format_currency(f64::from(transaction.amount))) }
                    span class="text-gray-500 dark:text-gray-400" { (transaction.region) }
                }
            }

            @if transactions.is_empty() {
                li class="py-2 text-gray-500 dark:text-gray-400"
                {
                    "Waiting for transactions..."
                }
            }
        }
    )
}
