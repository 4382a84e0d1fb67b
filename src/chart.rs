//! What each dashboard chart draws, and its ECharts options.
//!
//! A [ChartSpec] describes *what* to draw independently of the charting
//! library. [ChartSpec::to_echarts] turns a spec into the ECharts options the
//! browser renders:
//! - **Sales trend**: a filled line series over the trend labels
//! - **Product distribution**: a donut chart of product shares
//! - **Region sales**: a bar chart of region shares

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    datatype::DataPointItem,
    element::{AreaStyle, AxisType, ItemStyle, LineStyle, Tooltip, Trigger},
    series::{Line, Pie, bar::Bar},
};

use crate::snapshot::{CategorySlice, DashboardSnapshot};

const SALES_TREND_COLOR: &str = "#3498db";

/// The logical name of a chart widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChartId {
    /// The sales trend line chart.
    SalesTrend,
    /// The product share donut chart.
    ProductDistribution,
    /// The region share bar chart.
    RegionSales,
}

impl ChartId {
    /// Every chart on the dashboard, in display order.
    pub const ALL: [ChartId; 3] = [
        ChartId::SalesTrend,
        ChartId::ProductDistribution,
        ChartId::RegionSales,
    ];

    /// The HTML element ID of the chart container (kebab-case).
    pub fn id(self) -> &'static str {
        match self {
            ChartId::SalesTrend => "sales-trend",
            ChartId::ProductDistribution => "product-distribution",
            ChartId::RegionSales => "region-sales",
        }
    }
}

/// A library-independent description of a chart.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartSpec {
    /// A single line series over categorical labels.
    LineSeries {
        /// The chart title.
        title: String,
        /// The name of the series shown in tooltips.
        series_name: String,
        /// One label per value.
        labels: Vec<String>,
        /// The series values, oldest first.
        values: Vec<f64>,
        /// The line colour.
        color: String,
    },
    /// The share of each slice in a whole, drawn as a donut.
    ProportionalBreakdown {
        /// The chart title.
        title: String,
        /// The slices, each with its own colour.
        slices: Vec<CategorySlice>,
    },
    /// One bar per slice.
    CategoricalBars {
        /// The chart title.
        title: String,
        /// The name of the series shown in tooltips.
        series_name: String,
        /// The slices, each with its own colour.
        slices: Vec<CategorySlice>,
    },
}

impl ChartSpec {
    /// Convert the spec into ECharts options.
    pub fn to_echarts(&self) -> Chart {
        match self {
            ChartSpec::LineSeries {
                title,
                series_name,
                labels,
                values,
                color,
            } => Chart::new()
                .title(Title::new().text(title))
                .tooltip(Tooltip::new().trigger(Trigger::Axis))
                .grid(
                    Grid::new()
                        .left("3%")
                        .right("4%")
                        .bottom("3%")
                        .contain_label(true),
                )
                .x_axis(Axis::new().type_(AxisType::Category).data(labels.clone()))
                .y_axis(Axis::new().type_(AxisType::Value))
                .series(
                    Line::new()
                        .name(series_name)
                        .smooth(true)
                        .item_style(ItemStyle::new().color(color.as_str()))
                        .line_style(LineStyle::new().color(color.as_str()))
                        .area_style(AreaStyle::new())
                        .data(values.clone()),
                ),
            ChartSpec::ProportionalBreakdown { title, slices } => Chart::new()
                .title(Title::new().text(title))
                .tooltip(Tooltip::new().trigger(Trigger::Item))
                .legend(Legend::new().top("bottom"))
                .series(
                    Pie::new()
                        .name(title)
                        .radius(vec!["40%", "70%"])
                        .data(colored_items(slices)),
                ),
            ChartSpec::CategoricalBars {
                title,
                series_name,
                slices,
            } => Chart::new()
                .title(Title::new().text(title))
                .tooltip(Tooltip::new().trigger(Trigger::Axis))
                .grid(
                    Grid::new()
                        .left("3%")
                        .right("4%")
                        .bottom("3%")
                        .contain_label(true),
                )
                .x_axis(
                    Axis::new().type_(AxisType::Category).data(
                        slices
                            .iter()
                            .map(|slice| slice.name().to_owned())
                            .collect(),
                    ),
                )
                .y_axis(Axis::new().type_(AxisType::Value))
                .series(Bar::new().name(series_name).data(colored_items(slices))),
        }
    }
}

fn colored_items(slices: &[CategorySlice]) -> Vec<DataPointItem> {
    slices
        .iter()
        .map(|slice| {
            DataPointItem::new(slice.value())
                .name(slice.name())
                .item_style(ItemStyle::new().color(slice.color()))
        })
        .collect()
}

/// The spec for `chart` drawn from the current snapshot.
pub fn chart_spec(chart: ChartId, snapshot: &DashboardSnapshot) -> ChartSpec {
    match chart {
        ChartId::SalesTrend => ChartSpec::LineSeries {
            title: "Sales Trend".to_owned(),
            series_name: "Sales".to_owned(),
            labels: snapshot.trend_labels().to_vec(),
            values: snapshot.sales.trend().to_vec(),
            color: SALES_TREND_COLOR.to_owned(),
        },
        ChartId::ProductDistribution => ChartSpec::ProportionalBreakdown {
            title: "Product Distribution".to_owned(),
            slices: snapshot.products().to_vec(),
        },
        ChartId::RegionSales => ChartSpec::CategoricalBars {
            title: "Sales by Region".to_owned(),
            series_name: "Sales".to_owned(),
            slices: snapshot.regions().to_vec(),
        },
    }
}
