//! The in-memory data shown on the dashboard and the seeds it is loaded from.
//!
//! A [DashboardSnapshot] can only be created through validation, so code that
//! holds one can rely on its invariants: every trend is non-empty, every
//! slice value is non-negative and every slice has a usable display colour.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::Error;

/// Summary figures for one metric (e.g., sales or orders).
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSummary {
    /// The running total for the metric.
    pub total: f64,
    /// The change relative to the previous period, as a percentage.
    pub change_percent: f64,
    trend: Vec<f64>,
}

impl MetricSummary {
    /// Create a metric summary.
    ///
    /// # Errors
    /// Returns [Error::EmptyTrend] if `trend` is empty and
    /// [Error::InvalidTotal] if `total` is negative or not finite.
    pub fn new(
        metric: &str,
        total: f64,
        change_percent: f64,
        trend: Vec<f64>,
    ) -> Result<Self, Error> {
        if !total.is_finite() || total < 0.0 {
            return Err(Error::InvalidTotal {
                metric: metric.to_owned(),
                total,
            });
        }

        if trend.is_empty() {
            return Err(Error::EmptyTrend(metric.to_owned()));
        }

        Ok(Self {
            total,
            change_percent,
            trend,
        })
    }

    /// The recent history of the metric, oldest first. Never empty.
    pub fn trend(&self) -> &[f64] {
        &self.trend
    }
}

/// One named, coloured component of a categorical breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySlice {
    name: String,
    value: f64,
    color: String,
}

impl CategorySlice {
    /// Create a slice.
    ///
    /// # Errors
    /// Returns [Error::NegativeSliceValue] if `value` is negative or not a
    /// number, and [Error::InvalidColor] if `color` is not a display colour.
    pub fn new(name: &str, value: f64, color: &str) -> Result<Self, Error> {
        if value.is_nan() || value < 0.0 {
            return Err(Error::NegativeSliceValue {
                name: name.to_owned(),
                value,
            });
        }

        if !is_valid_color(color) {
            return Err(Error::InvalidColor {
                name: name.to_owned(),
                color: color.to_owned(),
            });
        }

        Ok(Self {
            name: name.to_owned(),
            value,
            color: color.to_owned(),
        })
    }

    /// The display name, e.g. "Product A".
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The weight of this slice. Never negative.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// The display colour, e.g. "#FF6384".
    pub fn color(&self) -> &str {
        &self.color
    }
}

/// The full dashboard state at a point in time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "SnapshotRecord")]
pub struct DashboardSnapshot {
    /// Sales figures.
    pub sales: MetricSummary,
    /// Order figures.
    pub orders: MetricSummary,
    products: Vec<CategorySlice>,
    regions: Vec<CategorySlice>,
    trend_labels: Vec<String>,
}

impl DashboardSnapshot {
    /// Create a snapshot from its parts.
    ///
    /// If `trend_labels` is empty, the labels default to "Day 1", "Day 2", ...
    /// for each point in the sales trend.
    ///
    /// # Errors
    /// Returns [Error::EmptyBreakdown] if either breakdown has no slices and
    /// [Error::TrendLabelMismatch] if labels are given but their count differs
    /// from the length of the sales trend.
    pub fn new(
        sales: MetricSummary,
        orders: MetricSummary,
        products: Vec<CategorySlice>,
        regions: Vec<CategorySlice>,
        trend_labels: Vec<String>,
    ) -> Result<Self, Error> {
        if products.is_empty() {
            return Err(Error::EmptyBreakdown("products"));
        }

        if regions.is_empty() {
            return Err(Error::EmptyBreakdown("regions"));
        }

        let trend_labels = if trend_labels.is_empty() {
            default_trend_labels(sales.trend().len())
        } else if trend_labels.len() != sales.trend().len() {
            return Err(Error::TrendLabelMismatch {
                labels: trend_labels.len(),
                points: sales.trend().len(),
            });
        } else {
            trend_labels
        };

        Ok(Self {
            sales,
            orders,
            products,
            regions,
            trend_labels,
        })
    }

    /// The sample data the dashboard shows when no seed file is given.
    pub fn sample() -> Self {
        let slice = |name: &str, value: f64, color: &str| CategorySlice {
            name: name.to_owned(),
            value,
            color: color.to_owned(),
        };

        Self {
            sales: MetricSummary {
                total: 125_430.0,
                change_percent: 12.5,
                trend: vec![
                    12_000.0, 19_000.0, 15_000.0, 18_000.0, 22_000.0, 25_000.0, 30_000.0,
                ],
            },
            orders: MetricSummary {
                total: 1_234.0,
                change_percent: 8.3,
                trend: vec![1_000.0, 1_100.0, 1_200.0, 1_150.0, 1_300.0, 1_250.0, 1_234.0],
            },
            products: vec![
                slice("Product A", 35.0, "#FF6384"),
                slice("Product B", 25.0, "#36A2EB"),
                slice("Product C", 20.0, "#FFCE56"),
                slice("Product D", 20.0, "#4BC0C0"),
            ],
            regions: vec![
                slice("North", 40.0, "#9966FF"),
                slice("South", 35.0, "#FF9F40"),
                slice("East", 25.0, "#FF6384"),
            ],
            trend_labels: ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
        }
    }

    /// The product breakdown. Never empty.
    pub fn products(&self) -> &[CategorySlice] {
        &self.products
    }

    /// The region breakdown. Never empty.
    pub fn regions(&self) -> &[CategorySlice] {
        &self.regions
    }

    /// One label per point in the sales trend.
    pub fn trend_labels(&self) -> &[String] {
        &self.trend_labels
    }
}

fn default_trend_labels(count: usize) -> Vec<String> {
    (1..=count).map(|day| format!("Day {day}")).collect()
}

/// Whether `token` is a colour a chart widget can display.
///
/// Accepts hex colours (`#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`), `rgb(...)`
/// and `rgba(...)` functions, and named colours made of ASCII letters.
pub fn is_valid_color(token: &str) -> bool {
    if let Some(hex) = token.strip_prefix('#') {
        return matches!(hex.len(), 3 | 4 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit());
    }

    if let Some(arguments) = token
        .strip_prefix("rgba(")
        .or_else(|| token.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let parts: Vec<&str> = arguments.split(',').map(str::trim).collect();
        return matches!(parts.len(), 3 | 4)
            && parts.iter().all(|part| part.parse::<f64>().is_ok());
    }

    !token.is_empty() && token.chars().all(|c| c.is_ascii_alphabetic())
}

/// A source of the initial dashboard data.
pub trait SeedSource {
    /// Load the snapshot the dashboard starts from.
    ///
    /// # Errors
    /// Implementations return an error if the seed cannot be read or does not
    /// describe a valid snapshot.
    fn load(&self) -> Result<DashboardSnapshot, Error>;
}

/// Seeds the dashboard with [DashboardSnapshot::sample].
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleSeed;

impl SeedSource for SampleSeed {
    fn load(&self) -> Result<DashboardSnapshot, Error> {
        Ok(DashboardSnapshot::sample())
    }
}

/// Seeds the dashboard from a JSON file.
#[derive(Debug, Clone)]
pub struct JsonSeedFile {
    path: PathBuf,
}

impl JsonSeedFile {
    /// Read the seed from the JSON file at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_owned(),
        }
    }
}

impl SeedSource for JsonSeedFile {
    fn load(&self) -> Result<DashboardSnapshot, Error> {
        let text = fs::read_to_string(&self.path).map_err(|error| {
            Error::SeedRead(format!("{}: {error}", self.path.display()))
        })?;

        parse_seed(&text)
    }
}

/// Parse and validate a JSON seed.
///
/// # Errors
/// Returns [Error::SeedParse] if the JSON is malformed or breaks one of the
/// snapshot invariants.
pub fn parse_seed(text: &str) -> Result<DashboardSnapshot, Error> {
    serde_json::from_str(text).map_err(|error| Error::SeedParse(error.to_string()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetricRecord {
    total: f64,
    #[serde(alias = "change")]
    change_percent: f64,
    trend: Vec<f64>,
}

#[derive(Deserialize)]
struct SliceRecord {
    name: String,
    value: f64,
    color: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotRecord {
    sales: MetricRecord,
    orders: MetricRecord,
    products: Vec<SliceRecord>,
    regions: Vec<SliceRecord>,
    #[serde(default)]
    trend_labels: Vec<String>,
}

impl TryFrom<SnapshotRecord> for DashboardSnapshot {
    type Error = Error;

    fn try_from(record: SnapshotRecord) -> Result<Self, Self::Error> {
        let to_slices = |records: Vec<SliceRecord>| {
            records
                .into_iter()
                .map(|slice| CategorySlice::new(&slice.name, slice.value, &slice.color))
                .collect::<Result<Vec<_>, _>>()
        };

        DashboardSnapshot::new(
            MetricSummary::new(
                "sales",
                record.sales.total,
                record.sales.change_percent,
                record.sales.trend,
            )?,
            MetricSummary::new(
                "orders",
                record.orders.total,
                record.orders.change_percent,
                record.orders.trend,
            )?,
            to_slices(record.products)?,
            to_slices(record.regions)?,
            record.trend_labels,
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::Error;

    use super::{
        CategorySlice, DashboardSnapshot, MetricSummary, SampleSeed, SeedSource, is_valid_color,
        parse_seed,
    };

    const SEED: &str = r##"{
        "sales": { "total": 125430, "change": 12.5, "trend": [12000, 19000, 15000] },
        "orders": { "total": 1234, "changePercent": 8.3, "trend": [1000, 1100, 1200] },
        "products": [
            { "name": "Product A", "value": 35, "color": "#FF6384" },
            { "name": "Product B", "value": 65, "color": "rgba(54, 162, 235, 0.5)" }
        ],
        "regions": [
            { "name": "North", "value": 40, "color": "purple" }
        ]
    }"##;

    #[test]
    fn sample_seed_passes_validation() {
        let sample = SampleSeed.load().unwrap();

        let rebuilt = DashboardSnapshot::new(
            MetricSummary::new(
                "sales",
                sample.sales.total,
                sample.sales.change_percent,
                sample.sales.trend().to_vec(),
            )
            .unwrap(),
            MetricSummary::new(
                "orders",
                sample.orders.total,
                sample.orders.change_percent,
                sample.orders.trend().to_vec(),
            )
            .unwrap(),
            sample
                .products()
                .iter()
                .map(|slice| CategorySlice::new(slice.name(), slice.value(), slice.color()))
                .collect::<Result<_, _>>()
                .unwrap(),
            sample
                .regions()
                .iter()
                .map(|slice| CategorySlice::new(slice.name(), slice.value(), slice.color()))
                .collect::<Result<_, _>>()
                .unwrap(),
            sample.trend_labels().to_vec(),
        )
        .unwrap();

        assert_eq!(rebuilt, sample);
    }

    #[test]
    fn parses_seed_json() {
        let snapshot = parse_seed(SEED).unwrap();

        assert_eq!(snapshot.sales.total, 125_430.0);
        assert_eq!(snapshot.sales.change_percent, 12.5);
        assert_eq!(snapshot.orders.change_percent, 8.3);
        assert_eq!(snapshot.products().len(), 2);
        assert_eq!(snapshot.regions()[0].color(), "purple");
        assert_eq!(snapshot.trend_labels(), ["Day 1", "Day 2", "Day 3"]);
    }

    #[test]
    fn rejects_empty_trend() {
        let got = MetricSummary::new("sales", 1.0, 0.0, vec![]);

        assert_eq!(got, Err(Error::EmptyTrend("sales".to_owned())));
    }

    #[test]
    fn rejects_negative_total() {
        let got = MetricSummary::new("orders", -1.0, 0.0, vec![1.0]);

        assert!(matches!(got, Err(Error::InvalidTotal { .. })));
    }

    #[test]
    fn rejects_negative_slice_value() {
        let got = CategorySlice::new("Product A", -0.5, "#fff");

        assert!(matches!(got, Err(Error::NegativeSliceValue { .. })));
    }

    #[test]
    fn rejects_invalid_color() {
        let got = CategorySlice::new("Product A", 1.0, "#12345");

        assert_eq!(
            got,
            Err(Error::InvalidColor {
                name: "Product A".to_owned(),
                color: "#12345".to_owned()
            })
        );
    }

    #[test]
    fn rejects_empty_breakdown_in_seed() {
        let seed = SEED.replace(
            r##"[
            { "name": "North", "value": 40, "color": "purple" }
        ]"##,
            "[]",
        );

        let got = parse_seed(&seed);

        assert!(matches!(got, Err(Error::SeedParse(message)) if message.contains("regions")));
    }

    #[test]
    fn rejects_mismatched_trend_labels() {
        let sales = MetricSummary::new("sales", 1.0, 0.0, vec![1.0, 2.0]).unwrap();
        let orders = MetricSummary::new("orders", 1.0, 0.0, vec![1.0]).unwrap();
        let slices = vec![CategorySlice::new("A", 1.0, "red").unwrap()];

        let got = DashboardSnapshot::new(
            sales,
            orders,
            slices.clone(),
            slices,
            vec!["Mon".to_owned()],
        );

        assert_eq!(
            got,
            Err(Error::TrendLabelMismatch {
                labels: 1,
                points: 2
            })
        );
    }

    #[test]
    fn recognises_color_tokens() {
        for valid in ["#fff", "#FF6384", "#ff638480", "rgb(1, 2, 3)", "rgba(1,2,3,0.1)", "teal"] {
            assert!(is_valid_color(valid), "{valid} should be valid");
        }

        for invalid in ["", "#ggg", "#12345", "rgb(1, 2)", "rgb(a, b, c)", "light blue"] {
            assert!(!is_valid_color(invalid), "{invalid} should be invalid");
        }
    }
}
