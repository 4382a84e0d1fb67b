//! The filter controls shown above the dashboard.
//!
//! Filter values are opaque: changing a filter triggers a recompute but does
//! not filter the trend or category data.

use serde::Deserialize;

/// The dimensions the dashboard can be filtered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterDimension {
    /// The period the figures cover.
    TimeRange,
    /// The sales region.
    Region,
}

impl FilterDimension {
    /// Both dimensions, in display order.
    pub const ALL: [FilterDimension; 2] = [FilterDimension::TimeRange, FilterDimension::Region];

    /// The HTML element ID of the control for this dimension.
    pub fn id(self) -> &'static str {
        match self {
            FilterDimension::TimeRange => "time-range",
            FilterDimension::Region => "region-filter",
        }
    }

    /// The name of the dimension as sent by the filter controls.
    pub fn name(self) -> &'static str {
        match self {
            FilterDimension::TimeRange => "time_range",
            FilterDimension::Region => "region",
        }
    }

    /// The value selected before the user changes anything.
    pub fn default_value(self) -> &'static str {
        match self {
            FilterDimension::TimeRange => "week",
            FilterDimension::Region => ALL_REGIONS,
        }
    }
}

/// The region filter value that selects every region.
pub const ALL_REGIONS: &str = "all";

/// The options of the time range control as `(value, label)` pairs.
pub const TIME_RANGE_OPTIONS: [(&str, &str); 4] = [
    ("today", "Today"),
    ("week", "This week"),
    ("month", "This month"),
    ("year", "This year"),
];
