//! Key performance indicators shown at the top of the dashboard.

use crate::{
    html::{format_count, format_currency},
    snapshot::DashboardSnapshot,
    surface::TextStyle,
};

/// The average value of an order, rounded to the nearest whole number.
///
/// Returns zero when there are no orders.
pub fn average_order_value(sales_total: f64, orders_total: f64) -> f64 {
    if orders_total == 0.0 {
        0.0
    } else {
        (sales_total / orders_total).round()
    }
}

/// The text and style of a change indicator, e.g. "+12.5%" styled positive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeIndicator {
    /// The percentage, with a "+" prefix when strictly positive.
    pub text: String,
    /// [TextStyle::Positive] for changes of zero or more, otherwise
    /// [TextStyle::Negative].
    pub style: TextStyle,
}

impl ChangeIndicator {
    /// Create the indicator for a change of `change_percent`.
    pub fn new(change_percent: f64) -> Self {
        // Avoid displaying "-0%".
        let change_percent = if change_percent == 0.0 {
            0.0
        } else {
            change_percent
        };
        let sign = if change_percent > 0.0 { "+" } else { "" };

        Self {
            text: format!("{sign}{change_percent}%"),
            style: if change_percent >= 0.0 {
                TextStyle::Positive
            } else {
                TextStyle::Negative
            },
        }
    }
}

/// The formatted KPI values for a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kpis {
    /// Total sales, e.g. "¥125,430".
    pub total_sales: String,
    /// Total orders, e.g. "1,234".
    pub total_orders: String,
    /// Average order value, e.g. "¥102".
    pub avg_order: String,
    /// The change in sales.
    pub sales_change: ChangeIndicator,
    /// The change in orders.
    pub orders_change: ChangeIndicator,
}

impl Kpis {
    /// Format the KPIs of `snapshot`.
    pub fn from_snapshot(snapshot: &DashboardSnapshot) -> Self {
        let sales = &snapshot.sales;
        let orders = &snapshot.orders;

        Self {
            total_sales: format_currency(sales.total),
            total_orders: format_count(orders.total),
            avg_order: format_currency(average_order_value(sales.total, orders.total)),
            sales_change: ChangeIndicator::new(sales.change_percent),
            orders_change: ChangeIndicator::new(orders.change_percent),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{snapshot::DashboardSnapshot, surface::TextStyle};

    use super::{ChangeIndicator, Kpis, average_order_value};

    #[test]
    fn average_order_value_rounds_to_nearest() {
        // 125430 / 1234 ≈ 101.64
        assert_eq!(average_order_value(125_430.0, 1_234.0), 102.0);
        assert_eq!(average_order_value(250.0, 100.0), 3.0);
        assert_eq!(average_order_value(240.0, 100.0), 2.0);
    }

    #[test]
    fn average_order_value_is_zero_without_orders() {
        assert_eq!(average_order_value(125_430.0, 0.0), 0.0);
        assert_eq!(average_order_value(0.0, 0.0), 0.0);
    }

    #[test]
    fn zero_change_is_positive_without_sign() {
        let got = ChangeIndicator::new(0.0);

        assert_eq!(got.text, "0%");
        assert_eq!(got.style, TextStyle::Positive);
    }

    #[test]
    fn negative_zero_displays_as_zero() {
        let got = ChangeIndicator::new(-0.0);

        assert_eq!(got.text, "0%");
        assert_eq!(got.style, TextStyle::Positive);
    }

    #[test]
    fn change_indicator_sign_and_style() {
        let cases = [
            (12.5, "+12.5%", TextStyle::Positive),
            (8.0, "+8%", TextStyle::Positive),
            (0.1, "+0.1%", TextStyle::Positive),
            (-0.1, "-0.1%", TextStyle::Negative),
            (-5.0, "-5%", TextStyle::Negative),
        ];

        for (change, want_text, want_style) in cases {
            let got = ChangeIndicator::new(change);

            assert_eq!(got.text, want_text, "text for {change}");
            assert_eq!(got.style, want_style, "style for {change}");
        }
    }

    #[test]
    fn formats_sample_kpis() {
        let got = Kpis::from_snapshot(&DashboardSnapshot::sample());

        assert_eq!(got.total_sales, "¥125,430");
        assert_eq!(got.total_orders, "1,234");
        assert_eq!(got.avg_order, "¥102");
        assert_eq!(got.sales_change.text, "+12.5%");
        assert_eq!(got.orders_change.text, "+8.3%");
    }
}
