//! The API endpoints URIs.

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The dashboard page.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The KPI cards of the dashboard.
pub const DASHBOARD_KPIS: &str = "/dashboard/kpis";
/// The transaction log of the dashboard.
pub const DASHBOARD_TRANSACTIONS: &str = "/dashboard/transactions";
/// The refresh control of the dashboard.
pub const DASHBOARD_REFRESH_BUTTON: &str = "/dashboard/refresh_button";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to request a cup of coffee (experimental).
pub const COFFEE: &str = "/api/coffee";
/// The route for changing a dashboard filter.
pub const DASHBOARD_FILTER: &str = "/api/dashboard/filter";
/// The route for refreshing the dashboard.
pub const DASHBOARD_REFRESH: &str = "/api/dashboard/refresh";
