//! Dashboard module
//!
//! Provides the dashboard page and the htmx partials that the filter,
//! refresh and transaction log controls request.

mod handlers;
mod views;

pub use handlers::{
    get_dashboard_page, get_kpis, get_refresh_button, get_transactions, post_filter, post_refresh,
};
