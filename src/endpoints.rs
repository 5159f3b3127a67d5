//! The API endpoints URIs.

/// The page that renders the dashboard for the posted records.
pub const DASHBOARD_VIEW: &str = "/dashboard";

/// The route that builds chart artifacts for the posted records.
pub const CHARTS_API: &str = "/api/charts";
/// The route for checking that the server is up.
pub const HEALTH: &str = "/api/health";
