pub mod error;
pub mod params;
pub mod service;
pub mod views;

pub use error::ServiceError;
pub use params::{
    InventoryRiskParamsInput, OverviewParams, RangeParams, TopProductParams, TrendParams,
};
pub use service::{AnalyticsService, EngineSettings};
pub use views::{
    CategoryPerformanceView, CohortAnalysisView, CustomerSegmentsView, InventoryRiskView,
    InventorySummary, KpiSet, OverviewView, RangeView, TopProductsView, TrendsView,
};
