pub mod cache;
pub mod config;
pub mod domain;
pub mod errors;
pub mod metrics;
pub mod window;

pub use cache::{CacheEntry, ResultCache};
pub use config::{AppConfig, ConfigError, LoadOptions};
pub use domain::customer::{Customer, CustomerId};
pub use domain::order::{Order, OrderId, OrderLine, OrderStatus};
pub use domain::product::{Product, ProductId};
pub use errors::DomainError;
pub use metrics::cohort::{Cohort, CohortTable, RetentionCell};
pub use metrics::inventory::{InventoryRiskParams, RiskEntry, RiskLevel};
pub use metrics::ranking::{CategoryRollup, ProductRanking, RankMetric};
pub use metrics::rfm::{CustomerRfm, Segment, SegmentSummary};
pub use metrics::snapshot::{delta_pct, KpiWithDelta, MetricSnapshot};
pub use metrics::trends::TrendPoint;
pub use window::{DateWindow, Interval};
