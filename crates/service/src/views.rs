//! Serializable result payloads for each analytics operation.
//!
//! These are the cacheable shapes: every view derives both `Serialize` and
//! `Deserialize` so a cache hit round-trips through JSON to the exact value
//! the first computation produced.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use shopgauge_core::window::{DateWindow, Interval};
use shopgauge_core::{
    CategoryRollup, Cohort, CohortTable, CustomerRfm, KpiWithDelta, MetricSnapshot,
    ProductRanking, RankMetric, RiskEntry, RiskLevel, SegmentSummary, TrendPoint,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeView {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl From<&DateWindow> for RangeView {
    fn from(window: &DateWindow) -> Self {
        Self { from: window.from, to: window.to }
    }
}

/// The overview KPIs, each paired with its period-over-period delta. Deltas
/// are 0 when no comparison window was requested.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiSet {
    pub gross_revenue: KpiWithDelta,
    pub orders: KpiWithDelta,
    pub aov: KpiWithDelta,
    pub units: KpiWithDelta,
    pub active_customers: KpiWithDelta,
    pub refund_rate: KpiWithDelta,
    pub gross_margin_pct: KpiWithDelta,
    pub conversion_rate: KpiWithDelta,
}

impl KpiSet {
    pub fn from_snapshots(current: &MetricSnapshot, compare: Option<&MetricSnapshot>) -> Self {
        let pair = |pick: fn(&MetricSnapshot) -> f64| {
            KpiWithDelta::new(pick(current), compare.map(pick))
        };
        Self {
            gross_revenue: pair(|s| s.gross_revenue.to_f64().unwrap_or(0.0)),
            orders: pair(|s| s.orders as f64),
            aov: pair(|s| s.aov.to_f64().unwrap_or(0.0)),
            units: pair(|s| s.units as f64),
            active_customers: pair(|s| s.active_customers as f64),
            refund_rate: pair(|s| s.refund_rate),
            gross_margin_pct: pair(|s| s.gross_margin_pct),
            conversion_rate: pair(|s| s.conversion_rate),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewView {
    pub range: RangeView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compare_range: Option<RangeView>,
    pub kpis: KpiSet,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendsView {
    pub range: RangeView,
    pub interval: Interval,
    pub points: Vec<TrendPoint>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopProductsView {
    pub range: RangeView,
    pub metric: RankMetric,
    pub products: Vec<ProductRanking>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPerformanceView {
    pub range: RangeView,
    pub categories: Vec<CategoryRollup>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub total_at_risk: u64,
    pub critical: u64,
    pub low_stock: u64,
}

impl InventorySummary {
    pub fn from_entries(entries: &[RiskEntry]) -> Self {
        let critical =
            entries.iter().filter(|entry| entry.risk_level == RiskLevel::Critical).count() as u64;
        Self { total_at_risk: entries.len() as u64, critical, low_stock: entries.len() as u64 - critical }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRiskView {
    pub assessed_at: DateTime<Utc>,
    pub window_days: u32,
    pub summary: InventorySummary,
    pub risk_products: Vec<RiskEntry>,
}

/// Cohorts keyed by month (`YYYY-MM`), plus the ascending month list for
/// table rendering.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortAnalysisView {
    pub range: RangeView,
    pub months: Vec<String>,
    pub cohorts: BTreeMap<String, Cohort>,
}

impl CohortAnalysisView {
    pub fn from_table(range: RangeView, table: CohortTable) -> Self {
        Self { range, months: table.months, cohorts: table.cohorts }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSegmentsView {
    pub range: RangeView,
    /// Total customers scored, before the response cap was applied.
    pub total_customers: u64,
    pub customers: Vec<CustomerRfm>,
    pub segments: Vec<SegmentSummary>,
}
