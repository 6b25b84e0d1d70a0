//! Scalar aggregates over a filtered order set, and period-over-period deltas.

use std::collections::{HashMap, HashSet};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order::Order;
use crate::domain::product::{Product, ProductId};

/// The headline KPI set for one date window. Ratio fields are percentages
/// and are 0 (never NaN) when their denominators are empty.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSnapshot {
    pub gross_revenue: Decimal,
    pub orders: u64,
    pub aov: Decimal,
    pub units: u64,
    pub active_customers: u64,
    pub refund_rate: f64,
    pub gross_margin_pct: f64,
    pub conversion_rate: f64,
}

impl MetricSnapshot {
    /// Computes the snapshot from orders already filtered to qualifying
    /// statuses within the window. `cancelled` is the count of Cancelled
    /// orders in the same window; `registered_customers` is the size of the
    /// whole customer base, used for the conversion rate.
    pub fn compute(
        qualifying: &[Order],
        cancelled: u64,
        products: &HashMap<ProductId, Product>,
        registered_customers: u64,
    ) -> Self {
        let gross_revenue: Decimal = qualifying.iter().map(|order| order.total).sum();
        let orders = qualifying.len() as u64;
        let units: u64 = qualifying.iter().map(Order::units).sum();

        let aov = if orders == 0 {
            Decimal::ZERO
        } else {
            gross_revenue / Decimal::from(orders)
        };

        let active_customers = qualifying
            .iter()
            .map(|order| &order.customer_id)
            .collect::<HashSet<_>>()
            .len() as u64;

        let refund_denominator = orders + cancelled;
        let refund_rate = if refund_denominator == 0 {
            0.0
        } else {
            cancelled as f64 / refund_denominator as f64 * 100.0
        };

        let conversion_rate = if registered_customers == 0 {
            0.0
        } else {
            active_customers as f64 / registered_customers as f64 * 100.0
        };

        Self {
            gross_revenue,
            orders,
            aov,
            units,
            active_customers,
            refund_rate,
            gross_margin_pct: gross_margin_pct(qualifying, products),
            conversion_rate,
        }
    }
}

/// Margin over line items whose product carries a known cost. Items with no
/// cost on file are excluded from both numerator and denominator so they do
/// not distort the ratio. Uses the live product price for both sides.
fn gross_margin_pct(qualifying: &[Order], products: &HashMap<ProductId, Product>) -> f64 {
    let mut costed_revenue = Decimal::ZERO;
    let mut margin = Decimal::ZERO;

    for order in qualifying {
        for line in &order.lines {
            let Some(product) = products.get(&line.product_id) else { continue };
            if !product.has_known_cost() {
                continue;
            }
            let quantity = Decimal::from(line.quantity);
            costed_revenue += product.price * quantity;
            margin += (product.price - product.cost) * quantity;
        }
    }

    if costed_revenue.is_zero() {
        return 0.0;
    }

    (margin / costed_revenue * Decimal::from(100)).to_f64().unwrap_or(0.0)
}

/// Percentage change from `compare` to `current`; 0 when there is nothing to
/// compare against.
pub fn delta_pct(current: f64, compare: f64) -> f64 {
    if compare == 0.0 {
        return 0.0;
    }
    (current - compare) / compare * 100.0
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiWithDelta {
    pub value: f64,
    pub delta_pct: f64,
}

impl KpiWithDelta {
    pub fn new(current: f64, compare: Option<f64>) -> Self {
        Self { value: current, delta_pct: compare.map_or(0.0, |base| delta_pct(current, base)) }
    }
}
