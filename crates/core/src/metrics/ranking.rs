//! Product and category leaderboards over expanded line items.
//!
//! Line items are joined to the product's *current* price and category. This
//! is a deliberate staleness tradeoff: per-item projections track today's
//! catalog, while window revenue in `MetricSnapshot` trusts the stored order
//! totals. Lines whose product no longer exists are skipped.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order::{Order, OrderId};
use crate::domain::product::{Product, ProductId};
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankMetric {
    Revenue,
    Units,
}

impl RankMetric {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Revenue => "revenue",
            Self::Units => "units",
        }
    }
}

impl std::str::FromStr for RankMetric {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "revenue" => Ok(Self::Revenue),
            "units" => Ok(Self::Units),
            other => Err(DomainError::InvalidParameter {
                param: "metric",
                value: other.to_string(),
                expected: "revenue|units",
            }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRanking {
    pub product_id: ProductId,
    pub name: String,
    pub category: String,
    pub revenue: Decimal,
    pub units: u64,
    pub orders: u64,
    pub avg_order_value: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRollup {
    pub category: String,
    pub revenue: Decimal,
    pub units: u64,
    pub orders: u64,
    pub product_count: u64,
    pub avg_order_value: Decimal,
}

struct Accumulator {
    revenue: Decimal,
    units: u64,
    orders: HashSet<OrderId>,
    products: HashSet<ProductId>,
}

impl Accumulator {
    fn new() -> Self {
        Self {
            revenue: Decimal::ZERO,
            units: 0,
            orders: HashSet::new(),
            products: HashSet::new(),
        }
    }

    fn add(&mut self, order_id: &OrderId, product: &Product, quantity: u32) {
        self.revenue += product.price * Decimal::from(quantity);
        self.units += u64::from(quantity);
        self.orders.insert(order_id.clone());
        self.products.insert(product.id.clone());
    }

    fn avg_order_value(&self) -> Decimal {
        if self.orders.is_empty() {
            Decimal::ZERO
        } else {
            self.revenue / Decimal::from(self.orders.len() as u64)
        }
    }
}

/// Ranks products by the requested metric, descending, capped at `limit`.
/// Ties break on ascending product id so output is stable.
pub fn rank_products(
    qualifying: &[Order],
    products: &HashMap<ProductId, Product>,
    metric: RankMetric,
    limit: usize,
) -> Vec<ProductRanking> {
    let mut by_product: HashMap<ProductId, Accumulator> = HashMap::new();

    for order in qualifying {
        for line in &order.lines {
            let Some(product) = products.get(&line.product_id) else { continue };
            by_product
                .entry(product.id.clone())
                .or_insert_with(Accumulator::new)
                .add(&order.id, product, line.quantity);
        }
    }

    let mut rankings: Vec<ProductRanking> = by_product
        .into_iter()
        .filter_map(|(product_id, acc)| {
            let product = products.get(&product_id)?;
            Some(ProductRanking {
                product_id,
                name: product.name.clone(),
                category: product.category.clone(),
                revenue: acc.revenue,
                units: acc.units,
                orders: acc.orders.len() as u64,
                avg_order_value: acc.avg_order_value(),
            })
        })
        .collect();

    match metric {
        RankMetric::Revenue => rankings.sort_by(|a, b| {
            b.revenue.cmp(&a.revenue).then_with(|| a.product_id.cmp(&b.product_id))
        }),
        RankMetric::Units => rankings
            .sort_by(|a, b| b.units.cmp(&a.units).then_with(|| a.product_id.cmp(&b.product_id))),
    }

    rankings.truncate(limit);
    rankings
}

/// Rolls line items up by product category, sorted by revenue descending
/// with ascending category name as tiebreak.
pub fn category_rollups(
    qualifying: &[Order],
    products: &HashMap<ProductId, Product>,
) -> Vec<CategoryRollup> {
    let mut by_category: HashMap<String, Accumulator> = HashMap::new();

    for order in qualifying {
        for line in &order.lines {
            let Some(product) = products.get(&line.product_id) else { continue };
            by_category
                .entry(product.category.clone())
                .or_insert_with(Accumulator::new)
                .add(&order.id, product, line.quantity);
        }
    }

    let mut rollups: Vec<CategoryRollup> = by_category
        .into_iter()
        .map(|(category, acc)| CategoryRollup {
            category,
            revenue: acc.revenue,
            units: acc.units,
            orders: acc.orders.len() as u64,
            product_count: acc.products.len() as u64,
            avg_order_value: acc.avg_order_value(),
        })
        .collect();

    rollups.sort_by(|a, b| b.revenue.cmp(&a.revenue).then_with(|| a.category.cmp(&b.category)));
    rollups
}
