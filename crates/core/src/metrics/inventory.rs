//! Stock-risk classification from trailing sales velocity.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::order::Order;
use crate::domain::product::{Product, ProductId};

/// Sort key stand-in for products with no computable days of cover, so they
/// land after every finite estimate within their tier.
const UNKNOWN_DAYS_OF_COVER: f64 = 999.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Critical,
    #[serde(rename = "Low Stock")]
    LowStock,
    Normal,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InventoryRiskParams {
    /// Stock at or below this is Critical regardless of velocity.
    pub critical_threshold: u32,
    /// Days of cover at or below this (but above 7) is Low Stock.
    pub safety_days: f64,
    /// Length of the trailing velocity window, in days.
    pub window_days: u32,
}

impl Default for InventoryRiskParams {
    fn default() -> Self {
        Self { critical_threshold: 5, safety_days: 14.0, window_days: 14 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskEntry {
    pub product_id: ProductId,
    pub name: String,
    pub current_stock: u32,
    pub daily_velocity: f64,
    pub days_of_cover: Option<f64>,
    pub risk_level: RiskLevel,
    pub risk_reason: String,
}

/// Classifies every product and returns the non-Normal entries, Critical
/// tier first, ascending days of cover within each tier.
///
/// Rules, first match wins:
/// 1. stock <= critical_threshold -> Critical
/// 2. velocity > 0 and cover <= 7 -> Critical; cover <= safety_days -> Low Stock
/// 3. velocity == 0 and stock <= critical_threshold * 2 -> Low Stock
/// 4. otherwise Normal
pub fn assess_inventory(
    products: &[Product],
    trailing_orders: &[Order],
    params: &InventoryRiskParams,
) -> Vec<RiskEntry> {
    let velocity = daily_velocity(trailing_orders, params.window_days);

    let mut entries: Vec<RiskEntry> = products
        .iter()
        .filter_map(|product| {
            let daily = velocity.get(&product.id).copied().unwrap_or(0.0);
            let entry = classify(product, daily, params);
            (entry.risk_level != RiskLevel::Normal).then_some(entry)
        })
        .collect();

    entries.sort_by(|a, b| {
        a.risk_level.cmp(&b.risk_level).then_with(|| {
            let a_cover = a.days_of_cover.unwrap_or(UNKNOWN_DAYS_OF_COVER);
            let b_cover = b.days_of_cover.unwrap_or(UNKNOWN_DAYS_OF_COVER);
            a_cover.partial_cmp(&b_cover).unwrap_or(std::cmp::Ordering::Equal)
        })
    });

    entries
}

fn daily_velocity(trailing_orders: &[Order], window_days: u32) -> HashMap<ProductId, f64> {
    let mut units: HashMap<ProductId, u64> = HashMap::new();
    for order in trailing_orders {
        for line in &order.lines {
            *units.entry(line.product_id.clone()).or_default() += u64::from(line.quantity);
        }
    }

    let days = f64::from(window_days.max(1));
    units.into_iter().map(|(product_id, sold)| (product_id, sold as f64 / days)).collect()
}

fn classify(product: &Product, daily_velocity: f64, params: &InventoryRiskParams) -> RiskEntry {
    let stock = product.stock;

    let (days_of_cover, risk_level, risk_reason) = if stock <= params.critical_threshold {
        let cover = (daily_velocity > 0.0).then(|| f64::from(stock) / daily_velocity);
        (cover, RiskLevel::Critical, format!("Only {stock} units remaining."))
    } else if daily_velocity > 0.0 {
        let cover = f64::from(stock) / daily_velocity;
        if cover <= 7.0 {
            (
                Some(cover),
                RiskLevel::Critical,
                format!("About {cover:.1} days of stock left at the current sales pace."),
            )
        } else if cover <= params.safety_days {
            (
                Some(cover),
                RiskLevel::LowStock,
                format!("About {cover:.1} days of stock left at the current sales pace."),
            )
        } else {
            (Some(cover), RiskLevel::Normal, String::new())
        }
    } else if stock <= params.critical_threshold * 2 {
        (None, RiskLevel::LowStock, "Stock is low and there is no recent sales data.".to_string())
    } else {
        (None, RiskLevel::Normal, String::new())
    };

    RiskEntry {
        product_id: product.id.clone(),
        name: product.name.clone(),
        current_stock: stock,
        daily_velocity,
        days_of_cover,
        risk_level,
        risk_reason,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use crate::domain::customer::CustomerId;
    use crate::domain::order::{Order, OrderId, OrderLine, OrderStatus};
    use crate::domain::product::{Product, ProductId};

    use super::{assess_inventory, InventoryRiskParams, RiskLevel};

    fn product(id: &str, stock: u32) -> Product {
        Product {
            id: ProductId(id.to_string()),
            name: format!("Product {id}"),
            category: "misc".to_string(),
            price: Decimal::from(10),
            cost: Decimal::ZERO,
            stock,
        }
    }

    fn sale(id: &str, product_id: &str, quantity: u32) -> Order {
        Order {
            id: OrderId(id.to_string()),
            customer_id: CustomerId("c1".to_string()),
            placed_at: Utc.with_ymd_and_hms(2024, 5, 20, 10, 0, 0).single().expect("ts"),
            status: OrderStatus::Paid,
            total: Decimal::from(10),
            lines: vec![OrderLine { product_id: ProductId(product_id.to_string()), quantity }],
        }
    }

    #[test]
    fn low_absolute_stock_is_critical_regardless_of_velocity() {
        let products = [product("p1", 3)];
        let orders = [sale("o1", "p1", 140)];

        let entries = assess_inventory(&products, &orders, &InventoryRiskParams::default());

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].risk_level, RiskLevel::Critical);
        assert_eq!(entries[0].risk_reason, "Only 3 units remaining.");
    }

    #[test]
    fn seven_day_cover_rule_beats_safety_days() {
        // 140 units over 14 days = 10/day; 50 in stock = 5 days of cover.
        let products = [product("p1", 50)];
        let orders = [sale("o1", "p1", 140)];

        let entries = assess_inventory(&products, &orders, &InventoryRiskParams::default());

        assert_eq!(entries[0].risk_level, RiskLevel::Critical);
        let cover = entries[0].days_of_cover.expect("cover");
        assert!((cover - 5.0).abs() < 1e-9);
    }

    #[test]
    fn moderate_cover_is_low_stock() {
        // 14 units over 14 days = 1/day; 10 in stock = 10 days of cover.
        let products = [product("p1", 10)];
        let orders = [sale("o1", "p1", 14)];

        let entries = assess_inventory(&products, &orders, &InventoryRiskParams::default());

        assert_eq!(entries[0].risk_level, RiskLevel::LowStock);
    }

    #[test]
    fn stale_stock_near_threshold_is_flagged_without_velocity() {
        let products = [product("p1", 9), product("p2", 11)];

        let entries = assess_inventory(&products, &[], &InventoryRiskParams::default());

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].product_id.0, "p1");
        assert_eq!(entries[0].risk_level, RiskLevel::LowStock);
        assert_eq!(entries[0].days_of_cover, None);
    }

    #[test]
    fn healthy_products_are_not_surfaced() {
        // 14 units over 14 days = 1/day; 100 in stock = 100 days of cover.
        let products = [product("p1", 100)];
        let orders = [sale("o1", "p1", 14)];

        let entries = assess_inventory(&products, &orders, &InventoryRiskParams::default());

        assert!(entries.is_empty());
    }

    #[test]
    fn critical_entries_sort_before_low_stock_and_by_cover() {
        let products = [
            product("fast", 50),   // 5 days of cover -> Critical
            product("empty", 2),   // absolute threshold -> Critical, no velocity
            product("slow", 10),   // 10 days of cover -> Low Stock
            product("stale", 8),   // no sales, near threshold -> Low Stock
        ];
        let orders = [sale("o1", "fast", 140), sale("o2", "slow", 14)];

        let entries = assess_inventory(&products, &orders, &InventoryRiskParams::default());
        let ids: Vec<&str> = entries.iter().map(|entry| entry.product_id.0.as_str()).collect();

        // "empty" has no velocity so its unknown cover sorts last within Critical.
        assert_eq!(ids, vec!["fast", "empty", "slow", "stale"]);
    }
}
