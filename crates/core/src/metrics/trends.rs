//! Time-bucketed revenue/order/unit series.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order::Order;
use crate::window::Interval;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub bucket: String,
    pub revenue: Decimal,
    pub orders: u64,
    pub units: u64,
}

/// Buckets qualifying orders by truncated timestamp. Buckets with no orders
/// are omitted rather than zero-filled; output is ascending by bucket key.
pub fn trend_points(qualifying: &[Order], interval: Interval) -> Vec<TrendPoint> {
    let mut buckets: BTreeMap<String, TrendPoint> = BTreeMap::new();

    for order in qualifying {
        let key = interval.bucket_key(order.placed_at);
        let point = buckets.entry(key.clone()).or_insert_with(|| TrendPoint {
            bucket: key,
            revenue: Decimal::ZERO,
            orders: 0,
            units: 0,
        });
        point.revenue += order.total;
        point.orders += 1;
        point.units += order.units();
    }

    buckets.into_values().collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use crate::domain::customer::CustomerId;
    use crate::domain::order::{Order, OrderId, OrderLine, OrderStatus};
    use crate::domain::product::ProductId;
    use crate::metrics::snapshot::MetricSnapshot;
    use crate::window::Interval;

    use super::trend_points;

    fn order(id: &str, day: u32, total: i64, quantity: u32) -> Order {
        Order {
            id: OrderId(id.to_string()),
            customer_id: CustomerId("c1".to_string()),
            placed_at: Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).single().expect("ts"),
            status: OrderStatus::Paid,
            total: Decimal::from(total),
            lines: vec![OrderLine { product_id: ProductId("p1".to_string()), quantity }],
        }
    }

    #[test]
    fn daily_buckets_are_sorted_and_sparse() {
        let orders = vec![order("o1", 9, 30, 1), order("o2", 3, 10, 2), order("o3", 9, 20, 3)];

        let points = trend_points(&orders, Interval::Day);

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].bucket, "2024-03-03");
        assert_eq!(points[1].bucket, "2024-03-09");
        assert_eq!(points[1].revenue, Decimal::from(50));
        assert_eq!(points[1].orders, 2);
        assert_eq!(points[1].units, 4);
    }

    #[test]
    fn monthly_bucket_collapses_the_window() {
        let orders = vec![order("o1", 1, 10, 1), order("o2", 28, 15, 1)];

        let points = trend_points(&orders, Interval::Month);

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].bucket, "2024-03");
        assert_eq!(points[0].orders, 2);
    }

    #[test]
    fn bucket_units_reconcile_with_the_window_snapshot() {
        let orders = vec![order("o1", 2, 10, 4), order("o2", 12, 25, 1), order("o3", 30, 5, 6)];

        let snapshot = MetricSnapshot::compute(&orders, 0, &HashMap::new(), 0);
        let bucketed_units: u64 =
            trend_points(&orders, Interval::Week).iter().map(|point| point.units).sum();

        assert_eq!(bucketed_units, snapshot.units);
    }
}
