//! First-purchase cohorts and month-over-month retention.
//!
//! "First purchase" is the customer's earliest qualifying order *within the
//! analysis window*, not their lifetime first order. Retention for a bounded
//! query range is intentionally relative to that range.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::domain::customer::CustomerId;
use crate::domain::order::Order;
use crate::window::{month_index, month_key};

/// Number of month offsets tracked per cohort (offset 0 through 11).
pub const RETENTION_MONTHS: usize = 12;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetentionCell {
    pub users: u64,
    pub rate: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cohort {
    pub cohort_month: String,
    pub size: u64,
    pub retention: Vec<RetentionCell>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortTable {
    pub cohorts: BTreeMap<String, Cohort>,
    pub months: Vec<String>,
}

/// Builds the cohort table from qualifying orders. Cohort months ascend;
/// `retention[i]` is the share of the cohort with at least one order in
/// cohort month + i.
pub fn cohort_table(qualifying: &[Order]) -> CohortTable {
    // Months (as monotonic indices) in which each customer ordered.
    let mut activity: HashMap<&CustomerId, BTreeSet<i32>> = HashMap::new();
    for order in qualifying {
        activity.entry(&order.customer_id).or_default().insert(month_index(order.placed_at));
    }

    // Cohort month = earliest active month; BTreeSet keeps it at the front.
    let mut members: BTreeMap<i32, Vec<&BTreeSet<i32>>> = BTreeMap::new();
    for months in activity.values() {
        if let Some(first) = months.first() {
            members.entry(*first).or_default().push(months);
        }
    }

    let mut cohorts = BTreeMap::new();
    for (cohort_index, cohort_members) in members {
        let size = cohort_members.len() as u64;
        let retention = (0..RETENTION_MONTHS as i32)
            .map(|offset| {
                let users = cohort_members
                    .iter()
                    .filter(|months| months.contains(&(cohort_index + offset)))
                    .count() as u64;
                let rate = if size == 0 { 0.0 } else { users as f64 / size as f64 * 100.0 };
                RetentionCell { users, rate }
            })
            .collect();

        let key = month_key(cohort_index);
        cohorts.insert(key.clone(), Cohort { cohort_month: key, size, retention });
    }

    let months = cohorts.keys().cloned().collect();
    CohortTable { cohorts, months }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use crate::domain::customer::CustomerId;
    use crate::domain::order::{Order, OrderId, OrderLine, OrderStatus};
    use crate::domain::product::ProductId;

    use super::{cohort_table, RETENTION_MONTHS};

    fn order(id: &str, customer: &str, year: i32, month: u32) -> Order {
        Order {
            id: OrderId(id.to_string()),
            customer_id: CustomerId(customer.to_string()),
            placed_at: Utc.with_ymd_and_hms(year, month, 5, 10, 0, 0).single().expect("ts"),
            status: OrderStatus::Paid,
            total: Decimal::from(25),
            lines: vec![OrderLine { product_id: ProductId("p1".to_string()), quantity: 1 }],
        }
    }

    #[test]
    fn empty_input_yields_empty_table() {
        let table = cohort_table(&[]);
        assert!(table.cohorts.is_empty());
        assert!(table.months.is_empty());
    }

    #[test]
    fn cohort_month_is_first_order_within_the_window() {
        let orders = vec![
            order("o1", "alice", 2024, 1),
            order("o2", "alice", 2024, 3),
            order("o3", "bob", 2024, 2),
        ];

        let table = cohort_table(&orders);

        assert_eq!(table.months, vec!["2024-01".to_string(), "2024-02".to_string()]);
        let january = &table.cohorts["2024-01"];
        assert_eq!(january.size, 1);
        assert_eq!(january.retention.len(), RETENTION_MONTHS);
        assert_eq!(january.retention[0].users, 1);
        assert_eq!(january.retention[2].users, 1);
        assert_eq!(january.retention[1].users, 0);
    }

    #[test]
    fn retention_rate_is_retained_share_of_cohort() {
        // Ten customers join in January; exactly four order again in February.
        let mut orders = Vec::new();
        for n in 0..10 {
            orders.push(order(&format!("jan-{n}"), &format!("c{n}"), 2024, 1));
        }
        for n in 0..4 {
            orders.push(order(&format!("feb-{n}"), &format!("c{n}"), 2024, 2));
        }

        let table = cohort_table(&orders);
        let cohort = &table.cohorts["2024-01"];

        assert_eq!(cohort.size, 10);
        assert_eq!(cohort.retention[0].users, 10);
        assert_eq!(cohort.retention[1].users, 4);
        assert!((cohort.retention[1].rate - 40.0).abs() < 1e-9);
    }

    #[test]
    fn december_cohort_offsets_cross_the_year_boundary() {
        let orders = vec![order("o1", "alice", 2023, 12), order("o2", "alice", 2024, 1)];

        let table = cohort_table(&orders);
        let cohort = &table.cohorts["2023-12"];

        assert_eq!(cohort.retention[1].users, 1);
        assert!((cohort.retention[1].rate - 100.0).abs() < 1e-9);
    }
}
