//! Recency/frequency/monetary scoring and named customer segments.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::customer::CustomerId;
use crate::domain::order::Order;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Segment {
    Champions,
    #[serde(rename = "Loyal Customers")]
    LoyalCustomers,
    #[serde(rename = "Potential Loyalists")]
    PotentialLoyalists,
    #[serde(rename = "At Risk")]
    AtRisk,
    #[serde(rename = "Cannot Lose Them")]
    CannotLoseThem,
    #[serde(rename = "Lost Customers")]
    LostCustomers,
    #[serde(rename = "New Customer")]
    NewCustomer,
}

impl Segment {
    pub fn label(self) -> &'static str {
        match self {
            Self::Champions => "Champions",
            Self::LoyalCustomers => "Loyal Customers",
            Self::PotentialLoyalists => "Potential Loyalists",
            Self::AtRisk => "At Risk",
            Self::CannotLoseThem => "Cannot Lose Them",
            Self::LostCustomers => "Lost Customers",
            Self::NewCustomer => "New Customer",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct AxisScores {
    recency: u8,
    frequency: u8,
    monetary: u8,
}

/// Ordered segment rules; the first predicate that matches wins, and the
/// final rule is the catch-all.
const SEGMENT_RULES: &[(fn(AxisScores) -> bool, Segment)] = &[
    (|s| s.recency >= 4 && s.frequency >= 4 && s.monetary >= 4, Segment::Champions),
    (|s| s.recency >= 3 && s.frequency >= 3 && s.monetary >= 3, Segment::LoyalCustomers),
    (|s| s.recency >= 4 && s.frequency <= 2, Segment::PotentialLoyalists),
    (|s| s.recency <= 2 && s.frequency >= 3, Segment::AtRisk),
    (|s| s.recency <= 2 && s.frequency <= 2 && s.monetary >= 3, Segment::CannotLoseThem),
    (|s| s.recency <= 2 && s.frequency <= 2, Segment::LostCustomers),
    (|_| true, Segment::NewCustomer),
];

fn recency_score(recency_days: i64) -> u8 {
    match recency_days {
        _ if recency_days <= 30 => 5,
        _ if recency_days <= 60 => 4,
        _ if recency_days <= 90 => 3,
        _ if recency_days <= 180 => 2,
        _ => 1,
    }
}

fn frequency_score(frequency: u64) -> u8 {
    match frequency {
        _ if frequency >= 10 => 5,
        _ if frequency >= 5 => 4,
        _ if frequency >= 3 => 3,
        _ if frequency >= 2 => 2,
        _ => 1,
    }
}

fn monetary_score(monetary: Decimal) -> u8 {
    if monetary >= Decimal::from(1000) {
        5
    } else if monetary >= Decimal::from(500) {
        4
    } else if monetary >= Decimal::from(200) {
        3
    } else if monetary >= Decimal::from(100) {
        2
    } else {
        1
    }
}

fn assign_segment(scores: AxisScores) -> Segment {
    SEGMENT_RULES
        .iter()
        .find(|(predicate, _)| predicate(scores))
        .map(|(_, segment)| *segment)
        .unwrap_or(Segment::NewCustomer)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRfm {
    pub customer_id: CustomerId,
    pub recency_days: i64,
    pub frequency: u64,
    pub monetary: Decimal,
    pub recency_score: u8,
    pub frequency_score: u8,
    pub monetary_score: u8,
    pub segment: Segment,
    pub rfm_score: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentSummary {
    pub segment: Segment,
    pub customers: u64,
    pub total_monetary: Decimal,
    pub avg_recency_days: f64,
    pub avg_frequency: f64,
    pub avg_monetary: Decimal,
}

/// Scores every customer with at least one qualifying order, sorted by
/// monetary value descending (customer id ascending as tiebreak).
pub fn score_customers(qualifying: &[Order], now: DateTime<Utc>) -> Vec<CustomerRfm> {
    struct Activity {
        last_order: DateTime<Utc>,
        frequency: u64,
        monetary: Decimal,
    }

    let mut by_customer: HashMap<&CustomerId, Activity> = HashMap::new();
    for order in qualifying {
        let activity = by_customer.entry(&order.customer_id).or_insert(Activity {
            last_order: order.placed_at,
            frequency: 0,
            monetary: Decimal::ZERO,
        });
        activity.last_order = activity.last_order.max(order.placed_at);
        activity.frequency += 1;
        activity.monetary += order.total;
    }

    let mut scored: Vec<CustomerRfm> = by_customer
        .into_iter()
        .map(|(customer_id, activity)| {
            let recency_days = (now - activity.last_order).num_days().max(0);
            let scores = AxisScores {
                recency: recency_score(recency_days),
                frequency: frequency_score(activity.frequency),
                monetary: monetary_score(activity.monetary),
            };

            CustomerRfm {
                customer_id: customer_id.clone(),
                recency_days,
                frequency: activity.frequency,
                monetary: activity.monetary,
                recency_score: scores.recency,
                frequency_score: scores.frequency,
                monetary_score: scores.monetary,
                segment: assign_segment(scores),
                rfm_score: format!("{}{}{}", scores.recency, scores.frequency, scores.monetary),
            }
        })
        .collect();

    scored.sort_by(|a, b| {
        b.monetary.cmp(&a.monetary).then_with(|| a.customer_id.cmp(&b.customer_id))
    });
    scored
}

/// Aggregates scored customers into per-segment summary cards, ordered by
/// customer count descending.
pub fn summarize_segments(customers: &[CustomerRfm]) -> Vec<SegmentSummary> {
    struct Totals {
        customers: u64,
        monetary: Decimal,
        recency_days: i64,
        frequency: u64,
    }

    let mut by_segment: HashMap<Segment, Totals> = HashMap::new();
    for customer in customers {
        let totals = by_segment.entry(customer.segment).or_insert(Totals {
            customers: 0,
            monetary: Decimal::ZERO,
            recency_days: 0,
            frequency: 0,
        });
        totals.customers += 1;
        totals.monetary += customer.monetary;
        totals.recency_days += customer.recency_days;
        totals.frequency += customer.frequency;
    }

    let mut summaries: Vec<SegmentSummary> = by_segment
        .into_iter()
        .map(|(segment, totals)| {
            let count = totals.customers;
            SegmentSummary {
                segment,
                customers: count,
                total_monetary: totals.monetary,
                avg_recency_days: totals.recency_days as f64 / count as f64,
                avg_frequency: totals.frequency as f64 / count as f64,
                avg_monetary: (totals.monetary / Decimal::from(count)).round_dp(2),
            }
        })
        .collect();

    summaries.sort_by(|a, b| b.customers.cmp(&a.customers).then_with(|| a.segment.cmp(&b.segment)));
    summaries
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::Decimal;

    use crate::domain::customer::CustomerId;
    use crate::domain::order::{Order, OrderId, OrderLine, OrderStatus};
    use crate::domain::product::ProductId;

    use super::{score_customers, summarize_segments, Segment};

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).single().expect("ts")
    }

    fn orders_for(customer: &str, count: u64, each_total: i64, days_ago: i64) -> Vec<Order> {
        (0..count)
            .map(|n| Order {
                id: OrderId(format!("{customer}-{n}")),
                customer_id: CustomerId(customer.to_string()),
                // Spread orders backward so the most recent one sets recency.
                placed_at: now() - Duration::days(days_ago + n as i64 * 7),
                status: OrderStatus::Delivered,
                total: Decimal::from(each_total),
                lines: vec![OrderLine { product_id: ProductId("p1".to_string()), quantity: 1 }],
            })
            .collect()
    }

    #[test]
    fn top_scores_land_in_champions() {
        let orders = orders_for("vip", 12, 125, 10);

        let scored = score_customers(&orders, now());

        assert_eq!(scored.len(), 1);
        let vip = &scored[0];
        assert_eq!(vip.recency_days, 10);
        assert_eq!(vip.frequency, 12);
        assert_eq!(vip.monetary, Decimal::from(1500));
        assert_eq!(vip.rfm_score, "555");
        assert_eq!(vip.segment, Segment::Champions);
    }

    #[test]
    fn stale_low_value_customers_are_lost() {
        let orders = orders_for("ghost", 1, 50, 200);

        let scored = score_customers(&orders, now());

        assert_eq!(scored[0].rfm_score, "111");
        assert_eq!(scored[0].segment, Segment::LostCustomers);
    }

    #[test]
    fn monetary_at_score_three_flips_lost_to_cannot_lose_them() {
        // Same recency/frequency as the lost customer, but monetary 250
        // crosses the >=200 breakpoint and rule 5 fires before rule 6.
        let orders = orders_for("whale", 1, 250, 200);

        let scored = score_customers(&orders, now());

        assert_eq!(scored[0].monetary_score, 3);
        assert_eq!(scored[0].segment, Segment::CannotLoseThem);
    }

    #[test]
    fn recent_infrequent_buyers_are_potential_loyalists() {
        let orders = orders_for("newish", 1, 80, 5);

        let scored = score_customers(&orders, now());

        assert_eq!(scored[0].segment, Segment::PotentialLoyalists);
    }

    #[test]
    fn lapsed_frequent_buyers_are_at_risk() {
        let orders = orders_for("lapsed", 4, 60, 200);

        let scored = score_customers(&orders, now());

        assert_eq!(scored[0].frequency_score, 3);
        assert_eq!(scored[0].recency_score, 1);
        assert_eq!(scored[0].segment, Segment::AtRisk);
    }

    #[test]
    fn summaries_average_over_segment_members() {
        let mut orders = orders_for("a", 1, 50, 200);
        orders.extend(orders_for("b", 1, 70, 220));

        let scored = score_customers(&orders, now());
        let summaries = summarize_segments(&scored);

        assert_eq!(summaries.len(), 1);
        let lost = &summaries[0];
        assert_eq!(lost.segment, Segment::LostCustomers);
        assert_eq!(lost.customers, 2);
        assert_eq!(lost.total_monetary, Decimal::from(120));
        assert_eq!(lost.avg_monetary, Decimal::from(60));
        assert!((lost.avg_recency_days - 210.0).abs() < 1e-9);
    }

    #[test]
    fn customers_sort_by_monetary_descending() {
        let mut orders = orders_for("small", 1, 40, 10);
        orders.extend(orders_for("big", 1, 400, 10));

        let scored = score_customers(&orders, now());

        assert_eq!(scored[0].customer_id.0, "big");
        assert_eq!(scored[1].customer_id.0, "small");
    }
}
