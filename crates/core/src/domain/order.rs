use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::customer::CustomerId;
use crate::domain::product::ProductId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Cancelled,
    Pending,
    Paid,
    Shipped,
    Delivered,
}

impl OrderStatus {
    /// Statuses that count toward revenue, units, and margin metrics.
    pub const QUALIFYING: &'static [OrderStatus] =
        &[OrderStatus::Paid, OrderStatus::Shipped, OrderStatus::Delivered];

    pub fn is_qualifying(self) -> bool {
        matches!(self, Self::Paid | Self::Shipped | Self::Delivered)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cancelled => "Cancelled",
            Self::Pending => "Pending",
            Self::Paid => "Paid",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = crate::errors::DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cancelled" => Ok(Self::Cancelled),
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            other => Err(crate::errors::DomainError::InvalidParameter {
                param: "status",
                value: other.to_string(),
                expected: "Cancelled|Pending|Paid|Shipped|Delivered",
            }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A stored order record. `total` is the checkout-time sum of line prices;
/// revenue metrics trust it, per-item projections use the live product price.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub placed_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub total: Decimal,
    pub lines: Vec<OrderLine>,
}

impl Order {
    pub fn units(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }
}
