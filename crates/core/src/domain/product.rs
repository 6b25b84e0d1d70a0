use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    /// Unit cost; `Decimal::ZERO` means the margin is unknown and the product
    /// is excluded from gross-margin calculations.
    pub cost: Decimal,
    pub stock: u32,
}

impl Product {
    pub fn has_known_cost(&self) -> bool {
        self.cost > Decimal::ZERO
    }
}
