use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;
use crate::errors::ValidationError;

pub const ORDER_STATUS_CREATED: &str = "created";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub i64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub status: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatistics {
    pub count: u64,
    pub total_quantity: i64,
}

pub fn validate_quantity(quantity: i64) -> Result<i64, ValidationError> {
    if quantity <= 0 {
        return Err(ValidationError::NonPositiveQuantity { quantity });
    }
    Ok(quantity)
}

#[cfg(test)]
mod tests {
    use super::{validate_quantity, OrderStatistics};
    use crate::errors::ValidationError;

    #[test]
    fn quantity_must_be_positive() {
        assert_eq!(validate_quantity(2), Ok(2));
        assert_eq!(
            validate_quantity(0),
            Err(ValidationError::NonPositiveQuantity { quantity: 0 })
        );
        assert!(validate_quantity(-3).unwrap_err().to_string().contains("quantity"));
    }

    #[test]
    fn default_statistics_are_zero() {
        let stats = OrderStatistics::default();
        assert_eq!(stats.count, 0);
        assert_eq!(stats.total_quantity, 0);
    }
}
