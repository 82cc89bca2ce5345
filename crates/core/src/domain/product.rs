use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub i64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    pub category: String,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
}

/// Payload for adding a product; the store assigns the id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    pub category: String,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, price: f64, category: impl Into<String>) -> Self {
        Self { name: name.into(), price, category: category.into(), in_stock: true }
    }

    pub fn with_in_stock(mut self, in_stock: bool) -> Self {
        self.in_stock = in_stock;
        self
    }

    /// Trims name and category and checks the catalog invariants.
    pub fn normalized(self) -> Result<Self, ValidationError> {
        let name = self.name.trim().to_string();
        let category = self.category.trim().to_string();

        if name.is_empty() {
            return Err(ValidationError::EmptyField { field: "name" });
        }
        if category.is_empty() {
            return Err(ValidationError::EmptyField { field: "category" });
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(ValidationError::InvalidPrice { price: self.price });
        }

        Ok(Self { name, price: self.price, category, in_stock: self.in_stock })
    }

    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name,
            price: self.price,
            category: self.category,
            in_stock: self.in_stock,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductStatistics {
    pub count: u64,
    pub average_price: f64,
}

impl ProductStatistics {
    pub fn empty() -> Self {
        Self { count: 0, average_price: 0.0 }
    }
}

fn default_in_stock() -> bool {
    true
}
