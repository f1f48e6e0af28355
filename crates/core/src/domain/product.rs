// Product Domain Model

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::company::{Company, CompanyId};
use super::entity::{require_text, Entity};
use crate::error::Result;

/// Product ID (generated on insert)
pub type ProductId = i64;

/// Product Entity (table `product`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: Option<ProductId>,
    pub name: String,
    pub producer: String,
    pub price: Decimal,
    pub expiration_date: NaiveDate,

    /// Set by `save` to the moment of the call; `None` until persisted
    pub creation_time: Option<NaiveDateTime>,

    /// Lazy many-to-one reference, column `company_id`
    pub company_id: Option<CompanyId>,
}

impl Product {
    /// Create a transient product (no id, no creation time)
    pub fn new(
        name: impl Into<String>,
        producer: impl Into<String>,
        price: Decimal,
        expiration_date: NaiveDate,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            producer: producer.into(),
            price,
            expiration_date,
            creation_time: None,
            company_id: None,
        }
    }

    /// Attach this product to a company
    pub fn with_company(mut self, company_id: CompanyId) -> Self {
        self.company_id = Some(company_id);
        self
    }

    pub fn validate(&self) -> Result<()> {
        require_text(Self::NAME, "name", &self.name)
    }
}

impl Entity for Product {
    const NAME: &'static str = "Product";

    fn id(&self) -> Option<i64> {
        self.id
    }
}

/// Product loaded together with its (optional) company
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductWithCompany {
    pub product: Product,
    pub company: Option<Company>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::require_id;
    use std::str::FromStr;

    fn milk() -> Product {
        Product::new(
            "Milk",
            "Acme",
            Decimal::from_str("1.50").unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        )
    }

    #[test]
    fn test_new_product_is_transient() {
        let product = milk();
        assert!(product.id.is_none());
        assert!(product.creation_time.is_none());
        assert!(product.company_id.is_none());
    }

    #[test]
    fn test_require_id_on_transient_product() {
        let err = require_id(&milk(), "update").unwrap_err();
        assert!(err.is_missing_id());
        assert_eq!(err.to_string(), "Cannot update Product: identifier is missing");
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut product = milk();
        product.name = "  ".to_string();
        assert!(product.validate().is_err());
    }
}
