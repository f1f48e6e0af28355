// Company Domain Model

use serde::{Deserialize, Serialize};

use super::entity::{require_text, Entity};
use super::product::Product;
use crate::error::Result;

/// Company ID (generated on insert)
pub type CompanyId = i64;

/// Company Entity (table `company`)
///
/// Products are never loaded implicitly; use the explicit
/// fetch-with-products variant of the DAO to get [`CompanyWithProducts`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: Option<CompanyId>,
    pub name: String,
}

impl Company {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_text(Self::NAME, "name", &self.name)
    }
}

impl Entity for Company {
    const NAME: &'static str = "Company";

    fn id(&self) -> Option<i64> {
        self.id
    }
}

/// Company with its product collection loaded eagerly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyWithProducts {
    pub company: Company,
    pub products: Vec<Product>,
}
