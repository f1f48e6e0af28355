// Account Domain Model

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::entity::{require_text, Entity};
use crate::error::{DaoError, Result};

/// Account ID (generated on insert)
pub type AccountId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gender::Male => write!(f, "MALE"),
            Gender::Female => write!(f, "FEMALE"),
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = DaoError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "MALE" => Ok(Gender::Male),
            "FEMALE" => Ok(Gender::Female),
            other => Err(DaoError::Validation(format!("Unknown gender: {}", other))),
        }
    }
}

/// Account Entity (table `account`, `email` is unique)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Option<AccountId>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub birthday: NaiveDate,
    pub gender: Gender,
    pub balance: Option<Decimal>,
    pub creation_time: Option<NaiveDateTime>,
}

impl Account {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        birthday: NaiveDate,
        gender: Gender,
    ) -> Self {
        Self {
            id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            birthday,
            gender,
            balance: None,
            creation_time: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_text(Self::NAME, "first_name", &self.first_name)?;
        require_text(Self::NAME, "last_name", &self.last_name)?;
        require_text(Self::NAME, "email", &self.email)
    }
}

impl Entity for Account {
    const NAME: &'static str = "Account";

    fn id(&self) -> Option<i64> {
        self.id
    }
}
