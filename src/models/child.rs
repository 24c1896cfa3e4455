use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cnp::Sex;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardianInfo {
    pub nume: String,
    #[serde(default)]
    pub telefon: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub relatie: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionType {
    #[default]
    Full,
    Half,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub taxa_lunara: Decimal,
    /// Meals served per attended day.
    #[serde(default)]
    pub mese_incluse: u32,
    #[serde(default)]
    pub tip_abonament: SubscriptionType,
}

/// Child (or resident) document, keyed by CNP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Child {
    pub cnp: String,
    pub nume: String,
    pub prenume: String,
    pub data_nasterii: NaiveDate,
    pub sex: Sex,
    #[serde(default)]
    pub adresa: Option<String>,
    #[serde(default)]
    pub alergii: Option<String>,
    #[serde(default)]
    pub observatii_medicale: Option<String>,
    pub parinte1: GuardianInfo,
    #[serde(default)]
    pub parinte2: Option<GuardianInfo>,
    pub contract: Contract,
    pub grupa_id: String,
    #[serde(with = "crate::types::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::types::timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Child {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.nume, self.prenume)
    }
}
