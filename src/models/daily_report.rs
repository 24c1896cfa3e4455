use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealPortion {
    All,
    Half,
    Little,
    None,
    #[default]
    NotServed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meals {
    #[serde(default)]
    pub mic_dejun: MealPortion,
    #[serde(default)]
    pub gustare: MealPortion,
    #[serde(default)]
    pub pranz: MealPortion,
    #[serde(default)]
    pub gustare_dupa_amiaza: MealPortion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepWindow {
    #[serde(with = "crate::types::hhmm")]
    pub start: NaiveTime,
    #[serde(with = "crate::types::hhmm")]
    pub end: NaiveTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Happy,
    Calm,
    Tired,
    Sad,
    Agitated,
}

/// `children/{cnp}/dailyReports/{YYYY-MM-DD}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyReport {
    pub date: NaiveDate,
    pub child_cnp: String,
    #[serde(default)]
    pub meals: Meals,
    #[serde(default)]
    pub sleep: Option<SleepWindow>,
    #[serde(default)]
    pub hygiene: Option<String>,
    #[serde(default)]
    pub mood: Option<Mood>,
    #[serde(default)]
    pub activities: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub author_id: String,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(with = "crate::types::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::types::timestamp")]
    pub updated_at: DateTime<Utc>,
}
