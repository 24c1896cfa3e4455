use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What kind of facility an organization runs. The data model is the same
/// for all of them; only the nouns shown to users change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacilityType {
    #[default]
    Kindergarten,
    ElderCare,
    Hospital,
    Hotel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacilityLabels {
    pub resident: &'static str,
    pub residents: &'static str,
    pub group: &'static str,
    pub staff: &'static str,
}

impl FacilityType {
    pub fn labels(&self) -> FacilityLabels {
        match self {
            FacilityType::Kindergarten => FacilityLabels {
                resident: "copil",
                residents: "copii",
                group: "grupă",
                staff: "educatoare",
            },
            FacilityType::ElderCare => FacilityLabels {
                resident: "rezident",
                residents: "rezidenți",
                group: "secție",
                staff: "îngrijitor",
            },
            FacilityType::Hospital => FacilityLabels {
                resident: "pacient",
                residents: "pacienți",
                group: "salon",
                staff: "asistent",
            },
            FacilityType::Hotel => FacilityLabels {
                resident: "oaspete",
                residents: "oaspeți",
                group: "etaj",
                staff: "recepționer",
            },
        }
    }
}

/// Root tenant document, `organizations/{ownerUid}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub name: String,
    #[serde(default)]
    pub facility_type: FacilityType,
    pub owner_email: String,
    #[serde(with = "crate::types::timestamp")]
    pub created_at: DateTime<Utc>,
}
