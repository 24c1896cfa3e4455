use chrono::NaiveDate;
use std::fmt;

use crate::database::store::StoreError;

/// Top-level registry mapping a staff principal to its tenant coordinates.
pub const STAFF_REGISTRY: &str = "educatoare";
/// Top-level registry mapping a guardian principal to its tenant coordinates.
pub const GUARDIAN_REGISTRY: &str = "parinti";
/// Login accounts (email + password hash).
pub const ACCOUNTS: &str = "accounts";
pub const ORGANIZATIONS: &str = "organizations";

/// Path of a collection: an odd number of segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath {
    segments: Vec<String>,
}

/// Path of a single document: a collection plus a document id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocPath {
    collection: CollectionPath,
    id: String,
}

fn validate_segment(segment: &str) -> Result<(), StoreError> {
    if segment.is_empty() || segment.contains('/') || segment == "." || segment == ".." {
        return Err(StoreError::InvalidPath(segment.to_string()));
    }
    Ok(())
}

impl CollectionPath {
    pub fn root(name: &str) -> Result<Self, StoreError> {
        validate_segment(name)?;
        Ok(Self { segments: vec![name.to_string()] })
    }

    /// Document inside this collection.
    pub fn doc(&self, id: &str) -> Result<DocPath, StoreError> {
        validate_segment(id)?;
        Ok(DocPath { collection: self.clone(), id: id.to_string() })
    }

    pub fn name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        let segments: Vec<String> = raw.split('/').map(str::to_string).collect();
        if segments.len() % 2 == 0 {
            return Err(StoreError::InvalidPath(raw.to_string()));
        }
        for segment in &segments {
            validate_segment(segment)?;
        }
        Ok(Self { segments })
    }
}

impl DocPath {
    pub fn collection(&self) -> &CollectionPath {
        &self.collection
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Sub-collection nested under this document.
    pub fn sub(&self, name: &str) -> Result<CollectionPath, StoreError> {
        validate_segment(name)?;
        let mut segments = self.collection.segments.clone();
        segments.push(self.id.clone());
        segments.push(name.to_string());
        Ok(CollectionPath { segments })
    }

    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        let (collection, id) = raw
            .rsplit_once('/')
            .ok_or_else(|| StoreError::InvalidPath(raw.to_string()))?;
        CollectionPath::parse(collection)?.doc(id)
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn staff_record(uid: &str) -> Result<DocPath, StoreError> {
    CollectionPath::root(STAFF_REGISTRY)?.doc(uid)
}

pub fn guardian_record(uid: &str) -> Result<DocPath, StoreError> {
    CollectionPath::root(GUARDIAN_REGISTRY)?.doc(uid)
}

pub fn account(uid: &str) -> Result<DocPath, StoreError> {
    CollectionPath::root(ACCOUNTS)?.doc(uid)
}

pub fn organization(org_id: &str) -> Result<DocPath, StoreError> {
    CollectionPath::root(ORGANIZATIONS)?.doc(org_id)
}

pub fn locations(org_id: &str) -> Result<CollectionPath, StoreError> {
    organization(org_id)?.sub("locations")
}

/// Which half of the weekly letter pair a document holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LetterKind {
    Monday,
    Friday,
}

impl LetterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LetterKind::Monday => "monday",
            LetterKind::Friday => "friday",
        }
    }
}

/// Root of one location's subtree: `organizations/{org}/locations/{location}`.
///
/// Only built from resolved tenant coordinates, so every path a handler
/// touches is confined to the caller's own tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantScope {
    organization_id: String,
    location_id: String,
}

impl TenantScope {
    pub(crate) fn new(organization_id: &str, location_id: &str) -> Result<Self, StoreError> {
        validate_segment(organization_id)?;
        validate_segment(location_id)?;
        Ok(Self {
            organization_id: organization_id.to_string(),
            location_id: location_id.to_string(),
        })
    }

    pub fn organization_id(&self) -> &str {
        &self.organization_id
    }

    pub fn location_id(&self) -> &str {
        &self.location_id
    }

    pub fn location(&self) -> Result<DocPath, StoreError> {
        locations(&self.organization_id)?.doc(&self.location_id)
    }

    pub fn collection(&self, name: &str) -> Result<CollectionPath, StoreError> {
        self.location()?.sub(name)
    }

    pub fn children(&self) -> Result<CollectionPath, StoreError> {
        self.collection("children")
    }

    pub fn child(&self, cnp: &str) -> Result<DocPath, StoreError> {
        self.children()?.doc(cnp)
    }

    pub fn attendance(&self, cnp: &str) -> Result<CollectionPath, StoreError> {
        self.child(cnp)?.sub("attendance")
    }

    pub fn attendance_day(&self, cnp: &str, date: NaiveDate) -> Result<DocPath, StoreError> {
        self.attendance(cnp)?.doc(&date_key(date))
    }

    pub fn daily_reports(&self, cnp: &str) -> Result<CollectionPath, StoreError> {
        self.child(cnp)?.sub("dailyReports")
    }

    pub fn daily_report(&self, cnp: &str, date: NaiveDate) -> Result<DocPath, StoreError> {
        self.daily_reports(cnp)?.doc(&date_key(date))
    }

    pub fn activities(&self) -> Result<CollectionPath, StoreError> {
        self.collection("activities")
    }

    pub fn activity(&self, id: &str) -> Result<DocPath, StoreError> {
        self.activities()?.doc(id)
    }

    pub fn messages(&self) -> Result<CollectionPath, StoreError> {
        self.collection("messages")
    }

    pub fn message(&self, id: &str) -> Result<DocPath, StoreError> {
        self.messages()?.doc(id)
    }

    pub fn menus(&self) -> Result<CollectionPath, StoreError> {
        self.collection("menus")
    }

    pub fn menu(&self, id: &str) -> Result<DocPath, StoreError> {
        self.menus()?.doc(id)
    }

    pub fn weekly_letters(&self) -> Result<CollectionPath, StoreError> {
        self.collection("weeklyLetters")
    }

    pub fn weekly_letter(&self, week_id: &str, kind: LetterKind) -> Result<DocPath, StoreError> {
        self.weekly_letters()?.doc(&format!("{}-{}", week_id, kind.as_str()))
    }

    pub fn gallery(&self) -> Result<CollectionPath, StoreError> {
        self.collection("gallery")
    }

    pub fn gallery_item(&self, id: &str) -> Result<DocPath, StoreError> {
        self.gallery()?.doc(id)
    }
}
