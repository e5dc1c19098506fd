use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::delta::Patch;

pub const TABLE_NAME: &str = "public.experience";

#[derive(Clone, Debug, Deserialize, FromRow, PartialEq, Eq)]
pub struct Experience {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub company: String,
    pub role: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub achievements: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewExperience {
    pub company: String,
    pub role: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub achievements: Vec<String>,
}

/// `Some(None)` on a date clears it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExperiencePatch {
    pub company: Option<String>,
    pub role: Option<String>,
    pub start_date: Option<Option<NaiveDate>>,
    pub end_date: Option<Option<NaiveDate>>,
    pub achievements: Option<Vec<String>>,
}

impl Patch for ExperiencePatch {
    fn is_empty(&self) -> bool {
        self.company.is_none()
            && self.role.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.achievements.is_none()
    }
}
