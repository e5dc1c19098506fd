use serde::Deserialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::delta::Patch;

pub const TABLE_NAME: &str = "public.education";

#[derive(Clone, Debug, Deserialize, FromRow, PartialEq, Eq)]
pub struct Education {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub degree: String,
    pub institution: String,
    pub year: Option<i32>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewEducation {
    pub degree: String,
    pub institution: String,
    pub year: Option<i32>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EducationPatch {
    pub degree: Option<String>,
    pub institution: Option<String>,
    pub year: Option<Option<i32>>,
}

impl Patch for EducationPatch {
    fn is_empty(&self) -> bool {
        self.degree.is_none() && self.institution.is_none() && self.year.is_none()
    }
}
