use serde::Deserialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::delta::Patch;

pub const TABLE_NAME: &str = "public.contact";

#[derive(Clone, Debug, Deserialize, FromRow, PartialEq, Eq)]
pub struct Contact {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewContact {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin: Option<String>,
}

/// Outer `None` leaves the column untouched, `Some(None)` clears it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactPatch {
    pub name: Option<Option<String>>,
    pub email: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub linkedin: Option<Option<String>>,
}

impl Patch for ContactPatch {
    fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none() && self.linkedin.is_none()
    }
}
