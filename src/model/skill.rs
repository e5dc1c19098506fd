use serde::Deserialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::delta::Patch;

pub const TABLE_NAME: &str = "public.skill";

#[derive(Clone, Debug, Deserialize, FromRow, PartialEq, Eq)]
pub struct Skill {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewSkill {
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SkillPatch {
    pub name: Option<String>,
}

impl Patch for SkillPatch {
    fn is_empty(&self) -> bool {
        self.name.is_none()
    }
}
