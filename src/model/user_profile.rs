use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::{
    contact::{Contact, NewContact},
    education::{Education, NewEducation},
    experience::{Experience, NewExperience},
    skill::{NewSkill, Skill},
};

pub const TABLE_NAME: &str = "public.user_profile";

#[derive(Clone, Debug, Deserialize, FromRow, PartialEq, Eq)]
pub struct UserProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub resume_text: Option<String>,
    pub created_date: Option<DateTime<FixedOffset>>,
    pub updated_date: Option<DateTime<FixedOffset>>,
}

/// A profile with every owned child record loaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfileAggregate {
    pub profile: UserProfile,
    pub contact: Option<Contact>,
    pub skills: Vec<Skill>,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
}

impl ProfileAggregate {
    pub fn skill_ids(&self) -> Vec<Uuid> {
        self.skills.iter().map(|x| x.id).collect()
    }

    pub fn experience_ids(&self) -> Vec<Uuid> {
        self.experience.iter().map(|x| x.id).collect()
    }

    pub fn education_ids(&self) -> Vec<Uuid> {
        self.education.iter().map(|x| x.id).collect()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewProfile {
    pub resume_text: Option<String>,
    pub contact: Option<NewContact>,
    pub skills: Vec<NewSkill>,
    pub experience: Vec<NewExperience>,
    pub education: Vec<NewEducation>,
}
