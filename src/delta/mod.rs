//! Reconciliation of partial profile updates into persistence operations.

pub mod collection;
pub mod contact;

pub use collection::{normalize, CollectionDelta, CollectionUpdate, DeltaRequest, ItemPatch};
pub use contact::{merge_contact, ContactUpsert};

use crate::model::{
    education::{EducationPatch, NewEducation},
    experience::{ExperiencePatch, NewExperience},
    skill::{NewSkill, SkillPatch},
};

/// A partial item whose emptiness means "nothing to change".
pub trait Patch {
    fn is_empty(&self) -> bool;
}

pub type SkillDelta = CollectionDelta<NewSkill, SkillPatch>;
pub type ExperienceDelta = CollectionDelta<NewExperience, ExperiencePatch>;
pub type EducationDelta = CollectionDelta<NewEducation, EducationPatch>;

/// Every per-field delta of one update request, applied by the store as a
/// single transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileDelta {
    pub contact: Option<ContactUpsert>,
    pub skills: SkillDelta,
    pub experience: ExperienceDelta,
    pub education: EducationDelta,
}

impl ProfileDelta {
    pub fn is_empty(&self) -> bool {
        self.contact.is_none()
            && self.skills.is_empty()
            && self.experience.is_empty()
            && self.education.is_empty()
    }
}
