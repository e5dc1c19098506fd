use crate::model::contact::{Contact, ContactPatch, NewContact};

use super::Patch;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContactUpsert {
    Create(NewContact),
    Update(ContactPatch),
}

/// Upsert instruction for the profile's single contact row. `None` means there
/// is nothing to write: the contact exists and the patch changes no field.
pub fn merge_contact(existing: Option<&Contact>, patch: ContactPatch) -> Option<ContactUpsert> {
    match existing {
        None => Some(ContactUpsert::Create(NewContact {
            name: patch.name.flatten(),
            email: patch.email.flatten(),
            phone: patch.phone.flatten(),
            linkedin: patch.linkedin.flatten(),
        })),
        Some(_) if patch.is_empty() => None,
        Some(_) => Some(ContactUpsert::Update(patch)),
    }
}
