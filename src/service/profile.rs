use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    core::error::{FieldError, ProfileError},
    delta::{merge_contact, normalize, CollectionUpdate, ProfileDelta},
    mapper::profile::to_profile_response,
    model::user_profile::{NewProfile, ProfileAggregate},
    repository::profile::ProfileStore,
    schema::{profile::ProfileResponse, profile_request::ProfileUpdateRequest},
};

pub async fn get_profile(
    store: &dyn ProfileStore,
    user_id: &Uuid,
) -> Result<ProfileResponse, ProfileError> {
    let aggregate = load_owned(store, user_id).await?;
    Ok(to_profile_response(&aggregate))
}

pub async fn create_profile(
    store: &dyn ProfileStore,
    user_id: &Uuid,
    profile: NewProfile,
) -> Result<ProfileResponse, ProfileError> {
    if store.find_by_user_id(user_id).await?.is_some() {
        warn!("user {} already has a profile", user_id);
        return Err(ProfileError::Duplicate(
            "A profile for this user already exists".to_string(),
        ));
    }
    let aggregate = store.create(user_id, &profile).await?;
    info!("profile {} created for user {}", aggregate.profile.id, user_id);
    Ok(to_profile_response(&aggregate))
}

/// Reconciles a validated partial update with the stored profile of
/// `user_id`. A request whose every delta turns out empty writes nothing and
/// returns the current profile.
pub async fn update_profile(
    store: &dyn ProfileStore,
    user_id: &Uuid,
    request: ProfileUpdateRequest,
) -> Result<ProfileResponse, ProfileError> {
    let aggregate = load_owned(store, user_id).await?;
    if let Err(err) = check_experience_dates(&aggregate, &request) {
        warn!("profile {} update rejected: {}", aggregate.profile.id, err);
        return Err(err);
    }
    let delta = build_delta(&aggregate, request);
    if delta.is_empty() {
        info!("profile {} update has nothing to apply", aggregate.profile.id);
        return Ok(to_profile_response(&aggregate));
    }
    let updated = store.apply_delta(&aggregate.profile.id, &delta).await?;
    info!(
        "profile {} updated: {} created, {} deleted, {} updated",
        updated.profile.id,
        delta.skills.creates.len() + delta.experience.creates.len() + delta.education.creates.len(),
        delta.skills.deletes.len() + delta.experience.deletes.len() + delta.education.deletes.len(),
        delta.skills.updates.len() + delta.experience.updates.len() + delta.education.updates.len(),
    );
    Ok(to_profile_response(&updated))
}

/// One delta per field present in `request`; absent fields stay untouched.
pub fn build_delta(aggregate: &ProfileAggregate, request: ProfileUpdateRequest) -> ProfileDelta {
    let mut delta = ProfileDelta {
        contact: request
            .contact
            .and_then(|patch| merge_contact(aggregate.contact.as_ref(), patch)),
        ..Default::default()
    };
    if let Some(skills) = request.skills {
        delta.skills = normalize(skills, &aggregate.skill_ids());
    }
    if let Some(experience) = request.experience {
        delta.experience = normalize(experience, &aggregate.experience_ids());
    }
    if let Some(education) = request.education {
        delta.education = normalize(education, &aggregate.education_ids());
    }
    delta
}

/// An experience update is checked against the stored row it lands on, so a
/// lone `end_date` cannot end up before the kept `start_date`. Identifiers of
/// other profiles are skipped, the store ignores them.
fn check_experience_dates(
    aggregate: &ProfileAggregate,
    request: &ProfileUpdateRequest,
) -> Result<(), ProfileError> {
    let Some(CollectionUpdate::Delta(delta)) = &request.experience else {
        return Ok(());
    };
    let mut errors: Vec<FieldError> = vec![];
    for (idx, item) in delta.update.iter().enumerate() {
        let Some(stored) = aggregate.experience.iter().find(|x| x.id == item.id) else {
            continue;
        };
        let start_date = item.patch.start_date.unwrap_or(stored.start_date);
        let end_date = item.patch.end_date.unwrap_or(stored.end_date);
        if let (Some(start), Some(end)) = (start_date, end_date) {
            if end < start {
                errors.push(FieldError::new(
                    format!("experience.update[{idx}].end_date"),
                    "must not be before start_date",
                ));
            }
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ProfileError::Validation(errors))
    }
}

async fn load_owned(
    store: &dyn ProfileStore,
    user_id: &Uuid,
) -> Result<ProfileAggregate, ProfileError> {
    match store.find_by_user_id(user_id).await? {
        Some(aggregate) => Ok(aggregate),
        None => {
            warn!("no profile for user {}", user_id);
            Err(ProfileError::NotFound("Profile not found".to_string()))
        }
    }
}
