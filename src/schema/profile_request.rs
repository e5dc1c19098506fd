//! Validation of profile request bodies.
//!
//! Bodies arrive as raw JSON so that every offending field can be reported in
//! one response. A collection field is resolved here, once, into a
//! [`CollectionUpdate`]: an array is a full replacement, an object is an
//! `add` / `remove` / `update` delta.

use chrono::NaiveDate;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    core::{
        error::{FieldError, ProfileError},
        utils::parse_date,
    },
    delta::{CollectionUpdate, DeltaRequest, ItemPatch},
    model::{
        contact::{ContactPatch, NewContact},
        education::{EducationPatch, NewEducation},
        experience::{ExperiencePatch, NewExperience},
        skill::{NewSkill, SkillPatch},
        user_profile::NewProfile,
    },
};

const UPDATE_FIELDS: &[&str] = &["contact", "skills", "experience", "education"];
const CREATE_FIELDS: &[&str] = &["resume_text", "contact", "skills", "experience", "education"];
const DELTA_KEYS: &[&str] = &["add", "remove", "update"];
const CONTACT_KEYS: &[&str] = &["name", "email", "phone", "linkedin"];
const MIN_YEAR: i64 = 1900;
/// Width of the `VARCHAR` columns backing item and contact strings.
const VARCHAR_MAX: usize = 255;
const PHONE_MAX: usize = 100;
const MAX_YEAR: i64 = 2100;

pub type SkillUpdate = CollectionUpdate<NewSkill, SkillPatch>;
pub type ExperienceUpdate = CollectionUpdate<NewExperience, ExperiencePatch>;
pub type EducationUpdate = CollectionUpdate<NewEducation, EducationPatch>;

/// A validated partial update. `None` fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileUpdateRequest {
    pub contact: Option<ContactPatch>,
    pub skills: Option<SkillUpdate>,
    pub experience: Option<ExperienceUpdate>,
    pub education: Option<EducationUpdate>,
}

impl ProfileUpdateRequest {
    pub fn parse(body: &Value) -> Result<Self, ProfileError> {
        let mut errors = FieldErrors::default();
        let Some(obj) = body.as_object() else {
            return Err(ProfileError::Validation(vec![FieldError::new(
                "body",
                "must be an object",
            )]));
        };
        if obj.is_empty() {
            return Err(ProfileError::Validation(vec![FieldError::new(
                "body",
                "at least one field required",
            )]));
        }
        check_keys(obj, UPDATE_FIELDS, "", &mut errors);

        let request = ProfileUpdateRequest {
            contact: obj
                .get("contact")
                .and_then(|x| parse_contact(x, "contact", &mut errors)),
            skills: obj
                .get("skills")
                .and_then(|x| parse_collection::<NewSkill>(x, "skills", &mut errors)),
            experience: obj
                .get("experience")
                .and_then(|x| parse_collection::<NewExperience>(x, "experience", &mut errors)),
            education: obj
                .get("education")
                .and_then(|x| parse_collection::<NewEducation>(x, "education", &mut errors)),
        };
        errors.into_result(request)
    }
}

/// Validates a profile creation body: full items only, every collection
/// optional.
pub fn parse_new_profile(body: &Value) -> Result<NewProfile, ProfileError> {
    let mut errors = FieldErrors::default();
    let Some(obj) = body.as_object() else {
        return Err(ProfileError::Validation(vec![FieldError::new(
            "body",
            "must be an object",
        )]));
    };
    check_keys(obj, CREATE_FIELDS, "", &mut errors);

    let resume_text = optional_string(obj, "resume_text", "", None, &mut errors).flatten();
    let contact = obj
        .get("contact")
        .and_then(|x| parse_contact(x, "contact", &mut errors))
        .map(|patch| NewContact {
            name: patch.name.flatten(),
            email: patch.email.flatten(),
            phone: patch.phone.flatten(),
            linkedin: patch.linkedin.flatten(),
        });
    let profile = NewProfile {
        resume_text,
        contact,
        skills: parse_full_list(obj.get("skills"), "skills", &mut errors),
        experience: parse_full_list(obj.get("experience"), "experience", &mut errors),
        education: parse_full_list(obj.get("education"), "education", &mut errors),
    };
    errors.into_result(profile)
}

#[derive(Default)]
struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    fn push(&mut self, property: impl Into<String>, message: &str) {
        self.0.push(FieldError::new(property, message));
    }

    fn into_result<T>(self, value: T) -> Result<T, ProfileError> {
        if self.0.is_empty() {
            Ok(value)
        } else {
            Err(ProfileError::Validation(self.0))
        }
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn check_keys(obj: &Map<String, Value>, allowed: &[&str], path: &str, errors: &mut FieldErrors) {
    for key in obj.keys() {
        if !allowed.contains(&key.as_str()) {
            errors.push(join(path, key), "is not allowed");
        }
    }
}

fn as_object<'a>(
    value: &'a Value,
    path: &str,
    errors: &mut FieldErrors,
) -> Option<&'a Map<String, Value>> {
    let obj = value.as_object();
    if obj.is_none() {
        errors.push(path, "must be an object");
    }
    obj
}

fn as_array<'a>(value: &'a Value, path: &str, errors: &mut FieldErrors) -> Option<&'a Vec<Value>> {
    let items = value.as_array();
    if items.is_none() {
        errors.push(path, "must be an array");
    }
    items
}

fn required_string(
    obj: &Map<String, Value>,
    key: &str,
    path: &str,
    errors: &mut FieldErrors,
) -> Option<String> {
    if matches!(obj.get(key), None | Some(Value::Null)) {
        errors.push(join(path, key), "is required");
        return None;
    }
    patch_required_string(obj, key, path, errors)
}

/// Absent stays `None`; a required scalar may be changed but never cleared.
fn patch_required_string(
    obj: &Map<String, Value>,
    key: &str,
    path: &str,
    errors: &mut FieldErrors,
) -> Option<String> {
    match obj.get(key) {
        None => None,
        Some(Value::Null) => {
            errors.push(join(path, key), "cannot be null");
            None
        }
        Some(Value::String(val)) if val.trim().is_empty() => {
            errors.push(join(path, key), "must not be empty");
            None
        }
        Some(Value::String(val)) => {
            within_length(val.trim(), VARCHAR_MAX, &join(path, key), errors)
        }
        Some(_) => {
            errors.push(join(path, key), "must be a string");
            None
        }
    }
}

/// Outer `None` when absent, `Some(None)` when null or blank. `max_len` is
/// `None` for `TEXT` columns.
fn optional_string(
    obj: &Map<String, Value>,
    key: &str,
    path: &str,
    max_len: Option<usize>,
    errors: &mut FieldErrors,
) -> Option<Option<String>> {
    match obj.get(key) {
        None => None,
        Some(Value::Null) => Some(None),
        Some(Value::String(val)) if val.trim().is_empty() => Some(None),
        Some(Value::String(val)) => match max_len {
            Some(max_len) => {
                within_length(val.trim(), max_len, &join(path, key), errors).map(Some)
            }
            None => Some(Some(val.trim().to_string())),
        },
        Some(_) => {
            errors.push(join(path, key), "must be a string");
            None
        }
    }
}

fn within_length(
    val: &str,
    max_len: usize,
    path: &str,
    errors: &mut FieldErrors,
) -> Option<String> {
    if val.chars().count() > max_len {
        errors.push(path, &format!("must be at most {max_len} characters"));
        return None;
    }
    Some(val.to_string())
}

fn optional_date(
    obj: &Map<String, Value>,
    key: &str,
    path: &str,
    errors: &mut FieldErrors,
) -> Option<Option<NaiveDate>> {
    match obj.get(key) {
        None => None,
        Some(Value::Null) => Some(None),
        Some(Value::String(val)) => match parse_date(val) {
            Some(date) => Some(Some(date)),
            None => {
                errors.push(join(path, key), "must be a date (YYYY-MM-DD or YYYY-MM)");
                None
            }
        },
        Some(_) => {
            errors.push(join(path, key), "must be a date (YYYY-MM-DD or YYYY-MM)");
            None
        }
    }
}

fn optional_year(
    obj: &Map<String, Value>,
    key: &str,
    path: &str,
    errors: &mut FieldErrors,
) -> Option<Option<i32>> {
    let year = match obj.get(key) {
        None => return None,
        Some(Value::Null) => return Some(None),
        Some(Value::Number(val)) => val.as_i64(),
        Some(Value::String(val)) => val.trim().parse::<i64>().ok(),
        Some(_) => None,
    };
    match year {
        Some(year) if (MIN_YEAR..=MAX_YEAR).contains(&year) => Some(Some(year as i32)),
        _ => {
            errors.push(
                join(path, key),
                "must be a year between 1900 and 2100",
            );
            None
        }
    }
}

fn optional_string_list(
    obj: &Map<String, Value>,
    key: &str,
    path: &str,
    errors: &mut FieldErrors,
) -> Option<Vec<String>> {
    match obj.get(key) {
        None => None,
        Some(Value::Null) => Some(vec![]),
        Some(Value::Array(items)) => {
            let mut result: Vec<String> = vec![];
            for (idx, item) in items.iter().enumerate() {
                match item.as_str() {
                    Some(val) => result.push(val.trim().to_string()),
                    None => errors.push(format!("{}[{}]", join(path, key), idx), "must be a string"),
                }
            }
            Some(result)
        }
        Some(_) => {
            errors.push(join(path, key), "must be an array of strings");
            None
        }
    }
}

fn parse_id(value: &Value, path: &str, errors: &mut FieldErrors) -> Option<Uuid> {
    let id = value.as_str().and_then(|x| Uuid::parse_str(x.trim()).ok());
    if id.is_none() {
        errors.push(path, "must be a valid identifier");
    }
    id
}

fn check_date_order(
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    path: &str,
    errors: &mut FieldErrors,
) {
    if let (Some(start), Some(end)) = (start_date, end_date) {
        if end < start {
            errors.push(join(path, "end_date"), "must not be before start_date");
        }
    }
}

/// Per-item rules for one collection. `KEYS` excludes `id`.
trait CollectionItem: Sized {
    type Patch;
    const KEYS: &'static [&'static str];

    fn parse_new(obj: &Map<String, Value>, path: &str, errors: &mut FieldErrors) -> Option<Self>;

    fn parse_patch(
        obj: &Map<String, Value>,
        path: &str,
        errors: &mut FieldErrors,
    ) -> Option<Self::Patch>;
}

impl CollectionItem for NewSkill {
    type Patch = SkillPatch;
    const KEYS: &'static [&'static str] = &["name"];

    fn parse_new(obj: &Map<String, Value>, path: &str, errors: &mut FieldErrors) -> Option<Self> {
        let name = required_string(obj, "name", path, errors)?;
        Some(NewSkill { name })
    }

    fn parse_patch(
        obj: &Map<String, Value>,
        path: &str,
        errors: &mut FieldErrors,
    ) -> Option<SkillPatch> {
        Some(SkillPatch {
            name: patch_required_string(obj, "name", path, errors),
        })
    }
}

impl CollectionItem for NewExperience {
    type Patch = ExperiencePatch;
    const KEYS: &'static [&'static str] =
        &["company", "role", "start_date", "end_date", "achievements"];

    fn parse_new(obj: &Map<String, Value>, path: &str, errors: &mut FieldErrors) -> Option<Self> {
        let company = required_string(obj, "company", path, errors);
        let role = required_string(obj, "role", path, errors);
        let start_date = optional_date(obj, "start_date", path, errors).flatten();
        let end_date = optional_date(obj, "end_date", path, errors).flatten();
        let achievements = optional_string_list(obj, "achievements", path, errors);
        check_date_order(start_date, end_date, path, errors);
        Some(NewExperience {
            company: company?,
            role: role?,
            start_date,
            end_date,
            achievements: achievements.unwrap_or_default(),
        })
    }

    fn parse_patch(
        obj: &Map<String, Value>,
        path: &str,
        errors: &mut FieldErrors,
    ) -> Option<ExperiencePatch> {
        let patch = ExperiencePatch {
            company: patch_required_string(obj, "company", path, errors),
            role: patch_required_string(obj, "role", path, errors),
            start_date: optional_date(obj, "start_date", path, errors),
            end_date: optional_date(obj, "end_date", path, errors),
            achievements: optional_string_list(obj, "achievements", path, errors),
        };
        check_date_order(
            patch.start_date.flatten(),
            patch.end_date.flatten(),
            path,
            errors,
        );
        Some(patch)
    }
}

impl CollectionItem for NewEducation {
    type Patch = EducationPatch;
    const KEYS: &'static [&'static str] = &["degree", "institution", "year"];

    fn parse_new(obj: &Map<String, Value>, path: &str, errors: &mut FieldErrors) -> Option<Self> {
        let degree = required_string(obj, "degree", path, errors);
        let institution = required_string(obj, "institution", path, errors);
        let year = optional_year(obj, "year", path, errors).flatten();
        Some(NewEducation {
            degree: degree?,
            institution: institution?,
            year,
        })
    }

    fn parse_patch(
        obj: &Map<String, Value>,
        path: &str,
        errors: &mut FieldErrors,
    ) -> Option<EducationPatch> {
        Some(EducationPatch {
            degree: patch_required_string(obj, "degree", path, errors),
            institution: patch_required_string(obj, "institution", path, errors),
            year: optional_year(obj, "year", path, errors),
        })
    }
}

fn with_id(keys: &[&'static str]) -> Vec<&'static str> {
    let mut keys = keys.to_vec();
    keys.push("id");
    keys
}

fn parse_contact(value: &Value, path: &str, errors: &mut FieldErrors) -> Option<ContactPatch> {
    let obj = as_object(value, path, errors)?;
    check_keys(obj, CONTACT_KEYS, path, errors);
    Some(ContactPatch {
        name: optional_string(obj, "name", path, Some(VARCHAR_MAX), errors),
        email: optional_string(obj, "email", path, Some(VARCHAR_MAX), errors),
        phone: optional_string(obj, "phone", path, Some(PHONE_MAX), errors),
        linkedin: optional_string(obj, "linkedin", path, Some(VARCHAR_MAX), errors),
    })
}

/// Parses `items` as full new items. `allowed` decides whether an `id` key is
/// tolerated (and ignored).
fn parse_new_items<T: CollectionItem>(
    items: &[Value],
    path: &str,
    allowed: &[&str],
    errors: &mut FieldErrors,
) -> Vec<T> {
    let mut result: Vec<T> = vec![];
    for (idx, item) in items.iter().enumerate() {
        let item_path = format!("{path}[{idx}]");
        let Some(obj) = as_object(item, &item_path, errors) else {
            continue;
        };
        check_keys(obj, allowed, &item_path, errors);
        if let Some(item) = T::parse_new(obj, &item_path, errors) {
            result.push(item);
        }
    }
    result
}

fn parse_full_list<T: CollectionItem>(
    value: Option<&Value>,
    path: &str,
    errors: &mut FieldErrors,
) -> Vec<T> {
    match value {
        None => vec![],
        Some(value) => match as_array(value, path, errors) {
            Some(items) => parse_new_items(items, path, T::KEYS, errors),
            None => vec![],
        },
    }
}

fn parse_collection<T: CollectionItem>(
    value: &Value,
    field: &str,
    errors: &mut FieldErrors,
) -> Option<CollectionUpdate<T, T::Patch>> {
    match value {
        Value::Array(items) => Some(CollectionUpdate::FullReplace(parse_new_items(
            items,
            field,
            &with_id(T::KEYS),
            errors,
        ))),
        Value::Object(obj) => {
            check_keys(obj, DELTA_KEYS, field, errors);
            let mut delta: DeltaRequest<T, T::Patch> = DeltaRequest::default();

            if let Some(value) = obj.get("add") {
                let path = join(field, "add");
                if let Some(items) = as_array(value, &path, errors) {
                    delta.add = parse_new_items(items, &path, T::KEYS, errors);
                }
            }

            if let Some(value) = obj.get("remove") {
                let path = join(field, "remove");
                if let Some(items) = as_array(value, &path, errors) {
                    for (idx, item) in items.iter().enumerate() {
                        if let Some(id) = parse_id(item, &format!("{path}[{idx}]"), errors) {
                            delta.remove.push(id);
                        }
                    }
                }
            }

            if let Some(value) = obj.get("update") {
                let path = join(field, "update");
                if let Some(items) = as_array(value, &path, errors) {
                    let allowed = with_id(T::KEYS);
                    for (idx, item) in items.iter().enumerate() {
                        let item_path = format!("{path}[{idx}]");
                        let Some(item_obj) = as_object(item, &item_path, errors) else {
                            continue;
                        };
                        check_keys(item_obj, &allowed, &item_path, errors);
                        let id = match item_obj.get("id") {
                            None | Some(Value::Null) => {
                                errors.push(join(&item_path, "id"), "is required");
                                None
                            }
                            Some(id) => parse_id(id, &join(&item_path, "id"), errors),
                        };
                        let patch = T::parse_patch(item_obj, &item_path, errors);
                        if let (Some(id), Some(patch)) = (id, patch) {
                            delta.update.push(ItemPatch { id, patch });
                        }
                    }
                }
            }

            for idx in delta.conflicting_updates() {
                errors.push(
                    format!("{field}.update[{idx}].id"),
                    "identifier is referenced more than once across remove and update",
                );
            }
            Some(CollectionUpdate::Delta(delta))
        }
        _ => {
            errors.push(field, "must be an array or an object");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn field_errors(result: Result<ProfileUpdateRequest, ProfileError>) -> Vec<FieldError> {
        match result {
            Err(ProfileError::Validation(errors)) => errors,
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    fn properties(errors: &[FieldError]) -> Vec<&str> {
        errors.iter().map(|x| x.property.as_str()).collect()
    }

    #[test]
    fn test_empty_body_requires_a_field() {
        let errors = field_errors(ProfileUpdateRequest::parse(&json!({})));
        assert_eq!(errors, vec![FieldError::new("body", "at least one field required")]);
    }

    #[test]
    fn test_non_object_body() {
        let errors = field_errors(ProfileUpdateRequest::parse(&json!([1, 2])));
        assert_eq!(properties(&errors), vec!["body"]);
    }

    #[test]
    fn test_array_is_full_replacement() {
        let request = ProfileUpdateRequest::parse(&json!({"skills": [{"name": "Go"}]})).unwrap();
        assert_eq!(
            request.skills,
            Some(CollectionUpdate::FullReplace(vec![NewSkill {
                name: "Go".to_string()
            }]))
        );
        assert!(request.contact.is_none());
        assert!(request.experience.is_none());
        assert!(request.education.is_none());
    }

    #[test]
    fn test_full_replacement_items_may_carry_ids() {
        let request = ProfileUpdateRequest::parse(&json!({
            "skills": [{"id": Uuid::now_v7().to_string(), "name": "Go"}]
        }))
        .unwrap();
        assert_eq!(
            request.skills,
            Some(CollectionUpdate::FullReplace(vec![NewSkill {
                name: "Go".to_string()
            }]))
        );
    }

    #[test]
    fn test_object_is_targeted_delta() {
        let s1 = Uuid::now_v7();
        let s2 = Uuid::now_v7();
        let request = ProfileUpdateRequest::parse(&json!({
            "skills": {
                "add": [{"name": "Rust"}],
                "remove": [s2.to_string()],
                "update": [{"id": s1.to_string(), "name": "C#"}]
            }
        }))
        .unwrap();
        assert_eq!(
            request.skills,
            Some(CollectionUpdate::Delta(DeltaRequest {
                add: vec![NewSkill {
                    name: "Rust".to_string()
                }],
                remove: vec![s2],
                update: vec![ItemPatch {
                    id: s1,
                    patch: SkillPatch {
                        name: Some("C#".to_string())
                    }
                }],
            }))
        );
    }

    #[test]
    fn test_empty_delta_object_is_accepted() {
        let request = ProfileUpdateRequest::parse(&json!({"education": {}})).unwrap();
        assert_eq!(
            request.education,
            Some(CollectionUpdate::Delta(DeltaRequest::default()))
        );
    }

    #[test]
    fn test_every_offending_field_is_reported() {
        let errors = field_errors(ProfileUpdateRequest::parse(&json!({
            "skills": {
                "add": [{"name": ""}, {}],
                "update": [{"name": "C#"}],
                "remove": ["not-a-uuid"]
            },
            "experience": [{"company": "Acme", "start_date": "someday"}],
            "education": "MIT",
            "contact": {"email": 42},
            "jobs": []
        })));
        let mut found = properties(&errors);
        found.sort();
        assert_eq!(
            found,
            vec![
                "contact.email",
                "education",
                "experience[0].role",
                "experience[0].start_date",
                "jobs",
                "skills.add[0].name",
                "skills.add[1].name",
                "skills.remove[0]",
                "skills.update[0].id",
            ]
        );
    }

    #[test]
    fn test_add_items_may_not_carry_ids() {
        let errors = field_errors(ProfileUpdateRequest::parse(&json!({
            "skills": {"add": [{"id": Uuid::now_v7().to_string(), "name": "Go"}]}
        })));
        assert_eq!(errors, vec![FieldError::new("skills.add[0].id", "is not allowed")]);
    }

    #[test]
    fn test_remove_and_update_same_id_is_rejected() {
        let s1 = Uuid::now_v7().to_string();
        let errors = field_errors(ProfileUpdateRequest::parse(&json!({
            "skills": {
                "remove": [s1],
                "update": [{"id": s1, "name": "C#"}]
            }
        })));
        assert_eq!(properties(&errors), vec!["skills.update[0].id"]);
    }

    #[test]
    fn test_update_cannot_null_required_scalar() {
        let errors = field_errors(ProfileUpdateRequest::parse(&json!({
            "education": {"update": [{"id": Uuid::now_v7().to_string(), "degree": null}]}
        })));
        assert_eq!(
            errors,
            vec![FieldError::new("education.update[0].degree", "cannot be null")]
        );
    }

    #[test]
    fn test_update_can_clear_optional_scalars() {
        let e1 = Uuid::now_v7();
        let request = ProfileUpdateRequest::parse(&json!({
            "experience": {"update": [{"id": e1.to_string(), "end_date": null, "role": "Lead"}]}
        }))
        .unwrap();
        assert_eq!(
            request.experience,
            Some(CollectionUpdate::Delta(DeltaRequest {
                add: vec![],
                remove: vec![],
                update: vec![ItemPatch {
                    id: e1,
                    patch: ExperiencePatch {
                        role: Some("Lead".to_string()),
                        end_date: Some(None),
                        ..Default::default()
                    }
                }],
            }))
        );
    }

    #[test]
    fn test_experience_dates_are_normalised() {
        let request = ProfileUpdateRequest::parse(&json!({
            "experience": [{
                "company": "Acme",
                "role": "Engineer",
                "start_date": "2020-01",
                "end_date": "2022-06-30",
                "achievements": ["Shipped v2"]
            }]
        }))
        .unwrap();
        assert_eq!(
            request.experience,
            Some(CollectionUpdate::FullReplace(vec![NewExperience {
                company: "Acme".to_string(),
                role: "Engineer".to_string(),
                start_date: NaiveDate::from_ymd_opt(2020, 1, 1),
                end_date: NaiveDate::from_ymd_opt(2022, 6, 30),
                achievements: vec!["Shipped v2".to_string()],
            }]))
        );
    }

    #[test]
    fn test_end_date_before_start_date() {
        let errors = field_errors(ProfileUpdateRequest::parse(&json!({
            "experience": [{
                "company": "Acme",
                "role": "Engineer",
                "start_date": "2022-01-01",
                "end_date": "2021-01-01"
            }]
        })));
        assert_eq!(properties(&errors), vec!["experience[0].end_date"]);
    }

    #[test]
    fn test_education_year_accepts_numeric_string() {
        let request = ProfileUpdateRequest::parse(&json!({
            "education": [
                {"degree": "BSc", "institution": "ITB", "year": "2019"},
                {"degree": "MSc", "institution": "ITB", "year": 2021}
            ]
        }))
        .unwrap();
        let Some(CollectionUpdate::FullReplace(items)) = request.education else {
            panic!("expected full replacement");
        };
        assert_eq!(items[0].year, Some(2019));
        assert_eq!(items[1].year, Some(2021));

        let errors = field_errors(ProfileUpdateRequest::parse(&json!({
            "education": [{"degree": "BSc", "institution": "ITB", "year": 19}]
        })));
        assert_eq!(properties(&errors), vec!["education[0].year"]);
    }

    #[test]
    fn test_contact_patch_distinguishes_null_from_absent() {
        let request = ProfileUpdateRequest::parse(&json!({
            "contact": {"phone": null, "linkedin": "https://linkedin.com/in/jane"}
        }))
        .unwrap();
        assert_eq!(
            request.contact,
            Some(ContactPatch {
                name: None,
                email: None,
                phone: Some(None),
                linkedin: Some(Some("https://linkedin.com/in/jane".to_string())),
            })
        );
    }

    #[test]
    fn test_strings_longer_than_their_column_are_rejected() {
        let long = "x".repeat(256);
        let errors = field_errors(ProfileUpdateRequest::parse(&json!({
            "skills": {"add": [{"name": long}]},
            "education": {"update": [{"id": Uuid::now_v7().to_string(), "institution": long}]},
            "contact": {"phone": "1".repeat(101), "email": long}
        })));
        let mut found = properties(&errors);
        found.sort();
        assert_eq!(
            found,
            vec![
                "contact.email",
                "contact.phone",
                "education.update[0].institution",
                "skills.add[0].name",
            ]
        );
        assert!(errors
            .iter()
            .any(|x| x.message == "must be at most 100 characters"));
    }

    #[test]
    fn test_strings_at_column_width_are_accepted() {
        let request = ProfileUpdateRequest::parse(&json!({
            "skills": [{"name": "é".repeat(255)}],
            "contact": {"phone": "1".repeat(100)}
        }))
        .unwrap();
        let Some(CollectionUpdate::FullReplace(items)) = request.skills else {
            panic!("expected full replacement");
        };
        assert_eq!(items[0].name.chars().count(), 255);
    }

    #[test]
    fn test_new_profile() {
        let profile = parse_new_profile(&json!({
            "resume_text": "Jane Doe, engineer",
            "contact": {"name": "Jane Doe"},
            "skills": [{"name": "Rust"}]
        }))
        .unwrap();
        assert_eq!(profile.resume_text, Some("Jane Doe, engineer".to_string()));
        assert_eq!(
            profile.contact,
            Some(NewContact {
                name: Some("Jane Doe".to_string()),
                ..Default::default()
            })
        );
        assert_eq!(profile.skills.len(), 1);
        assert!(profile.experience.is_empty());
        assert!(profile.education.is_empty());
    }

    #[test]
    fn test_new_profile_rejects_delta_shape() {
        let result = parse_new_profile(&json!({"skills": {"add": [{"name": "Rust"}]}}));
        match result {
            Err(ProfileError::Validation(errors)) => {
                assert_eq!(errors, vec![FieldError::new("skills", "must be an array")]);
            }
            other => panic!("expected validation failure, got {:?}", other),
        }
    }
}
