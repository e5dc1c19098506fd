use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Local};
use sqlx::{PgConnection, PgPool};
use tracing::debug;
use uuid::Uuid;

use crate::{
    core::{
        error::ProfileError,
        sqlx_utils::{binds_query, binds_query_as, query_builder, update_builder, SqlxBinds},
    },
    delta::{ContactUpsert, ItemPatch, ProfileDelta},
    model::{
        contact::{Contact, ContactPatch, NewContact, TABLE_NAME as CONTACT_TABLE_NAME},
        education::{
            Education, EducationPatch, NewEducation, TABLE_NAME as EDUCATION_TABLE_NAME,
        },
        experience::{
            Experience, ExperiencePatch, NewExperience, TABLE_NAME as EXPERIENCE_TABLE_NAME,
        },
        skill::{NewSkill, Skill, SkillPatch, TABLE_NAME as SKILL_TABLE_NAME},
        user_profile::{NewProfile, ProfileAggregate, UserProfile, TABLE_NAME},
    },
};

/// Persistence boundary for profile aggregates.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_by_user_id(&self, user_id: &Uuid)
        -> Result<Option<ProfileAggregate>, ProfileError>;

    async fn create(
        &self,
        user_id: &Uuid,
        profile: &NewProfile,
    ) -> Result<ProfileAggregate, ProfileError>;

    /// Applies every operation of `delta` in one transaction and returns the
    /// reloaded aggregate. Statements only ever touch rows owned by
    /// `profile_id`; identifiers of other profiles match nothing.
    async fn apply_delta(
        &self,
        profile_id: &Uuid,
        delta: &ProfileDelta,
    ) -> Result<ProfileAggregate, ProfileError>;
}

pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn find_by_user_id(
        &self,
        user_id: &Uuid,
    ) -> Result<Option<ProfileAggregate>, ProfileError> {
        let mut conn = self.pool.acquire().await?;
        let profile = get_profile_by_user_id(&mut conn, user_id).await?;
        match profile {
            Some(profile) => Ok(Some(load_aggregate(&mut conn, profile).await?)),
            None => Ok(None),
        }
    }

    async fn create(
        &self,
        user_id: &Uuid,
        profile: &NewProfile,
    ) -> Result<ProfileAggregate, ProfileError> {
        let now = Local::now().fixed_offset();
        let user_profile = UserProfile {
            id: Uuid::now_v7(),
            user_id: *user_id,
            resume_text: profile.resume_text.clone(),
            created_date: Some(now),
            updated_date: Some(now),
        };
        let mut tx = self.pool.begin().await?;
        insert_profile(&mut tx, &user_profile).await?;
        if let Some(contact) = &profile.contact {
            insert_contact(&mut tx, &user_profile.id, contact).await?;
        }
        insert_skills(&mut tx, &user_profile.id, &profile.skills).await?;
        insert_experience(&mut tx, &user_profile.id, &profile.experience).await?;
        insert_education(&mut tx, &user_profile.id, &profile.education).await?;
        tx.commit().await?;

        let mut conn = self.pool.acquire().await?;
        let stored = get_profile_by_id(&mut conn, &user_profile.id)
            .await?
            .ok_or_else(|| ProfileError::NotFound("Profile not found".to_string()))?;
        load_aggregate(&mut conn, stored).await
    }

    async fn apply_delta(
        &self,
        profile_id: &Uuid,
        delta: &ProfileDelta,
    ) -> Result<ProfileAggregate, ProfileError> {
        let now = Local::now().fixed_offset();
        let mut tx = self.pool.begin().await?;
        write_delta(&mut tx, profile_id, delta, &now).await?;
        tx.commit().await?;

        let mut conn = self.pool.acquire().await?;
        let profile = get_profile_by_id(&mut conn, profile_id)
            .await?
            .ok_or_else(|| ProfileError::NotFound("Profile not found".to_string()))?;
        load_aggregate(&mut conn, profile).await
    }
}

/// Deletes first, then updates, then creates. Dropping the transaction
/// without commit rolls every statement back. Returns the number of rows
/// written; `updated_date` only moves when that number is not zero.
pub async fn write_delta(
    conn: &mut PgConnection,
    profile_id: &Uuid,
    delta: &ProfileDelta,
    now: &DateTime<FixedOffset>,
) -> Result<u64, ProfileError> {
    let mut affected: u64 = 0;
    affected += remove_rows(
        conn,
        SKILL_TABLE_NAME,
        profile_id,
        delta.skills.replace_all,
        &delta.skills.deletes,
    )
    .await?;
    affected += remove_rows(
        conn,
        EXPERIENCE_TABLE_NAME,
        profile_id,
        delta.experience.replace_all,
        &delta.experience.deletes,
    )
    .await?;
    affected += remove_rows(
        conn,
        EDUCATION_TABLE_NAME,
        profile_id,
        delta.education.replace_all,
        &delta.education.deletes,
    )
    .await?;

    for item in &delta.skills.updates {
        affected += update_skill(conn, profile_id, item).await?;
    }
    for item in &delta.experience.updates {
        affected += update_experience(conn, profile_id, item).await?;
    }
    for item in &delta.education.updates {
        affected += update_education(conn, profile_id, item).await?;
    }

    affected += match &delta.contact {
        Some(ContactUpsert::Create(contact)) => insert_contact(conn, profile_id, contact).await?,
        Some(ContactUpsert::Update(patch)) => update_contact(conn, profile_id, patch).await?,
        None => 0,
    };
    affected += insert_skills(conn, profile_id, &delta.skills.creates).await?;
    affected += insert_experience(conn, profile_id, &delta.experience.creates).await?;
    affected += insert_education(conn, profile_id, &delta.education.creates).await?;

    if affected > 0 {
        touch_profile(conn, profile_id, now).await?;
    } else {
        debug!("delta for profile {} changed no row", profile_id);
    }
    Ok(affected)
}

pub async fn get_profile_by_user_id(
    conn: &mut PgConnection,
    user_id: &Uuid,
) -> Result<Option<UserProfile>, ProfileError> {
    let stmt = query_builder(None, TABLE_NAME, &["user_id = $1".to_string()], vec![]);
    Ok(
        binds_query_as::<UserProfile>(&stmt, vec![SqlxBinds::Uuid(*user_id)])
            .fetch_optional(&mut *conn)
            .await?,
    )
}

pub async fn get_profile_by_id(
    conn: &mut PgConnection,
    id: &Uuid,
) -> Result<Option<UserProfile>, ProfileError> {
    let stmt = query_builder(None, TABLE_NAME, &["id = $1".to_string()], vec![]);
    Ok(binds_query_as::<UserProfile>(&stmt, vec![SqlxBinds::Uuid(*id)])
        .fetch_optional(&mut *conn)
        .await?)
}

/// Loads every child collection of `profile`, ordered by identifier.
pub async fn load_aggregate(
    conn: &mut PgConnection,
    profile: UserProfile,
) -> Result<ProfileAggregate, ProfileError> {
    let filters = vec!["profile_id = $1".to_string()];
    let order_by = vec!["id ASC".to_string()];
    let binds = vec![SqlxBinds::Uuid(profile.id)];

    let contact_stmt = query_builder(None, CONTACT_TABLE_NAME, &filters, vec![]);
    let skill_stmt = query_builder(None, SKILL_TABLE_NAME, &filters, order_by.clone());
    let experience_stmt = query_builder(None, EXPERIENCE_TABLE_NAME, &filters, order_by.clone());
    let education_stmt = query_builder(None, EDUCATION_TABLE_NAME, &filters, order_by);

    let contact = binds_query_as::<Contact>(&contact_stmt, binds.clone())
        .fetch_optional(&mut *conn)
        .await?;
    let skills = binds_query_as::<Skill>(&skill_stmt, binds.clone())
        .fetch_all(&mut *conn)
        .await?;
    let experience = binds_query_as::<Experience>(&experience_stmt, binds.clone())
        .fetch_all(&mut *conn)
        .await?;
    let education = binds_query_as::<Education>(&education_stmt, binds)
        .fetch_all(&mut *conn)
        .await?;
    Ok(ProfileAggregate {
        profile,
        contact,
        skills,
        experience,
        education,
    })
}

pub async fn insert_profile(
    conn: &mut PgConnection,
    profile: &UserProfile,
) -> Result<(), ProfileError> {
    sqlx::query(
        format!(
            r#"INSERT INTO {} (id, user_id, resume_text, created_date, updated_date)
            VALUES ($1, $2, $3, $4, $5)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(profile.id)
    .bind(profile.user_id)
    .bind(&profile.resume_text)
    .bind(profile.created_date)
    .bind(profile.updated_date)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn touch_profile(
    conn: &mut PgConnection,
    profile_id: &Uuid,
    now: &DateTime<FixedOffset>,
) -> Result<(), ProfileError> {
    let stmt = update_builder(
        TABLE_NAME,
        &["updated_date = $1".to_string()],
        &["id = $2".to_string()],
    );
    binds_query(
        &stmt,
        vec![
            SqlxBinds::DateTimeFixedOffset(*now),
            SqlxBinds::Uuid(*profile_id),
        ],
    )
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn insert_contact(
    conn: &mut PgConnection,
    profile_id: &Uuid,
    contact: &NewContact,
) -> Result<u64, ProfileError> {
    sqlx::query(
        format!(
            r#"INSERT INTO {} (id, profile_id, name, email, phone, linkedin)
            VALUES ($1, $2, $3, $4, $5, $6)"#,
            CONTACT_TABLE_NAME
        )
        .as_str(),
    )
    .bind(Uuid::now_v7())
    .bind(profile_id)
    .bind(&contact.name)
    .bind(&contact.email)
    .bind(&contact.phone)
    .bind(&contact.linkedin)
    .execute(&mut *conn)
    .await?;
    Ok(1)
}

async fn update_contact(
    conn: &mut PgConnection,
    profile_id: &Uuid,
    patch: &ContactPatch,
) -> Result<u64, ProfileError> {
    let mut sets = SetClause::default();
    sets.push("name", patch.name.clone().map(SqlxBinds::OptionString));
    sets.push("email", patch.email.clone().map(SqlxBinds::OptionString));
    sets.push("phone", patch.phone.clone().map(SqlxBinds::OptionString));
    sets.push("linkedin", patch.linkedin.clone().map(SqlxBinds::OptionString));
    let affected = sets
        .execute(conn, CONTACT_TABLE_NAME, vec![("profile_id", *profile_id)])
        .await?;
    if affected == 0 {
        debug!("contact of profile {} vanished before update", profile_id);
    }
    Ok(affected)
}

async fn insert_skills(
    conn: &mut PgConnection,
    profile_id: &Uuid,
    items: &[NewSkill],
) -> Result<u64, ProfileError> {
    for item in items {
        sqlx::query(
            format!(
                "INSERT INTO {} (id, profile_id, name) VALUES ($1, $2, $3)",
                SKILL_TABLE_NAME
            )
            .as_str(),
        )
        .bind(Uuid::now_v7())
        .bind(profile_id)
        .bind(&item.name)
        .execute(&mut *conn)
        .await?;
    }
    Ok(items.len() as u64)
}

async fn insert_experience(
    conn: &mut PgConnection,
    profile_id: &Uuid,
    items: &[NewExperience],
) -> Result<u64, ProfileError> {
    for item in items {
        sqlx::query(
            format!(
                r#"INSERT INTO {} (id, profile_id, company, role, start_date, end_date, achievements)
                VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
                EXPERIENCE_TABLE_NAME
            )
            .as_str(),
        )
        .bind(Uuid::now_v7())
        .bind(profile_id)
        .bind(&item.company)
        .bind(&item.role)
        .bind(item.start_date)
        .bind(item.end_date)
        .bind(&item.achievements)
        .execute(&mut *conn)
        .await?;
    }
    Ok(items.len() as u64)
}

async fn insert_education(
    conn: &mut PgConnection,
    profile_id: &Uuid,
    items: &[NewEducation],
) -> Result<u64, ProfileError> {
    for item in items {
        sqlx::query(
            format!(
                r#"INSERT INTO {} (id, profile_id, degree, institution, year)
                VALUES ($1, $2, $3, $4, $5)"#,
                EDUCATION_TABLE_NAME
            )
            .as_str(),
        )
        .bind(Uuid::now_v7())
        .bind(profile_id)
        .bind(&item.degree)
        .bind(&item.institution)
        .bind(item.year)
        .execute(&mut *conn)
        .await?;
    }
    Ok(items.len() as u64)
}

/// With `replace_all` every row of the profile goes, including rows
/// created after the aggregate was loaded.
async fn remove_rows(
    conn: &mut PgConnection,
    table_name: &str,
    profile_id: &Uuid,
    replace_all: bool,
    ids: &[Uuid],
) -> Result<u64, ProfileError> {
    if replace_all {
        let stmt = format!("DELETE FROM {} WHERE profile_id = $1", table_name);
        let res = binds_query(&stmt, vec![SqlxBinds::Uuid(*profile_id)])
            .execute(&mut *conn)
            .await?;
        return Ok(res.rows_affected());
    }
    delete_owned(conn, table_name, profile_id, ids).await
}

async fn delete_owned(
    conn: &mut PgConnection,
    table_name: &str,
    profile_id: &Uuid,
    ids: &[Uuid],
) -> Result<u64, ProfileError> {
    if ids.is_empty() {
        return Ok(0);
    }
    let stmt = format!(
        "DELETE FROM {} WHERE id = ANY($1) AND profile_id = $2",
        table_name
    );
    let res = binds_query(
        &stmt,
        vec![
            SqlxBinds::UuidList(ids.to_vec()),
            SqlxBinds::Uuid(*profile_id),
        ],
    )
    .execute(&mut *conn)
    .await?;
    if res.rows_affected() < ids.len() as u64 {
        debug!(
            "{} of {} {} deletions matched no row of profile {}",
            ids.len() as u64 - res.rows_affected(),
            ids.len(),
            table_name,
            profile_id
        );
    }
    Ok(res.rows_affected())
}

async fn update_skill(
    conn: &mut PgConnection,
    profile_id: &Uuid,
    item: &ItemPatch<SkillPatch>,
) -> Result<u64, ProfileError> {
    let mut sets = SetClause::default();
    sets.push("name", item.patch.name.clone().map(SqlxBinds::String));
    update_owned(conn, SKILL_TABLE_NAME, profile_id, &item.id, sets).await
}

async fn update_experience(
    conn: &mut PgConnection,
    profile_id: &Uuid,
    item: &ItemPatch<ExperiencePatch>,
) -> Result<u64, ProfileError> {
    let patch = &item.patch;
    let mut sets = SetClause::default();
    sets.push("company", patch.company.clone().map(SqlxBinds::String));
    sets.push("role", patch.role.clone().map(SqlxBinds::String));
    sets.push("start_date", patch.start_date.map(SqlxBinds::OptionDate));
    sets.push("end_date", patch.end_date.map(SqlxBinds::OptionDate));
    sets.push(
        "achievements",
        patch.achievements.clone().map(SqlxBinds::StringList),
    );
    update_owned(conn, EXPERIENCE_TABLE_NAME, profile_id, &item.id, sets).await
}

async fn update_education(
    conn: &mut PgConnection,
    profile_id: &Uuid,
    item: &ItemPatch<EducationPatch>,
) -> Result<u64, ProfileError> {
    let patch = &item.patch;
    let mut sets = SetClause::default();
    sets.push("degree", patch.degree.clone().map(SqlxBinds::String));
    sets.push("institution", patch.institution.clone().map(SqlxBinds::String));
    sets.push("year", patch.year.map(SqlxBinds::OptionInt));
    update_owned(conn, EDUCATION_TABLE_NAME, profile_id, &item.id, sets).await
}

async fn update_owned(
    conn: &mut PgConnection,
    table_name: &str,
    profile_id: &Uuid,
    id: &Uuid,
    sets: SetClause,
) -> Result<u64, ProfileError> {
    let affected = sets
        .execute(
            conn,
            table_name,
            vec![("id", *id), ("profile_id", *profile_id)],
        )
        .await?;
    if affected == 0 {
        debug!(
            "{} update of {} matched no row of profile {}",
            table_name, id, profile_id
        );
    }
    Ok(affected)
}

/// Assignments of a partial update; absent fields are never written.
#[derive(Default)]
struct SetClause {
    sets: Vec<String>,
    binds: Vec<SqlxBinds>,
}

impl SetClause {
    fn push(&mut self, column: &str, value: Option<SqlxBinds>) {
        if let Some(value) = value {
            self.binds.push(value);
            self.sets.push(format!("{} = ${}", column, self.binds.len()));
        }
    }

    async fn execute(
        mut self,
        conn: &mut PgConnection,
        table_name: &str,
        keys: Vec<(&str, Uuid)>,
    ) -> Result<u64, ProfileError> {
        if self.sets.is_empty() {
            return Ok(0);
        }
        let mut wheres: Vec<String> = vec![];
        for (column, value) in keys {
            self.binds.push(SqlxBinds::Uuid(value));
            wheres.push(format!("{} = ${}", column, self.binds.len()));
        }
        let stmt = update_builder(table_name, &self.sets, &wheres);
        let res = binds_query(&stmt, self.binds).execute(&mut *conn).await?;
        Ok(res.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use sqlx::PgPool;

    use super::*;
    use crate::{
        delta::{normalize, CollectionDelta, CollectionUpdate, ItemPatch},
        factory::{skill::SkillFactory, user::UserFactory, user_profile::UserProfileFactory},
    };

    async fn new_profile(pool: &PgPool, profile: NewProfile) -> anyhow::Result<ProfileAggregate> {
        let user = UserFactory::<()>::new().generate_one(pool, ()).await?;
        let store = PgProfileStore::new(pool.clone());
        Ok(store.create(&user.id, &profile).await?)
    }

    fn skills(names: &[&str]) -> Vec<NewSkill> {
        names
            .iter()
            .map(|x| NewSkill {
                name: x.to_string(),
            })
            .collect()
    }

    #[sqlx::test]
    async fn test_create_and_find(pool: PgPool) -> anyhow::Result<()> {
        // When
        let created = new_profile(
            &pool,
            NewProfile {
                resume_text: Some("resume".to_string()),
                contact: Some(NewContact {
                    name: Some("Jane".to_string()),
                    ..Default::default()
                }),
                skills: skills(&["Python", "Rust"]),
                experience: vec![NewExperience {
                    company: "Acme".to_string(),
                    role: "Engineer".to_string(),
                    start_date: NaiveDate::from_ymd_opt(2020, 1, 1),
                    end_date: None,
                    achievements: vec!["Shipped".to_string()],
                }],
                education: vec![],
            },
        )
        .await?;

        // Expect
        let store = PgProfileStore::new(pool.clone());
        let found = store.find_by_user_id(&created.profile.user_id).await?;
        assert_eq!(found, Some(created.clone()));
        assert_eq!(created.contact.unwrap().name, Some("Jane".to_string()));
        let names: Vec<String> = created.skills.into_iter().map(|x| x.name).collect();
        assert_eq!(names, vec!["Python", "Rust"]);
        assert_eq!(created.experience[0].achievements, vec!["Shipped"]);
        Ok(())
    }

    #[sqlx::test]
    async fn test_find_missing_profile(pool: PgPool) -> anyhow::Result<()> {
        let store = PgProfileStore::new(pool);
        assert!(store.find_by_user_id(&Uuid::now_v7()).await?.is_none());
        Ok(())
    }

    #[sqlx::test]
    async fn test_second_profile_for_user_is_duplicate(pool: PgPool) -> anyhow::Result<()> {
        let created = new_profile(&pool, NewProfile::default()).await?;
        let store = PgProfileStore::new(pool);
        let res = store
            .create(&created.profile.user_id, &NewProfile::default())
            .await;
        assert!(matches!(res, Err(ProfileError::Duplicate(_))));
        Ok(())
    }

    #[sqlx::test]
    async fn test_apply_delta(pool: PgPool) -> anyhow::Result<()> {
        // Given
        let created = new_profile(
            &pool,
            NewProfile {
                skills: skills(&["Python", "Java"]),
                ..Default::default()
            },
        )
        .await?;
        let python = created.skills[0].id;
        let java = created.skills[1].id;
        let delta = ProfileDelta {
            contact: Some(ContactUpsert::Create(NewContact {
                email: Some("jane@example.com".to_string()),
                ..Default::default()
            })),
            skills: CollectionDelta {
                creates: skills(&["Rust"]),
                deletes: vec![java],
                updates: vec![ItemPatch {
                    id: python,
                    patch: SkillPatch {
                        name: Some("C#".to_string()),
                    },
                }],
                replace_all: false,
            },
            ..Default::default()
        };

        // When
        let store = PgProfileStore::new(pool.clone());
        let updated = store.apply_delta(&created.profile.id, &delta).await?;

        // Expect
        let names: Vec<String> = updated.skills.iter().map(|x| x.name.clone()).collect();
        assert_eq!(names, vec!["C#", "Rust"]);
        assert_eq!(updated.skills[0].id, python);
        assert_eq!(
            updated.contact.unwrap().email,
            Some("jane@example.com".to_string())
        );
        assert!(updated.profile.updated_date >= created.profile.updated_date);
        Ok(())
    }

    #[sqlx::test]
    async fn test_foreign_identifiers_match_nothing(pool: PgPool) -> anyhow::Result<()> {
        // Given
        let owner = new_profile(
            &pool,
            NewProfile {
                skills: skills(&["Python"]),
                ..Default::default()
            },
        )
        .await?;
        let other = new_profile(&pool, NewProfile::default()).await?;
        let foreign = owner.skills[0].id;
        let delta = ProfileDelta {
            skills: CollectionDelta {
                creates: vec![],
                deletes: vec![foreign],
                updates: vec![ItemPatch {
                    id: foreign,
                    patch: SkillPatch {
                        name: Some("Hijacked".to_string()),
                    },
                }],
                replace_all: false,
            },
            ..Default::default()
        };

        // When
        let store = PgProfileStore::new(pool.clone());
        let updated = store.apply_delta(&other.profile.id, &delta).await?;

        // Expect
        assert!(updated.skills.is_empty());
        assert_eq!(updated.profile.updated_date, other.profile.updated_date);
        let untouched = store.find_by_user_id(&owner.profile.user_id).await?.unwrap();
        assert_eq!(untouched.skills, owner.skills);
        Ok(())
    }

    #[sqlx::test]
    async fn test_failed_delta_rolls_back(pool: PgPool) -> anyhow::Result<()> {
        // Given
        let created = new_profile(
            &pool,
            NewProfile {
                contact: Some(NewContact::default()),
                skills: skills(&["Python"]),
                ..Default::default()
            },
        )
        .await?;
        // a second contact row violates the one-contact-per-profile constraint
        let delta = ProfileDelta {
            contact: Some(ContactUpsert::Create(NewContact::default())),
            skills: CollectionDelta {
                creates: vec![],
                deletes: vec![created.skills[0].id],
                updates: vec![],
                replace_all: false,
            },
            ..Default::default()
        };

        // When
        let store = PgProfileStore::new(pool.clone());
        let res = store.apply_delta(&created.profile.id, &delta).await;

        // Expect
        assert!(matches!(res, Err(ProfileError::Duplicate(_))));
        let reloaded = store
            .find_by_user_id(&created.profile.user_id)
            .await?
            .unwrap();
        assert_eq!(reloaded.skills, created.skills);
        Ok(())
    }

    #[sqlx::test]
    async fn test_partial_update_keeps_other_columns(pool: PgPool) -> anyhow::Result<()> {
        // Given
        let created = new_profile(
            &pool,
            NewProfile {
                contact: Some(NewContact {
                    name: Some("Jane".to_string()),
                    phone: Some("+62 812".to_string()),
                    ..Default::default()
                }),
                education: vec![NewEducation {
                    degree: "BSc".to_string(),
                    institution: "ITB".to_string(),
                    year: Some(2019),
                }],
                ..Default::default()
            },
        )
        .await?;
        let delta = ProfileDelta {
            contact: Some(ContactUpsert::Update(ContactPatch {
                phone: Some(None),
                ..Default::default()
            })),
            education: CollectionDelta {
                creates: vec![],
                deletes: vec![],
                updates: vec![ItemPatch {
                    id: created.education[0].id,
                    patch: EducationPatch {
                        year: Some(None),
                        ..Default::default()
                    },
                }],
                replace_all: false,
            },
            ..Default::default()
        };

        // When
        let store = PgProfileStore::new(pool.clone());
        let updated = store.apply_delta(&created.profile.id, &delta).await?;

        // Expect
        let contact = updated.contact.unwrap();
        assert_eq!(contact.name, Some("Jane".to_string()));
        assert_eq!(contact.phone, None);
        assert_eq!(updated.education[0].degree, "BSc".to_string());
        assert_eq!(updated.education[0].year, None);
        Ok(())
    }

    #[sqlx::test]
    async fn test_find_profile_seeded_by_factories(pool: PgPool) -> anyhow::Result<()> {
        // Given
        let user = UserFactory::<()>::new().generate_one(&pool, ()).await?;
        let mut profile_factory = UserProfileFactory::<Uuid>::new();
        profile_factory.modified_one(|data, ext| UserProfile {
            user_id: ext,
            ..data.clone()
        });
        let profile = profile_factory.generate_one(&pool, user.id).await?;
        let mut seeded = SkillFactory::<()>::new()
            .generate_many(&pool, profile.id, 3, ())
            .await?;
        seeded.sort_by_key(|x| x.id);

        // When
        let store = PgProfileStore::new(pool);
        let found = store.find_by_user_id(&user.id).await?;

        // Expect
        let found = found.ok_or_else(|| anyhow::anyhow!("profile not found"))?;
        assert_eq!(found.profile.id, profile.id);
        assert!(found.contact.is_none());
        assert_eq!(found.skills, seeded);
        Ok(())
    }

    #[sqlx::test]
    async fn test_full_replacement_clears_rows_added_after_load(
        pool: PgPool,
    ) -> anyhow::Result<()> {
        // Given
        let snapshot = new_profile(
            &pool,
            NewProfile {
                skills: skills(&["Python"]),
                ..Default::default()
            },
        )
        .await?;
        // a concurrent request adds a skill after the snapshot was read
        SkillFactory::<()>::new()
            .generate_many(&pool, snapshot.profile.id, 1, ())
            .await?;
        let delta = ProfileDelta {
            skills: normalize(
                CollectionUpdate::FullReplace(skills(&["Go"])),
                &snapshot.skill_ids(),
            ),
            ..Default::default()
        };

        // When
        let store = PgProfileStore::new(pool.clone());
        let updated = store.apply_delta(&snapshot.profile.id, &delta).await?;

        // Expect
        let names: Vec<String> = updated.skills.iter().map(|x| x.name.clone()).collect();
        assert_eq!(names, vec!["Go"]);
        Ok(())
    }

    #[sqlx::test]
    async fn test_experience_update_and_removals(pool: PgPool) -> anyhow::Result<()> {
        // Given
        let experience = |company: &str| NewExperience {
            company: company.to_string(),
            role: "Engineer".to_string(),
            start_date: NaiveDate::from_ymd_opt(2020, 1, 1),
            end_date: None,
            achievements: vec!["Shipped".to_string()],
        };
        let created = new_profile(
            &pool,
            NewProfile {
                experience: vec![experience("Acme"), experience("Globex")],
                education: vec![
                    NewEducation {
                        degree: "BSc".to_string(),
                        institution: "ITB".to_string(),
                        year: Some(2019),
                    },
                    NewEducation {
                        degree: "MSc".to_string(),
                        institution: "UI".to_string(),
                        year: Some(2021),
                    },
                ],
                ..Default::default()
            },
        )
        .await?;
        let acme = created.experience[0].id;
        let delta = ProfileDelta {
            experience: CollectionDelta {
                creates: vec![],
                deletes: vec![created.experience[1].id],
                updates: vec![ItemPatch {
                    id: acme,
                    patch: ExperiencePatch {
                        start_date: Some(NaiveDate::from_ymd_opt(2019, 6, 1)),
                        end_date: Some(NaiveDate::from_ymd_opt(2023, 2, 1)),
                        achievements: Some(vec!["Led".to_string(), "Hired".to_string()]),
                        ..Default::default()
                    },
                }],
                replace_all: false,
            },
            education: CollectionDelta {
                deletes: vec![created.education[0].id],
                ..Default::default()
            },
            ..Default::default()
        };

        // When
        let store = PgProfileStore::new(pool.clone());
        let updated = store.apply_delta(&created.profile.id, &delta).await?;

        // Expect
        assert_eq!(updated.experience.len(), 1);
        let item = &updated.experience[0];
        assert_eq!(item.id, acme);
        assert_eq!(item.company, "Acme".to_string());
        assert_eq!(item.start_date, NaiveDate::from_ymd_opt(2019, 6, 1));
        assert_eq!(item.end_date, NaiveDate::from_ymd_opt(2023, 2, 1));
        assert_eq!(item.achievements, vec!["Led", "Hired"]);
        assert_eq!(updated.education.len(), 1);
        assert_eq!(updated.education[0].degree, "MSc".to_string());
        assert!(updated.profile.updated_date > created.profile.updated_date);
        Ok(())
    }
}
