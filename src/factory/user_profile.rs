use chrono::{DateTime, FixedOffset};
use fake::{faker::lorem::en::Paragraph, Dummy, Fake, Faker};
use sqlx::PgPool;
use uuid::Uuid;

use crate::model::user_profile::UserProfile;

pub struct UserProfileFactory<T: Clone> {
    modifier_one: fn(x: &UserProfile, ext: T) -> UserProfile,
    modifier_many: fn(x: &UserProfile, idx: usize, ext: T) -> UserProfile,
}

impl<T: Clone> Default for UserProfileFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> UserProfileFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_one: |x, _| x.clone(),
            modifier_many: |x, _, _| x.clone(),
        }
    }

    pub fn modified_one(&mut self, modifier: fn(x: &UserProfile, ext: T) -> UserProfile) {
        self.modifier_one = modifier
    }

    pub fn modified_many(
        &mut self,
        modifier: fn(x: &UserProfile, idx: usize, ext: T) -> UserProfile,
    ) {
        self.modifier_many = modifier
    }

    /// The generated `user_id` is random; point it at an existing user
    /// through a modifier.
    pub async fn generate_one(&mut self, db: &PgPool, ext: T) -> anyhow::Result<UserProfile> {
        let data = (self.modifier_one)(&Faker.fake::<UserProfileDummy>().into(), ext);
        insert_user_profile(db, &data).await?;
        Ok(data)
    }

    pub async fn generate_many(
        &mut self,
        db: &PgPool,
        num: u32,
        ext: T,
    ) -> anyhow::Result<Vec<UserProfile>> {
        let mut result: Vec<UserProfile> = vec![];
        for idx in 0..num as usize {
            let data: UserProfile = Faker.fake::<UserProfileDummy>().into();
            result.push((self.modifier_many)(&data, idx, ext.clone()));
        }
        let mut tx = db.begin().await?;
        for item in result.iter() {
            sqlx::query(
                r#"
            INSERT INTO public.user_profile (id, user_id, resume_text, created_date, updated_date)
            VALUES ($1, $2, $3, $4, $5)"#,
            )
            .bind(item.id)
            .bind(item.user_id)
            .bind(&item.resume_text)
            .bind(item.created_date)
            .bind(item.updated_date)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(result)
    }
}

async fn insert_user_profile(db: &PgPool, data: &UserProfile) -> anyhow::Result<()> {
    sqlx::query(
        r#"
    INSERT INTO public.user_profile (id, user_id, resume_text, created_date, updated_date)
    VALUES ($1, $2, $3, $4, $5)"#,
    )
    .bind(data.id)
    .bind(data.user_id)
    .bind(&data.resume_text)
    .bind(data.created_date)
    .bind(data.updated_date)
    .execute(db)
    .await?;
    Ok(())
}

#[derive(Debug, Dummy, Clone)]
struct UserProfileDummy {
    pub user_id: Uuid,
    #[dummy(faker = "Paragraph(1..3)")]
    pub resume_text: String,
    pub created_date: Option<DateTime<FixedOffset>>,
    pub updated_date: Option<DateTime<FixedOffset>>,
}

impl From<UserProfileDummy> for UserProfile {
    fn from(dummy: UserProfileDummy) -> Self {
        UserProfile {
            id: Uuid::now_v7(),
            user_id: dummy.user_id,
            resume_text: Some(dummy.resume_text),
            created_date: dummy.created_date,
            updated_date: dummy.updated_date,
        }
    }
}
