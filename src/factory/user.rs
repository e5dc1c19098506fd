use chrono::{DateTime, FixedOffset};
use fake::{faker::internet::en::SafeEmail, faker::name::en::Name, Dummy, Fake, Faker};
use sqlx::PgPool;
use uuid::Uuid;

use crate::model::user::User;

pub struct UserFactory<T: Clone> {
    modifier_one: fn(x: &User, ext: T) -> User,
    modifier_many: fn(x: &User, idx: usize, ext: T) -> User,
}

impl<T: Clone> Default for UserFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> UserFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_one: |x, _| x.clone(),
            modifier_many: |x, _, _| x.clone(),
        }
    }

    pub fn modified_one(&mut self, modifier: fn(x: &User, ext: T) -> User) {
        self.modifier_one = modifier
    }

    pub fn modified_many(&mut self, modifier: fn(x: &User, idx: usize, ext: T) -> User) {
        self.modifier_many = modifier
    }

    pub async fn generate_one(&mut self, db: &PgPool, ext: T) -> anyhow::Result<User> {
        let data = (self.modifier_one)(&UserDummy::generate_one(), ext);
        insert_user(db, &data).await?;
        Ok(data)
    }

    pub async fn generate_many(
        &mut self,
        db: &PgPool,
        num: u32,
        ext: T,
    ) -> anyhow::Result<Vec<User>> {
        let mut result: Vec<User> = vec![];
        for (idx, item) in UserDummy::generate_many(num).iter().enumerate() {
            result.push((self.modifier_many)(item, idx, ext.clone()));
        }
        for item in result.iter() {
            insert_user(db, item).await?;
        }
        Ok(result)
    }
}

async fn insert_user(db: &PgPool, user: &User) -> anyhow::Result<()> {
    sqlx::query(
        r#"
    INSERT INTO public.user (id, email, name, password, created_date, updated_date)
    VALUES ($1, $2, $3, $4, $5, $6)"#,
    )
    .bind(user.id)
    .bind(&user.email)
    .bind(&user.name)
    .bind(&user.password)
    .bind(user.created_date)
    .bind(user.updated_date)
    .execute(db)
    .await?;
    Ok(())
}

#[derive(Debug, Dummy, Clone)]
struct UserDummy {
    #[dummy(faker = "Name()")]
    pub name: String,
    pub password: String,
    pub created_date: Option<DateTime<FixedOffset>>,
    pub updated_date: Option<DateTime<FixedOffset>>,
}

impl UserDummy {
    fn into_user(self) -> User {
        // prefixed so a batch never repeats an email
        let email: String = SafeEmail().fake();
        User {
            id: Uuid::now_v7(),
            email: format!("{}.{}", Uuid::now_v7().simple(), email),
            name: self.name,
            password: self.password,
            created_date: self.created_date,
            updated_date: self.updated_date,
        }
    }

    pub fn generate_one() -> User {
        Faker.fake::<UserDummy>().into_user()
    }

    pub fn generate_many(num: u32) -> Vec<User> {
        (0..num).map(|_| Self::generate_one()).collect()
    }
}
