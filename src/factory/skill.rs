use fake::{faker::lorem::en::Word, Dummy, Fake, Faker};
use sqlx::PgPool;
use uuid::Uuid;

use crate::model::skill::Skill;

/// Skills generated for one profile.
pub struct SkillFactory<T: Clone> {
    modifier_many: fn(x: &Skill, idx: usize, ext: T) -> Skill,
}

impl<T: Clone> Default for SkillFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> SkillFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_many: |x, _, _| x.clone(),
        }
    }

    pub fn modified_many(&mut self, modifier: fn(x: &Skill, idx: usize, ext: T) -> Skill) {
        self.modifier_many = modifier
    }

    pub async fn generate_many(
        &mut self,
        db: &PgPool,
        profile_id: Uuid,
        num: u32,
        ext: T,
    ) -> anyhow::Result<Vec<Skill>> {
        let mut result: Vec<Skill> = vec![];
        for idx in 0..num as usize {
            let dummy = Faker.fake::<SkillDummy>();
            let data = Skill {
                id: Uuid::now_v7(),
                profile_id,
                name: dummy.name,
            };
            result.push((self.modifier_many)(&data, idx, ext.clone()));
        }
        let mut tx = db.begin().await?;
        for item in result.iter() {
            sqlx::query(r#"INSERT INTO public.skill (id, profile_id, name) VALUES ($1, $2, $3)"#)
                .bind(item.id)
                .bind(item.profile_id)
                .bind(&item.name)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(result)
    }
}

#[derive(Debug, Dummy)]
struct SkillDummy {
    #[dummy(faker = "Word()")]
    pub name: String,
}
