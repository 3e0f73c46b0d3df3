use crate::domain::course::Course;
use anyhow::Result;
use sqlx::{PgPool, Row};
use uuid::Uuid;

#[async_trait::async_trait]
pub trait CourseCatalog: Send + Sync {
    async fn fetch_course_by_id(&self, course_id: Uuid) -> Result<Option<Course>>;
}

#[derive(Clone)]
pub struct CoursesRepo {
    pub pool: PgPool,
}

#[async_trait::async_trait]
impl CourseCatalog for CoursesRepo {
    async fn fetch_course_by_id(&self, course_id: Uuid) -> Result<Option<Course>> {
        let row = sqlx::query("SELECT id, title, price FROM courses WHERE id = $1")
            .bind(course_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| Course {
            id: r.get("id"),
            title: r.get("title"),
            price: r.get("price"),
        }))
    }
}
