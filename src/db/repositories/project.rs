use anyhow::{Context, Result};
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder, Set};

use crate::entities::{prelude::*, projects};

#[derive(Debug, Clone, Default)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub tech_stack: Vec<String>,
    pub image_url: Option<String>,
    pub live_link: Option<String>,
    pub repo_link: Option<String>,
}

pub struct ProjectRepository {
    conn: DatabaseConnection,
}

impl ProjectRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Newest first. Timestamps are RFC 3339 so the lexicographic order is
    /// chronological; id breaks same-instant ties.
    pub async fn list(&self) -> Result<Vec<projects::Model>> {
        Projects::find()
            .order_by_desc(projects::Column::CreatedAt)
            .order_by_desc(projects::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list projects")
    }

    pub async fn create(&self, input: NewProject) -> Result<projects::Model> {
        let active = projects::ActiveModel {
            title: Set(input.title),
            description: Set(input.description),
            tech_stack: Set(serde_json::to_string(&input.tech_stack)
                .context("Failed to encode tech stack")?),
            image_url: Set(input.image_url),
            live_link: Set(input.live_link),
            repo_link: Set(input.repo_link),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let res = Projects::insert(active).exec(&self.conn).await?;
        let model = Projects::find_by_id(res.last_insert_id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Project missing after insert"))?;
        Ok(model)
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Projects::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }
}
