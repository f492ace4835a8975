use anyhow::{Context, Result};
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder, Set};

use crate::entities::{contact_messages, prelude::*};

#[derive(Debug, Clone)]
pub struct NewMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

pub struct ContactRepository {
    conn: DatabaseConnection,
}

impl ContactRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn add(&self, input: NewMessage) -> Result<contact_messages::Model> {
        let active = contact_messages::ActiveModel {
            name: Set(input.name),
            email: Set(input.email),
            subject: Set(input.subject),
            message: Set(input.message),
            ip_address: Set(input.ip_address),
            user_agent: Set(input.user_agent),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let res = ContactMessages::insert(active).exec(&self.conn).await?;
        let model = ContactMessages::find_by_id(res.last_insert_id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Message missing after insert"))?;
        Ok(model)
    }

    pub async fn list(&self) -> Result<Vec<contact_messages::Model>> {
        ContactMessages::find()
            .order_by_desc(contact_messages::Column::CreatedAt)
            .order_by_desc(contact_messages::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list contact messages")
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = ContactMessages::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }
}
