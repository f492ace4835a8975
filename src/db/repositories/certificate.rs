use anyhow::{Context, Result};
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder, Set};

use crate::entities::{certificates, prelude::*};

#[derive(Debug, Clone, Default)]
pub struct NewCertificate {
    pub title: String,
    pub issuer: String,
    pub issue_date: Option<String>,
    pub skills: Vec<String>,
    pub cert_url: Option<String>,
}

pub struct CertificateRepository {
    conn: DatabaseConnection,
}

impl CertificateRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<certificates::Model>> {
        Certificates::find()
            .order_by_desc(certificates::Column::CreatedAt)
            .order_by_desc(certificates::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list certificates")
    }

    pub async fn create(&self, input: NewCertificate) -> Result<certificates::Model> {
        let active = certificates::ActiveModel {
            title: Set(input.title),
            issuer: Set(input.issuer),
            issue_date: Set(input.issue_date),
            skills: Set(serde_json::to_string(&input.skills).context("Failed to encode skills")?),
            cert_url: Set(input.cert_url),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let res = Certificates::insert(active).exec(&self.conn).await?;
        let model = Certificates::find_by_id(res.last_insert_id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Certificate missing after insert"))?;
        Ok(model)
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Certificates::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }
}
