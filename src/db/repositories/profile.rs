use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use crate::entities::profile;

/// Fixed id of the single profile row.
pub const PROFILE_ROW_ID: i32 = 1;

/// Allow-list of profile fields writable through the admin update path.
/// Role and password are not representable here; that exclusion is the
/// security boundary, not an omission.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub title: Option<String>,
    pub bio: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub instagram: Option<String>,
    pub resume_url: Option<String>,
    pub skills: Option<Vec<String>>,
}

pub struct ProfileRepository {
    conn: DatabaseConnection,
}

impl ProfileRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Return the profile row, creating an empty default on first read.
    pub async fn get_or_create(&self) -> Result<profile::Model> {
        if let Some(model) = self.find().await? {
            return Ok(model);
        }

        let active = profile::ActiveModel {
            id: Set(PROFILE_ROW_ID),
            skills: Set("[]".to_string()),
            updated_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        match active.insert(&self.conn).await {
            Ok(model) => Ok(model),
            // A concurrent first read may have inserted the row already.
            Err(_) => self
                .find()
                .await?
                .ok_or_else(|| anyhow::anyhow!("Profile row missing after insert race")),
        }
    }

    /// Upsert through the allow-list. Absent fields keep their stored
    /// values; the whole write is single-row, last-write-wins.
    pub async fn upsert(&self, update: ProfileUpdate) -> Result<profile::Model> {
        let existing = self.get_or_create().await?;

        let mut active: profile::ActiveModel = existing.into();
        apply_update(&mut active, update)?;
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        active
            .update(&self.conn)
            .await
            .context("Failed to update profile")
    }

    async fn find(&self) -> Result<Option<profile::Model>> {
        profile::Entity::find_by_id(PROFILE_ROW_ID)
            .one(&self.conn)
            .await
            .context("Failed to query profile")
    }
}

fn apply_update(active: &mut profile::ActiveModel, update: ProfileUpdate) -> Result<()> {
    if let Some(v) = update.name {
        active.name = Set(Some(v));
    }
    if let Some(v) = update.title {
        active.title = Set(Some(v));
    }
    if let Some(v) = update.bio {
        active.bio = Set(Some(v));
    }
    if let Some(v) = update.email {
        active.email = Set(Some(v));
    }
    if let Some(v) = update.phone {
        active.phone = Set(Some(v));
    }
    if let Some(v) = update.github {
        active.github = Set(Some(v));
    }
    if let Some(v) = update.linkedin {
        active.linkedin = Set(Some(v));
    }
    if let Some(v) = update.instagram {
        active.instagram = Set(Some(v));
    }
    if let Some(v) = update.resume_url {
        active.resume_url = Set(Some(v));
    }
    if let Some(v) = update.skills {
        active.skills = Set(serde_json::to_string(&v).context("Failed to encode skills")?);
    }
    Ok(())
}
