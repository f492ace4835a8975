use sea_orm::entity::prelude::*;

/// Single-row table: the one public profile lives at a fixed id.
/// Writes go through the upsert path only.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "profile")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,

    pub name: Option<String>,

    pub title: Option<String>,

    pub bio: Option<String>,

    /// Public contact address, distinct from the login email on accounts.
    pub email: Option<String>,

    pub phone: Option<String>,

    pub github: Option<String>,

    pub linkedin: Option<String>,

    pub instagram: Option<String>,

    pub resume_url: Option<String>,

    /// JSON-encoded ordered list of skill tags.
    pub skills: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
