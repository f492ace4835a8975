use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "certificates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,

    pub issuer: String,

    /// Free-text issue date ("2024", "March 2024", ...).
    pub issue_date: Option<String>,

    /// JSON-encoded ordered list of skill tags.
    pub skills: String,

    /// Image or PDF URL at the media host.
    pub cert_url: Option<String>,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
