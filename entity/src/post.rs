use sea_orm::{entity::prelude::*, QueryOrder};
use serde::Serialize;

#[derive(Clone, Serialize, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    /// Internal ID of post
    pub id: i64,
    /// Post text
    pub text: String,
    /// Publication time, set once on creation
    pub pub_date: DateTimeUtc,
    /// Internal ID of author
    pub author_id: i64,
    #[sea_orm(nullable)]
    /// Internal ID of group, cleared when group is deleted
    pub group_id: Option<i64>,
    #[sea_orm(nullable)]
    /// Path of attached image, relative to media root
    pub image: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Author,
    #[sea_orm(
        belongs_to = "super::group::Entity",
        from = "Column::GroupId",
        to = "super::group::Column::Id",
        on_delete = "SetNull"
    )]
    Group,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Entity {
    /// All posts, newest first. Every post listing starts from here.
    pub fn find_newest() -> Select<Entity> {
        Self::find()
            .order_by_desc(Column::PubDate)
            .order_by_desc(Column::Id)
    }
}
