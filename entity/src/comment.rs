use sea_orm::{entity::prelude::*, QueryOrder};
use serde::Serialize;

#[derive(Clone, Serialize, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "comments")]
pub struct Model {
    #[sea_orm(primary_key)]
    /// Internal ID of comment
    pub id: i64,
    /// Internal ID of commented post
    pub post_id: i64,
    /// Internal ID of author
    pub author_id: i64,
    pub text: String,
    /// Creation time
    pub created: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::post::Entity",
        from = "Column::PostId",
        to = "super::post::Column::Id",
        on_delete = "Cascade"
    )]
    Post,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Author,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Entity {
    /// All comments, newest first
    pub fn find_newest() -> Select<Entity> {
        Self::find()
            .order_by_desc(Column::Created)
            .order_by_desc(Column::Id)
    }
}
