use entity::{comment, follow, group, post, user};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(user::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(user::Column::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(user::Column::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(user::Column::IsStaff)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                Table::create()
                    .table(group::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(group::Column::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(group::Column::Title)
                            .string_len(group::TITLE_MAX_LEN as u32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(group::Column::Slug)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(group::Column::Description).text().not_null())
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                Table::create()
                    .table(post::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(post::Column::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(post::Column::Text).text().not_null())
                    .col(
                        ColumnDef::new(post::Column::PubDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(post::Column::AuthorId).integer().not_null())
                    .col(ColumnDef::new(post::Column::GroupId).integer().null())
                    .col(ColumnDef::new(post::Column::Image).string().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-posts-author_id")
                            .from(post::Entity, post::Column::AuthorId)
                            .to(user::Entity, user::Column::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-posts-group_id")
                            .from(post::Entity, post::Column::GroupId)
                            .to(group::Entity, group::Column::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx-posts-pub_date")
                    .table(post::Entity)
                    .col(post::Column::PubDate)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                Table::create()
                    .table(comment::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(comment::Column::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(comment::Column::PostId).integer().not_null())
                    .col(
                        ColumnDef::new(comment::Column::AuthorId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(comment::Column::Text).text().not_null())
                    .col(
                        ColumnDef::new(comment::Column::Created)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-comments-post_id")
                            .from(comment::Entity, comment::Column::PostId)
                            .to(post::Entity, post::Column::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-comments-author_id")
                            .from(comment::Entity, comment::Column::AuthorId)
                            .to(user::Entity, user::Column::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                Table::create()
                    .table(follow::Entity)
                    .if_not_exists()
                    .col(ColumnDef::new(follow::Column::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(follow::Column::AuthorId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(follow::Column::Created)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    // one edge per (follower, author) pair
                    .primary_key(
                        Index::create()
                            .col(follow::Column::UserId)
                            .col(follow::Column::AuthorId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-follows-user_id")
                            .from(follow::Entity, follow::Column::UserId)
                            .to(user::Entity, user::Column::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-follows-author_id")
                            .from(follow::Entity, follow::Column::AuthorId)
                            .to(user::Entity, user::Column::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx-follows-created")
                    .table(follow::Entity)
                    .col(follow::Column::Created)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(follow::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(comment::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(post::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(group::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(user::Entity).to_owned())
            .await
    }
}
