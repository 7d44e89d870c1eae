//! Directed "follows" relation between users.
//!
//! Both mutations are idempotent. Uniqueness of an edge is guaranteed by the
//! primary key of `follows`, inserts on an existing edge do nothing.

use chrono::Utc;
use entity::follow;
use sea_orm::{
    sea_query::OnConflict, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set,
};

/// Makes `user_id` follow `author_id`. Returns whether a new edge was created.
pub async fn follow<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    author_id: i64,
) -> Result<bool, DbErr> {
    if user_id == author_id {
        return Ok(false);
    }

    let active = follow::ActiveModel {
        user_id: Set(user_id),
        author_id: Set(author_id),
        created: Set(Utc::now()),
    };

    let inserted = follow::Entity::insert(active)
        .on_conflict(
            OnConflict::columns([follow::Column::UserId, follow::Column::AuthorId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    if inserted > 0 {
        tracing::info!(user_id, author_id, "user followed author");
    }

    Ok(inserted > 0)
}

/// Removes edge from `user_id` to `author_id`. Returns whether there was one.
pub async fn unfollow<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    author_id: i64,
) -> Result<bool, DbErr> {
    let result = follow::Entity::delete_many()
        .filter(follow::Column::UserId.eq(user_id))
        .filter(follow::Column::AuthorId.eq(author_id))
        .exec(db)
        .await?;

    if result.rows_affected > 0 {
        tracing::info!(user_id, author_id, "user unfollowed author");
    }

    Ok(result.rows_affected > 0)
}

pub async fn is_following<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    author_id: i64,
) -> Result<bool, DbErr> {
    Ok(follow::Entity::find_by_id((user_id, author_id))
        .one(db)
        .await?
        .is_some())
}

/// Number of users following `user_id`
pub async fn follower_count<C: ConnectionTrait>(db: &C, user_id: i64) -> Result<u64, DbErr> {
    follow::Entity::find()
        .filter(follow::Column::AuthorId.eq(user_id))
        .count(db)
        .await
}

/// Number of authors `user_id` follows
pub async fn following_count<C: ConnectionTrait>(db: &C, user_id: i64) -> Result<u64, DbErr> {
    follow::Entity::find()
        .filter(follow::Column::UserId.eq(user_id))
        .count(db)
        .await
}
