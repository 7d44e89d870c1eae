use std::path::Path;

use chrono::Utc;
use entity::{comment, post, user};
use file_format::FileFormat;
use rocket::{fs::TempFile, tokio::fs};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, Set,
};

use super::{groups, policy};
use crate::{
    error::{AppError, Result},
    forms::{CleanPost, FormErrors, INVALID_CHOICE},
};

/// Directory, relative to media root, where post images are stored
pub const IMAGE_DIR: &str = "posts";

/// Post that passed every check and can be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub text: String,
    pub group_id: Option<i64>,
    /// Newly uploaded image, relative to media root
    pub image: Option<String>,
}

/// Finds post `post_id` written by `username`
pub async fn find_post<C: ConnectionTrait>(
    db: &C,
    username: &str,
    post_id: i64,
) -> Result<(user::Model, post::Model)> {
    let found = post::Entity::find_by_id(post_id)
        .find_also_related(user::Entity)
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?;

    match found {
        Some((post, Some(author))) => Ok((author, post)),
        _ => Err(AppError::NotFound("Post")),
    }
}

pub async fn count_by_author<C: ConnectionTrait>(db: &C, author_id: i64) -> Result<u64, DbErr> {
    post::Entity::find()
        .filter(post::Column::AuthorId.eq(author_id))
        .count(db)
        .await
}

/// Checks parts of a cleaned post that need database
pub async fn check<C: ConnectionTrait>(db: &C, post: &CleanPost) -> Result<Result<(), FormErrors>> {
    if let Some(id) = post.group {
        if !groups::exists(db, id).await? {
            let mut errors = FormErrors::default();
            errors.add("group", INVALID_CHOICE);
            return Ok(Err(errors));
        }
    }

    Ok(Ok(()))
}

/// Copies uploaded image under media root and returns its relative path,
/// e.g. `posts/small.gif`. Extension comes from the detected `format`.
pub async fn store_image(
    media_root: &Path,
    file: &mut TempFile<'_>,
    format: FileFormat,
) -> Result<String> {
    let stem = file.name().unwrap_or("image").to_string();
    let ext = format.extension();

    let dir = media_root.join(IMAGE_DIR);
    fs::create_dir_all(&dir).await?;

    let mut name = format!("{stem}.{ext}");
    if fs::try_exists(dir.join(&name)).await? {
        name = format!("{stem}_{}.{ext}", Utc::now().timestamp_millis());
    }

    file.move_copy_to(dir.join(&name)).await?;

    Ok(format!("{IMAGE_DIR}/{name}"))
}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    author: &user::Model,
    draft: PostDraft,
) -> Result<post::Model, DbErr> {
    let post = post::ActiveModel {
        text: Set(draft.text),
        pub_date: Set(Utc::now()),
        author_id: Set(author.id),
        group_id: Set(draft.group_id),
        image: Set(draft.image),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(post_id = post.id, author = %author.username, "post created");

    Ok(post)
}

/// Applies `draft` to `post` on behalf of `actor`.
///
/// Returns `None` without touching anything when `actor` may not edit the post.
/// Existing image is kept unless a new one was uploaded.
pub async fn edit<C: ConnectionTrait>(
    db: &C,
    actor: &user::Model,
    post: post::Model,
    draft: PostDraft,
) -> Result<Option<post::Model>, DbErr> {
    if !policy::can_edit(actor, &post) {
        tracing::warn!(post_id = post.id, actor = %actor.username, "edit attempt by non-author");
        return Ok(None);
    }

    let mut active = post.into_active_model();
    active.text = Set(draft.text);
    active.group_id = Set(draft.group_id);
    if let Some(image) = draft.image {
        active.image = Set(Some(image));
    }

    let post = active.update(db).await?;

    tracing::info!(post_id = post.id, "post edited");

    Ok(Some(post))
}

pub async fn add_comment<C: ConnectionTrait>(
    db: &C,
    author: &user::Model,
    post: &post::Model,
    text: String,
) -> Result<comment::Model, DbErr> {
    let comment = comment::ActiveModel {
        post_id: Set(post.id),
        author_id: Set(author.id),
        text: Set(text),
        created: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(
        comment_id = comment.id,
        post_id = post.id,
        author = %author.username,
        "comment added"
    );

    Ok(comment)
}
