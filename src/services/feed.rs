//! Post listings shown on index, group, profile and following pages.
//!
//! Every listing starts from [`post::Entity::find_newest`], so the newest-first
//! order holds for all of them.

use std::collections::HashMap;

use entity::{comment, follow, group, post, user};
use itertools::Itertools;
use sea_orm::{
    sea_query::Query, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Select,
};
use serde::Serialize;

use crate::{
    error::{AppError, Result},
    models::pagination::{fetch_page, Page, PageRequest, PAGE_SIZE},
};

/// Post together with things needed to show it
#[derive(Debug, Clone, Serialize)]
pub struct FeedElement {
    pub post: post::Model,
    pub author: user::Model,
    pub group: Option<group::Model>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentElement {
    pub comment: comment::Model,
    pub author: user::Model,
}

pub fn global_feed() -> Select<post::Entity> {
    post::Entity::find_newest()
}

/// Posts of group with `slug`
pub async fn group_feed<C: ConnectionTrait>(
    db: &C,
    slug: &str,
) -> Result<(group::Model, Select<post::Entity>)> {
    let group = group::Entity::find()
        .filter(group::Column::Slug.eq(slug))
        .one(db)
        .await?
        .ok_or(AppError::NotFound("Group"))?;

    let posts = post::Entity::find_newest().filter(post::Column::GroupId.eq(group.id));

    Ok((group, posts))
}

/// Posts written by `username`
pub async fn profile_feed<C: ConnectionTrait>(
    db: &C,
    username: &str,
) -> Result<(user::Model, Select<post::Entity>)> {
    let author = super::users::find_by_username(db, username).await?;
    let posts = post::Entity::find_newest().filter(post::Column::AuthorId.eq(author.id));

    Ok((author, posts))
}

/// Posts of every author that `user_id` follows. Empty when they follow nobody.
pub fn following_feed(user_id: i64) -> Select<post::Entity> {
    post::Entity::find_newest().filter(
        post::Column::AuthorId.in_subquery(
            Query::select()
                .column(follow::Column::AuthorId)
                .from(follow::Entity)
                .and_where(follow::Column::UserId.eq(user_id))
                .to_owned(),
        ),
    )
}

/// Fetches one page of `posts` along with authors and groups
pub async fn fetch_feed_page<C: ConnectionTrait>(
    db: &C,
    posts: Select<post::Entity>,
    request: PageRequest,
) -> Result<Page<FeedElement>, DbErr> {
    let page = fetch_page(posts, db, PAGE_SIZE, request).await?;

    hydrate(db, page).await
}

pub async fn hydrate<C: ConnectionTrait>(
    db: &C,
    page: Page<post::Model>,
) -> Result<Page<FeedElement>, DbErr> {
    let author_ids = page.items.iter().map(|p| p.author_id).unique().collect_vec();
    let group_ids = page.items.iter().flat_map(|p| p.group_id).unique().collect_vec();

    let authors: HashMap<_, _> = if author_ids.is_empty() {
        HashMap::new()
    } else {
        user::Entity::find()
            .filter(user::Column::Id.is_in(author_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect()
    };

    let groups: HashMap<_, _> = if group_ids.is_empty() {
        HashMap::new()
    } else {
        group::Entity::find()
            .filter(group::Column::Id.is_in(group_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|g| (g.id, g))
            .collect()
    };

    let items = page
        .items
        .iter()
        .filter_map(|post| {
            // author is a required foreign key, a miss means it was deleted just now
            let author = authors.get(&post.author_id)?.clone();
            let group = post.group_id.and_then(|id| groups.get(&id).cloned());

            Some(FeedElement {
                post: post.clone(),
                author,
                group,
            })
        })
        .collect();

    Ok(page.with_items(items))
}

/// Comments of a post, newest first
pub async fn post_comments<C: ConnectionTrait>(
    db: &C,
    post_id: i64,
) -> Result<Vec<CommentElement>, DbErr> {
    let comments = comment::Entity::find_newest()
        .filter(comment::Column::PostId.eq(post_id))
        .find_also_related(user::Entity)
        .all(db)
        .await?
        .into_iter()
        .filter_map(|(comment, author)| Some(CommentElement { comment, author: author? }))
        .collect();

    Ok(comments)
}
