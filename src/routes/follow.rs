use rocket::{get, post, response::Redirect, routes, Route, State};
use sea_orm::DatabaseConnection;
use serde::Serialize;

use super::profile_location;
use crate::{
    error::AppError,
    models::{
        pagination::{Page, PageRequest},
        response::APIResponse,
        sessionauth::SessionUser,
    },
    services::{
        feed::{self, FeedElement},
        follow, users,
    },
};

pub fn routes() -> Vec<Route> {
    routes![follow_index, profile_follow, profile_unfollow]
}

#[derive(Serialize)]
struct FollowPage {
    page: Page<FeedElement>,
}

/// Posts of authors the user follows
#[get("/follow?<page>")]
async fn follow_index(
    page: Option<String>,
    user: SessionUser,
    db: &State<DatabaseConnection>,
) -> Result<APIResponse, AppError> {
    let page = feed::fetch_feed_page(
        db.inner(),
        feed::following_feed(user.id),
        PageRequest::parse(page.as_deref()),
    )
    .await?;

    Ok(APIResponse::new(FollowPage { page }))
}

/// Following yourself or following twice silently does nothing
#[post("/<username>/follow")]
async fn profile_follow(
    username: &str,
    user: SessionUser,
    db: &State<DatabaseConnection>,
) -> Result<Redirect, AppError> {
    let author = users::find_by_username(db.inner(), username).await?;

    follow::follow(db.inner(), user.id, author.id).await?;

    Ok(Redirect::found(profile_location(&author.username)))
}

#[post("/<username>/unfollow")]
async fn profile_unfollow(
    username: &str,
    user: SessionUser,
    db: &State<DatabaseConnection>,
) -> Result<Redirect, AppError> {
    let author = users::find_by_username(db.inner(), username).await?;

    follow::unfollow(db.inner(), user.id, author.id).await?;

    Ok(Redirect::found(profile_location(&author.username)))
}
