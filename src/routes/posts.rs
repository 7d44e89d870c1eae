use entity::{group, post, user};
use rocket::{
    form::Form, get, http::ContentType, post, response::Redirect, routes, Either, Route, State,
};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Serialize;

use super::post_location;
use crate::{
    config::Settings,
    error::AppError,
    forms::{CleanPost, CommentForm, FormErrors, PostForm},
    models::{
        pagecache::PageCache,
        pagination::{Page, PageRequest},
        response::APIResponse,
        sessionauth::SessionUser,
    },
    services::{
        feed::{self, CommentElement, FeedElement},
        follow, groups, policy,
        posts::{self, PostDraft},
    },
};

pub fn routes() -> Vec<Route> {
    routes![
        index,
        group_posts,
        profile,
        post_view,
        new_post_form,
        new_post,
        post_edit_form,
        post_edit,
        add_comment
    ]
}

#[derive(Serialize)]
struct IndexPage {
    page: Page<FeedElement>,
}

#[derive(Serialize)]
struct GroupPage {
    group: group::Model,
    page: Page<FeedElement>,
}

#[derive(Serialize)]
struct ProfilePage {
    author: user::Model,
    page: Page<FeedElement>,
    /// Whether the viewer follows this author, always false for anonymous viewers
    following: bool,
    followers: u64,
    follows: u64,
}

#[derive(Serialize)]
struct PostPage {
    #[serde(flatten)]
    post: FeedElement,
    comments: Vec<CommentElement>,
    /// Number of posts written by author
    author_posts: u64,
    /// Whether the viewer may open edit form
    can_edit: bool,
}

#[derive(Serialize)]
struct PostFormPage {
    is_new: bool,
    post: Option<post::Model>,
    text: String,
    group: Option<i64>,
    groups: Vec<group::Model>,
    errors: FormErrors,
}

/// Home page. Rendered body is cached per requested page, see [`PageCache`].
#[get("/?<page>")]
async fn index(
    page: Option<String>,
    db: &State<DatabaseConnection>,
    cache: &State<PageCache>,
) -> Result<(ContentType, String), AppError> {
    let db = db.inner();
    let request = PageRequest::parse(page.as_deref());
    let key = format!("/?page={}", request.normalized());

    let content = cache
        .get_or_try_insert_with(&key, || async move {
            let page = feed::fetch_feed_page(db, feed::global_feed(), request).await?;

            Ok::<_, AppError>(APIResponse::render_data(&IndexPage { page })?)
        })
        .await?;

    Ok((ContentType::JSON, content.to_string()))
}

#[get("/group/<slug>?<page>")]
async fn group_posts(
    slug: &str,
    page: Option<String>,
    db: &State<DatabaseConnection>,
) -> Result<APIResponse, AppError> {
    let db = db.inner();

    let (group, selection) = feed::group_feed(db, slug).await?;
    let page = feed::fetch_feed_page(db, selection, PageRequest::parse(page.as_deref())).await?;

    Ok(APIResponse::new(GroupPage { group, page }))
}

#[get("/<username>?<page>")]
async fn profile(
    username: &str,
    page: Option<String>,
    viewer: Option<SessionUser>,
    db: &State<DatabaseConnection>,
) -> Result<APIResponse, AppError> {
    let db = db.inner();

    let (author, selection) = feed::profile_feed(db, username).await?;
    let page = feed::fetch_feed_page(db, selection, PageRequest::parse(page.as_deref())).await?;

    let following = match &viewer {
        Some(viewer) => follow::is_following(db, viewer.id, author.id).await?,
        None => false,
    };

    Ok(APIResponse::new(ProfilePage {
        followers: follow::follower_count(db, author.id).await?,
        follows: follow::following_count(db, author.id).await?,
        author,
        page,
        following,
    }))
}

#[get("/<username>/<post_id>")]
async fn post_view(
    username: &str,
    post_id: i64,
    viewer: Option<SessionUser>,
    db: &State<DatabaseConnection>,
) -> Result<APIResponse, AppError> {
    let db = db.inner();

    let (author, post) = posts::find_post(db, username, post_id).await?;
    let group = match post.group_id {
        Some(id) => group::Entity::find_by_id(id).one(db).await?,
        None => None,
    };

    Ok(APIResponse::new(PostPage {
        comments: feed::post_comments(db, post.id).await?,
        author_posts: posts::count_by_author(db, author.id).await?,
        can_edit: viewer.map_or(false, |v| policy::can_edit(&v, &post)),
        post: FeedElement {
            post,
            author,
            group,
        },
    }))
}

/// Runs every check on submitted post, returning form errors if any failed
async fn validate(
    db: &DatabaseConnection,
    form: &PostForm<'_>,
) -> Result<Result<CleanPost, FormErrors>, AppError> {
    let post = match form.clean().await? {
        Ok(post) => post,
        Err(errors) => return Ok(Err(errors)),
    };

    Ok(posts::check(db, &post).await?.map(|()| post))
}

/// Form re-rendered with submitted values and errors
async fn form_page(
    db: &DatabaseConnection,
    post: Option<post::Model>,
    form: &PostForm<'_>,
    errors: FormErrors,
) -> Result<APIResponse, AppError> {
    Ok(APIResponse::new(PostFormPage {
        is_new: post.is_none(),
        post,
        text: form.text.clone().unwrap_or_default(),
        group: form.group.as_deref().and_then(|g| g.trim().parse().ok()),
        groups: groups::all(db).await?,
        errors,
    }))
}

#[get("/new")]
async fn new_post_form(
    _user: SessionUser,
    db: &State<DatabaseConnection>,
) -> Result<APIResponse, AppError> {
    Ok(APIResponse::new(PostFormPage {
        is_new: true,
        post: None,
        text: String::new(),
        group: None,
        groups: groups::all(db.inner()).await?,
        errors: FormErrors::default(),
    }))
}

#[post("/new", data = "<form>")]
async fn new_post(
    user: SessionUser,
    mut form: Form<PostForm<'_>>,
    db: &State<DatabaseConnection>,
    settings: &State<Settings>,
) -> Result<Either<Redirect, APIResponse>, AppError> {
    let db = db.inner();

    let post = match validate(db, &form).await? {
        Ok(post) => post,
        Err(errors) => return Ok(Either::Right(form_page(db, None, &form, errors).await?)),
    };

    let image = match (form.image_mut(), post.image) {
        (Some(file), Some(format)) => {
            Some(posts::store_image(&settings.media_root, file, format).await?)
        }
        _ => None,
    };

    let draft = PostDraft {
        text: post.text,
        group_id: post.group,
        image,
    };
    posts::create(db, &user, draft).await?;

    Ok(Either::Left(Redirect::found("/")))
}

#[get("/<username>/<post_id>/edit")]
async fn post_edit_form(
    username: &str,
    post_id: i64,
    user: SessionUser,
    db: &State<DatabaseConnection>,
) -> Result<Either<Redirect, APIResponse>, AppError> {
    let db = db.inner();

    let (author, post) = posts::find_post(db, username, post_id).await?;
    if !policy::can_edit(&user, &post) {
        return Ok(Either::Left(Redirect::found(post_location(
            &author.username,
            post.id,
        ))));
    }

    Ok(Either::Right(APIResponse::new(PostFormPage {
        is_new: false,
        text: post.text.clone(),
        group: post.group_id,
        post: Some(post),
        groups: groups::all(db).await?,
        errors: FormErrors::default(),
    })))
}

#[post("/<username>/<post_id>/edit", data = "<form>")]
async fn post_edit(
    username: &str,
    post_id: i64,
    user: SessionUser,
    mut form: Form<PostForm<'_>>,
    db: &State<DatabaseConnection>,
    settings: &State<Settings>,
) -> Result<Either<Redirect, APIResponse>, AppError> {
    let db = db.inner();

    let (author, post) = posts::find_post(db, username, post_id).await?;
    let location = post_location(&author.username, post.id);

    if !policy::can_edit(&user, &post) {
        return Ok(Either::Left(Redirect::found(location)));
    }

    let clean = match validate(db, &form).await? {
        Ok(clean) => clean,
        Err(errors) => {
            return Ok(Either::Right(
                form_page(db, Some(post), &form, errors).await?,
            ))
        }
    };

    let image = match (form.image_mut(), clean.image) {
        (Some(file), Some(format)) => {
            Some(posts::store_image(&settings.media_root, file, format).await?)
        }
        _ => None,
    };

    let draft = PostDraft {
        text: clean.text,
        group_id: clean.group,
        image,
    };
    posts::edit(db, &user, post, draft).await?;

    Ok(Either::Left(Redirect::found(location)))
}

/// Invalid comments are dropped without telling the user; both outcomes
/// redirect back to the post.
#[post("/<username>/<post_id>/comment", data = "<form>")]
async fn add_comment(
    username: &str,
    post_id: i64,
    user: SessionUser,
    form: Form<CommentForm>,
    db: &State<DatabaseConnection>,
) -> Result<Redirect, AppError> {
    let db = db.inner();

    let (author, post) = posts::find_post(db, username, post_id).await?;

    match form.clean() {
        Ok(text) => {
            posts::add_comment(db, &user, &post, text).await?;
        }
        Err(errors) => tracing::debug!(?errors, post_id, "comment rejected"),
    }

    Ok(Redirect::found(post_location(&author.username, post.id)))
}
