mod common;

use common::*;
use entity::{comment, follow, post, user};
use rocket::http::ContentType;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

#[rocket::async_test]
async fn deleting_user_removes_their_posts_comments_and_follows() {
    let app = setup().await;
    let leo = create_user(app.db(), "leo").await;
    let ann = create_user(app.db(), "ann").await;
    let bob = create_user(app.db(), "bob").await;

    let leo_post = create_post(app.db(), &leo, "by leo", None).await;
    let ann_post = create_post(app.db(), &ann, "by ann", None).await;

    let leo_url = format!("/leo/{}", leo_post.id);
    let ann_url = format!("/ann/{}", ann_post.id);

    for (commenter, post_url) in [(&leo, &ann_url), (&ann, &leo_url), (&bob, &ann_url)] {
        app.client
            .post(format!("{post_url}/comment"))
            .header(ContentType::Form)
            .private_cookie(session(commenter))
            .body(format!("text=from+{}", commenter.username))
            .dispatch()
            .await;
    }
    for (follower, author) in [(&leo, "ann"), (&ann, "leo"), (&bob, "ann")] {
        app.client
            .post(format!("/{author}/follow"))
            .private_cookie(session(follower))
            .dispatch()
            .await;
    }
    assert_eq!(comment::Entity::find().count(app.db()).await.unwrap(), 3);
    assert_eq!(follow::Entity::find().count(app.db()).await.unwrap(), 3);

    user::Entity::delete_by_id(leo.id)
        .exec(app.db())
        .await
        .unwrap();

    let posts = post::Entity::find().all(app.db()).await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].id, ann_post.id);

    // leo's comment on ann's post and ann's comment on leo's post are both gone
    let comments = comment::Entity::find().all(app.db()).await.unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].author_id, bob.id);
    assert_eq!(comments[0].post_id, ann_post.id);

    let follows = follow::Entity::find().all(app.db()).await.unwrap();
    assert_eq!(follows.len(), 1);
    assert_eq!((follows[0].user_id, follows[0].author_id), (bob.id, ann.id));
}

#[rocket::async_test]
async fn deleting_post_removes_its_comments() {
    let app = setup().await;
    let leo = create_user(app.db(), "leo").await;
    let ann = create_user(app.db(), "ann").await;
    let first = create_post(app.db(), &leo, "first", None).await;
    let second = create_post(app.db(), &leo, "second", None).await;

    for post in [&first, &second] {
        app.client
            .post(format!("/leo/{}/comment", post.id))
            .header(ContentType::Form)
            .private_cookie(session(&ann))
            .body("text=nice")
            .dispatch()
            .await;
    }

    post::Entity::delete_by_id(first.id)
        .exec(app.db())
        .await
        .unwrap();

    let orphans = comment::Entity::find()
        .filter(comment::Column::PostId.eq(first.id))
        .count(app.db())
        .await
        .unwrap();
    assert_eq!(orphans, 0);
    assert_eq!(comment::Entity::find().count(app.db()).await.unwrap(), 1);
    assert_eq!(user::Entity::find().count(app.db()).await.unwrap(), 2);
}
