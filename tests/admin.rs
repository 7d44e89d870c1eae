mod common;

use common::*;
use entity::{group, post};
use rocket::http::{ContentType, Status};
use sea_orm::{EntityTrait, PaginatorTrait};

#[rocket::async_test]
async fn non_staff_is_forbidden() {
    let app = setup().await;
    let leo = create_user(app.db(), "leo").await;
    create_group(app.db(), "Cats", "cats").await;

    let responses = [
        app.client
            .delete("/admin/cache")
            .private_cookie(session(&leo))
            .dispatch()
            .await,
        app.client
            .post("/admin/groups")
            .header(ContentType::Form)
            .private_cookie(session(&leo))
            .body("title=Dogs&slug=dogs&description=Woof")
            .dispatch()
            .await,
        app.client
            .delete("/admin/groups/cats")
            .private_cookie(session(&leo))
            .dispatch()
            .await,
    ];

    for response in responses {
        assert_eq!(response.status(), Status::Forbidden);
    }

    assert_eq!(group::Entity::find().count(app.db()).await.unwrap(), 1);
}

#[rocket::async_test]
async fn staff_creates_group() {
    let app = setup().await;
    let admin = create_staff(app.db(), "admin").await;

    let created = data(
        app.client
            .post("/admin/groups")
            .header(ContentType::Form)
            .private_cookie(session(&admin))
            .body("title=Dogs&slug=dogs&description=Woof")
            .dispatch()
            .await,
    )
    .await;
    assert_eq!(created["slug"], "dogs");
    assert_eq!(created["title"], "Dogs");

    let page = data(app.client.get("/group/dogs").dispatch().await).await;
    assert_eq!(page["group"]["description"], "Woof");
}

#[rocket::async_test]
async fn invalid_or_taken_slug_is_reported() {
    let app = setup().await;
    let admin = create_staff(app.db(), "admin").await;
    create_group(app.db(), "Cats", "cats").await;

    for body in [
        "title=Cats+again&slug=cats&description=Meow",
        "title=Bad&slug=not+a+slug&description=Meow",
        "title=&slug=empty&description=Meow",
    ] {
        let page = data(
            app.client
                .post("/admin/groups")
                .header(ContentType::Form)
                .private_cookie(session(&admin))
                .body(body)
                .dispatch()
                .await,
        )
        .await;

        assert!(page["errors"].is_object(), "{body}");
    }

    assert_eq!(group::Entity::find().count(app.db()).await.unwrap(), 1);
}

#[rocket::async_test]
async fn deleting_group_keeps_its_posts() {
    let app = setup().await;
    let admin = create_staff(app.db(), "admin").await;
    let leo = create_user(app.db(), "leo").await;
    let cats = create_group(app.db(), "Cats", "cats").await;
    let post = create_post(app.db(), &leo, "meow", Some(cats.id)).await;

    let response = app
        .client
        .delete("/admin/groups/cats")
        .private_cookie(session(&admin))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::NoContent);

    let orphan = post::Entity::find_by_id(post.id)
        .one(app.db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(orphan.group_id, None);

    let response = app.client.get("/group/cats").dispatch().await;
    assert_eq!(response.status(), Status::NotFound);

    let response = app
        .client
        .delete("/admin/groups/cats")
        .private_cookie(session(&admin))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::NotFound);
}

#[rocket::async_test]
async fn anonymous_admin_is_sent_to_login() {
    let app = setup().await;

    let response = app.client.delete("/admin/cache").dispatch().await;

    assert_eq!(response.status(), Status::Found);
    assert!(location(&response).starts_with("/auth/login"));
}
