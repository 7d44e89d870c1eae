#![allow(dead_code)]

use std::time::Duration;

use chrono::Utc;
use entity::{group, post, user};
use inkwell::{config::Settings, models::pagecache::DEFAULT_TTL};
use migration::{Migrator, MigratorTrait};
use rocket::{
    http::{Cookie, Header, Status},
    local::asynchronous::{Client, LocalResponse},
    Config,
};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use serde_json::Value;
use tempfile::TempDir;

pub struct TestApp {
    pub client: Client,
    /// Removed together with uploaded images when dropped
    pub media: TempDir,
}

impl TestApp {
    pub fn db(&self) -> &DatabaseConnection {
        self.client
            .rocket()
            .state::<DatabaseConnection>()
            .expect("database is managed")
    }
}

pub async fn setup() -> TestApp {
    setup_with_ttl(DEFAULT_TTL).await
}

pub async fn setup_with_ttl(ttl: Duration) -> TestApp {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(options).await.expect("in-memory database");
    Migrator::up(&db, None).await.expect("migrations");

    let media = tempfile::tempdir().expect("media dir");
    let settings = Settings::new(media.path(), ttl);

    let figment = Config::figment().merge(("log_level", "off"));
    let client = Client::tracked(inkwell::build(figment, db, settings))
        .await
        .expect("valid rocket instance");

    TestApp { client, media }
}

pub async fn create_user(db: &DatabaseConnection, username: &str) -> user::Model {
    user::ActiveModel {
        username: Set(username.to_string()),
        is_staff: Set(false),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("user inserted")
}

pub async fn create_staff(db: &DatabaseConnection, username: &str) -> user::Model {
    user::ActiveModel {
        username: Set(username.to_string()),
        is_staff: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("staff inserted")
}

pub async fn create_group(db: &DatabaseConnection, title: &str, slug: &str) -> group::Model {
    group::ActiveModel {
        title: Set(title.to_string()),
        slug: Set(slug.to_string()),
        description: Set(format!("All about {title}")),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("group inserted")
}

pub async fn create_post(
    db: &DatabaseConnection,
    author: &user::Model,
    text: &str,
    group_id: Option<i64>,
) -> post::Model {
    post::ActiveModel {
        text: Set(text.to_string()),
        pub_date: Set(Utc::now()),
        author_id: Set(author.id),
        group_id: Set(group_id),
        image: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("post inserted")
}

/// Session cookie of a logged in `user`
pub fn session(user: &user::Model) -> Cookie<'static> {
    Cookie::new("user_id", user.id.to_string())
}

/// Body of a successful response, unwrapped from its envelope
pub async fn data(response: LocalResponse<'_>) -> Value {
    assert_eq!(response.status(), Status::Ok);

    let body: Value = response.into_json().await.expect("JSON body");
    assert_eq!(body["ok"], true);

    body["data"].clone()
}

/// Texts of posts on a listing page, in order
pub fn texts(page: &Value) -> Vec<String> {
    page["items"]
        .as_array()
        .expect("page items")
        .iter()
        .map(|item| item["post"]["text"].as_str().expect("post text").to_string())
        .collect()
}

pub fn location(response: &LocalResponse<'_>) -> String {
    response
        .headers()
        .get_one("Location")
        .expect("Location header")
        .to_string()
}

/// 1x1 transparent GIF
pub const GIF: &[u8] = b"GIF89a\x01\x00\x01\x00\x80\x00\x00\x00\x00\x00\xff\xff\xff\
    !\xf9\x04\x01\x00\x00\x00\x00,\x00\x00\x00\x00\x01\x00\x01\x00\x00\x02\x02D\x01\x00;";

const BOUNDARY: &str = "INKWELLBOUNDARY";

/// File part of a multipart body: field name, file name, content type and content
pub struct Upload<'a> {
    pub field: &'a str,
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub content: &'a [u8],
}

/// `multipart/form-data` body with given text fields and an optional file
pub fn multipart(
    fields: &[(&str, &str)],
    upload: Option<Upload<'_>>,
) -> (Header<'static>, Vec<u8>) {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\n\
                 Content-Disposition: form-data; name=\"{name}\"\r\n\r\n\
                 {value}\r\n"
            )
            .as_bytes(),
        );
    }

    if let Some(upload) = upload {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                 Content-Type: {}\r\n\r\n",
                upload.field, upload.file_name, upload.content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(upload.content);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let header = Header::new(
        "Content-Type",
        format!("multipart/form-data; boundary={BOUNDARY}"),
    );

    (header, body)
}
