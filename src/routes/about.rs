use rocket::{get, routes, Route};
use serde::Serialize;

use crate::models::response::APIResponse;

pub fn routes() -> Vec<Route> {
    routes![author, tech]
}

#[derive(Serialize)]
struct StaticPage {
    title: &'static str,
    text: &'static str,
}

#[get("/author")]
fn author() -> APIResponse {
    APIResponse::new(StaticPage {
        title: "About the author",
        text: "A small blogging platform: write posts, join groups, follow authors.",
    })
}

#[get("/tech")]
fn tech() -> APIResponse {
    APIResponse::new(StaticPage {
        title: "Technologies",
        text: "Rust, Rocket, sea-orm and SQLite.",
    })
}
