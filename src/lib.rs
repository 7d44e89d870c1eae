use rocket::{figment::Figment, Build, Rocket};
use sea_orm::DatabaseConnection;

use crate::{config::Settings, models::pagecache::PageCache};

pub mod config;
pub mod error;
pub mod forms;
pub mod models;
pub mod routes;
pub mod services;

/// Assembles the application on top of given Rocket configuration
pub fn build(figment: Figment, db: DatabaseConnection, settings: Settings) -> Rocket<Build> {
    rocket::custom(figment)
        .manage(db)
        .manage(PageCache::new(settings.index_cache_ttl))
        .manage(settings)
        .register("/", routes::catchers::catchers())
        .mount("/", routes::posts::routes())
        .mount("/", routes::follow::routes())
        .mount("/about", routes::about::routes())
        .mount("/admin", routes::admin::routes())
}
