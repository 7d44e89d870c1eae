use rocket::{delete, form::Form, post, routes, Route, State};
use sea_orm::DatabaseConnection;
use serde::Serialize;

use crate::{
    error::AppError,
    forms::{FormErrors, GroupForm},
    models::{pagecache::PageCache, response::APIResponse, sessionauth::SessionUser},
    services::groups,
};

pub fn routes() -> Vec<Route> {
    routes![clear_cache, create_group, delete_group]
}

#[derive(Serialize)]
struct GroupFormPage {
    errors: FormErrors,
}

fn require_staff(user: &SessionUser) -> Result<(), AppError> {
    if user.is_staff {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You need to be staff to do that".to_string(),
        ))
    }
}

/// Makes next home page request render from scratch
#[delete("/cache")]
fn clear_cache(user: SessionUser, cache: &State<PageCache>) -> Result<APIResponse, AppError> {
    require_staff(&user)?;

    cache.clear();

    Ok(APIResponse::NoContent)
}

#[post("/groups", data = "<form>")]
async fn create_group(
    user: SessionUser,
    form: Form<GroupForm>,
    db: &State<DatabaseConnection>,
) -> Result<APIResponse, AppError> {
    require_staff(&user)?;

    let data = match form.clean() {
        Ok(data) => data,
        Err(errors) => return Ok(APIResponse::new(GroupFormPage { errors })),
    };

    match groups::create(db.inner(), data).await? {
        Ok(group) => Ok(APIResponse::new(group)),
        Err(errors) => Ok(APIResponse::new(GroupFormPage { errors })),
    }
}

#[delete("/groups/<slug>")]
async fn delete_group(
    slug: &str,
    user: SessionUser,
    db: &State<DatabaseConnection>,
) -> Result<APIResponse, AppError> {
    require_staff(&user)?;

    groups::delete(db.inner(), slug).await?;

    Ok(APIResponse::NoContent)
}
