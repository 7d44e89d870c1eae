use std::ops::Deref;

use rocket::{
    http::Status,
    outcome::try_outcome,
    request::{FromRequest, Outcome},
    Request, State,
};
use sea_orm::{DatabaseConnection, EntityTrait};

/// Private (encrypted) cookie holding ID of logged in user. Issued by the auth service.
pub const SESSION_COOKIE: &str = "user_id";

/// Where unauthenticated users are sent
pub const LOGIN_URL: &str = "/auth/login";

/// Logged in user. Requests without a valid session fail with `401`, which
/// the catcher turns into a redirect to [`LOGIN_URL`].
#[derive(Debug, Clone)]
pub struct SessionUser(pub entity::user::Model);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for SessionUser {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let id = req
            .cookies()
            .get_private(SESSION_COOKIE)
            .and_then(|cookie| cookie.value().parse::<i64>().ok());

        let id = match id {
            Some(id) => id,
            None => return Outcome::Error((Status::Unauthorized, ())),
        };

        let db = try_outcome!(req.guard::<&State<DatabaseConnection>>().await);

        match entity::user::Entity::find_by_id(id).one(db.inner()).await {
            Ok(Some(user)) => Outcome::Success(SessionUser(user)),
            Ok(None) => Outcome::Error((Status::Unauthorized, ())),
            Err(e) => {
                tracing::error!(error = %e, user_id = id, "failed to load session user");
                Outcome::Error((Status::InternalServerError, ()))
            }
        }
    }
}

impl Deref for SessionUser {
    type Target = entity::user::Model;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
