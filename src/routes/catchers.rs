use rocket::{
    catch, catchers,
    http::{RawStr, Status},
    response::Redirect,
    Catcher, Request,
};

use crate::models::{response::APIResponse, sessionauth::LOGIN_URL};

pub fn catchers() -> Vec<Catcher> {
    catchers![login_catcher, no_endpoint_catcher, default_catcher]
}

/// Protected pages send anonymous users to login, remembering where they were going
#[catch(401)]
fn login_catcher(req: &Request) -> Redirect {
    let next = req.uri().to_string();

    Redirect::found(format!(
        "{LOGIN_URL}?next={}",
        RawStr::new(&next).percent_encode().as_str()
    ))
}

#[catch(404)]
fn no_endpoint_catcher(req: &Request) -> APIResponse {
    APIResponse::error(404, format!("Page {} not found", req.uri().path()))
}

#[catch(default)]
fn default_catcher(status: Status, _: &Request) -> APIResponse {
    APIResponse::error(status.code, status.reason_lossy())
}
