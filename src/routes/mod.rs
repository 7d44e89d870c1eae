pub mod about;
pub mod admin;
pub mod catchers;
pub mod follow;
pub mod posts;

/// Location of profile page of `username`
pub fn profile_location(username: &str) -> String {
    format!("/{username}")
}

/// Location of read-only post page
pub fn post_location(username: &str, post_id: i64) -> String {
    format!("/{username}/{post_id}")
}
