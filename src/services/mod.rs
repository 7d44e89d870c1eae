pub mod feed;
pub mod follow;
pub mod groups;
pub mod policy;
pub mod posts;
pub mod users;
