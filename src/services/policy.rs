use entity::{post, user};

/// Only author of a post may change it
pub fn can_edit(actor: &user::Model, post: &post::Model) -> bool {
    actor.id == post.author_id
}
