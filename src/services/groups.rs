use entity::group;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::{
    error::{AppError, Result},
    forms::{CleanGroup, FormErrors},
};

/// Groups offered as choices in post form
pub async fn all<C: ConnectionTrait>(db: &C) -> Result<Vec<group::Model>, DbErr> {
    group::Entity::find()
        .order_by_asc(group::Column::Title)
        .all(db)
        .await
}

pub async fn exists<C: ConnectionTrait>(db: &C, id: i64) -> Result<bool, DbErr> {
    Ok(group::Entity::find_by_id(id).count(db).await? > 0)
}

/// Creates group, unless slug is taken
pub async fn create<C: ConnectionTrait>(
    db: &C,
    data: CleanGroup,
) -> Result<Result<group::Model, FormErrors>> {
    let taken = group::Entity::find()
        .filter(group::Column::Slug.eq(data.slug.as_str()))
        .count(db)
        .await?
        > 0;

    if taken {
        let mut errors = FormErrors::default();
        errors.add("slug", "Group with this slug already exists.");
        return Ok(Err(errors));
    }

    let group = group::ActiveModel {
        title: Set(data.title),
        slug: Set(data.slug),
        description: Set(data.description),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(slug = %group.slug, "group created");

    Ok(Ok(group))
}

/// Deletes group by slug. Its posts stay, without a group.
pub async fn delete<C: ConnectionTrait>(db: &C, slug: &str) -> Result<()> {
    let result = group::Entity::delete_many()
        .filter(group::Column::Slug.eq(slug))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Group"));
    }

    tracing::info!(slug, "group deleted");

    Ok(())
}
