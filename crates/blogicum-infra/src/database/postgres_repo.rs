//! PostgreSQL repository implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, Condition, DbConn, EntityTrait, FromQueryResult, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, prelude::DateTimeWithTimeZone,
};
use uuid::Uuid;

use blogicum_core::domain::{Category, CommentSummary, Location, Post, PostSummary, User};
use blogicum_core::error::RepoError;
use blogicum_core::policy::{PostFilter, Visibility};
use blogicum_core::ports::{
    CategoryRepository, CommentRepository, LocationRepository, Page, PageRequest, PostRepository,
    UserRepository,
};

use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::location::{self, Entity as LocationEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, query_error};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

/// PostgreSQL location repository.
pub type PostgresLocationRepository = PostgresBaseRepository<LocationEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(username = %username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl LocationRepository for PostgresLocationRepository {}

/// A post row carrying its aggregated comment count.
#[derive(Debug, FromQueryResult)]
struct PostRow {
    id: Uuid,
    title: String,
    text: String,
    image: Option<String>,
    pub_date: DateTimeWithTimeZone,
    author_id: Uuid,
    location_id: Option<Uuid>,
    category_id: Option<Uuid>,
    is_published: bool,
    created_at: DateTimeWithTimeZone,
    comment_count: i64,
}

impl PostRow {
    fn into_parts(self) -> (Post, u64) {
        let post = post::Model {
            id: self.id,
            title: self.title,
            text: self.text,
            image: self.image,
            pub_date: self.pub_date,
            author_id: self.author_id,
            location_id: self.location_id,
            category_id: self.category_id,
            is_published: self.is_published,
            created_at: self.created_at,
        };
        (post.into(), self.comment_count.max(0) as u64)
    }
}

/// Posts matching `filter`. The category is left-joined so its publication
/// flag can take part in the WHERE clause.
pub(crate) fn filtered_posts(filter: &PostFilter) -> Select<PostEntity> {
    let mut query = PostEntity::find().join(JoinType::LeftJoin, post::Relation::Category.def());

    if let Some(category_id) = filter.category_id {
        query = query.filter(post::Column::CategoryId.eq(category_id));
    }
    if let Some(author_id) = filter.author_id {
        query = query.filter(post::Column::AuthorId.eq(author_id));
    }
    if let Visibility::Public { now } = filter.visibility {
        query = query.filter(
            Condition::all()
                .add(post::Column::IsPublished.eq(true))
                .add(post::Column::PubDate.lte(now))
                .add(
                    Condition::any()
                        .add(post::Column::CategoryId.is_null())
                        .add(category::Column::IsPublished.eq(true)),
                ),
        );
    }

    query
}

/// Add the per-post comment count and the listing order.
pub(crate) fn with_comment_count(query: Select<PostEntity>) -> Select<PostEntity> {
    query
        .join(JoinType::LeftJoin, post::Relation::Comment.def())
        .column_as(comment::Column::Id.count(), "comment_count")
        .group_by(post::Column::Id)
        .order_by_desc(post::Column::PubDate)
        .order_by_desc(post::Column::CreatedAt)
}

impl PostgresPostRepository {
    /// Attach authors, categories and locations to a page of rows, loading
    /// each kind in one query.
    async fn hydrate(&self, rows: Vec<PostRow>) -> Result<Vec<PostSummary>, RepoError> {
        let parts: Vec<(Post, u64)> = rows.into_iter().map(PostRow::into_parts).collect();

        let author_ids: Vec<Uuid> = parts.iter().map(|(p, _)| p.author_id).collect();
        let category_ids: Vec<Uuid> = parts.iter().filter_map(|(p, _)| p.category_id).collect();
        let location_ids: Vec<Uuid> = parts.iter().filter_map(|(p, _)| p.location_id).collect();

        let authors: HashMap<Uuid, String> = if author_ids.is_empty() {
            HashMap::new()
        } else {
            UserEntity::find()
                .filter(user::Column::Id.is_in(author_ids))
                .all(&self.db)
                .await
                .map_err(query_error)?
                .into_iter()
                .map(|u| (u.id, u.username))
                .collect()
        };

        let categories: HashMap<Uuid, Category> = if category_ids.is_empty() {
            HashMap::new()
        } else {
            CategoryEntity::find()
                .filter(category::Column::Id.is_in(category_ids))
                .all(&self.db)
                .await
                .map_err(query_error)?
                .into_iter()
                .map(|c| (c.id, c.into()))
                .collect()
        };

        let locations: HashMap<Uuid, Location> = if location_ids.is_empty() {
            HashMap::new()
        } else {
            LocationEntity::find()
                .filter(location::Column::Id.is_in(location_ids))
                .all(&self.db)
                .await
                .map_err(query_error)?
                .into_iter()
                .map(|l| (l.id, l.into()))
                .collect()
        };

        parts
            .into_iter()
            .map(|(post, comment_count)| {
                let author_username = authors
                    .get(&post.author_id)
                    .cloned()
                    .ok_or_else(|| RepoError::Query(format!("author of post {} missing", post.id)))?;
                let category = post.category_id.and_then(|id| categories.get(&id).cloned());
                let location = post.location_id.and_then(|id| locations.get(&id).cloned());

                Ok(PostSummary {
                    post,
                    author_username,
                    category,
                    location,
                    comment_count,
                })
            })
            .collect()
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_summary(&self, id: Uuid) -> Result<Option<PostSummary>, RepoError> {
        let row = with_comment_count(PostEntity::find())
            .filter(post::Column::Id.eq(id))
            .into_model::<PostRow>()
            .one(&self.db)
            .await
            .map_err(query_error)?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<Page<PostSummary>, RepoError> {
        let paginator = with_comment_count(filtered_posts(filter))
            .into_model::<PostRow>()
            .paginate(&self.db, page.size);

        let total_items = paginator.num_items().await.map_err(query_error)?;
        if page.checked_offset().is_none() {
            return Ok(Page::new(Vec::new(), page, total_items));
        }
        let rows = paginator
            .fetch_page(page.number.saturating_sub(1))
            .await
            .map_err(query_error)?;

        tracing::debug!(
            total_items,
            page = page.number,
            rows = rows.len(),
            "Listed posts"
        );

        Ok(Page::new(self.hydrate(rows).await?, page, total_items))
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentSummary>, RepoError> {
        let rows = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .find_also_related(UserEntity)
            .order_by_asc(comment::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(rows
            .into_iter()
            .map(|(comment, author)| CommentSummary {
                comment: comment.into(),
                author_username: author.map(|a| a.username).unwrap_or_default(),
            })
            .collect())
    }
}

/// Build every repository over one connection.
pub struct PostgresRepositories {
    pub users: PostgresUserRepository,
    pub categories: PostgresCategoryRepository,
    pub locations: PostgresLocationRepository,
    pub posts: PostgresPostRepository,
    pub comments: PostgresCommentRepository,
}

impl PostgresRepositories {
    pub fn new(db: DbConn) -> Self {
        Self {
            users: PostgresUserRepository::new(db.clone()),
            categories: PostgresCategoryRepository::new(db.clone()),
            locations: PostgresLocationRepository::new(db.clone()),
            posts: PostgresPostRepository::new(db.clone()),
            comments: PostgresCommentRepository::new(db),
        }
    }
}
