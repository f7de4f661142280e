//! In-memory implementation of every repository port.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use blogicum_core::domain::{Category, Comment, CommentSummary, Location, Post, PostSummary, User};
use blogicum_core::error::RepoError;
use blogicum_core::policy::PostFilter;
use blogicum_core::ports::{
    BaseRepository, CategoryRepository, CommentRepository, LocationRepository, Page, PageRequest,
    PostRepository, UserRepository,
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    categories: HashMap<Uuid, Category>,
    locations: HashMap<Uuid, Location>,
    posts: HashMap<Uuid, Post>,
    comments: HashMap<Uuid, Comment>,
}

impl Tables {
    fn summarize(&self, post: &Post) -> PostSummary {
        PostSummary {
            post: post.clone(),
            author_username: self
                .users
                .get(&post.author_id)
                .map(|u| u.username.clone())
                .unwrap_or_default(),
            category: post
                .category_id
                .and_then(|id| self.categories.get(&id).cloned()),
            location: post
                .location_id
                .and_then(|id| self.locations.get(&id).cloned()),
            comment_count: self
                .comments
                .values()
                .filter(|c| c.post_id == post.id)
                .count() as u64,
        }
    }

    /// Reject posts whose references do not exist.
    fn check_post_references(&self, post: &Post) -> Result<(), RepoError> {
        if !self.users.contains_key(&post.author_id) {
            return Err(RepoError::Constraint("post author does not exist".to_string()));
        }
        if post
            .category_id
            .is_some_and(|id| !self.categories.contains_key(&id))
        {
            return Err(RepoError::Constraint("post category does not exist".to_string()));
        }
        if post
            .location_id
            .is_some_and(|id| !self.locations.contains_key(&id))
        {
            return Err(RepoError::Constraint("post location does not exist".to_string()));
        }
        Ok(())
    }

    fn check_comment_references(&self, comment: &Comment) -> Result<(), RepoError> {
        if !self.posts.contains_key(&comment.post_id) {
            return Err(RepoError::Constraint("comment post does not exist".to_string()));
        }
        if !self.users.contains_key(&comment.author_id) {
            return Err(RepoError::Constraint("comment author does not exist".to_string()));
        }
        Ok(())
    }

    fn username_taken(&self, user: &User) -> bool {
        self.users
            .values()
            .any(|u| u.id != user.id && u.username == user.username)
    }

    fn slug_taken(&self, category: &Category) -> bool {
        self.categories
            .values()
            .any(|c| c.id != category.id && c.slug == category.slug)
    }

    fn delete_post_cascade(&mut self, post_id: Uuid) {
        self.posts.remove(&post_id);
        self.comments.retain(|_, c| c.post_id != post_id);
    }
}

/// Repository store backed by hash maps behind an async RwLock.
///
/// Enforces the same uniqueness and reference rules as the relational
/// schema: deleting a user or post cascades, deleting a category or location
/// clears the reference on its posts. Data is lost on process restart.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.users.contains_key(&user.id) || tables.username_taken(&user) {
            return Err(RepoError::Constraint("username already exists".to_string()));
        }
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user.id) {
            return Err(RepoError::NotFound);
        }
        if tables.username_taken(&user) {
            return Err(RepoError::Constraint("username already exists".to_string()));
        }
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        let owned: Vec<Uuid> = tables
            .posts
            .values()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in owned {
            tables.delete_post_cascade(post_id);
        }
        tables.comments.retain(|_, c| c.author_id != id);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

fn check_slug(category: &Category) -> Result<(), RepoError> {
    if Category::is_valid_slug(&category.slug) {
        Ok(())
    } else {
        Err(RepoError::Constraint(format!("invalid slug {:?}", category.slug)))
    }
}

#[async_trait]
impl BaseRepository<Category, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        Ok(self.tables.read().await.categories.get(&id).cloned())
    }

    async fn insert(&self, category: Category) -> Result<Category, RepoError> {
        check_slug(&category)?;
        let mut tables = self.tables.write().await;
        if tables.categories.contains_key(&category.id) || tables.slug_taken(&category) {
            return Err(RepoError::Constraint("slug already exists".to_string()));
        }
        tables.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn update(&self, category: Category) -> Result<Category, RepoError> {
        check_slug(&category)?;
        let mut tables = self.tables.write().await;
        if !tables.categories.contains_key(&category.id) {
            return Err(RepoError::NotFound);
        }
        if tables.slug_taken(&category) {
            return Err(RepoError::Constraint("slug already exists".to_string()));
        }
        tables.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if tables.categories.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        for post in tables.posts.values_mut() {
            if post.category_id == Some(id) {
                post.category_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .values()
            .find(|c| c.slug == slug)
            .cloned())
    }
}

#[async_trait]
impl BaseRepository<Location, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Location>, RepoError> {
        Ok(self.tables.read().await.locations.get(&id).cloned())
    }

    async fn insert(&self, location: Location) -> Result<Location, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.locations.contains_key(&location.id) {
            return Err(RepoError::Constraint("location already exists".to_string()));
        }
        tables.locations.insert(location.id, location.clone());
        Ok(location)
    }

    async fn update(&self, location: Location) -> Result<Location, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.locations.contains_key(&location.id) {
            return Err(RepoError::NotFound);
        }
        tables.locations.insert(location.id, location.clone());
        Ok(location)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if tables.locations.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        for post in tables.posts.values_mut() {
            if post.location_id == Some(id) {
                post.location_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl LocationRepository for InMemoryStore {}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.posts.contains_key(&post.id) {
            return Err(RepoError::Constraint("post already exists".to_string()));
        }
        tables.check_post_references(&post)?;
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&post.id) {
            return Err(RepoError::NotFound);
        }
        tables.check_post_references(&post)?;
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&id) {
            return Err(RepoError::NotFound);
        }
        tables.delete_post_cascade(id);
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn find_summary(&self, id: Uuid) -> Result<Option<PostSummary>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.get(&id).map(|p| tables.summarize(p)))
    }

    async fn list(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<Page<PostSummary>, RepoError> {
        let tables = self.tables.read().await;

        let mut matching: Vec<&Post> = tables
            .posts
            .values()
            .filter(|p| {
                let category = p.category_id.and_then(|id| tables.categories.get(&id));
                filter.matches(p, category)
            })
            .collect();
        matching.sort_by(|a, b| {
            b.pub_date
                .cmp(&a.pub_date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });

        let total_items = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.size as usize)
            .map(|p| tables.summarize(p))
            .collect();

        Ok(Page::new(items, page, total_items))
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        Ok(self.tables.read().await.comments.get(&id).cloned())
    }

    async fn insert(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.comments.contains_key(&comment.id) {
            return Err(RepoError::Constraint("comment already exists".to_string()));
        }
        tables.check_comment_references(&comment)?;
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn update(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.comments.contains_key(&comment.id) {
            return Err(RepoError::NotFound);
        }
        tables.check_comment_references(&comment)?;
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables
            .comments
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentSummary>, RepoError> {
        let tables = self.tables.read().await;

        let mut comments: Vec<&Comment> = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .collect();
        comments.sort_by_key(|c| c.created_at);

        Ok(comments
            .into_iter()
            .map(|c| CommentSummary {
                comment: c.clone(),
                author_username: tables
                    .users
                    .get(&c.author_id)
                    .map(|u| u.username.clone())
                    .unwrap_or_default(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blogicum_core::domain::PostDraft;
    use chrono::{DateTime, TimeDelta, Utc};

    fn draft(pub_date: DateTime<Utc>, category_id: Option<Uuid>) -> PostDraft {
        PostDraft {
            title: "Title".to_string(),
            text: "Text".to_string(),
            image: None,
            pub_date,
            location_id: None,
            category_id,
            is_published: true,
        }
    }

    async fn user(store: &InMemoryStore, username: &str) -> User {
        let user = User::new(username.into(), format!("{username}@example.com"), "hash".into());
        BaseRepository::<User, Uuid>::insert(store, user).await.unwrap()
    }

    async fn post(store: &InMemoryStore, author: &User, draft: PostDraft) -> Post {
        BaseRepository::<Post, Uuid>::insert(store, Post::new(author.id, draft))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_duplicate_username_is_rejected() {
        let store = InMemoryStore::new();
        user(&store, "anna").await;

        let dup = User::new("anna".into(), "other@example.com".into(), "hash".into());
        let result = BaseRepository::<User, Uuid>::insert(&store, dup).await;

        assert!(matches!(result, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_category_slug_must_be_url_safe() {
        let store = InMemoryStore::new();

        let bad = Category::new("Путешествия".into(), String::new(), "путешествия".into());
        let result = BaseRepository::<Category, Uuid>::insert(&store, bad).await;
        assert!(matches!(result, Err(RepoError::Constraint(_))));

        let good = Category::new("Travel".into(), String::new(), "travel".into());
        let mut good = BaseRepository::<Category, Uuid>::insert(&store, good)
            .await
            .unwrap();
        good.slug = "travel notes".into();
        let result = BaseRepository::<Category, Uuid>::update(&store, good).await;
        assert!(matches!(result, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_list_past_addressable_offset_is_empty() {
        let store = InMemoryStore::new();
        let author = user(&store, "anna").await;
        post(&store, &author, draft(Utc::now() - TimeDelta::hours(1), None)).await;

        let page = store
            .list(&PostFilter::public(Utc::now()), PageRequest::new(u64::MAX, 10))
            .await
            .unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.total_items, 1);
    }

    #[tokio::test]
    async fn test_post_requires_existing_references() {
        let store = InMemoryStore::new();
        let author = user(&store, "anna").await;

        let orphan = Post::new(author.id, draft(Utc::now(), Some(Uuid::new_v4())));
        let result = BaseRepository::<Post, Uuid>::insert(&store, orphan).await;

        assert!(matches!(result, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_list_orders_by_pub_date_desc_and_counts_comments() {
        let store = InMemoryStore::new();
        let author = user(&store, "anna").await;
        let now = Utc::now();

        let older = post(&store, &author, draft(now - TimeDelta::days(2), None)).await;
        let newer = post(&store, &author, draft(now - TimeDelta::days(1), None)).await;
        for text in ["first", "second"] {
            let comment = Comment::new(older.id, author.id, text.into());
            BaseRepository::<Comment, Uuid>::insert(&store, comment)
                .await
                .unwrap();
        }

        let page = store
            .list(&PostFilter::public(now), PageRequest::new(1, 10))
            .await
            .unwrap();

        let ids: Vec<Uuid> = page.items.iter().map(|s| s.post.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
        assert_eq!(page.items[0].comment_count, 0);
        assert_eq!(page.items[1].comment_count, 2);
        assert_eq!(page.items[1].author_username, "anna");
    }

    #[tokio::test]
    async fn test_list_applies_visibility_filter() {
        let store = InMemoryStore::new();
        let author = user(&store, "anna").await;
        let now = Utc::now();

        let mut hidden = Category::new("Hidden".into(), String::new(), "hidden".into());
        hidden.is_published = false;
        let hidden = BaseRepository::<Category, Uuid>::insert(&store, hidden)
            .await
            .unwrap();

        let visible = post(&store, &author, draft(now - TimeDelta::hours(1), None)).await;
        post(&store, &author, draft(now + TimeDelta::days(1), None)).await;
        post(&store, &author, draft(now - TimeDelta::hours(1), Some(hidden.id))).await;
        let mut unpublished = draft(now - TimeDelta::hours(1), None);
        unpublished.is_published = false;
        post(&store, &author, unpublished).await;

        let public = store
            .list(&PostFilter::public(now), PageRequest::new(1, 10))
            .await
            .unwrap();
        assert_eq!(public.total_items, 1);
        assert_eq!(public.items[0].post.id, visible.id);

        let all = store
            .list(
                &PostFilter::unrestricted().by_author(author.id),
                PageRequest::new(1, 10),
            )
            .await
            .unwrap();
        assert_eq!(all.total_items, 4);
    }

    #[tokio::test]
    async fn test_list_paginates() {
        let store = InMemoryStore::new();
        let author = user(&store, "anna").await;
        let now = Utc::now();
        for i in 0..12 {
            post(&store, &author, draft(now - TimeDelta::minutes(i + 1), None)).await;
        }

        let second = store
            .list(&PostFilter::public(now), PageRequest::new(2, 10))
            .await
            .unwrap();

        assert_eq!(second.items.len(), 2);
        assert_eq!(second.total_items, 12);
        assert_eq!(second.total_pages, 2);
    }

    #[tokio::test]
    async fn test_deleting_user_cascades() {
        let store = InMemoryStore::new();
        let author = user(&store, "anna").await;
        let reader = user(&store, "boris").await;
        let p = post(&store, &author, draft(Utc::now(), None)).await;
        let on_own = Comment::new(p.id, reader.id, "hi".into());
        BaseRepository::<Comment, Uuid>::insert(&store, on_own.clone())
            .await
            .unwrap();

        BaseRepository::<User, Uuid>::delete(&store, author.id)
            .await
            .unwrap();

        assert!(BaseRepository::<Post, Uuid>::find_by_id(&store, p.id).await.unwrap().is_none());
        assert!(BaseRepository::<Comment, Uuid>::find_by_id(&store, on_own.id).await.unwrap().is_none());
        assert!(BaseRepository::<User, Uuid>::find_by_id(&store, reader.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_deleting_category_keeps_posts() {
        let store = InMemoryStore::new();
        let author = user(&store, "anna").await;
        let category = Category::new("Travel".into(), String::new(), "travel".into());
        let category = BaseRepository::<Category, Uuid>::insert(&store, category)
            .await
            .unwrap();
        let location = BaseRepository::<Location, Uuid>::insert(&store, Location::new("Moscow".into()))
            .await
            .unwrap();
        let mut d = draft(Utc::now(), Some(category.id));
        d.location_id = Some(location.id);
        let p = post(&store, &author, d).await;

        BaseRepository::<Category, Uuid>::delete(&store, category.id)
            .await
            .unwrap();
        BaseRepository::<Location, Uuid>::delete(&store, location.id)
            .await
            .unwrap();

        let kept = BaseRepository::<Post, Uuid>::find_by_id(&store, p.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(kept.category_id, None);
        assert_eq!(kept.location_id, None);
    }

    #[tokio::test]
    async fn test_comments_listed_oldest_first() {
        let store = InMemoryStore::new();
        let author = user(&store, "anna").await;
        let p = post(&store, &author, draft(Utc::now(), None)).await;

        let mut first = Comment::new(p.id, author.id, "first".into());
        first.created_at = Utc::now() - TimeDelta::minutes(5);
        let second = Comment::new(p.id, author.id, "second".into());
        BaseRepository::<Comment, Uuid>::insert(&store, second).await.unwrap();
        BaseRepository::<Comment, Uuid>::insert(&store, first).await.unwrap();

        let texts: Vec<String> = store
            .list_for_post(p.id)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.comment.text)
            .collect();

        assert_eq!(texts, vec!["first", "second"]);
    }
}
