//! Paginated post listings: the index, a category page, a user's profile.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::{PostFilter, Viewer};
use crate::domain::{Category, PostSummary, User};
use crate::error::DomainError;
use crate::ports::{CategoryRepository, Page, PageRequest, PostRepository, UserRepository};

/// Default number of posts per page.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Which listing to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    Index,
    Category { slug: String },
    Profile { username: String },
}

/// The entity a listing was resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingContext {
    Index,
    Category(Category),
    Profile(User),
}

/// A page of posts together with what the listing is about.
#[derive(Debug, Clone)]
pub struct PostListing {
    pub context: ListingContext,
    pub page: Page<PostSummary>,
}

/// Composes visibility filter, pagination and comment counts for listings.
#[derive(Clone)]
pub struct ListingAssembler {
    posts: Arc<dyn PostRepository>,
    categories: Arc<dyn CategoryRepository>,
    users: Arc<dyn UserRepository>,
    page_size: u64,
}

impl ListingAssembler {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        categories: Arc<dyn CategoryRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            posts,
            categories,
            users,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Build page `page_number` (1-based) of `listing` as seen by `viewer`.
    ///
    /// An unknown or unpublished category, an unknown user and a page past
    /// the last one (including one too far out to address) are all
    /// `NotFound`. Page 1 of an empty listing is an empty page.
    pub async fn assemble(
        &self,
        viewer: Viewer,
        listing: Listing,
        page_number: u64,
        now: DateTime<Utc>,
    ) -> Result<PostListing, DomainError> {
        if page_number == 0 {
            return Err(DomainError::invalid("page", "Page numbers start at 1"));
        }

        let (context, filter) = match listing {
            Listing::Index => (ListingContext::Index, PostFilter::public(now)),
            Listing::Category { slug } => {
                let category = self
                    .categories
                    .find_by_slug(&slug)
                    .await?
                    .filter(|c| c.is_published)
                    .ok_or_else(|| DomainError::not_found("Category", &slug))?;
                let filter = PostFilter::public(now).in_category(category.id);
                (ListingContext::Category(category), filter)
            }
            Listing::Profile { username } => {
                let owner = self
                    .users
                    .find_by_username(&username)
                    .await?
                    .ok_or_else(|| DomainError::not_found("User", &username))?;
                let filter = profile_filter(viewer, &owner, now);
                (ListingContext::Profile(owner), filter)
            }
        };

        let request = PageRequest::new(page_number, self.page_size);
        if request.checked_offset().is_none() {
            return Err(DomainError::not_found("Page", page_number));
        }

        let page = self.posts.list(&filter, request).await?;

        if page.number > 1 && page.number > page.total_pages {
            return Err(DomainError::not_found("Page", page_number));
        }

        Ok(PostListing { context, page })
    }
}

/// The owner of a profile sees all of their posts; everyone else only the
/// public ones.
fn profile_filter(viewer: Viewer, owner: &User, now: DateTime<Utc>) -> PostFilter {
    let filter = if viewer.is(owner.id) {
        PostFilter::unrestricted()
    } else {
        PostFilter::public(now)
    };
    filter.by_author(owner.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Post;
    use crate::error::RepoError;
    use crate::ports::BaseRepository;
    use crate::policy::Visibility;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use uuid::Uuid;

    /// Records the filter it was asked for and reports `total` matches.
    struct RecordingPosts {
        seen: Mutex<Vec<PostFilter>>,
        total: u64,
    }

    #[async_trait]
    impl BaseRepository<Post, Uuid> for RecordingPosts {
        async fn find_by_id(&self, _id: Uuid) -> Result<Option<Post>, RepoError> {
            Ok(None)
        }
        async fn insert(&self, p: Post) -> Result<Post, RepoError> {
            Ok(p)
        }
        async fn update(&self, p: Post) -> Result<Post, RepoError> {
            Ok(p)
        }
        async fn delete(&self, _id: Uuid) -> Result<(), RepoError> {
            Ok(())
        }
    }

    #[async_trait]
    impl PostRepository for RecordingPosts {
        async fn find_summary(&self, _id: Uuid) -> Result<Option<PostSummary>, RepoError> {
            Ok(None)
        }
        async fn list(
            &self,
            filter: &PostFilter,
            page: PageRequest,
        ) -> Result<Page<PostSummary>, RepoError> {
            self.seen.lock().unwrap().push(filter.clone());
            Ok(Page::new(vec![], page, self.total))
        }
    }

    struct FixedCategories(Vec<Category>);

    #[async_trait]
    impl BaseRepository<Category, Uuid> for FixedCategories {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
            Ok(self.0.iter().find(|c| c.id == id).cloned())
        }
        async fn insert(&self, c: Category) -> Result<Category, RepoError> {
            Ok(c)
        }
        async fn update(&self, c: Category) -> Result<Category, RepoError> {
            Ok(c)
        }
        async fn delete(&self, _id: Uuid) -> Result<(), RepoError> {
            Ok(())
        }
    }

    #[async_trait]
    impl CategoryRepository for FixedCategories {
        async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
            Ok(self.0.iter().find(|c| c.slug == slug).cloned())
        }
    }

    struct FixedUsers(Vec<User>);

    #[async_trait]
    impl BaseRepository<User, Uuid> for FixedUsers {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
            Ok(self.0.iter().find(|u| u.id == id).cloned())
        }
        async fn insert(&self, u: User) -> Result<User, RepoError> {
            Ok(u)
        }
        async fn update(&self, u: User) -> Result<User, RepoError> {
            Ok(u)
        }
        async fn delete(&self, _id: Uuid) -> Result<(), RepoError> {
            Ok(())
        }
    }

    #[async_trait]
    impl UserRepository for FixedUsers {
        async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
            Ok(self.0.iter().find(|u| u.username == username).cloned())
        }
    }

    struct Fixture {
        posts: Arc<RecordingPosts>,
        assembler: ListingAssembler,
        author: User,
        hidden: Category,
    }

    fn fixture(total: u64) -> Fixture {
        let posts = Arc::new(RecordingPosts {
            seen: Mutex::new(Vec::new()),
            total,
        });
        let travel = Category::new("Travel".into(), String::new(), "travel".into());
        let mut hidden = Category::new("Drafts".into(), String::new(), "drafts".into());
        hidden.is_published = false;
        let author = User::new("leo".into(), "leo@example.com".into(), "hash".into());

        let assembler = ListingAssembler::new(
            posts.clone(),
            Arc::new(FixedCategories(vec![travel, hidden.clone()])),
            Arc::new(FixedUsers(vec![author.clone()])),
        );

        Fixture {
            posts,
            assembler,
            author,
            hidden,
        }
    }

    fn last_filter(posts: &RecordingPosts) -> PostFilter {
        posts.seen.lock().unwrap().last().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_index_uses_public_filter() {
        let f = fixture(0);
        let now = Utc::now();

        let listing = f
            .assembler
            .assemble(Viewer::Anonymous, Listing::Index, 1, now)
            .await
            .unwrap();

        assert_eq!(listing.context, ListingContext::Index);
        assert_eq!(last_filter(&f.posts), PostFilter::public(now));
        assert_eq!(listing.page.size, DEFAULT_PAGE_SIZE);
    }

    #[tokio::test]
    async fn test_category_listing_restricts_to_category() {
        let f = fixture(3);
        let now = Utc::now();

        let listing = f
            .assembler
            .assemble(
                Viewer::Anonymous,
                Listing::Category {
                    slug: "travel".into(),
                },
                1,
                now,
            )
            .await
            .unwrap();

        let ListingContext::Category(category) = listing.context else {
            panic!("expected category context");
        };
        assert_eq!(
            last_filter(&f.posts),
            PostFilter::public(now).in_category(category.id)
        );
    }

    #[tokio::test]
    async fn test_unaddressable_page_is_not_found() {
        let f = fixture(25);

        let result = f
            .assembler
            .assemble(Viewer::Anonymous, Listing::Index, u64::MAX, Utc::now())
            .await;

        assert!(matches!(
            result,
            Err(DomainError::NotFound {
                entity_type: "Page",
                ..
            })
        ));
        assert!(f.posts.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unpublished_or_unknown_category_is_not_found() {
        let f = fixture(0);

        for slug in [f.hidden.slug.clone(), "missing".to_string()] {
            let result = f
                .assembler
                .assemble(Viewer::Anonymous, Listing::Category { slug }, 1, Utc::now())
                .await;
            assert!(matches!(result, Err(DomainError::NotFound { .. })));
        }
        assert!(f.posts.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_profile_owner_sees_everything() {
        let f = fixture(0);
        let now = Utc::now();
        let listing = Listing::Profile {
            username: "leo".into(),
        };

        f.assembler
            .assemble(Viewer::User(f.author.id), listing.clone(), 1, now)
            .await
            .unwrap();
        assert_eq!(last_filter(&f.posts).visibility, Visibility::Unrestricted);
        assert_eq!(last_filter(&f.posts).author_id, Some(f.author.id));

        f.assembler
            .assemble(Viewer::User(Uuid::new_v4()), listing.clone(), 1, now)
            .await
            .unwrap();
        assert_eq!(last_filter(&f.posts), PostFilter::public(now).by_author(f.author.id));

        f.assembler
            .assemble(Viewer::Anonymous, listing, 1, now)
            .await
            .unwrap();
        assert_eq!(last_filter(&f.posts), PostFilter::public(now).by_author(f.author.id));
    }

    #[tokio::test]
    async fn test_unknown_profile_is_not_found() {
        let f = fixture(0);

        let result = f
            .assembler
            .assemble(
                Viewer::Anonymous,
                Listing::Profile {
                    username: "nobody".into(),
                },
                1,
                Utc::now(),
            )
            .await;

        assert!(matches!(result, Err(DomainError::NotFound { entity_type: "User", .. })));
    }

    #[tokio::test]
    async fn test_page_bounds() {
        let f = fixture(25);
        let assembler = f.assembler.clone();

        assert!(matches!(
            assembler.assemble(Viewer::Anonymous, Listing::Index, 0, Utc::now()).await,
            Err(DomainError::Validation(_))
        ));
        assert!(assembler.assemble(Viewer::Anonymous, Listing::Index, 3, Utc::now()).await.is_ok());
        assert!(matches!(
            assembler.assemble(Viewer::Anonymous, Listing::Index, 4, Utc::now()).await,
            Err(DomainError::NotFound { entity_type: "Page", .. })
        ));
    }

    #[tokio::test]
    async fn test_custom_page_size() {
        let f = fixture(0);
        let assembler = f.assembler.with_page_size(5);

        let listing = assembler
            .assemble(Viewer::Anonymous, Listing::Index, 1, Utc::now())
            .await
            .unwrap();

        assert_eq!(listing.page.size, 5);
    }
}
