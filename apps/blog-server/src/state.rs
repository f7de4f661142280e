//! Application state - shared across all handlers.

use std::sync::Arc;

use blogicum_core::policy::ListingAssembler;
use blogicum_core::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PostRepository, UserRepository,
};
use blogicum_infra::InMemoryStore;

#[cfg(feature = "postgres")]
use blogicum_infra::{DatabaseConnections, PostgresRepositories};

use crate::config::AppConfig;

/// Which store the repositories are backed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    InMemory,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub locations: Arc<dyn LocationRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub listings: ListingAssembler,
    pub store: StoreKind,
    #[cfg(feature = "postgres")]
    pub db: Option<Arc<DatabaseConnections>>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    ///
    /// Falls back to the in-memory store when no database is configured or
    /// the connection fails.
    pub async fn new(config: &AppConfig) -> Self {
        #[cfg(feature = "postgres")]
        {
            if let Some(db_config) = &config.database {
                match DatabaseConnections::init(db_config).await {
                    Ok(connections) => {
                        let state = Self::postgres(connections, config.posts_per_page);
                        tracing::info!("Application state initialized (postgres)");
                        return state;
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to connect to database: {}. Using in-memory fallback.",
                            e
                        );
                    }
                }
            } else {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            }
        }

        #[cfg(not(feature = "postgres"))]
        tracing::info!("Running without postgres feature - using in-memory store");

        let state = Self::in_memory(Arc::new(InMemoryStore::new()), config.posts_per_page);
        tracing::info!("Application state initialized (in-memory)");
        state
    }

    #[cfg(feature = "postgres")]
    fn postgres(connections: DatabaseConnections, posts_per_page: u64) -> Self {
        let repos = PostgresRepositories::new(connections.main.clone());
        let users: Arc<dyn UserRepository> = Arc::new(repos.users);
        let categories: Arc<dyn CategoryRepository> = Arc::new(repos.categories);
        let posts: Arc<dyn PostRepository> = Arc::new(repos.posts);

        Self {
            listings: ListingAssembler::new(posts.clone(), categories.clone(), users.clone())
                .with_page_size(posts_per_page),
            users,
            categories,
            locations: Arc::new(repos.locations),
            posts,
            comments: Arc::new(repos.comments),
            store: StoreKind::Postgres,
            db: Some(Arc::new(connections)),
        }
    }

    /// State backed entirely by `store`.
    pub fn in_memory(store: Arc<InMemoryStore>, posts_per_page: u64) -> Self {
        let users: Arc<dyn UserRepository> = store.clone();
        let categories: Arc<dyn CategoryRepository> = store.clone();
        let posts: Arc<dyn PostRepository> = store.clone();

        Self {
            listings: ListingAssembler::new(posts.clone(), categories.clone(), users.clone())
                .with_page_size(posts_per_page),
            users,
            categories,
            locations: store.clone(),
            posts,
            comments: store,
            store: StoreKind::InMemory,
            #[cfg(feature = "postgres")]
            db: None,
        }
    }
}
