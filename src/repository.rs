use crate::{
    models::{Comment, CommentThread, User},
    threads,
};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

/// RepositoryError
///
/// Persistence faults. These are never retried; the request that hit them fails.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Repository Trait
///
/// Read-only contract over users and comments. Handlers only see this trait, so the
/// Postgres implementation and the in-memory one are interchangeable.
///
/// Collections come back in a stable order: users by inscription date, comments by
/// publication date, ties broken by id.
///
/// **Send + Sync + async_trait** are required to share `Arc<dyn Repository>` across
/// Axum's task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn get_user(&self, id: &str) -> RepositoryResult<Option<User>>;
    async fn get_users(&self) -> RepositoryResult<Vec<User>>;
    async fn get_users_by_verified(&self, is_verified: bool) -> RepositoryResult<Vec<User>>;
    async fn get_new_users(&self) -> RepositoryResult<Vec<User>>;

    // --- Comments ---
    async fn get_comment(&self, id: &str) -> RepositoryResult<Option<Comment>>;
    // Roots and replies together.
    async fn get_comments(&self) -> RepositoryResult<Vec<Comment>>;
    async fn get_published_comments(&self) -> RepositoryResult<Vec<Comment>>;
    // Only thread roots still flagged as new.
    async fn get_new_comments(&self) -> RepositoryResult<Vec<Comment>>;

    /// get_comment_threads
    ///
    /// Every root with its replies and the "contains an unseen reply" flag.
    async fn get_comment_threads(&self) -> RepositoryResult<Vec<CommentThread>> {
        let comments = self.get_comments().await?;
        Ok(threads::group_threads(&comments))
    }
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

const USER_COLUMNS: &str =
    "id, nickname, email, password, roles, is_verified, inscription_date, is_new";
const COMMENT_COLUMNS: &str =
    "id, parent_id, user_id, nickname, content, publication_date, is_published, is_new";
const USER_ORDER: &str = "ORDER BY inscription_date ASC, id ASC";
const COMMENT_ORDER: &str = "ORDER BY publication_date ASC, id ASC";

/// PostgresRepository
///
/// The `Repository` backed by PostgreSQL. Queries are checked at runtime so the
/// crate builds without a live database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn get_user(&self, id: &str) -> RepositoryResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn get_users(&self) -> RepositoryResult<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users {USER_ORDER}");
        let users = sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?;
        Ok(users)
    }

    async fn get_users_by_verified(&self, is_verified: bool) -> RepositoryResult<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE is_verified = $1 {USER_ORDER}");
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(is_verified)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn get_new_users(&self) -> RepositoryResult<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE is_new = true {USER_ORDER}");
        let users = sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?;
        Ok(users)
    }

    async fn get_comment(&self, id: &str) -> RepositoryResult<Option<Comment>> {
        let sql = format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1");
        let comment = sqlx::query_as::<_, Comment>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(comment)
    }

    async fn get_comments(&self) -> RepositoryResult<Vec<Comment>> {
        let sql = format!("SELECT {COMMENT_COLUMNS} FROM comments {COMMENT_ORDER}");
        let comments = sqlx::query_as::<_, Comment>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(comments)
    }

    async fn get_published_comments(&self) -> RepositoryResult<Vec<Comment>> {
        let sql =
            format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE is_published = true {COMMENT_ORDER}");
        let comments = sqlx::query_as::<_, Comment>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(comments)
    }

    async fn get_new_comments(&self) -> RepositoryResult<Vec<Comment>> {
        let sql = format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE is_new = true AND parent_id IS NULL {COMMENT_ORDER}"
        );
        let comments = sqlx::query_as::<_, Comment>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(comments)
    }
}

/// InMemoryRepository
///
/// A `Repository` over plain vectors, used by the test suites and for wiring the
/// router without a database. Collections are returned in insertion order.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    users: Vec<User>,
    comments: Vec<Comment>,
    /// When true, every call returns `RepositoryError::Unavailable`.
    pub should_fail: bool,
    /// When true, only the collection reads fail; single-row lookups still succeed.
    pub fail_collections: bool,
}

impl InMemoryRepository {
    pub fn new(users: Vec<User>, comments: Vec<Comment>) -> Self {
        Self {
            users,
            comments,
            should_fail: false,
            fail_collections: false,
        }
    }

    /// Serves `get_user` and `get_comment` but fails every collection read.
    pub fn new_failing_collections(users: Vec<User>, comments: Vec<Comment>) -> Self {
        Self {
            fail_collections: true,
            ..Self::new(users, comments)
        }
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    fn check(&self) -> RepositoryResult<()> {
        if self.should_fail {
            return Err(RepositoryError::Unavailable(
                "simulated store outage".to_string(),
            ));
        }
        Ok(())
    }

    fn check_collections(&self) -> RepositoryResult<()> {
        self.check()?;
        if self.fail_collections {
            return Err(RepositoryError::Unavailable(
                "simulated collection read failure".to_string(),
            ));
        }
        Ok(())
    }

    fn users_where(&self, keep: impl Fn(&User) -> bool) -> RepositoryResult<Vec<User>> {
        self.check_collections()?;
        Ok(self.users.iter().filter(|user| keep(user)).cloned().collect())
    }

    fn comments_where(&self, keep: impl Fn(&Comment) -> bool) -> RepositoryResult<Vec<Comment>> {
        self.check_collections()?;
        Ok(self
            .comments
            .iter()
            .filter(|comment| keep(comment))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn get_user(&self, id: &str) -> RepositoryResult<Option<User>> {
        self.check()?;
        Ok(self.users.iter().find(|user| user.id == id).cloned())
    }

    async fn get_users(&self) -> RepositoryResult<Vec<User>> {
        self.users_where(|_| true)
    }

    async fn get_users_by_verified(&self, is_verified: bool) -> RepositoryResult<Vec<User>> {
        self.users_where(|user| user.is_verified == is_verified)
    }

    async fn get_new_users(&self) -> RepositoryResult<Vec<User>> {
        self.users_where(|user| user.is_new)
    }

    async fn get_comment(&self, id: &str) -> RepositoryResult<Option<Comment>> {
        self.check()?;
        Ok(self.comments.iter().find(|comment| comment.id == id).cloned())
    }

    async fn get_comments(&self) -> RepositoryResult<Vec<Comment>> {
        self.comments_where(|_| true)
    }

    async fn get_published_comments(&self) -> RepositoryResult<Vec<Comment>> {
        self.comments_where(|comment| comment.is_published)
    }

    async fn get_new_comments(&self) -> RepositoryResult<Vec<Comment>> {
        self.comments_where(|comment| comment.is_new && comment.is_root())
    }
}
