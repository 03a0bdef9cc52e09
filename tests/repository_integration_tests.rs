use chrono::{TimeZone, Utc};
use comment_moderation::{
    models::{Comment, User},
    repository::{PostgresRepository, Repository},
};
use sqlx::PgPool;
use tokio::test;

// These tests need a disposable Postgres database:
//   DATABASE_URL=postgres://... cargo test -- --ignored

// --- Test Context and Setup ---

/// A simple structure to hold the database pool for testing
struct DbTestContext {
    pool: PgPool,
    // Prefix for every id inserted by one test, so runs do not see each other's rows.
    prefix: String,
}

impl DbTestContext {
    async fn setup(name: &str) -> Self {
        dotenv::dotenv().ok();

        let db_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set to run integration tests");

        let pool = PgPool::connect(&db_url)
            .await
            .expect("Failed to connect to database for integration tests.");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run database migrations.");

        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        DbTestContext {
            pool,
            prefix: format!("{name}-{nanos}-"),
        }
    }

    fn repository(&self) -> PostgresRepository {
        PostgresRepository::new(self.pool.clone())
    }

    fn id(&self, local: &str) -> String {
        format!("{}{}", self.prefix, local)
    }

    fn mine<'a>(&self, ids: impl Iterator<Item = &'a String>) -> Vec<String> {
        ids.filter_map(|id| id.strip_prefix(&self.prefix).map(str::to_string))
            .collect()
    }
}

// --- Test Data Helpers ---

async fn insert_user(ctx: &DbTestContext, local: &str, roles: &[&str], verified: bool, new: bool, offset: i64) {
    let roles: Vec<String> = roles.iter().map(|r| r.to_string()).collect();
    sqlx::query(
        "INSERT INTO users (id, nickname, email, password, roles, is_verified, inscription_date, is_new) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(ctx.id(local))
    .bind(local)
    .bind(format!("{}@test.com", ctx.id(local)))
    .bind("hash")
    .bind(roles)
    .bind(verified)
    .bind(Utc.timestamp_opt(1_700_000_000 + offset, 0).unwrap())
    .bind(new)
    .execute(&ctx.pool)
    .await
    .expect("Failed to create test user");
}

async fn insert_comment(
    ctx: &DbTestContext,
    local: &str,
    parent: Option<&str>,
    published: bool,
    new: bool,
    offset: i64,
) {
    sqlx::query(
        "INSERT INTO comments (id, parent_id, user_id, nickname, content, publication_date, is_published, is_new) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(ctx.id(local))
    .bind(parent.map(|p| ctx.id(p)))
    .bind(ctx.id("author"))
    .bind("author")
    .bind(format!("text {local}"))
    .bind(Utc.timestamp_opt(1_700_000_000 + offset, 0).unwrap())
    .bind(published)
    .bind(new)
    .execute(&ctx.pool)
    .await
    .expect("Failed to create test comment");
}

async fn seed(ctx: &DbTestContext) {
    insert_user(ctx, "author", &["ROLE_USER"], true, false, 0).await;
    insert_user(ctx, "mod", &["ROLE_MODERATOR"], true, true, 5).await;
    insert_user(ctx, "fresh", &["ROLE_USER"], false, true, 10).await;

    insert_comment(ctx, "c1", None, true, true, 100).await;
    insert_comment(ctx, "c2", Some("c1"), false, true, 110).await;
    insert_comment(ctx, "c3", None, false, false, 120).await;
}

fn user_ids(ctx: &DbTestContext, users: &[User]) -> Vec<String> {
    ctx.mine(users.iter().map(|u| &u.id))
}

fn comment_ids(ctx: &DbTestContext, comments: &[Comment]) -> Vec<String> {
    ctx.mine(comments.iter().map(|c| &c.id))
}

// --- Tests ---

#[test]
#[ignore = "requires DATABASE_URL"]
async fn test_user_lookups() {
    let ctx = DbTestContext::setup("users").await;
    seed(&ctx).await;
    let repo = ctx.repository();

    let moderator = repo.get_user(&ctx.id("mod")).await.unwrap().unwrap();
    assert_eq!(moderator.roles, vec!["ROLE_MODERATOR"]);
    assert!(repo.get_user(&ctx.id("ghost")).await.unwrap().is_none());

    assert_eq!(
        user_ids(&ctx, &repo.get_users().await.unwrap()),
        vec!["author", "mod", "fresh"]
    );
    assert_eq!(
        user_ids(&ctx, &repo.get_users_by_verified(false).await.unwrap()),
        vec!["fresh"]
    );
    assert_eq!(
        user_ids(&ctx, &repo.get_new_users().await.unwrap()),
        vec!["mod", "fresh"]
    );
}

#[test]
#[ignore = "requires DATABASE_URL"]
async fn test_comment_lookups() {
    let ctx = DbTestContext::setup("comments").await;
    seed(&ctx).await;
    let repo = ctx.repository();

    let reply = repo.get_comment(&ctx.id("c2")).await.unwrap().unwrap();
    assert_eq!(reply.parent_id, Some(ctx.id("c1")));

    assert_eq!(
        comment_ids(&ctx, &repo.get_comments().await.unwrap()),
        vec!["c1", "c2", "c3"]
    );
    assert_eq!(
        comment_ids(&ctx, &repo.get_published_comments().await.unwrap()),
        vec!["c1"]
    );
    // c2 is new but is a reply.
    assert_eq!(
        comment_ids(&ctx, &repo.get_new_comments().await.unwrap()),
        vec!["c1"]
    );

    let threads = repo.get_comment_threads().await.unwrap();
    let mine: Vec<_> = threads
        .iter()
        .filter(|t| t.comment.id.starts_with(&ctx.prefix))
        .collect();
    assert_eq!(mine.len(), 2);
    assert_eq!(comment_ids(&ctx, &mine[0].replies), vec!["c2"]);
    assert!(mine[0].contain_new_reply);
}
