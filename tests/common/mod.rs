#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use comment_moderation::{
    AppConfig, AppState, InMemoryRepository, JwtService,
    auth::Claims,
    models::{Comment, User},
};
use std::sync::Arc;

// --- Shared Test Fixtures ---

pub const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";

/// Fixed timestamps keep serialized snapshots deterministic.
pub fn at(offset_secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + offset_secs, 0).unwrap()
}

pub fn user(id: &str, roles: &[&str], is_verified: bool, is_new: bool, offset: i64) -> User {
    User {
        id: id.to_string(),
        nickname: format!("{id}-nick"),
        email: format!("{id}@example.com"),
        password: format!("$2y$13$hash-of-{id}"),
        roles: roles.iter().map(|role| role.to_string()).collect(),
        is_verified,
        inscription_date: at(offset),
        is_new,
    }
}

pub fn comment(
    id: &str,
    parent_id: Option<&str>,
    is_published: bool,
    is_new: bool,
    offset: i64,
) -> Comment {
    Comment {
        id: id.to_string(),
        parent_id: parent_id.map(str::to_string),
        user_id: "u-reader".to_string(),
        nickname: "u-reader-nick".to_string(),
        content: format!("content of {id}"),
        publication_date: at(offset),
        is_published,
        is_new,
    }
}

/// u-mod: moderator. u-reader and u-fresh: baseline users. u-mixed: baseline + admin.
pub fn sample_users() -> Vec<User> {
    vec![
        user("u-mod", &["ROLE_MODERATOR"], true, false, 0),
        user("u-reader", &["ROLE_USER"], true, true, 10),
        user("u-fresh", &["ROLE_USER"], false, true, 20),
        user("u-mixed", &["ROLE_USER", "ROLE_ADMIN"], true, false, 30),
    ]
}

/// c1 and c3 are roots. c2 answers c1, c4 answers c2, c5 points at a missing parent.
pub fn sample_comments() -> Vec<Comment> {
    vec![
        comment("c1", None, true, false, 100),
        comment("c2", Some("c1"), false, true, 110),
        comment("c3", None, false, true, 120),
        comment("c4", Some("c2"), true, false, 130),
        comment("c5", Some("gone"), false, true, 140),
    ]
}

pub fn sample_repo() -> InMemoryRepository {
    InMemoryRepository::new(sample_users(), sample_comments())
}

pub fn test_config() -> AppConfig {
    AppConfig {
        jwt_secret: TEST_JWT_SECRET.to_string(),
        ..AppConfig::default()
    }
}

pub fn state_with(repo: InMemoryRepository, config: AppConfig) -> AppState {
    AppState::new(Arc::new(repo), config)
}

pub fn sample_state() -> AppState {
    state_with(sample_repo(), test_config())
}

pub fn token_for(user_id: &str) -> String {
    JwtService
        .issue(&Claims::new(user_id, 3600), TEST_JWT_SECRET)
        .unwrap()
}

/// A token whose `exp` lies `secs_ago` seconds in the past.
pub fn token_expired_since(user_id: &str, secs_ago: u64) -> String {
    let now = Utc::now().timestamp() as u64;
    let claims = Claims {
        user_id: user_id.to_string(),
        iat: now - secs_ago - 3600,
        exp: now - secs_ago,
    };
    JwtService.issue(&claims, TEST_JWT_SECRET).unwrap()
}

/// Expired an hour ago.
pub fn expired_token_for(user_id: &str) -> String {
    token_expired_since(user_id, 3600)
}

pub fn ids<T, F: Fn(&T) -> &str>(items: &[T], id: F) -> Vec<String> {
    items.iter().map(|item| id(item).to_string()).collect()
}
