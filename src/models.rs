use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;

// --- Stored Entities (Mapped to Database) ---

/// User
///
/// A registered account from the `users` table. Only read by this service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, Default)]
pub struct User {
    pub id: String,
    pub nickname: String,
    pub email: String,
    // Password hash, never the clear text.
    pub password: String,
    // Role labels such as "ROLE_USER" or "ROLE_MODERATOR".
    pub roles: Vec<String>,
    pub is_verified: bool,
    pub inscription_date: DateTime<Utc>,
    // Set until a moderator has looked at the account.
    pub is_new: bool,
}

/// Comment
///
/// A row from the `comments` table. A null `parent_id` marks a thread root,
/// anything else is a reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, Default)]
pub struct Comment {
    pub id: String,
    pub parent_id: Option<String>,
    // Author reference and display name at posting time.
    pub user_id: String,
    pub nickname: String,
    pub content: String,
    pub publication_date: DateTime<Utc>,
    pub is_published: bool,
    pub is_new: bool,
}

impl Comment {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// CommentThread
///
/// A root comment with its replies in publication order. Built by
/// `threads::group_threads`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommentThread {
    pub comment: Comment,
    pub replies: Vec<Comment>,
    // True when at least one reply is still flagged as new.
    pub contain_new_reply: bool,
}

// --- Wire Records (Output Schemas) ---

/// UserRecord
///
/// Flattened user as it appears in the snapshot collections. The key names are
/// consumed as-is by the moderation front-end, hence the mixed casing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UserRecord {
    pub id: String,
    pub nickname: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub password: Option<String>,
    pub roles: Vec<String>,
    pub is_verified: bool,
    #[serde(rename = "inscriptionDate")]
    #[ts(type = "string")]
    pub inscription_date: DateTime<Utc>,
    pub is_new: bool,
}

impl User {
    /// Shapes the user for output. The password hash is only carried when
    /// `expose_sensitive` is set.
    pub fn to_record(&self, expose_sensitive: bool) -> UserRecord {
        UserRecord {
            id: self.id.clone(),
            nickname: self.nickname.clone(),
            email: self.email.clone(),
            password: expose_sensitive.then(|| self.password.clone()),
            roles: self.roles.clone(),
            is_verified: self.is_verified,
            inscription_date: self.inscription_date,
            is_new: self.is_new,
        }
    }
}

/// CommentRecord
///
/// Flattened comment as it appears in the snapshot collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CommentRecord {
    pub id: String,
    pub parent_id: Option<String>,
    pub user_id: String,
    pub nickname: String,
    pub content: String,
    #[serde(rename = "publicationDate")]
    #[ts(type = "string")]
    pub publication_date: DateTime<Utc>,
    pub is_published: bool,
    pub is_new: bool,
}

impl From<&Comment> for CommentRecord {
    fn from(comment: &Comment) -> Self {
        CommentRecord {
            id: comment.id.clone(),
            parent_id: comment.parent_id.clone(),
            user_id: comment.user_id.clone(),
            nickname: comment.nickname.clone(),
            content: comment.content.clone(),
            publication_date: comment.publication_date,
            is_published: comment.is_published,
            is_new: comment.is_new,
        }
    }
}

/// ThreadRecord
///
/// One entry of `commentsWithReplies`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ThreadRecord {
    pub comment: CommentRecord,
    pub replies: Vec<CommentRecord>,
    #[serde(rename = "containNewReply")]
    pub contain_new_reply: bool,
}

impl From<&CommentThread> for ThreadRecord {
    fn from(thread: &CommentThread) -> Self {
        ThreadRecord {
            comment: CommentRecord::from(&thread.comment),
            replies: thread.replies.iter().map(CommentRecord::from).collect(),
            contain_new_reply: thread.contain_new_reply,
        }
    }
}

/// UserProfile
///
/// The requesting moderator's own profile, echoed back with the bearer token.
/// `token` and `password` are omitted when sensitive fields are disabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub token: Option<String>,
    pub id: String,
    pub nickname: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub password: Option<String>,
    pub roles: Vec<String>,
    pub is_verified: bool,
    #[serde(rename = "inscriptionDate")]
    #[ts(type = "string")]
    pub inscription_date: DateTime<Utc>,
    pub is_new: bool,
}

impl UserProfile {
    pub fn new(user: &User, token: &str, expose_sensitive: bool) -> Self {
        UserProfile {
            token: expose_sensitive.then(|| token.to_string()),
            id: user.id.clone(),
            nickname: user.nickname.clone(),
            email: user.email.clone(),
            password: expose_sensitive.then(|| user.password.clone()),
            roles: user.roles.clone(),
            is_verified: user.is_verified,
            inscription_date: user.inscription_date,
            is_new: user.is_new,
        }
    }
}

/// ModerationSnapshot
///
/// Success payload of `GET /adm/moderate_new_specific_comment/{commentId}`.
/// Field order is the serialization order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ModerationSnapshot {
    /// Always "Success".
    pub status: String,
    /// Always "Secured data".
    pub message: String,
    pub user: UserProfile,
    pub all_users: Vec<UserRecord>,
    pub verified_users: Vec<UserRecord>,
    pub unverified_users: Vec<UserRecord>,
    pub are_new_users: Vec<UserRecord>,
    /// New comments that are thread roots.
    pub are_new_comments: Vec<CommentRecord>,
    pub published_comments: Vec<CommentRecord>,
    /// Every thread root.
    pub comments: Vec<CommentRecord>,
    /// Every reply.
    pub replies: Vec<CommentRecord>,
    pub comments_with_replies: Vec<ThreadRecord>,
}

/// ErrorEnvelope
///
/// Body returned for every application error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ErrorEnvelope {
    pub operation: String,
    /// Always "Error, stopped".
    pub status: String,
    pub message: String,
}
