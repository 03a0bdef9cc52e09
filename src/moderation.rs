use crate::{
    AppState,
    error::ModerationError,
    models::{Comment, CommentRecord, ModerationSnapshot, ThreadRecord, User, UserProfile},
    threads,
};

pub const SUCCESS_STATUS: &str = "Success";
pub const SUCCESS_MESSAGE: &str = "Secured data";

/// build_snapshot
///
/// Runs the moderation pipeline for one request:
/// token check, user lookup, comment lookup, policy check, then the bulk reads.
///
/// Each check short-circuits, so nothing is fetched in bulk for a rejected request.
/// The bulk reads are independent and run concurrently; the first persistence
/// failure aborts the whole snapshot.
pub async fn build_snapshot(
    state: &AppState,
    token: &str,
    comment_id: &str,
) -> Result<ModerationSnapshot, ModerationError> {
    let secret = state.config.jwt_secret.as_str();

    if !state.tokens.validate(token, secret) {
        return Err(ModerationError::InvalidToken);
    }
    let claims = state
        .tokens
        .decode(token, secret)
        .map_err(|_| ModerationError::InvalidToken)?;

    let user = state
        .repo
        .get_user(&claims.user_id)
        .await?
        .ok_or(ModerationError::UserNotFound)?;

    let comment = state
        .repo
        .get_comment(comment_id)
        .await?
        .ok_or(ModerationError::CommentNotFound)?;

    if let Err(denied) = state.policy.authorize(&user.roles) {
        tracing::warn!(user_id = %user.id, roles = ?user.roles, "moderation access denied");
        return Err(denied.into());
    }

    tracing::debug!(user_id = %user.id, comment_id = %comment.id, "loading moderation snapshot");

    let repo = &state.repo;
    let (
        all_users,
        all_comments,
        verified_users,
        unverified_users,
        new_users,
        published_comments,
        new_comments,
        comment_threads,
    ) = tokio::try_join!(
        repo.get_users(),
        repo.get_comments(),
        repo.get_users_by_verified(true),
        repo.get_users_by_verified(false),
        repo.get_new_users(),
        repo.get_published_comments(),
        repo.get_new_comments(),
        repo.get_comment_threads(),
    )?;

    let (roots, replies) = threads::partition_comments(&all_comments);

    let expose = state.config.expose_sensitive_fields;
    let user_records = |users: &[User]| {
        users.iter().map(|u| u.to_record(expose)).collect::<Vec<_>>()
    };
    let comment_records = |comments: &[&Comment]| {
        comments
            .iter()
            .map(|c| CommentRecord::from(*c))
            .collect::<Vec<_>>()
    };
    let owned_comment_records = |comments: &[Comment]| {
        comments.iter().map(CommentRecord::from).collect::<Vec<_>>()
    };

    let snapshot = ModerationSnapshot {
        status: SUCCESS_STATUS.to_string(),
        message: SUCCESS_MESSAGE.to_string(),
        user: UserProfile::new(&user, token, expose),
        all_users: user_records(&all_users),
        verified_users: user_records(&verified_users),
        unverified_users: user_records(&unverified_users),
        are_new_users: user_records(&new_users),
        are_new_comments: owned_comment_records(&new_comments),
        published_comments: owned_comment_records(&published_comments),
        comments: comment_records(&roots),
        replies: comment_records(&replies),
        comments_with_replies: comment_threads.iter().map(ThreadRecord::from).collect(),
    };

    tracing::info!(
        user_id = %user.id,
        comment_id = %comment.id,
        users = snapshot.all_users.len(),
        comments = snapshot.comments.len(),
        replies = snapshot.replies.len(),
        threads = snapshot.comments_with_replies.len(),
        "moderation snapshot served"
    );

    Ok(snapshot)
}
