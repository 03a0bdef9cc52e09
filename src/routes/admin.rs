use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Admin Router Module
///
/// Routes of the moderation panel, nested under `/adm`.
///
/// Access Control:
/// No middleware here. Each handler validates the bearer token and applies the
/// configured `AccessPolicy` itself, because rejections must be rendered as the
/// JSON error envelope rather than a bare status code.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /adm/moderate_new_specific_comment/{commentId}
        // Snapshot of users, comments and threads for moderating one new comment.
        .route(
            "/moderate_new_specific_comment/{commentId}",
            get(handlers::moderate_new_specific_comment),
        )
}
