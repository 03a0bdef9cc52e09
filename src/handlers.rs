use crate::{
    AppState,
    auth::BearerToken,
    error::ApiError,
    models::{ErrorEnvelope, ModerationSnapshot},
    moderation,
};
use axum::{
    Json,
    extract::{Path, State},
};

/// moderate_new_specific_comment
///
/// [Admin Route] Returns the moderation snapshot used by the "moderate a new comment"
/// screen: the requesting moderator's profile plus every user and comment collection
/// the screen needs.
///
/// *Errors*: token, user, comment and role failures come back as an `ErrorEnvelope`.
/// In the default legacy mode they use HTTP 200, as the front-end expects.
#[utoipa::path(
    get,
    path = "/adm/moderate_new_specific_comment/{commentId}",
    params(("commentId" = String, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Moderation snapshot", body = ModerationSnapshot),
        (status = 401, description = "Invalid token or unknown user (http status mode)", body = ErrorEnvelope),
        (status = 403, description = "Role check failed (http status mode)", body = ErrorEnvelope),
        (status = 404, description = "Comment not found (http status mode)", body = ErrorEnvelope),
        (status = 500, description = "Persistence failure", body = ErrorEnvelope)
    )
)]
pub async fn moderate_new_specific_comment(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Path(comment_id): Path<String>,
) -> Result<Json<ModerationSnapshot>, ApiError> {
    moderation::build_snapshot(&state, &token, &comment_id)
        .await
        .map(Json)
        .map_err(|error| ApiError::new(error, state.config.error_status))
}
