//! Like/dislike toggling on posts and comments

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::Redirect,
    routing::get,
    Router,
};
use quire_core::{TargetKind, VoteAction};

use crate::db::{ReactionRepo, Target};
use crate::http::error::AppError;
use crate::http::extractors::SignedIn;
use crate::http::server::AppState;

/// GET /vote/{obj_type}/{obj_id}/{action}
///
/// Unknown object types and missing targets are 404. An unknown action
/// changes nothing. Every outcome lands back on the home page.
async fn add_vote(
    State(state): State<Arc<AppState>>,
    signed_in: SignedIn,
    Path((obj_type, obj_id, action)): Path<(String, i64, String)>,
) -> Result<Redirect, AppError> {
    let kind: TargetKind = obj_type
        .parse()
        .map_err(|_| AppError::not_found("object type", &obj_type))?;
    let target = Target { kind, id: obj_id };

    let repo = ReactionRepo::new(&state.pool);
    match action.parse::<VoteAction>() {
        Ok(action) => {
            repo.toggle(target, signed_in.user.id, action).await?;
            tracing::info!(
                user = %signed_in.user.username,
                target_kind = %kind,
                target_id = obj_id,
                %action,
                "vote"
            );
        }
        Err(e) => {
            if !repo.exists(target).await? {
                return Err(AppError::not_found(kind.as_str(), obj_id));
            }
            tracing::debug!(error = %e, "ignoring unknown vote action");
        }
    }

    Ok(Redirect::to("/"))
}

/// Vote routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/vote/{obj_type}/{obj_id}/{action}", get(add_vote))
}
