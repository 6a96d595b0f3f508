use axum::{extract::State, routing::get, Extension, Json, Router};

use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::models::{ContactFilter, Segment};
use crate::services::aggregate_segments;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(list_segments))
}

async fn list_segments(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<Segment>>> {
    let contacts = state
        .repos
        .contacts
        .list(user.id, &ContactFilter::default())
        .await?;
    let lists = state.repos.lists.list(user.id).await?;

    Ok(Json(aggregate_segments(&contacts, &lists)))
}
