use axum::{extract::State, routing::get, Extension, Json, Router};

use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::services::{DashboardService, DashboardStats};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/stats", get(get_stats))
}

async fn get_stats(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<DashboardStats>> {
    let dashboard_service = DashboardService::new(&state.repos);
    let stats = dashboard_service.get_stats(user.id).await?;
    Ok(Json(stats))
}
