use axum::Json;
use axum::extract::State;

use crate::model::Actor;
use crate::services::dashboard::{self, DashboardSummary};
use crate::state::AppState;

pub async fn summary(State(state): State<AppState>, actor: Actor) -> Json<DashboardSummary> {
    Json(dashboard::summary(&state, actor).await)
}
