use axum::{
    Json,
    extract::{Query, State},
    http::HeaderMap,
};
use serde::{Deserialize, Serialize};

use crate::app::{AppState, now_fixed_offset, owner_id};
use crate::error::{Error, Result};
use crate::models::DailySchedule;
use crate::scheduler::generate_daily_schedule;

#[derive(Debug, Default, Deserialize)]
pub struct PlanQuery {
    pub capacity: Option<f64>, // work units for today; server default if absent
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub date: String,
    pub now: String,
    pub daily_capacity: f64,
    #[serde(flatten)]
    pub schedule: DailySchedule,
}

// -----------------------------
// GET /api/plan/today
// Sweeps missed tasks, then ranks and allocates today's capacity
// -----------------------------
pub async fn get_today_plan(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(q): Query<PlanQuery>,
) -> Result<Json<PlanResponse>> {
    let owner = owner_id(&headers)?;

    let daily_capacity = q.capacity.unwrap_or(state.daily_capacity);
    if !daily_capacity.is_finite() {
        return Err(Error::BadRequest("invalid capacity".to_string()));
    }

    let now = now_fixed_offset();
    let tasks = state.store.list_tasks_swept(owner, now)?;
    let schedule = generate_daily_schedule(&tasks, daily_capacity, now);

    Ok(Json(PlanResponse {
        date: now.date_naive().format("%Y-%m-%d").to_string(),
        now: now.to_rfc3339(),
        daily_capacity,
        schedule,
    }))
}
