// Shared request-handling pieces: state, owner lookup, clock, router.

use std::sync::Arc;

use axum::{
    Router,
    http::HeaderMap,
    routing::{get, post, put},
};
use chrono::{DateTime, FixedOffset};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::store::TaskStore;
use crate::{routes_plan, routes_tasks};

pub const OWNER_HEADER: &str = "x-owner-id";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TaskStore>,
    pub daily_capacity: f64,
}

impl AppState {
    pub fn new(store: Arc<dyn TaskStore>, daily_capacity: f64) -> Self {
        Self {
            store,
            daily_capacity,
        }
    }
}

// Local time as a fixed offset (current system offset)
pub fn now_fixed_offset() -> DateTime<FixedOffset> {
    chrono::Local::now().fixed_offset()
}

// Owner identity comes from the caller; credentials are checked upstream.
pub fn owner_id(headers: &HeaderMap) -> Result<Uuid> {
    headers
        .get(OWNER_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s.trim()).ok())
        .ok_or(Error::MissingOwner)
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        // plan
        .route("/plan/today", get(routes_plan::get_today_plan))
        // tasks
        .route("/tasks", get(routes_tasks::get_tasks).post(routes_tasks::create_task))
        .route(
            "/tasks/:id",
            put(routes_tasks::update_task).delete(routes_tasks::delete_task),
        )
        .route("/tasks/:id/progress", post(routes_tasks::progress_task));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn reads_owner_header() {
        let owner = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(OWNER_HEADER, HeaderValue::from_str(&owner.to_string()).unwrap());
        assert_eq!(owner_id(&headers).unwrap(), owner);
    }

    #[test]
    fn rejects_missing_or_garbage_owner() {
        assert!(matches!(owner_id(&HeaderMap::new()), Err(Error::MissingOwner)));
        let mut headers = HeaderMap::new();
        headers.insert(OWNER_HEADER, HeaderValue::from_static("not-a-uuid"));
        assert!(matches!(owner_id(&headers), Err(Error::MissingOwner)));
    }
}
