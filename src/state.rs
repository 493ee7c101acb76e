/*
Task state after a unit of work.
Produces the proposed values only; persisting them is up to the store.
*/

use chrono::{DateTime, FixedOffset};
use tracing::debug;

use crate::date_math::days_remaining;
use crate::models::{NextTaskState, Task, TaskStatus};

// Work applied when no allocation is given (e.g. a manual "progress" click)
pub const DEFAULT_CHUNK: f64 = 1.0;

/// Compute the state of `task` after `allocated` units of work at `now`.
///
/// Transitions for a pending task, in order:
/// - nothing left        -> completed (completed_at = now)
/// - deadline has passed -> missed
/// - otherwise           -> pending
///
/// Completed and missed tasks keep their status and `completed_at`, but the
/// work is still subtracted. `last_scheduled_at` is refreshed on every call.
pub fn calculate_next_task_state(
    task: &Task,
    allocated: Option<f64>,
    now: DateTime<FixedOffset>,
) -> NextTaskState {
    let chunk = allocated
        .filter(|a| a.is_finite() && *a != 0.0)
        .unwrap_or(DEFAULT_CHUNK);
    let new_remaining = (task.remaining_work() - chunk).max(0.0);
    let days_left = days_remaining(task.deadline, now);

    let status = if task.status.is_terminal() {
        task.status
    } else if new_remaining <= 0.0 {
        TaskStatus::Completed
    } else if days_left < 0 {
        TaskStatus::Missed
    } else {
        TaskStatus::Pending
    };

    let completed_at = if status == TaskStatus::Completed && !task.status.is_terminal() {
        Some(now)
    } else {
        task.completed_at
    };

    debug!(
        task_id = %task.id,
        chunk,
        remaining = new_remaining,
        ?status,
        "advanced task state"
    );

    NextTaskState {
        status,
        remaining_days: new_remaining,
        last_scheduled_at: now,
        completed_at,
    }
}
