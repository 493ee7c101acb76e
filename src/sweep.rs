/*
Read-time correction of overdue tasks.
Any pending task whose deadline has passed with work still left is flagged
missed. The state advancer runs its own missed check on write; both stay.
*/

use chrono::{DateTime, FixedOffset};
use tracing::warn;
use uuid::Uuid;

use crate::date_math::days_remaining;
use crate::models::{Task, TaskPatch, TaskStatus};

pub fn is_overdue(task: &Task, now: DateTime<FixedOffset>) -> bool {
    task.status == TaskStatus::Pending
        && days_remaining(task.deadline, now) < 0
        && task.remaining_work() > 0.0
}

/// Flag overdue pending tasks as missed, in place.
///
/// Returns the status patches the store has to persist.
pub fn sweep_missed(tasks: &mut [Task], now: DateTime<FixedOffset>) -> Vec<(Uuid, TaskPatch)> {
    let mut patches = Vec::new();

    for task in tasks.iter_mut() {
        if !is_overdue(task, now) {
            continue;
        }

        warn!(
            task_id = %task.id,
            deadline = ?task.deadline,
            remaining = task.remaining_work(),
            "deadline passed, marking task missed"
        );

        let patch = TaskPatch::status_only(TaskStatus::Missed);
        task.apply_patch(&patch);
        patches.push((task.id, patch));
    }

    patches
}
