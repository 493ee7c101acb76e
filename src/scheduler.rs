/*
Daily schedule generation: rank the active tasks, then hand out the day's
capacity greedily in rank order.
Kept free of HTTP / Axum so it can be tested on its own.
*/

use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset};
use tracing::{debug, info};

use crate::metrics::calculate_task_metrics;
use crate::models::{DailySchedule, MetricsView, ScheduledTask, Task, TaskStatus};

pub const DEFAULT_DAILY_CAPACITY: f64 = 3.0;

// Paces closer than this are treated as equal (float jitter guard)
pub const PACE_EPSILON: f64 = 0.001;

// Select tasks that take part in scheduling.
//
// Only pending tasks; completed and missed never come back.
pub fn active_tasks(tasks: &[Task]) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Pending)
        .collect()
}

// Fixed-width pace bucket; paces in the same bucket compare as equal.
//
// Bucket boundaries do not depend on the other tasks, so two paces more than
// PACE_EPSILON apart never share a bucket.
fn pace_bucket(view: &MetricsView) -> i64 {
    (view.daily_required / PACE_EPSILON).floor() as i64
}

// Priority order between two ranked tasks.
//
// 1) critical before non-critical, whatever the score
// 2) higher pace bucket first
// 3) higher adjusted score first
// 4) task id ascending, so no two tasks ever tie
fn compare_ranked(a: &(i64, MetricsView), b: &(i64, MetricsView)) -> Ordering {
    let (bucket_a, ma) = a;
    let (bucket_b, mb) = b;
    mb.is_critical
        .cmp(&ma.is_critical)
        .then_with(|| bucket_b.cmp(bucket_a))
        .then_with(|| mb.adjusted_score.total_cmp(&ma.adjusted_score))
        .then_with(|| ma.task.id.cmp(&mb.task.id))
}

/// Sort metrics views into scheduling priority order.
pub fn rank_tasks(views: Vec<MetricsView>) -> Vec<MetricsView> {
    let mut ranked: Vec<(i64, MetricsView)> =
        views.into_iter().map(|v| (pace_bucket(&v), v)).collect();
    ranked.sort_by(compare_ranked);
    ranked.into_iter().map(|(_, view)| view).collect()
}

/// Hand out `daily_capacity` across ranked tasks.
///
/// Each task gets `min(daily_required, capacity_left)`. Tasks with nothing
/// to do today are skipped without consuming capacity. Stops as soon as the
/// capacity is used up.
pub fn allocate_capacity(ranked: &[MetricsView], daily_capacity: f64) -> Vec<ScheduledTask> {
    let mut capacity = daily_capacity;
    let mut scheduled: Vec<ScheduledTask> = Vec::new();

    for view in ranked {
        if capacity <= 0.0 {
            break;
        }

        let allocated = view.daily_required.min(capacity);
        if allocated <= 0.0 {
            continue;
        }

        debug!(
            task_id = %view.task.id,
            allocated,
            capacity_left = capacity - allocated,
            critical = view.is_critical,
            "allocated capacity"
        );

        scheduled.push(ScheduledTask {
            metrics: view.clone(),
            allocated,
        });
        capacity -= allocated;
    }

    scheduled
}

/// Build today's schedule.
///
/// Process:
/// - keep pending tasks only
/// - compute metrics for each of them at `now`
/// - rank them
/// - allocate the capacity; the first allocated task is the must-do task
pub fn generate_daily_schedule(
    tasks: &[Task],
    daily_capacity: f64,
    now: DateTime<FixedOffset>,
) -> DailySchedule {
    let views: Vec<MetricsView> = active_tasks(tasks)
        .into_iter()
        .map(|t| calculate_task_metrics(t, now))
        .collect();

    let all_tasks = rank_tasks(views);
    let scheduled_tasks = allocate_capacity(&all_tasks, daily_capacity);
    let must_do_task = scheduled_tasks.first().cloned();

    info!(
        active = all_tasks.len(),
        scheduled = scheduled_tasks.len(),
        daily_capacity,
        must_do = ?must_do_task.as_ref().map(|t| t.metrics.task.id),
        "generated daily schedule"
    );

    DailySchedule {
        must_do_task,
        scheduled_tasks,
        all_tasks,
    }
}
