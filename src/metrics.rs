/*
Per-task scoring.
Everything here is derived from a persisted Task plus a reference time
and is thrown away after each scheduling pass.
*/

use chrono::{DateTime, FixedOffset};

use crate::date_math::{days_between, days_remaining};
use crate::models::{MetricsView, SCALE_MAX, Task};

// Score weights (sum to 1.0)
pub const WEIGHT_URGENCY: f64 = 0.30;
pub const WEIGHT_IMPORTANCE: f64 = 0.25;
pub const WEIGHT_CONSEQUENCES: f64 = 0.15;
pub const WEIGHT_EFFORT: f64 = 0.15;
pub const WEIGHT_DIFFICULTY: f64 = 0.15;

// Fairness penalty numerator
pub const FAIRNESS_ALPHA: f64 = 1.5;
// Staleness assumed for a task that was never scheduled
pub const NEVER_SCHEDULED_DAYS: f64 = 10.0;
// Lower bound on days-since-last to keep the penalty finite
pub const MIN_DAYS_SINCE_LAST: f64 = 0.1;

const SCALE: f64 = SCALE_MAX as f64;

/// Compute the metrics view for one task at `now`.
///
/// Steps:
/// - pace: `daily_required = remaining_work / max(days_remaining, 1)`
/// - urgency: pace scaled by 10 and capped at 10
/// - base score: weighted mix of urgency and the owner's inputs, with
///   effort and difficulty inverted so that easier tasks score higher
/// - fairness: recently scheduled tasks lose `1.5 / max(days_since, 0.1)`
pub fn calculate_task_metrics(task: &Task, now: DateTime<FixedOffset>) -> MetricsView {
    let days_remaining = days_remaining(task.deadline, now);
    let remaining_work = task.remaining_work();

    let safe_days = days_remaining.max(1) as f64;
    let daily_required = remaining_work / safe_days;
    let urgency = (daily_required * SCALE).min(SCALE);
    let slack = days_remaining as f64 - remaining_work;

    // Policy: low-effort / low-difficulty tasks are preferred
    let effort_score = SCALE - task.effort as f64;
    let difficulty_score = SCALE - task.difficulty as f64;

    let base_score = urgency * WEIGHT_URGENCY
        + task.importance as f64 * WEIGHT_IMPORTANCE
        + task.consequences as f64 * WEIGHT_CONSEQUENCES
        + effort_score * WEIGHT_EFFORT
        + difficulty_score * WEIGHT_DIFFICULTY;

    let days_since_last = task
        .last_scheduled_at
        .map(|last| days_between(last, now))
        .unwrap_or(NEVER_SCHEDULED_DAYS);
    let fairness_penalty = FAIRNESS_ALPHA / days_since_last.max(MIN_DAYS_SINCE_LAST);
    let adjusted_score = base_score - fairness_penalty;

    let is_critical = remaining_work >= days_remaining as f64;

    MetricsView {
        task: task.clone(),
        days_remaining,
        remaining_work,
        daily_required,
        urgency,
        slack,
        base_score,
        fairness_penalty,
        adjusted_score,
        is_critical,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskStatus;
    use chrono::Duration;
    use uuid::Uuid;

    fn now() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2026-03-10T10:00:00+00:00").unwrap()
    }

    fn task_due_in(days: i64, estimated: i64, remaining: Option<f64>) -> Task {
        Task {
            id: Uuid::new_v4(),
            owner_id: Uuid::nil(),
            title: "thesis chapter".to_string(),
            description: None,
            deadline: Some(now().date_naive() + Duration::days(days)),
            estimated_days: estimated,
            remaining_days: remaining,
            importance: 8,
            effort: 2,
            difficulty: 2,
            consequences: 8,
            status: TaskStatus::Pending,
            last_scheduled_at: None,
            completed_at: None,
            created_at: now(),
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn pace_urgency_and_criticality() {
        let m = calculate_task_metrics(&task_due_in(5, 10, Some(10.0)), now());
        assert_eq!(m.days_remaining, 5);
        assert!(close(m.daily_required, 2.0));
        assert!(close(m.urgency, 10.0));
        assert!(close(m.slack, -5.0));
        assert!(m.is_critical);
    }

    #[test]
    fn base_score_uses_fixed_weights() {
        // urgency 10, importance 8, consequences 8, effort 2 -> 8, difficulty 2 -> 8
        let m = calculate_task_metrics(&task_due_in(5, 10, Some(10.0)), now());
        let expected = 0.30 * 10.0 + 0.25 * 8.0 + 0.15 * 8.0 + 0.15 * 8.0 + 0.15 * 8.0;
        assert!(close(m.base_score, expected));
    }

    #[test]
    fn never_scheduled_gets_small_penalty() {
        let m = calculate_task_metrics(&task_due_in(5, 2, None), now());
        assert!(close(m.fairness_penalty, 0.15));
        assert!(close(m.adjusted_score, m.base_score - 0.15));
    }

    #[test]
    fn recently_scheduled_penalty_is_floored() {
        let mut t = task_due_in(5, 2, None);
        t.last_scheduled_at = Some(now());
        let m = calculate_task_metrics(&t, now());
        assert!(close(m.fairness_penalty, 15.0));

        t.last_scheduled_at = Some(now() - Duration::days(3));
        let m = calculate_task_metrics(&t, now());
        assert!(close(m.fairness_penalty, 0.5));
    }

    #[test]
    fn overdue_task_uses_one_day_denominator() {
        let m = calculate_task_metrics(&task_due_in(-2, 3, Some(1.5)), now());
        assert_eq!(m.days_remaining, -2);
        assert!(close(m.daily_required, 1.5));
        assert!(close(m.urgency, 10.0));
        assert!(m.is_critical);
    }

    #[test]
    fn relaxed_task_is_not_critical() {
        let m = calculate_task_metrics(&task_due_in(20, 4, None), now());
        assert!(close(m.daily_required, 0.2));
        assert!(close(m.urgency, 2.0));
        assert!(close(m.slack, 16.0));
        assert!(!m.is_critical);
    }

    #[test]
    fn no_deadline_defaults_to_zero_days() {
        let mut t = task_due_in(5, 2, None);
        t.deadline = None;
        let m = calculate_task_metrics(&t, now());
        assert_eq!(m.days_remaining, 0);
        assert!(close(m.daily_required, 2.0));
        assert!(m.is_critical);
        assert_eq!(m.task.id, t.id);
    }

    #[test]
    fn urgency_stays_within_scale() {
        for days in [-3, 0, 1, 2, 7, 30] {
            for remaining in [0.0, 0.5, 1.0, 4.0, 12.0] {
                let m = calculate_task_metrics(&task_due_in(days, 12, Some(remaining)), now());
                assert!((0.0..=10.0).contains(&m.urgency));
                let expected = remaining / (days.max(1) as f64);
                assert!(close(m.daily_required, expected));
            }
        }
    }

    #[test]
    fn easier_task_scores_higher() {
        let hard = Task {
            effort: 9,
            difficulty: 9,
            ..task_due_in(10, 2, None)
        };
        let easy = Task {
            effort: 1,
            difficulty: 1,
            ..task_due_in(10, 2, None)
        };
        assert!(calculate_task_metrics(&easy, now()).base_score > calculate_task_metrics(&hard, now()).base_score);
    }
}
