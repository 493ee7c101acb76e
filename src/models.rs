use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Scalar inputs (importance, effort, ...) live on a 0..=10 scale
pub const SCALE_MAX: i64 = 10;
pub const DEFAULT_SCALAR: i64 = 5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Completed,
    Missed,
}

impl TaskStatus {
    // completed / missed never revert automatically
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Missed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    pub estimated_days: i64,
    #[serde(default)]
    pub remaining_days: Option<f64>, // falls back to estimated_days
    pub importance: i64,   // 0..=10
    pub effort: i64,       // 0..=10
    pub difficulty: i64,   // 0..=10
    pub consequences: i64, // 0..=10
    pub status: TaskStatus,
    #[serde(default)]
    pub last_scheduled_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<FixedOffset>>,
    pub created_at: DateTime<FixedOffset>,
}

impl Task {
    /// Work units still to do, defaulting to the full estimate.
    pub fn remaining_work(&self) -> f64 {
        self.remaining_days.unwrap_or(self.estimated_days as f64)
    }

    /// Apply a state patch. Present fields replace the stored value.
    pub fn apply_patch(&mut self, patch: &TaskPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(remaining) = patch.remaining_days {
            self.remaining_days = Some(remaining);
        }
        if let Some(at) = patch.last_scheduled_at {
            self.last_scheduled_at = Some(at);
        }
        if let Some(at) = patch.completed_at {
            self.completed_at = Some(at);
        }
    }

    /// Apply a descriptive edit.
    ///
    /// Changing `estimated_days` keeps the same completed fraction:
    /// `remaining = min(new_est, round(new_est * remaining / old_est))`.
    pub fn apply_edit(&mut self, edit: TaskEdit) {
        if let Some(new_est) = edit.estimated_days {
            if new_est != self.estimated_days && self.estimated_days > 0 {
                let ratio = self.remaining_work() / self.estimated_days as f64;
                let rescaled = (new_est as f64 * ratio).round();
                self.remaining_days = Some(rescaled.min(new_est as f64));
            }
            self.estimated_days = new_est;
        }
        if let Some(title) = edit.title {
            self.title = title;
        }
        if let Some(description) = edit.description {
            self.description = description;
        }
        if let Some(deadline) = edit.deadline {
            self.deadline = deadline;
        }
        if let Some(v) = edit.importance {
            self.importance = v;
        }
        if let Some(v) = edit.effort {
            self.effort = v;
        }
        if let Some(v) = edit.difficulty {
            self.difficulty = v;
        }
        if let Some(v) = edit.consequences {
            self.consequences = v;
        }
    }
}

// Partial update of the four scheduling-state fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    pub status: Option<TaskStatus>,
    pub remaining_days: Option<f64>,
    pub last_scheduled_at: Option<DateTime<FixedOffset>>,
    pub completed_at: Option<DateTime<FixedOffset>>,
}

impl TaskPatch {
    pub fn status_only(status: TaskStatus) -> Self {
        TaskPatch {
            status: Some(status),
            ..TaskPatch::default()
        }
    }
}

/// State proposed by the state advancer after a unit of work.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NextTaskState {
    pub status: TaskStatus,
    pub remaining_days: f64,
    pub last_scheduled_at: DateTime<FixedOffset>,
    pub completed_at: Option<DateTime<FixedOffset>>,
}

impl From<NextTaskState> for TaskPatch {
    fn from(next: NextTaskState) -> Self {
        TaskPatch {
            status: Some(next.status),
            remaining_days: Some(next.remaining_days),
            last_scheduled_at: Some(next.last_scheduled_at),
            completed_at: next.completed_at,
        }
    }
}

// Editable descriptive fields; absent means "leave as is".
// description / deadline: Some(None) clears the stored value.
#[derive(Debug, Clone, Default)]
pub struct TaskEdit {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub deadline: Option<Option<NaiveDate>>,
    pub estimated_days: Option<i64>,
    pub importance: Option<i64>,
    pub effort: Option<i64>,
    pub difficulty: Option<i64>,
    pub consequences: Option<i64>,
}

// Derived per-task figures, recomputed on every scheduling pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsView {
    pub task: Task,
    pub days_remaining: i64,
    pub remaining_work: f64,
    pub daily_required: f64,
    pub urgency: f64,   // 0..=10
    pub slack: f64,     // >0 ahead, <0 behind
    pub base_score: f64,
    pub fairness_penalty: f64,
    pub adjusted_score: f64,
    pub is_critical: bool,
}

// A ranked task that received part of today's capacity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduledTask {
    #[serde(flatten)]
    pub metrics: MetricsView,
    pub allocated: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySchedule {
    pub must_do_task: Option<ScheduledTask>,
    pub scheduled_tasks: Vec<ScheduledTask>,
    pub all_tasks: Vec<MetricsView>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Db {
    pub tasks: Vec<Task>,
}
